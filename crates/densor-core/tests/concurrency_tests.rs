//! Integration tests for the pool and gradient slot under concurrent use.

use std::sync::Barrier;
use std::thread;

use densor_core::pool::{self, capacity_for};
use densor_core::prelude::*;
use densor_core::PoolConfig;

const THREADS: usize = 8;

// ============================================================================
// Pool
// ============================================================================

#[test]
fn test_pool_capacity_bounds() {
    for size in [1usize, 2, 3, 7, 8, 9, 100, 1000, 4097] {
        let cap = capacity_for(size);
        assert!(size < cap && cap <= 2 * size, "size {size}: cap {cap}");
    }
    assert_eq!(Pool::<f32>::new().get(0, 0).into_vec().capacity(), 0);
}

#[test]
fn test_held_buffer_capacity_across_reuse() {
    let pool = Pool::<f32>::new();
    let in_bounds = |cap: usize, size: usize| size < cap && cap <= 2 * size;
    for round in 0..3 {
        for size in 1..300usize {
            // Alternate shapes so one bucket serves several sizes.
            let (rows, cols) = if size % 2 == 0 { (2, size / 2) } else { (size, 1) };

            let fresh = pool.get(rows, cols);
            pool.put(fresh);
            let reused = pool.get(rows, cols);
            assert_eq!(reused.size(), size);
            let cap = reused.into_vec().capacity();
            assert!(in_bounds(cap, size), "round {round} get({rows}, {cols}): cap {cap}");

            let z = pool.get_empty(rows, cols);
            pool.put(z);
            let z = pool.get_empty(rows, cols);
            assert!(z.data().iter().all(|&v| v == 0.0));
            let cap = z.into_vec().capacity();
            assert!(in_bounds(cap, size), "round {round} get_empty({rows}, {cols}): cap {cap}");
        }
    }
    assert!(pool.stats().reused > 0);
}

#[test]
fn test_get_empty_after_dirty_put() {
    let pool = Pool::<f64>::new();
    for round in 0..4 {
        let mut t = pool.get(8, 8);
        t.fill(round as f64 + 1.0);
        pool.put(t);
        let z = pool.get_empty(8, 7);
        assert!(z.data().iter().all(|&v| v == 0.0), "round {round}");
        pool.put(z);
    }
}

#[test]
fn test_pool_concurrent_get_put() {
    let pool = Pool::<f32>::with_config(PoolConfig::default().max_free_per_bucket(4));
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for id in 0..THREADS {
            let pool = &pool;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                for i in 0..200 {
                    let n = 1 + (id * 13 + i) % 64;
                    let mut t = pool.get(n, 1);
                    let marker = (id * 1000 + i) as f32;
                    t.fill(marker);
                    // No other thread may observe or overwrite a checked-out buffer.
                    assert!(t.data().iter().all(|&v| v == marker));
                    pool.put(t);
                }
            });
        }
    });

    let stats = pool.stats();
    assert_eq!(stats.returned + stats.discarded, THREADS * 200);
    assert_eq!(stats.allocated + stats.reused, THREADS * 200);
    assert!(pool.idle_buffers() <= 4 * (usize::BITS as usize + 1));
}

#[test]
fn test_global_pool_shared_across_threads() {
    let addr = pool::global::<f64>() as *const Pool<f64> as usize;
    let other = thread::spawn(|| pool::global::<f64>() as *const Pool<f64> as usize)
        .join()
        .unwrap();
    assert_eq!(addr, other);
}

// ============================================================================
// Gradient accumulation
// ============================================================================

#[test]
fn test_concurrent_acc_grad_sums_contributions() {
    let param = Dense::<f64>::zeros(4, 4).with_requires_grad(true);
    let contributions: Vec<Dense<f64>> = (0..THREADS)
        .map(|i| Dense::from_fn(4, 4, |r, c| (i * 16 + r * 4 + c) as f64))
        .collect();
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for g in &contributions {
            let param = &param;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                param.acc_grad(g);
            });
        }
    });

    let mut expected = Dense::<f64>::zeros(4, 4);
    for g in &contributions {
        expected.add_in_place(g);
    }
    assert_eq!(param.grad().unwrap(), expected);
}

#[test]
fn test_readers_during_accumulation() {
    let param = Dense::<f32>::zeros(1, 8);
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for id in 0..THREADS {
            let param = &param;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                for _ in 0..100 {
                    if id % 2 == 0 {
                        param.acc_grad(&Dense::ones(1, 8));
                    } else if let Some(g) = param.grad() {
                        // A snapshot is never torn: every element saw the same updates.
                        let first = g.data()[0];
                        assert!(g.data().iter().all(|&v| v == first));
                    }
                }
            });
        }
    });

    let writers = THREADS / 2;
    assert!(param.has_grad());
    assert!(param.grad().unwrap().data().iter().all(|&v| v == (writers * 100) as f32));
    param.zero_grad();
    assert!(!param.has_grad());
}
