//! Benchmark: matrix product, LU, inverse and pool churn.
//!
//! Run with `cargo bench -p densor-core`; set `RUST_LOG=densor_core=trace`
//! to watch pool traffic.

use std::time::Instant;

use densor_core::pool;
use densor_core::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

fn time_per_iter(iters: usize, mut f: impl FnMut()) -> f64 {
    let start = Instant::now();
    for _ in 0..iters {
        f();
    }
    start.elapsed().as_secs_f64() / iters as f64
}

fn gflops(m: usize, n: usize, k: usize, secs: f64) -> f64 {
    (2.0 * m as f64 * n as f64 * k as f64) / secs / 1e9
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut rng = StdRng::seed_from_u64(0x5eed);

    println!("=== densor linalg benchmark ===\n");
    println!(
        "{:<8} {:>12} {:>10} {:>12} {:>12}",
        "Size", "mul (ms)", "GF/s", "lu (ms)", "inverse (ms)"
    );
    println!("{}", "-".repeat(58));

    for &n in &[32usize, 64, 128, 256] {
        let a = Dense::<f64>::random_uniform(n, n, -1.0, 1.0, &mut rng);
        let b = Dense::<f64>::random_uniform(n, n, -1.0, 1.0, &mut rng);
        let iters = if n <= 64 { 200 } else if n <= 128 { 20 } else { 4 };

        let mul_s = time_per_iter(iters, || {
            let _ = a.mul(&b);
        });
        let lu_s = time_per_iter(iters, || {
            let _ = a.lu();
        });
        let inv_s = time_per_iter(iters, || {
            let _ = a.inverse();
        });

        println!(
            "{:<8} {:>10.3}ms {:>10.2} {:>10.3}ms {:>10.3}ms",
            format!("{}x{}", n, n),
            mul_s * 1000.0,
            gflops(n, n, n, mul_s),
            lu_s * 1000.0,
            inv_s * 1000.0,
        );
    }

    println!("\n=== pool churn ===\n");
    let sizes = [16usize, 100, 1000, 10_000];
    let fresh_s = time_per_iter(10_000, || {
        for &s in &sizes {
            std::hint::black_box(Dense::from_vec(1, s, vec![0.0f32; s]));
        }
    });
    let pool = pool::global::<f32>();
    let pooled_s = time_per_iter(10_000, || {
        for &s in &sizes {
            let t = pool.get(1, s);
            pool.put(std::hint::black_box(t));
        }
    });
    println!("fresh vec:   {:>8.3}us / round", fresh_s * 1e6);
    println!("pooled:      {:>8.3}us / round", pooled_s * 1e6);
    println!("pool stats:  {:?}", pool.stats());
}
