//! Configuring the process-wide pool.
//!
//! Kept in its own test binary: the global pool can only be configured before
//! the first allocation of its element type in the process.

use densor_core::pool;
use densor_core::prelude::*;
use densor_core::PoolConfig;

#[test]
fn test_configured_global_pool_bounds_op_outputs() {
    let config = PoolConfig::default().max_free_per_bucket(1);
    assert!(pool::init_global::<f64>(config));
    assert!(!pool::init_global::<f64>(PoolConfig::default()));

    let global = pool::global::<f64>();
    assert_eq!(global.config(), config);

    let a = Dense::<f64>::zeros(4, 4);
    let b = a.add(&a);
    let c = a.mul(&b);
    let d = c.clone();
    for t in [&b, &c, &d] {
        assert!(t.is_from_pool());
    }
    let before = global.stats();
    assert_eq!(before.allocated, 4);

    // Every 4x4 output lands in the same bucket, which keeps one idle buffer.
    for t in [a, b, c, d] {
        global.put(t);
    }
    let after = global.stats();
    assert_eq!(global.idle_buffers(), 1);
    assert_eq!(after.returned, 1);
    assert_eq!(after.discarded, 3);

    // The next op output reuses the kept buffer.
    let e = Dense::<f64>::ones(4, 4).sub_scalar(1.0);
    assert!(e.data().iter().all(|&v| v == 0.0));
    assert_eq!(global.stats().reused, 1);
}
