mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use common::app_router;

#[test]
fn test_concurrent_first_dispatch() {
    let router = Arc::new(app_router());
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let router = Arc::clone(&router);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let path = format!("/user/u{}/t{}", i, i);
                let found = router.dispatch(&path, "GET", None).expect("route matches");
                assert_eq!(found.params, vec![format!("u{}", i), format!("t{}", i)]);
                assert!(router.dispatch("/repo/mantis.nvim", "GET", None).is_some());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Patterns are memoized once per distinct path.
    let memo = router.patterns();
    assert!(memo.get("/user/{uuid}/{token}").is_some());
    assert_eq!(memo.len(), memo.sources().len());
    assert!(memo.len() <= router.routes().paths().count());
}
