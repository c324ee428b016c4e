use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cooperative cancellation flag checked between files during a bulk
/// forest walk.
///
/// Cheap to clone; every clone observes the same underlying flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A token that never reports cancelled, for callers that don't need
    /// to interrupt a query.
    pub fn never() -> CancellationToken {
        CancellationToken::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The host-side handle used to request cancellation of whichever query
/// was handed the paired [`CancellationToken`].
#[derive(Clone, Debug, Default)]
pub struct CancellationSource(Arc<AtomicBool>);

impl CancellationSource {
    pub fn new() -> (CancellationSource, CancellationToken) {
        let flag = Arc::new(AtomicBool::new(false));
        (CancellationSource(Arc::clone(&flag)), CancellationToken(flag))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}
