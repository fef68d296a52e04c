use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Connectivity flag checked before every network read or write.
#[derive(Debug, Clone)]
pub struct Connectivity(Arc<AtomicBool>);

impl Connectivity {
    pub fn new(online: bool) -> Self {
        Self(Arc::new(AtomicBool::new(online)))
    }

    pub fn is_online(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set_online(&self, online: bool) {
        self.0.store(online, Ordering::Relaxed);
    }

    pub fn label(&self) -> &'static str {
        if self.is_online() {
            "ONLINE"
        } else {
            "OFFLINE"
        }
    }
}
