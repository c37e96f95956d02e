//! Page mount tracking.
//!
//! A page's async work can outlive the page: the operator navigates away
//! while a fetch is in flight. The page keeps a [`Mount`] and checks it after
//! every await; whoever drives navigation keeps the [`MountHandle`] and drops
//! it (or calls [`MountHandle::unmount`]) when the page goes away. Results
//! arriving after that are discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug)]
pub struct Mount {
    active: Arc<AtomicBool>,
}

#[derive(Debug)]
pub struct MountHandle {
    active: Arc<AtomicBool>,
}

impl Mount {
    pub fn new() -> (Mount, MountHandle) {
        let active = Arc::new(AtomicBool::new(true));
        (
            Mount {
                active: active.clone(),
            },
            MountHandle { active },
        )
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl MountHandle {
    pub fn unmount(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}
