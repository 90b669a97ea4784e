use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Tracks GPU device loss. A lost device never comes back, so once set the
/// flag stays set and the owner must rebuild from a fresh device.
#[derive(Clone, Debug, Default)]
pub struct ContextGuard {
    lost: Arc<AtomicBool>,
}

impl ContextGuard {
    pub fn install(device: &wgpu::Device) -> Self {
        let guard = Self::default();
        let hook = guard.clone();
        device.set_device_lost_callback(move |reason, message| {
            warn!(?reason, %message, "gpu device lost, rendering paused");
            hook.mark_lost();
        });
        guard
    }

    pub fn mark_lost(&self) {
        self.lost.store(true, Ordering::SeqCst);
    }

    pub fn is_lost(&self) -> bool {
        self.lost.load(Ordering::SeqCst)
    }
}
