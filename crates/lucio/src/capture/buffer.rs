use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::adapters::{ScreenImage, ScreenSource};

/// Latest captured frame, shared between the streamer and readers.
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    latest: Arc<RwLock<Option<ScreenImage>>>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, frame: ScreenImage) {
        match self.latest.write() {
            Ok(mut slot) => *slot = Some(frame),
            Err(poisoned) => *poisoned.into_inner() = Some(frame),
        }
    }

    /// Blocks until a frame is available or `timeout` passes.
    pub fn wait_for_frame(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.latest().is_some() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            std::thread::sleep((deadline - now).min(Duration::from_millis(25)));
        }
    }
}

impl ScreenSource for FrameBuffer {
    fn latest(&self) -> Option<ScreenImage> {
        self.latest.read().ok().and_then(|slot| slot.clone())
    }
}
