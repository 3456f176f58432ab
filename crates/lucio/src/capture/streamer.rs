use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};

use crate::capture::buffer::FrameBuffer;
use crate::capture::grabber::FrameGrabber;
use crate::error::CaptureError;

/// Refreshes a [`FrameBuffer`] from a [`FrameGrabber`] on a background
/// thread. A failed capture keeps the previous frame.
pub struct ScreenStreamer {
    grabber: Arc<dyn FrameGrabber>,
    buffer: FrameBuffer,
    interval: Duration,
    running: Arc<AtomicBool>,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ScreenStreamer {
    pub fn new(grabber: Arc<dyn FrameGrabber>, buffer: FrameBuffer, interval: Duration) -> Self {
        Self {
            grabber,
            buffer,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            stop_tx: None,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Starts the capture loop. Starting a running streamer does nothing.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.is_running() {
            return Ok(());
        }

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let grabber = Arc::clone(&self.grabber);
        let buffer = self.buffer.clone();
        let running = Arc::clone(&self.running);
        let interval = self.interval;

        running.store(true, Ordering::Release);
        let handle = std::thread::Builder::new()
            .name("lucio-screen".to_string())
            .spawn(move || {
                let mut failures: u32 = 0;
                loop {
                    match grabber.grab() {
                        Ok(frame) => {
                            if failures > 0 {
                                tracing::info!(after = failures, "Screen capture recovered");
                            }
                            failures = 0;
                            buffer.publish(frame);
                        }
                        Err(e) => {
                            failures += 1;
                            // Only the first failure of a streak is worth a warning
                            if failures == 1 {
                                tracing::warn!("Screen capture failed: {}", e);
                            } else {
                                tracing::trace!("Screen capture failed: {}", e);
                            }
                        }
                    }

                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        _ => break,
                    }
                }
                running.store(false, Ordering::Release);
            })
            .map_err(|e| {
                self.running.store(false, Ordering::Release);
                CaptureError::StreamerSpawn(e.to_string())
            })?;

        self.stop_tx = Some(stop_tx);
        self.handle = Some(handle);
        Ok(())
    }

    /// Stops the capture loop and waits for the thread to exit. The last
    /// frame stays in the buffer.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Screen streamer thread panicked");
            }
        }
        self.running.store(false, Ordering::Release);
    }
}

impl Drop for ScreenStreamer {
    fn drop(&mut self) {
        self.stop();
    }
}
