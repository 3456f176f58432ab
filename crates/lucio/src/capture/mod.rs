//! Screen capture: a background streamer keeps the latest frame in a shared
//! buffer so the pipeline never waits for a fresh screenshot.

pub mod buffer;
pub mod grabber;
pub mod streamer;

pub use buffer::FrameBuffer;
pub use grabber::{CommandGrabber, FrameGrabber};
pub use streamer::ScreenStreamer;
