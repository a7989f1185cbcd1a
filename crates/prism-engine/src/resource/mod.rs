//! GPU-resident resources.
//!
//! Buffers are wrapped in scoped types so the device-side free and the
//! host-side handle release always happen, in that order, on every exit
//! path. Readback is a one-shot watcher decoupled from the frame loop.

mod buffer;
mod readback;

pub use buffer::{BufferInit, DeviceBuffer};
pub use readback::{Readback, ReadbackPoll};
