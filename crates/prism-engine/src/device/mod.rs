//! GPU device + surface management.
//!
//! This module is responsible for:
//! - acquiring the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - acquiring frames and submitting/presenting them

mod context;
mod error;
mod frame;
mod init;
mod surface;

pub use context::{FrameStats, Gpu};
pub use error::SurfaceErrorAction;
pub use frame::Frame;
pub use init::GpuInit;
