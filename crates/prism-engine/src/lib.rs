//! Prism engine crate.
//!
//! This crate owns the GPU pipeline pieces used by the viewer: device
//! acquisition, buffer/pipeline resources, readback, and the frame loop.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod pipeline;
pub mod render;
pub mod resource;
