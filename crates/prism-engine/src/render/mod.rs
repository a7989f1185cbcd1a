//! Renderer-facing frame context.
//!
//! Draw code receives a [`RenderCtx`] (device/queue + surface format) and a
//! [`RenderTarget`] (encoder + color view) for exactly one frame. Long-lived
//! resources (pipelines, buffers) belong to the app; everything here is
//! frame-scoped.

mod color;
mod ctx;

pub use color::Color;
pub use ctx::{RenderCtx, RenderTarget};
