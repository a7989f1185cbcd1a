//! Shader compilation and render pipeline construction.
//!
//! A pipeline is described declaratively by [`PipelineSpec`] and created
//! once; the resulting `wgpu::RenderPipeline` is immutable and reused across
//! frames. Per-frame pipeline creation is a bug.

mod spec;

pub use spec::{FragmentSpec, MultisampleSpec, PipelineSpec, compile_shader};
