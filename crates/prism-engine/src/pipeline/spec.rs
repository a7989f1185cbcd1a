use std::borrow::Cow;

/// Compiles a WGSL shader module from source text.
///
/// Compilation errors surface through the device's uncaptured-error channel;
/// the returned module handle is valid either way and fails at pipeline
/// creation if the source was bad.
pub fn compile_shader(device: &wgpu::Device, source: &str, label: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
    })
}

/// Fragment stage description: one color target with optional blending.
#[derive(Debug, Clone)]
pub struct FragmentSpec<'a> {
    pub entry: &'a str,
    /// Must match the presentation surface's format for on-screen use;
    /// a mismatch fails validation at draw time, not here.
    pub format: wgpu::TextureFormat,
    pub blend: Option<wgpu::BlendState>,
    pub write_mask: wgpu::ColorWrites,
}

impl<'a> FragmentSpec<'a> {
    /// Conventional fragment stage: `fs_main`, alpha blending, all channels.
    pub fn new(format: wgpu::TextureFormat) -> Self {
        Self {
            entry: "fs_main",
            format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        }
    }
}

/// Multisample state.
#[derive(Debug, Clone)]
pub struct MultisampleSpec {
    pub count: u32,
    pub mask: u64,
    pub alpha_to_coverage: bool,
}

impl Default for MultisampleSpec {
    fn default() -> Self {
        Self {
            count: 1,
            mask: !0,
            alpha_to_coverage: false,
        }
    }
}

/// Declarative render pipeline description.
///
/// Identical specs build pipelines with identical behavior, so a spec can be
/// kept around as the canonical description of what the pipeline does.
#[derive(Debug, Clone)]
pub struct PipelineSpec<'a> {
    pub label: &'a str,
    pub vs_entry: &'a str,
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub topology: wgpu::PrimitiveTopology,
    pub strip_index_format: Option<wgpu::IndexFormat>,
    pub front_face: wgpu::FrontFace,
    pub cull_mode: Option<wgpu::Face>,
    pub fragment: Option<FragmentSpec<'a>>,
    pub depth_stencil: Option<wgpu::DepthStencilState>,
    pub multisample: MultisampleSpec,
}

impl Default for PipelineSpec<'_> {
    fn default() -> Self {
        Self {
            label: "prism pipeline",
            vs_entry: "vs_main",
            vertex_buffers: &[],
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            fragment: None,
            depth_stencil: None,
            multisample: MultisampleSpec::default(),
        }
    }
}

impl PipelineSpec<'_> {
    /// Creates the pipeline. One-time synchronous call; the result is
    /// immutable and valid for every subsequent frame.
    pub fn build(
        &self,
        device: &wgpu::Device,
        module: &wgpu::ShaderModule,
    ) -> wgpu::RenderPipeline {
        let targets = self.fragment.as_ref().map(|f| [Some(color_target(f))]);

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(self.label),
            layout: None,
            vertex: wgpu::VertexState {
                module,
                entry_point: Some(self.vs_entry),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: self.vertex_buffers,
            },
            fragment: self
                .fragment
                .as_ref()
                .zip(targets.as_ref())
                .map(|(f, targets)| wgpu::FragmentState {
                    module,
                    entry_point: Some(f.entry),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets,
                }),
            primitive: wgpu::PrimitiveState {
                topology: self.topology,
                strip_index_format: self.strip_index_format,
                front_face: self.front_face,
                cull_mode: self.cull_mode,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: self.depth_stencil.clone(),
            multisample: wgpu::MultisampleState {
                count: self.multisample.count,
                mask: self.multisample.mask,
                alpha_to_coverage_enabled: self.multisample.alpha_to_coverage,
            },
            multiview_mask: None,
            cache: None,
        })
    }
}

fn color_target(frag: &FragmentSpec<'_>) -> wgpu::ColorTargetState {
    wgpu::ColorTargetState {
        format: frag.format,
        blend: frag.blend,
        write_mask: frag.write_mask,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── defaults ──────────────────────────────────────────────────────────

    #[test]
    fn spec_defaults_match_conventions() {
        let spec = PipelineSpec::default();
        assert_eq!(spec.vs_entry, "vs_main");
        assert_eq!(spec.topology, wgpu::PrimitiveTopology::TriangleList);
        assert_eq!(spec.front_face, wgpu::FrontFace::Ccw);
        assert!(spec.cull_mode.is_none());
        assert!(spec.fragment.is_none());
        assert_eq!(spec.multisample.count, 1);
        assert_eq!(spec.multisample.mask, !0);
        assert!(!spec.multisample.alpha_to_coverage);
    }

    #[test]
    fn fragment_spec_defaults() {
        let frag = FragmentSpec::new(wgpu::TextureFormat::Bgra8UnormSrgb);
        assert_eq!(frag.entry, "fs_main");
        assert_eq!(frag.blend, Some(wgpu::BlendState::ALPHA_BLENDING));
        assert_eq!(frag.write_mask, wgpu::ColorWrites::ALL);
    }

    // ── color target construction ─────────────────────────────────────────

    #[test]
    fn color_target_carries_blend_and_mask() {
        let frag = FragmentSpec {
            entry: "fs_main",
            format: wgpu::TextureFormat::Rgba8Unorm,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::COLOR,
        };
        let target = color_target(&frag);
        assert_eq!(target.format, wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(target.blend, Some(wgpu::BlendState::REPLACE));
        assert_eq!(target.write_mask, wgpu::ColorWrites::COLOR);
    }

    #[test]
    fn alpha_blend_composes_over() {
        // src*srcFactor (+) dst*dstFactor, per channel.
        let blend = wgpu::BlendState::ALPHA_BLENDING;
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        assert_eq!(blend.color.operation, wgpu::BlendOperation::Add);
    }
}
