//! Prism viewer: clears the window, draws one triangle, and runs a
//! write → copy → map-read buffer round trip through the engine's readback
//! watcher.

use std::process::ExitCode;

use prism_engine::core::{App, AppControl, FrameCtx};
use prism_engine::device::GpuInit;
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::pipeline::{compile_shader, FragmentSpec, PipelineSpec};
use prism_engine::render::Color;
use prism_engine::resource::{BufferInit, DeviceBuffer, Readback, ReadbackPoll};
use prism_engine::window::{Runtime, RuntimeConfig};

const TRIANGLE_WGSL: &str = include_str!("shaders/triangle.wgsl");

const CLEAR_COLOR: Color = Color::rgba(0.9, 0.1, 0.2, 1.0);

const DEMO_SIZE: u64 = 16;

#[derive(Default)]
struct TriangleApp {
    pipeline: Option<wgpu::RenderPipeline>,
    /// Source and destination of the device-to-device copy; kept alive until
    /// the readback of the destination has completed.
    demo_buffers: Option<(DeviceBuffer, DeviceBuffer)>,
    readback: Option<Readback>,
    demo_done: bool,
}

impl TriangleApp {
    /// Builds the render pipeline. Deferred to the first frame because the
    /// surface format is only known once the GPU context exists.
    fn ensure_pipeline(&mut self, ctx: &FrameCtx<'_, '_>) {
        if self.pipeline.is_some() {
            return;
        }

        let device = ctx.gpu.device();
        let module = compile_shader(device, TRIANGLE_WGSL, "triangle shader");
        let spec = PipelineSpec {
            label: "triangle pipeline",
            fragment: Some(FragmentSpec::new(ctx.gpu.surface_format())),
            ..Default::default()
        };
        self.pipeline = Some(spec.build(device, &module));
    }

    /// Starts the buffer demo: fill a buffer with `0..=15`, copy it
    /// device-to-device, then map the copy for reading.
    fn start_buffer_demo(&mut self, ctx: &FrameCtx<'_, '_>) -> anyhow::Result<()> {
        let device = ctx.gpu.device();
        let queue = ctx.gpu.queue();

        let src = DeviceBuffer::create(
            device,
            &BufferInit {
                label: "demo src",
                size: DEMO_SIZE,
                usage: wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            },
        )?;
        let dst = DeviceBuffer::create(
            device,
            &BufferInit {
                label: "demo dst",
                size: DEMO_SIZE,
                usage: wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            },
        )?;

        let data: Vec<u8> = (0..DEMO_SIZE as u8).collect();
        src.write(queue, 0, &data)?;

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("demo copy encoder"),
        });
        src.copy_to(&mut encoder, &dst, 0, 0, DEMO_SIZE)?;
        queue.submit(std::iter::once(encoder.finish()));
        ctx.gpu.notify_work_done("demo copy");

        self.readback = Some(Readback::enqueue(device, queue, &dst, 0, DEMO_SIZE)?);
        self.demo_buffers = Some((src, dst));
        Ok(())
    }

    /// Drives the readback one poll tick per frame until it completes.
    ///
    /// A failed readback only cancels the demo; the frame loop keeps going.
    fn poll_buffer_demo(&mut self, ctx: &FrameCtx<'_, '_>) {
        let Some(readback) = self.readback.take() else {
            return;
        };

        match readback.poll(ctx.gpu.device()) {
            ReadbackPoll::Pending(readback) => self.readback = Some(readback),
            ReadbackPoll::Ready(Ok(bytes)) => {
                log::info!("buffer round trip complete: {bytes:?}");
                self.demo_buffers = None;
                self.demo_done = true;
            }
            ReadbackPoll::Ready(Err(err)) => {
                log::warn!("buffer round trip failed: {err:#}");
                self.demo_buffers = None;
                self.demo_done = true;
            }
        }
    }
}

impl App for TriangleApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.ensure_pipeline(ctx);

        if !self.demo_done && self.demo_buffers.is_none() {
            if let Err(err) = self.start_buffer_demo(ctx) {
                log::warn!("buffer demo setup failed: {err:#}");
                self.demo_done = true;
            }
        }
        self.poll_buffer_demo(ctx);

        let Some(pipeline) = &self.pipeline else {
            return AppControl::Continue;
        };

        ctx.render(CLEAR_COLOR, |_rctx, target| {
            let mut rpass = target
                .encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("triangle pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target.color_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                });
            rpass.set_pipeline(pipeline);
            rpass.draw(0..3, 0..1);
        })
    }
}

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "prism viewer".to_string(),
        ..Default::default()
    };

    match Runtime::run(config, GpuInit::default(), TriangleApp::default()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
