use std::cell::Cell;

use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::surface;
use super::{Frame, GpuInit, SurfaceErrorAction};

/// Acquire/present counters for the frame loop.
///
/// In steady state `acquired == presented`; they diverge by at most one while
/// a frame is in flight between `begin_frame` and `submit`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub acquired: u64,
    pub presented: u64,
}

/// Owns wgpu core objects and the surface configuration.
///
/// This type is the low-level rendering context:
/// - negotiates Instance → Adapter → Device/Queue (asynchronous under wgpu)
/// - creates and configures the Surface (swapchain)
/// - acquires frames and submits/presents them
pub struct Gpu<'w> {
    /// wgpu instance used to create the adapter and surface.
    instance: wgpu::Instance,

    /// Surface bound to the window.
    ///
    /// Surface lifetime is tied to the window; architecture must ensure the
    /// window outlives the `Gpu` instance.
    surface: wgpu::Surface<'w>,

    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,

    /// Frame accounting. One thread owns the `Gpu`, so plain cells suffice.
    acquired: Cell<u64>,
    presented: Cell<u64>,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter and device acquisition complete via callbacks under the hood;
    /// wgpu exposes them as futures, which the runtime blocks on with
    /// `pollster` during setup. A single attempt is made — any failure here
    /// is fatal to the setup phase.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        // Use all backends to allow wgpu to select the optimal platform backend.
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Surface lifetime is tied to `window` via `'w`.
        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        log_adapter(&adapter);

        // Check the requested limits against the adapter before asking the
        // device for them; an unsatisfiable request fails setup here rather
        // than as a backend validation error.
        let adapter_limits = adapter.limits();
        anyhow::ensure!(
            init.required_limits.check_limits(&adapter_limits),
            "requested device limits exceed adapter support"
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("prism-engine device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        install_error_handler(&device);

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&surface_caps.formats, init.prefer_srgb)
            .context("no supported surface formats")?;
        let alpha_mode = surface::choose_alpha_mode(&surface_caps.alpha_modes, init.alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);

        Ok(Gpu {
            instance,
            surface,
            adapter,
            device,
            queue,
            config,
            size,
            acquired: Cell::new(0),
            presented: Cell::new(0),
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the limits supported by the selected adapter.
    pub fn adapter_limits(&self) -> wgpu::Limits {
        self.adapter.limits()
    }

    /// Returns the acquire/present counters.
    pub fn frame_stats(&self) -> FrameStats {
        FrameStats {
            acquired: self.acquired.get(),
            presented: self.presented.get(),
        }
    }

    /// Requests a fire-once notification when all work submitted to the
    /// queue so far has completed on the device.
    pub fn notify_work_done(&self, tag: &'static str) {
        self.queue.on_submitted_work_done(move || {
            log::debug!("queue work done: {tag}");
        });
    }

    /// Reconfigures the surface after a resize.
    ///
    /// wgpu does not support configuring a surface with a 0x0 size; in that
    /// case, only internal state is updated and configuration is deferred.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            new_size,
        );
    }

    /// Acquires the next surface texture and creates an encoder.
    ///
    /// The returned frame owns the surface texture, its view, and the
    /// encoder; all three must be consumed by [`Gpu::submit`] (or dropped)
    /// before the next acquire.
    pub fn begin_frame(&self) -> std::result::Result<Frame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        self.acquired.set(self.acquired.get() + 1);

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("prism frame encoder"),
            });

        Ok(Frame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded commands for the given frame and presents it.
    ///
    /// The encoder is finished into a single command buffer, the buffer is
    /// submitted, and the surface texture is presented. The view and command
    /// buffer are dropped here; nothing from the frame survives the call.
    pub fn submit(&self, frame: Frame) {
        let Frame {
            surface_texture,
            view,
            encoder,
        } = frame;

        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
        self.presented.set(self.presented.get() + 1);
    }

    /// Converts a `SurfaceError` into a higher-level action, reconfiguring
    /// the surface when that can bring it back.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        let action = surface::classify_surface_error(err);
        if action == SurfaceErrorAction::Reconfigured
            && self.size.width > 0
            && self.size.height > 0
        {
            self.surface.configure(&self.device, &self.config);
        }
        action
    }
}

/// Registers the device's uncaptured-error handler.
///
/// One handler exists per device lifetime; a later registration replaces the
/// current one. The handler only logs — uncaptured errors are advisory and
/// must not unwind the frame loop.
fn install_error_handler(device: &wgpu::Device) {
    device.on_uncaptured_error(std::sync::Arc::new(|error| {
        log::error!("uncaptured wgpu error: {error}");
    }));
}

fn log_adapter(adapter: &wgpu::Adapter) {
    let info = adapter.get_info();
    log::info!(
        "adapter: {} ({:?}, {:?})",
        info.name,
        info.device_type,
        info.backend
    );

    let features: Vec<&str> = adapter
        .features()
        .iter_names()
        .map(|(name, _)| name)
        .collect();
    log::debug!("adapter features ({}): {}", features.len(), features.join(", "));
}
