use std::sync::mpsc;

use anyhow::{Context, Result};
use wgpu::BufferUsages;

use super::DeviceBuffer;

/// One-shot asynchronous buffer readback.
///
/// `enqueue` copies a range of a device buffer into a private staging buffer,
/// submits the copy, and starts the map-for-read. The map callback fires on a
/// device poll tick, never spontaneously, so completion is observed either by
/// [`Readback::poll`] (one non-blocking tick, for use inside a frame loop) or
/// [`Readback::wait`] (blocks until the queue drains).
///
/// The watcher owns all state the callback needs; nothing is captured by
/// reference, so it is safe for the requesting scope to end before the map
/// completes.
pub struct Readback {
    staging: wgpu::Buffer,
    len: u64,
    rx: mpsc::Receiver<std::result::Result<(), wgpu::BufferAsyncError>>,
}

/// Outcome of a non-blocking readback poll.
///
/// A pending readback is handed back to the caller for the next tick.
pub enum ReadbackPoll {
    Pending(Readback),
    Ready(Result<Vec<u8>>),
}

impl Readback {
    /// Records and submits the copy, then begins the asynchronous map.
    pub fn enqueue(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        src: &DeviceBuffer,
        offset: u64,
        len: u64,
    ) -> Result<Self> {
        anyhow::ensure!(len > 0, "readback length must be > 0");
        anyhow::ensure!(
            src.usage().contains(BufferUsages::COPY_SRC),
            "readback source requires COPY_SRC usage"
        );
        let end = offset
            .checked_add(len)
            .context("readback range overflows")?;
        anyhow::ensure!(
            end <= src.size(),
            "readback range {offset}..{end} exceeds buffer size {}",
            src.size()
        );

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism readback staging"),
            size: len,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("prism readback encoder"),
        });
        encoder.copy_buffer_to_buffer(src.raw(), offset, &staging, 0, len);
        queue.submit(std::iter::once(encoder.finish()));

        let (tx, rx) = mpsc::channel();
        staging.slice(..).map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        Ok(Self { staging, len, rx })
    }

    /// Takes one poll tick and checks for completion.
    ///
    /// Does not block; a still-pending readback is returned for the next
    /// call. Intended to be driven once per frame-loop iteration.
    pub fn poll(self, device: &wgpu::Device) -> ReadbackPoll {
        let _ = device.poll(wgpu::PollType::Poll);

        match self.rx.try_recv() {
            Ok(status) => ReadbackPoll::Ready(self.finish(status)),
            Err(mpsc::TryRecvError::Empty) => ReadbackPoll::Pending(self),
            Err(mpsc::TryRecvError::Disconnected) => {
                ReadbackPoll::Ready(Err(anyhow::anyhow!("map callback dropped without status")))
            }
        }
    }

    /// Blocks until the map completes and returns the bytes.
    pub fn wait(self, device: &wgpu::Device) -> Result<Vec<u8>> {
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .context("device poll failed")?;

        let status = self
            .rx
            .recv()
            .context("map callback dropped without status")?;
        self.finish(status)
    }

    /// Blocking wait that reinterprets the bytes as a `Pod` slice.
    pub fn wait_typed<T: bytemuck::Pod>(self, device: &wgpu::Device) -> Result<Vec<T>> {
        let bytes = self.wait(device)?;
        Ok(bytemuck::cast_slice(&bytes).to_vec())
    }

    fn finish(
        self,
        status: std::result::Result<(), wgpu::BufferAsyncError>,
    ) -> Result<Vec<u8>> {
        status.context("buffer map failed")?;

        let data = {
            let view = self.staging.slice(..).get_mapped_range();
            view.to_vec()
        };
        debug_assert_eq!(data.len() as u64, self.len);

        // Unmap before the device-side free; a mapped buffer cannot be
        // destroyed cleanly on all backends.
        self.staging.unmap();
        self.staging.destroy();

        Ok(data)
    }
}
