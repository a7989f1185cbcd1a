use anyhow::Result;
use wgpu::BufferUsages;

/// Creation parameters for a [`DeviceBuffer`].
#[derive(Debug, Clone)]
pub struct BufferInit<'a> {
    pub label: &'a str,
    pub size: u64,
    pub usage: BufferUsages,
    pub mapped_at_creation: bool,
}

/// A GPU buffer with host-side validation and scoped teardown.
///
/// Dropping the wrapper calls `destroy()` (device-side free) before the wgpu
/// handle itself is released, so the memory is reclaimed even when the handle
/// is still referenced elsewhere in the backend.
pub struct DeviceBuffer {
    raw: wgpu::Buffer,
    size: u64,
    usage: BufferUsages,
}

impl DeviceBuffer {
    /// Creates a buffer after validating the descriptor.
    pub fn create(device: &wgpu::Device, init: &BufferInit<'_>) -> Result<Self> {
        validate_descriptor(init.size, init.usage)?;

        let raw = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(init.label),
            size: init.size,
            usage: init.usage,
            mapped_at_creation: init.mapped_at_creation,
        });

        Ok(Self {
            raw,
            size: init.size,
            usage: init.usage,
        })
    }

    /// Enqueues a host-to-device write on the queue.
    ///
    /// The copy is staged immediately and lands before any later submission
    /// executes; the buffer needs `COPY_DST` usage.
    pub fn write(&self, queue: &wgpu::Queue, offset: u64, data: &[u8]) -> Result<()> {
        validate_write(self.size, self.usage, offset, data.len() as u64)?;
        queue.write_buffer(&self.raw, offset, data);
        Ok(())
    }

    /// Records a device-side copy from `self` into `dst`.
    pub fn copy_to(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        dst: &DeviceBuffer,
        src_offset: u64,
        dst_offset: u64,
        len: u64,
    ) -> Result<()> {
        validate_copy(
            self.size,
            self.usage,
            src_offset,
            dst.size,
            dst.usage,
            dst_offset,
            len,
        )?;
        encoder.copy_buffer_to_buffer(&self.raw, src_offset, &dst.raw, dst_offset, len);
        Ok(())
    }

    /// Returns the underlying wgpu buffer.
    pub fn raw(&self) -> &wgpu::Buffer {
        &self.raw
    }

    /// Returns the buffer size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the usage flags the buffer was created with.
    pub fn usage(&self) -> BufferUsages {
        self.usage
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        // Device-side free first; the handle release follows when `raw` drops.
        self.raw.destroy();
    }
}

// ── validation ────────────────────────────────────────────────────────────
//
// These rules mirror what the backend would reject, but as host-side errors
// caught before any command is recorded.

fn validate_descriptor(size: u64, usage: BufferUsages) -> Result<()> {
    anyhow::ensure!(size > 0, "buffer size must be > 0");
    anyhow::ensure!(!usage.is_empty(), "buffer needs at least one usage flag");
    anyhow::ensure!(
        !usage.contains(BufferUsages::MAP_READ | BufferUsages::MAP_WRITE),
        "MAP_READ and MAP_WRITE are mutually exclusive"
    );
    Ok(())
}

fn validate_write(size: u64, usage: BufferUsages, offset: u64, len: u64) -> Result<()> {
    anyhow::ensure!(
        usage.contains(BufferUsages::COPY_DST),
        "write requires COPY_DST usage"
    );
    validate_range(size, offset, len, "write")
}

fn validate_copy(
    src_size: u64,
    src_usage: BufferUsages,
    src_offset: u64,
    dst_size: u64,
    dst_usage: BufferUsages,
    dst_offset: u64,
    len: u64,
) -> Result<()> {
    anyhow::ensure!(
        src_usage.contains(BufferUsages::COPY_SRC),
        "copy source requires COPY_SRC usage"
    );
    anyhow::ensure!(
        dst_usage.contains(BufferUsages::COPY_DST),
        "copy destination requires COPY_DST usage"
    );
    validate_range(src_size, src_offset, len, "copy source")?;
    validate_range(dst_size, dst_offset, len, "copy destination")
}

fn validate_range(size: u64, offset: u64, len: u64, what: &str) -> Result<()> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| anyhow::anyhow!("{what} range overflows"))?;
    anyhow::ensure!(
        end <= size,
        "{what} range {offset}..{end} exceeds buffer size {size}"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── descriptor validation ─────────────────────────────────────────────

    #[test]
    fn zero_size_rejected() {
        assert!(validate_descriptor(0, BufferUsages::COPY_DST).is_err());
    }

    #[test]
    fn empty_usage_rejected() {
        assert!(validate_descriptor(16, BufferUsages::empty()).is_err());
    }

    #[test]
    fn map_read_write_exclusive() {
        let usage = BufferUsages::MAP_READ | BufferUsages::MAP_WRITE;
        assert!(validate_descriptor(16, usage).is_err());
    }

    #[test]
    fn copy_src_dst_combinable() {
        let usage = BufferUsages::COPY_SRC | BufferUsages::COPY_DST;
        assert!(validate_descriptor(16, usage).is_ok());
    }

    // ── write validation ──────────────────────────────────────────────────

    #[test]
    fn write_within_bounds_ok() {
        assert!(validate_write(16, BufferUsages::COPY_DST, 8, 8).is_ok());
    }

    #[test]
    fn write_past_end_rejected() {
        assert!(validate_write(16, BufferUsages::COPY_DST, 8, 9).is_err());
    }

    #[test]
    fn write_without_copy_dst_rejected() {
        assert!(validate_write(16, BufferUsages::COPY_SRC, 0, 4).is_err());
    }

    #[test]
    fn write_offset_overflow_rejected() {
        assert!(validate_write(16, BufferUsages::COPY_DST, u64::MAX, 1).is_err());
    }

    // ── copy validation ───────────────────────────────────────────────────

    #[test]
    fn copy_requires_src_flag() {
        let err = validate_copy(
            16,
            BufferUsages::COPY_DST,
            0,
            16,
            BufferUsages::COPY_DST,
            0,
            16,
        );
        assert!(err.is_err());
    }

    #[test]
    fn copy_requires_dst_flag() {
        let err = validate_copy(
            16,
            BufferUsages::COPY_SRC,
            0,
            16,
            BufferUsages::MAP_READ,
            0,
            16,
        );
        assert!(err.is_err());
    }

    #[test]
    fn copy_checks_both_ranges() {
        // Source fits, destination does not.
        let err = validate_copy(
            32,
            BufferUsages::COPY_SRC,
            0,
            16,
            BufferUsages::COPY_DST,
            8,
            16,
        );
        assert!(err.is_err());
    }

    #[test]
    fn copy_full_range_ok() {
        let ok = validate_copy(
            16,
            BufferUsages::COPY_SRC,
            0,
            16,
            BufferUsages::COPY_DST | BufferUsages::MAP_READ,
            0,
            16,
        );
        assert!(ok.is_ok());
    }
}
