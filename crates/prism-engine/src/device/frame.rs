/// A single acquired frame.
///
/// Owns the per-iteration transient objects: the surface texture, the view
/// onto it, and the command encoder recording against it. All three live for
/// exactly one loop iteration; holding the surface texture blocks acquisition
/// of the next frame.
pub struct Frame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
