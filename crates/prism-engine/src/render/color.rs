/// Straight-alpha RGBA color with `f32` components in `[0, 1]`.
///
/// Used for clear colors and constant draw colors; blending state decides
/// how alpha composes, so components are stored straight, not premultiplied.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Converts to wgpu's double-precision clear color.
    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_is_opaque() {
        assert_eq!(Color::rgb(0.9, 0.1, 0.2).a, 1.0);
    }

    #[test]
    fn wgpu_conversion_widens() {
        let c = Color::rgba(0.0, 0.4, 1.0, 1.0).to_wgpu();
        assert_eq!(c.g, 0.4f32 as f64);
        assert_eq!(c.b, 1.0);
    }
}
