//! Texture formats and descriptors.

use super::Extent3d;
use bitflags::bitflags;

/// Texture format enumeration.
///
/// Preview targets render in half-float color so high-dynamic-range
/// environments survive until the tone-map in the compositing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// 8-bit RGBA channels, unsigned normalized.
    Rgba8Unorm,
    /// 8-bit RGBA channels, sRGB.
    Rgba8UnormSrgb,
    /// 8-bit BGRA channels, unsigned normalized.
    Bgra8Unorm,
    /// 16-bit RGBA channels, float.
    #[default]
    Rgba16Float,
    /// 32-bit RGBA channels, float.
    Rgba32Float,
    /// 32-bit depth, float.
    Depth32Float,
}

impl TextureFormat {
    /// Returns true if this is a depth format.
    pub fn is_depth(&self) -> bool {
        matches!(self, Self::Depth32Float)
    }

    /// Returns the size in bytes per pixel.
    pub fn block_size(&self) -> u32 {
        match self {
            Self::Rgba8Unorm | Self::Rgba8UnormSrgb | Self::Bgra8Unorm | Self::Depth32Float => 4,
            Self::Rgba16Float => 8,
            Self::Rgba32Float => 16,
        }
    }
}

bitflags! {
    /// Usage flags for textures.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Texture can be copied from.
        const COPY_SRC = 1 << 0;
        /// Texture can be copied to.
        const COPY_DST = 1 << 1;
        /// Texture can be sampled in a shader.
        const TEXTURE_BINDING = 1 << 2;
        /// Texture can be used as a render attachment.
        const RENDER_ATTACHMENT = 1 << 3;
    }
}

impl Default for TextureUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Descriptor for creating a texture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    /// Debug label for the texture.
    pub label: Option<String>,
    /// Size of the texture.
    pub size: Extent3d,
    /// Texture format.
    pub format: TextureFormat,
    /// Usage flags.
    pub usage: TextureUsage,
}

impl TextureDescriptor {
    /// Create a new 2D texture descriptor.
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            label: None,
            size: Extent3d::new_2d(width, height),
            format,
            usage,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_block_sizes() {
        assert_eq!(TextureFormat::Rgba8Unorm.block_size(), 4);
        assert_eq!(TextureFormat::Rgba16Float.block_size(), 8);
        assert_eq!(TextureFormat::Rgba32Float.block_size(), 16);
    }

    #[test]
    fn descriptor_builder() {
        let desc = TextureDescriptor::new_2d(
            256,
            128,
            TextureFormat::Rgba16Float,
            TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
        )
        .with_label("preview");

        assert_eq!(desc.size, Extent3d::new_2d(256, 128));
        assert_eq!(desc.label.as_deref(), Some("preview"));
        assert!(desc.usage.contains(TextureUsage::RENDER_ATTACHMENT));
    }
}
