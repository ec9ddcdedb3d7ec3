use std::collections::TryReserveError;

use crate::foundation::{
    error::{PrettifierError, PrettifierResult},
    math::Fnv1a64,
};

/// Pixel layout of an [`Image`].
///
/// Samples are always stored as `f32`; the format fixes the channel count and the byte cost the
/// buffer pool accounts for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PixelFormat {
    /// Single-channel height data.
    R32Float,
    /// Two-channel height data (height + auxiliary channel).
    Rg32Float,
    /// Four-channel color data, samples normalized to `[0, 1]`.
    Rgba8Unorm,
}

impl PixelFormat {
    /// Samples stored per pixel.
    pub fn channels(self) -> usize {
        match self {
            Self::R32Float => 1,
            Self::Rg32Float => 2,
            Self::Rgba8Unorm => 4,
        }
    }

    /// Bytes per pixel of the equivalent device texture.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::R32Float => 4,
            Self::Rg32Float => 8,
            Self::Rgba8Unorm => 4,
        }
    }

    /// `true` for satellite/color data, `false` for height data.
    pub fn is_color(self) -> bool {
        matches!(self, Self::Rgba8Unorm)
    }

    fn tag(self) -> u32 {
        match self {
            Self::R32Float => 1,
            Self::Rg32Float => 2,
            Self::Rgba8Unorm => 3,
        }
    }
}

/// Shape of an image buffer: the key the buffer pool caches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Whether derived mip levels are kept alongside the base level.
    pub mips: bool,
}

impl ImageDesc {
    /// Descriptor without mips.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            mips: false,
        }
    }

    pub fn with_mips(mut self, mips: bool) -> Self {
        self.mips = mips;
        self
    }

    /// Number of `f32` samples in the base level.
    pub fn sample_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|px| px.checked_mul(self.format.channels()))
    }

    /// Device byte cost of the base level.
    pub fn byte_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|px| px.checked_mul(self.format.bytes_per_pixel()))
    }

    /// Mip levels below the base level, down to 1x1.
    pub fn mip_count(&self) -> u32 {
        if !self.mips {
            return 0;
        }
        let largest = self.width.max(self.height).max(1);
        31 - largest.leading_zeros()
    }
}

/// Identity of a pooled buffer. Stable across swaps, changes on reallocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

impl BufferId {
    /// Id of images created outside a buffer pool.
    pub const DETACHED: Self = Self(0);
}

/// One derived level of an image's mip chain.
#[derive(Clone, Debug, PartialEq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    /// Row-major samples with the parent image's channel count.
    pub data: Vec<f32>,
}

/// Owned 2D pixel buffer.
#[derive(Clone, Debug)]
pub struct Image {
    id: BufferId,
    desc: ImageDesc,
    data: Vec<f32>,
    mips: Vec<MipLevel>,
}

impl Image {
    /// Build a detached image from tightly packed, row-major samples.
    pub fn from_samples(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<f32>,
    ) -> PrettifierResult<Self> {
        if width == 0 || height == 0 {
            return Err(PrettifierError::validation("image width/height must be > 0"));
        }
        let desc = ImageDesc::new(width, height, format);
        let expected = desc
            .sample_len()
            .ok_or_else(|| PrettifierError::validation("image size overflow"))?;
        if data.len() != expected {
            return Err(PrettifierError::validation(format!(
                "image expects {expected} samples for {width}x{height} {format:?}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            id: BufferId::DETACHED,
            desc,
            data,
            mips: Vec::new(),
        })
    }

    /// Detached image with every channel set to `value`.
    pub fn filled(
        width: u32,
        height: u32,
        format: PixelFormat,
        value: f32,
    ) -> PrettifierResult<Self> {
        let len = ImageDesc::new(width, height, format)
            .sample_len()
            .ok_or_else(|| PrettifierError::validation("image size overflow"))?;
        Self::from_samples(width, height, format, vec![value; len])
    }

    /// Detached image whose channels are produced by `f(x, y, channel)`.
    pub fn from_fn(
        width: u32,
        height: u32,
        format: PixelFormat,
        mut f: impl FnMut(u32, u32, usize) -> f32,
    ) -> PrettifierResult<Self> {
        let ch = format.channels();
        let len = ImageDesc::new(width, height, format)
            .sample_len()
            .ok_or_else(|| PrettifierError::validation("image size overflow"))?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                for c in 0..ch {
                    data.push(f(x, y, c));
                }
            }
        }
        Self::from_samples(width, height, format, data)
    }

    pub(crate) fn try_alloc(id: BufferId, desc: ImageDesc) -> Result<Self, TryReserveError> {
        let len = desc.sample_len().unwrap_or(usize::MAX);
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0.0);
        Ok(Self {
            id,
            desc,
            data,
            mips: Vec::new(),
        })
    }

    pub(crate) fn set_mips_wanted(&mut self, mips: bool) {
        self.desc.mips = mips;
        if !mips {
            self.mips.clear();
        }
    }

    /// Pool identity, or [`BufferId::DETACHED`] for images built by the constructors above.
    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn desc(&self) -> ImageDesc {
        self.desc
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    pub fn format(&self) -> PixelFormat {
        self.desc.format
    }

    pub fn channels(&self) -> usize {
        self.desc.format.channels()
    }

    /// Row-major, channel-interleaved samples of the base level.
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Derived levels, largest first. Empty unless the descriptor asks for mips and a run
    /// regenerated them.
    pub fn mips(&self) -> &[MipLevel] {
        &self.mips
    }

    /// Sample at integer coordinates, clamped to the edge.
    pub fn texel(&self, x: i64, y: i64, channel: usize) -> f32 {
        let w = i64::from(self.desc.width);
        let h = i64::from(self.desc.height);
        let xi = x.clamp(0, w - 1) as usize;
        let yi = y.clamp(0, h - 1) as usize;
        let ch = self.channels();
        let c = channel.min(ch - 1);
        self.data[(yi * self.desc.width as usize + xi) * ch + c]
    }

    /// Bilinear sample at normalized coordinates (pixel centers at `(i + 0.5) / size`).
    pub fn sample_bilinear(&self, u: f32, v: f32, channel: usize) -> f32 {
        let fx = u * self.desc.width as f32 - 0.5;
        let fy = v * self.desc.height as f32 - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);
        let a = self.texel(x0, y0, channel);
        let b = self.texel(x0 + 1, y0, channel);
        let c = self.texel(x0, y0 + 1, channel);
        let d = self.texel(x0 + 1, y0 + 1, channel);
        let top = a + (b - a) * tx;
        let bottom = c + (d - c) * tx;
        top + (bottom - top) * ty
    }

    /// Stable hash of shape and samples, independent of buffer identity.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new();
        h.write_u32(self.desc.width);
        h.write_u32(self.desc.height);
        h.write_u32(self.desc.format.tag());
        for &s in &self.data {
            h.write_f32(s);
        }
        h.finish()
    }

    /// Overwrite this image with `src`, resampling and remapping channels as needed.
    ///
    /// Same-shape copies are exact. Otherwise every destination pixel center is sampled
    /// bilinearly from `src`. Missing color channels replicate the last source channel, except
    /// alpha, which becomes opaque.
    pub(crate) fn copy_resampled_from(&mut self, src: &Image) {
        self.mips.clear();
        if src.desc.width == self.desc.width
            && src.desc.height == self.desc.height
            && src.desc.format == self.desc.format
        {
            self.data.copy_from_slice(&src.data);
            return;
        }

        let dst_ch = self.channels();
        let src_ch = src.channels();
        let (w, h) = (self.desc.width, self.desc.height);
        let same_size = src.desc.width == w && src.desc.height == h;
        for y in 0..h {
            for x in 0..w {
                let base = (y as usize * w as usize + x as usize) * dst_ch;
                for c in 0..dst_ch {
                    let value = if c == 3 && src_ch < 4 {
                        1.0
                    } else if same_size {
                        src.texel(i64::from(x), i64::from(y), c)
                    } else {
                        let u = (x as f32 + 0.5) / w as f32;
                        let v = (y as f32 + 0.5) / h as f32;
                        src.sample_bilinear(u, v, c)
                    };
                    self.data[base + c] = value;
                }
            }
        }
    }

    /// Rebuild the mip chain with a 2x2 box filter.
    pub(crate) fn generate_mips(&mut self) {
        self.mips.clear();
        let ch = self.channels();
        let levels = self.desc.mip_count();
        let (mut pw, mut ph) = (self.desc.width, self.desc.height);
        for level in 0..levels {
            let (nw, nh) = ((pw / 2).max(1), (ph / 2).max(1));
            let prev: &[f32] = match level {
                0 => &self.data,
                _ => &self.mips[level as usize - 1].data,
            };
            let mut data = vec![0.0; nw as usize * nh as usize * ch];
            for y in 0..nh {
                for x in 0..nw {
                    for c in 0..ch {
                        let mut acc = 0.0;
                        for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                            let sx = (2 * x + dx).min(pw - 1) as usize;
                            let sy = (2 * y + dy).min(ph - 1) as usize;
                            acc += prev[(sy * pw as usize + sx) * ch + c];
                        }
                        data[(y as usize * nw as usize + x as usize) * ch + c] = acc * 0.25;
                    }
                }
            }
            self.mips.push(MipLevel {
                width: nw,
                height: nh,
                data,
            });
            (pw, ph) = (nw, nh);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/buffer.rs"]
mod tests;
