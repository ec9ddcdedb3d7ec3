use std::sync::Arc;

use crate::{
    config::model::RendererConfig,
    foundation::{
        core::{Rgb, TerrainBounds, Vec3},
        math::{clamp01, rotate_about_axis},
    },
    pipeline::{passes::PassKind, random::RandomDirectionSet},
    raster::ImageDesc,
};

/// Ray-marcher settings for the lit preview.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarcherParams {
    /// Upper bound on shadow-ray steps.
    pub sample_count: u32,
    /// World distance after which a shadow ray gives up and reports the point lit.
    pub max_dist: f32,
    /// Smallest world step; the actual step is at least one texel.
    pub min_step: f32,
}

/// Terrain-wide values derived from world bounds, image size and renderer settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainParams {
    /// World-space center of the terrain bounds.
    pub center: Vec3,
    /// World-space extent of the terrain bounds.
    pub size: Vec3,
    /// `(min.x, min.z, 1 / size.x, 1 / size.z)`.
    pub heightmap_bounds: [f32; 4],
    /// World extent of one texel: `(1 / tx, 1 / tz, tx, tz)`.
    pub texel_size: [f32; 4],
    /// `(1 / width, 1 / height, width, height)`.
    pub pixel_size: [f32; 4],
    /// `(min.y, max.y)`.
    pub height_bounds: [f32; 2],
    /// Multiply-add that maps normalized height samples to world Y.
    pub height_scale_offset: [f32; 2],
    pub marcher: MarcherParams,
    /// Unit vector pointing towards the sun.
    pub sun_dir: Vec3,
    /// Linear multiplier applied to the shaded color.
    pub exposure: f32,
    /// Slope above which faces are darkened.
    pub max_slope: f32,
    /// Lambert lighting from [`Self::sun_dir`].
    pub lighting: bool,
    /// Ray-marched shadows towards the sun.
    pub shadows: bool,
    /// Satellite color as albedo instead of flat gray.
    pub albedo: bool,
}

impl TerrainParams {
    /// Derive the terrain-wide values for an image of `width` x `height` covering `terrain`.
    ///
    /// Pure: identical inputs produce identical values. Zero dimensions are treated as one.
    pub fn bind(
        terrain: &TerrainBounds,
        renderer: &RendererConfig,
        width: u32,
        height: u32,
    ) -> Self {
        let size = terrain.size();
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        let tx = size.x / w;
        let tz = size.z / h;
        Self {
            center: terrain.center(),
            size,
            heightmap_bounds: [terrain.min.x, terrain.min.z, 1.0 / size.x, 1.0 / size.z],
            texel_size: [1.0 / tx, 1.0 / tz, tx, tz],
            pixel_size: [1.0 / w, 1.0 / h, w, h],
            height_bounds: [terrain.min.y, terrain.max.y],
            height_scale_offset: [size.y, terrain.min.y],
            marcher: MarcherParams {
                sample_count: renderer.sample_count,
                max_dist: renderer.max_dist,
                min_step: renderer.min_step,
            },
            sun_dir: sun_direction(renderer.sun_azimuth, renderer.sun_altitude),
            exposure: renderer.exposure,
            max_slope: renderer.max_slope,
            lighting: renderer.lighting,
            shadows: renderer.shadows,
            albedo: renderer.albedo,
        }
    }

    /// World-space height of a normalized sample.
    pub fn world_height(&self, sample: f32) -> f32 {
        sample * self.height_scale_offset[0] + self.height_scale_offset[1]
    }
}

/// Direction towards the sun.
///
/// Forward `(0, 0, 1)` is pitched up by `altitude_deg` (rotation about `-X`), then turned by
/// `azimuth_deg` about `+Y`.
pub fn sun_direction(azimuth_deg: f32, altitude_deg: f32) -> Vec3 {
    let pitched = rotate_about_axis(Vec3::FORWARD, -Vec3::RIGHT, altitude_deg);
    rotate_about_axis(pitched, Vec3::UP, azimuth_deg)
}

/// Number of denoise invocations for a strength value: `ceil(strength)`.
///
/// Strength 0 skips the pass, 2.3 runs it three times. Negative values run nothing.
pub fn denoise_iterations(strength: f32) -> u32 {
    strength.max(0.0).ceil() as u32
}

/// Strength handed to denoise invocation `iteration`: `clamp01(strength - iteration)`.
///
/// Every invocation but the last runs at full strength; the last one gets the fractional rest.
pub fn denoise_step_strength(strength: f32, iteration: u32) -> f32 {
    clamp01(strength - iteration as f32)
}

/// Erosion strength as seen by the backend: `strength^4`.
///
/// The quartic curve gives the low end of the `[0, 10]` slider fine control.
pub fn erosion_strength(strength: f32) -> f32 {
    strength.powi(4)
}

/// Ridge sharpness as seen by the backend: `max(sharpness, 0.001)^2`.
pub fn ridge_sharpness(sharpness: f32) -> f32 {
    sharpness.max(0.001).powi(2)
}

/// Bilateral smoothing for one denoise invocation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DenoiseParams {
    /// Blend factor in `[0, 1]` between source and smoothed value.
    pub strength: f32,
    /// Zero-based invocation index within the pass.
    pub iteration: u32,
    pub terrain: TerrainParams,
}

/// Ridge sharpening parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RidgeParams {
    pub strength: f32,
    /// Already remapped through [`ridge_sharpness`].
    pub sharpness: f32,
    pub terrain: TerrainParams,
}

/// Slope-masked fractal erosion parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErosionParams {
    /// Already remapped through [`erosion_strength`].
    pub strength: f32,
    /// Noise octaves summed per texel.
    pub octaves: u32,
    /// Base noise frequency in cycles per texel.
    pub frequency: f32,
    /// Normalized slope `s / (1 + s)` at which erosion starts to apply.
    pub slope_mask: f32,
    /// Higher values narrow the transition above [`Self::slope_mask`].
    pub slope_sharpness: f32,
    /// Seed of the noise lattice.
    pub seed: u64,
    pub terrain: TerrainParams,
}

/// Shadow removal parameters for one repetition.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadowRemovalParams {
    /// Zero-based repetition index; later repetitions reach further.
    pub pass_index: u32,
    /// Tint that marks a pixel as shadowed.
    pub shadow_color: Rgb,
    /// Pixels darker than this are shadow candidates.
    pub luminance_threshold: f32,
    /// Pixels less saturated than this are shadow candidates.
    pub saturation_threshold: f32,
    /// Softness of the shadow mask around both thresholds.
    pub edge: f32,
    /// Sampling radius in pixels.
    pub radius: f32,
    /// `(1 / width, 1 / height, width, height)` of the color target.
    pub pixel_size: [f32; 4],
    /// Jitter table indexed per pixel.
    pub directions: Arc<RandomDirectionSet>,
}

/// Curvature-based darkening of the color image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CavityParams {
    /// Scale of the darkening; 0 leaves the image unchanged.
    pub intensity: f32,
    /// Sampling radius in heightmap texels.
    pub radius: f32,
    /// Texel and height mapping of the heightmap being sampled.
    pub terrain: TerrainParams,
}

/// Everything a backend needs for one pass invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum PassParams {
    Denoise(DenoiseParams),
    RidgeSynthesis(RidgeParams),
    Erosion(ErosionParams),
    ShadowRemoval(ShadowRemovalParams),
    CavityShading(CavityParams),
}

impl PassParams {
    /// The pass these parameters belong to.
    pub fn kind(&self) -> PassKind {
        match self {
            Self::Denoise(_) => PassKind::Denoise,
            Self::RidgeSynthesis(_) => PassKind::RidgeSynthesis,
            Self::Erosion(_) => PassKind::Erosion,
            Self::ShadowRemoval(_) => PassKind::ShadowRemoval,
            Self::CavityShading(_) => PassKind::CavityShading,
        }
    }
}

/// Run-level inputs to parameter binding.
#[derive(Clone, Debug)]
pub struct BindContext {
    /// Shape of the buffers the passes write.
    pub target: ImageDesc,
    /// Shape of the auxiliary heightmap, when one is bound.
    pub heightmap: Option<ImageDesc>,
    /// Shared jitter table for shadow removal.
    pub directions: Arc<RandomDirectionSet>,
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/params.rs"]
mod tests;
