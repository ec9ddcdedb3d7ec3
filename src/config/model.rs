use std::{ops::RangeInclusive, path::Path};

use anyhow::Context;

use crate::foundation::{
    core::{Rgb, TerrainBounds},
    error::{PrettifierError, PrettifierResult},
};

/// Declared inclusive ranges for every numeric parameter.
///
/// [`PrettifierConfig::validate`] enforces these; pipeline code downstream trusts them.
pub mod ranges {
    use std::ops::RangeInclusive;

    pub const DENOISE_STRENGTH: RangeInclusive<f32> = 0.0..=4.0;
    pub const RIDGE_STRENGTH: RangeInclusive<f32> = 0.0..=100.0;
    pub const RIDGE_SHARPNESS: RangeInclusive<f32> = 0.0..=1.0;
    pub const EROSION_STRENGTH: RangeInclusive<f32> = 0.0..=10.0;
    pub const EROSION_OCTAVES: RangeInclusive<u32> = 1..=12;
    pub const EROSION_FREQUENCY: RangeInclusive<f32> = 0.0..=1.0;
    pub const EROSION_SLOPE_MASK: RangeInclusive<f32> = 0.0..=1.0;
    pub const EROSION_SLOPE_SHARPNESS: RangeInclusive<f32> = 0.0..=1.0;
    pub const SHADOW_PASSES: RangeInclusive<u32> = 1..=64;
    pub const SHADOW_LUMINANCE_THRESHOLD: RangeInclusive<f32> = 0.0..=1.0;
    pub const SHADOW_SATURATION_THRESHOLD: RangeInclusive<f32> = 0.0..=1.0;
    pub const SHADOW_EDGE: RangeInclusive<f32> = 0.0..=1.0;
    pub const SHADOW_RADIUS: RangeInclusive<f32> = 0.0..=64.0;
    pub const SHADOW_COLOR_CHANNEL: RangeInclusive<f32> = 0.0..=1.0;
    pub const CAVITY_INTENSITY: RangeInclusive<f32> = 0.0..=2.0;
    pub const CAVITY_RADIUS: RangeInclusive<f32> = 1.0..=16.0;
    pub const SUN_AZIMUTH: RangeInclusive<f32> = 0.0..=360.0;
    pub const SUN_ALTITUDE: RangeInclusive<f32> = 0.0..=90.0;
    pub const EXPOSURE: RangeInclusive<f32> = 0.0..=10.0;
    pub const MAX_SLOPE: RangeInclusive<f32> = 0.0..=1.0;
    pub const SAMPLE_COUNT: RangeInclusive<u32> = 128..=1024;
    pub const MARCHER_MAX_DIST: RangeInclusive<f32> = 100.0..=100_000.0;
    pub const MARCHER_MIN_STEP: RangeInclusive<f32> = 0.0..=1000.0;
}

/// Complete tool configuration snapshot.
///
/// Plain data: the pipeline only ever sees the value passed to a run, so undo/redo is a matter
/// of swapping snapshots (see [`crate::ConfigHistory`]).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PrettifierConfig {
    /// Height-data pipeline settings.
    pub heightmap: HeightmapConfig,
    /// Color-data pipeline settings.
    pub satellite: SatelliteConfig,
    /// Preview lighting settings.
    pub renderer: RendererConfig,
    /// World-space terrain bounds.
    pub terrain: TerrainBounds,
    /// Seed of the random-direction table.
    pub seed: u64,
}

/// Default seed of the shadow-sampling direction table.
pub const DEFAULT_DIRECTION_SEED: u64 = 123;

impl Default for PrettifierConfig {
    fn default() -> Self {
        Self {
            heightmap: HeightmapConfig::default(),
            satellite: SatelliteConfig::default(),
            renderer: RendererConfig::default(),
            terrain: TerrainBounds::default(),
            seed: DEFAULT_DIRECTION_SEED,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HeightmapConfig {
    /// Master switch for every height pass.
    pub enabled: bool,
    pub denoise: DenoiseConfig,
    pub ridges: RidgeConfig,
    pub erosion: ErosionConfig,
}

impl Default for HeightmapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            denoise: DenoiseConfig::default(),
            ridges: RidgeConfig::default(),
            erosion: ErosionConfig::default(),
        }
    }
}

/// Bilateral smoothing. Strength above 1 repeats the pass.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DenoiseConfig {
    pub enabled: bool,
    pub strength: f32,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RidgeConfig {
    pub enabled: bool,
    pub strength: f32,
    pub sharpness: f32,
}

impl Default for RidgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: 5.0,
            sharpness: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ErosionConfig {
    pub enabled: bool,
    pub strength: f32,
    pub octaves: u32,
    pub frequency: f32,
    pub slope_mask: f32,
    pub slope_sharpness: f32,
}

impl Default for ErosionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: 0.22,
            octaves: 5,
            frequency: 0.15,
            slope_mask: 0.02,
            slope_sharpness: 0.75,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SatelliteConfig {
    /// Master switch for every color pass.
    pub enabled: bool,
    pub shadow_removal: ShadowRemovalConfig,
    pub cavity: CavityConfig,
}

impl Default for SatelliteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            shadow_removal: ShadowRemovalConfig::default(),
            cavity: CavityConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShadowRemovalConfig {
    pub enabled: bool,
    pub shadow_color: Rgb,
    /// Number of pass repetitions.
    pub passes: u32,
    pub luminance_threshold: f32,
    pub saturation_threshold: f32,
    pub edge: f32,
    /// Sampling radius in pixels.
    pub radius: f32,
}

impl Default for ShadowRemovalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            shadow_color: Rgb::BLACK,
            passes: 16,
            luminance_threshold: 0.5,
            saturation_threshold: 0.5,
            edge: 0.1,
            radius: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CavityConfig {
    pub enabled: bool,
    pub intensity: f32,
    /// Sampling radius in heightmap texels.
    pub radius: f32,
}

impl Default for CavityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: 0.25,
            radius: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Degrees around the vertical axis.
    pub sun_azimuth: f32,
    /// Degrees above the horizon.
    pub sun_altitude: f32,
    pub exposure: f32,
    pub lighting: bool,
    pub shadows: bool,
    pub albedo: bool,
    pub max_slope: f32,
    /// Shadow ray-march step budget.
    pub sample_count: u32,
    pub max_dist: f32,
    pub min_step: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            sun_azimuth: 45.0,
            sun_altitude: 15.0,
            exposure: 1.0,
            lighting: true,
            shadows: true,
            albedo: true,
            max_slope: 0.5,
            sample_count: 512,
            max_dist: 100_000.0,
            min_step: 0.0,
        }
    }
}

impl PrettifierConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(s: &str) -> PrettifierResult<Self> {
        serde_json::from_str(s).map_err(|e| PrettifierError::serde(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> PrettifierResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| PrettifierError::serde(e.to_string()))
    }

    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> PrettifierResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg = Self::from_json_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> PrettifierResult<()> {
        let path = path.as_ref();
        let text = self.to_json_pretty()?;
        std::fs::write(path, text).with_context(|| format!("write config '{}'", path.display()))?;
        Ok(())
    }

    /// Enforce the declared parameter ranges.
    pub fn validate(&self) -> PrettifierResult<()> {
        use ranges::*;

        let h = &self.heightmap;
        check_f32("heightmap.denoise.strength", h.denoise.strength, DENOISE_STRENGTH)?;
        check_f32("heightmap.ridges.strength", h.ridges.strength, RIDGE_STRENGTH)?;
        check_f32("heightmap.ridges.sharpness", h.ridges.sharpness, RIDGE_SHARPNESS)?;
        check_f32("heightmap.erosion.strength", h.erosion.strength, EROSION_STRENGTH)?;
        check_u32("heightmap.erosion.octaves", h.erosion.octaves, EROSION_OCTAVES)?;
        check_f32("heightmap.erosion.frequency", h.erosion.frequency, EROSION_FREQUENCY)?;
        check_f32("heightmap.erosion.slope_mask", h.erosion.slope_mask, EROSION_SLOPE_MASK)?;
        check_f32(
            "heightmap.erosion.slope_sharpness",
            h.erosion.slope_sharpness,
            EROSION_SLOPE_SHARPNESS,
        )?;

        let s = &self.satellite.shadow_removal;
        check_u32("satellite.shadow_removal.passes", s.passes, SHADOW_PASSES)?;
        check_f32(
            "satellite.shadow_removal.luminance_threshold",
            s.luminance_threshold,
            SHADOW_LUMINANCE_THRESHOLD,
        )?;
        check_f32(
            "satellite.shadow_removal.saturation_threshold",
            s.saturation_threshold,
            SHADOW_SATURATION_THRESHOLD,
        )?;
        check_f32("satellite.shadow_removal.edge", s.edge, SHADOW_EDGE)?;
        check_f32("satellite.shadow_removal.radius", s.radius, SHADOW_RADIUS)?;
        for (name, v) in [
            ("r", s.shadow_color.r),
            ("g", s.shadow_color.g),
            ("b", s.shadow_color.b),
        ] {
            check_f32(
                &format!("satellite.shadow_removal.shadow_color.{name}"),
                v,
                SHADOW_COLOR_CHANNEL,
            )?;
        }

        let c = &self.satellite.cavity;
        check_f32("satellite.cavity.intensity", c.intensity, CAVITY_INTENSITY)?;
        check_f32("satellite.cavity.radius", c.radius, CAVITY_RADIUS)?;

        let r = &self.renderer;
        check_f32("renderer.sun_azimuth", r.sun_azimuth, SUN_AZIMUTH)?;
        check_f32("renderer.sun_altitude", r.sun_altitude, SUN_ALTITUDE)?;
        check_f32("renderer.exposure", r.exposure, EXPOSURE)?;
        check_f32("renderer.max_slope", r.max_slope, MAX_SLOPE)?;
        check_u32("renderer.sample_count", r.sample_count, SAMPLE_COUNT)?;
        check_f32("renderer.max_dist", r.max_dist, MARCHER_MAX_DIST)?;
        check_f32("renderer.min_step", r.min_step, MARCHER_MIN_STEP)?;

        self.terrain.validate()
    }
}

fn check_f32(name: &str, v: f32, range: RangeInclusive<f32>) -> PrettifierResult<()> {
    if !v.is_finite() || !range.contains(&v) {
        return Err(PrettifierError::validation(format!(
            "{name} must be within [{}, {}], got {v}",
            range.start(),
            range.end()
        )));
    }
    Ok(())
}

fn check_u32(name: &str, v: u32, range: RangeInclusive<u32>) -> PrettifierResult<()> {
    if !range.contains(&v) {
        return Err(PrettifierError::validation(format!(
            "{name} must be within [{}, {}], got {v}",
            range.start(),
            range.end()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
