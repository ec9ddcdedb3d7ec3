use std::fmt;

use crate::{
    config::model::PrettifierConfig,
    pipeline::params::{
        BindContext, CavityParams, DenoiseParams, ErosionParams, PassParams, RidgeParams,
        ShadowRemovalParams, TerrainParams, denoise_iterations, denoise_step_strength,
        erosion_strength, ridge_sharpness,
    },
};

/// Identity of a pixel pass. Discriminants are the stable shader-pass indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PassKind {
    Denoise = 0,
    RidgeSynthesis = 1,
    Erosion = 2,
    ShadowRemoval = 3,
    CavityShading = 4,
}

impl PassKind {
    pub fn shader_index(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Denoise => "denoise",
            Self::RidgeSynthesis => "ridge_synthesis",
            Self::Erosion => "erosion",
            Self::ShadowRemoval => "shadow_removal",
            Self::CavityShading => "cavity_shading",
        }
    }
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static description of one pass: when it runs, how often, and with which parameters.
pub struct PassDescriptor<C> {
    pub kind: PassKind,
    pub is_enabled: fn(&C) -> bool,
    pub iteration_count: fn(&C) -> u32,
    pub bind: fn(&C, &BindContext, u32) -> PassParams,
}

impl<C> Clone for PassDescriptor<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for PassDescriptor<C> {}

impl<C> fmt::Debug for PassDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassDescriptor")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Ordered pass list of one pipeline. Order is fixed and never changes at runtime.
pub type PassTable<C> = &'static [PassDescriptor<C>];

pub static HEIGHTMAP_PASSES: [PassDescriptor<PrettifierConfig>; 3] = [
    PassDescriptor {
        kind: PassKind::Denoise,
        is_enabled: |c| c.heightmap.enabled && c.heightmap.denoise.enabled,
        iteration_count: |c| denoise_iterations(c.heightmap.denoise.strength),
        bind: bind_denoise,
    },
    PassDescriptor {
        kind: PassKind::RidgeSynthesis,
        is_enabled: |c| c.heightmap.enabled && c.heightmap.ridges.enabled,
        iteration_count: |_| 1,
        bind: bind_ridges,
    },
    PassDescriptor {
        kind: PassKind::Erosion,
        is_enabled: |c| c.heightmap.enabled && c.heightmap.erosion.enabled,
        iteration_count: |_| 1,
        bind: bind_erosion,
    },
];

pub static SATELLITE_PASSES: [PassDescriptor<PrettifierConfig>; 2] = [
    PassDescriptor {
        kind: PassKind::ShadowRemoval,
        is_enabled: |c| c.satellite.enabled && c.satellite.shadow_removal.enabled,
        iteration_count: |c| c.satellite.shadow_removal.passes,
        bind: bind_shadow_removal,
    },
    PassDescriptor {
        kind: PassKind::CavityShading,
        is_enabled: |c| c.satellite.enabled && c.satellite.cavity.enabled,
        iteration_count: |_| 1,
        bind: bind_cavity,
    },
];

fn target_terrain(cfg: &PrettifierConfig, ctx: &BindContext) -> TerrainParams {
    TerrainParams::bind(
        &cfg.terrain,
        &cfg.renderer,
        ctx.target.width,
        ctx.target.height,
    )
}

fn bind_denoise(cfg: &PrettifierConfig, ctx: &BindContext, iteration: u32) -> PassParams {
    PassParams::Denoise(DenoiseParams {
        strength: denoise_step_strength(cfg.heightmap.denoise.strength, iteration),
        iteration,
        terrain: target_terrain(cfg, ctx),
    })
}

fn bind_ridges(cfg: &PrettifierConfig, ctx: &BindContext, _: u32) -> PassParams {
    let r = &cfg.heightmap.ridges;
    PassParams::RidgeSynthesis(RidgeParams {
        strength: r.strength,
        sharpness: ridge_sharpness(r.sharpness),
        terrain: target_terrain(cfg, ctx),
    })
}

fn bind_erosion(cfg: &PrettifierConfig, ctx: &BindContext, _: u32) -> PassParams {
    let e = &cfg.heightmap.erosion;
    PassParams::Erosion(ErosionParams {
        strength: erosion_strength(e.strength),
        octaves: e.octaves,
        frequency: e.frequency,
        slope_mask: e.slope_mask,
        slope_sharpness: e.slope_sharpness,
        seed: cfg.seed,
        terrain: target_terrain(cfg, ctx),
    })
}

fn bind_shadow_removal(cfg: &PrettifierConfig, ctx: &BindContext, iteration: u32) -> PassParams {
    let s = &cfg.satellite.shadow_removal;
    PassParams::ShadowRemoval(ShadowRemovalParams {
        pass_index: iteration,
        shadow_color: s.shadow_color,
        luminance_threshold: s.luminance_threshold,
        saturation_threshold: s.saturation_threshold,
        edge: s.edge,
        radius: s.radius,
        pixel_size: target_terrain(cfg, ctx).pixel_size,
        directions: ctx.directions.clone(),
    })
}

fn bind_cavity(cfg: &PrettifierConfig, ctx: &BindContext, _: u32) -> PassParams {
    let c = &cfg.satellite.cavity;
    let hm = ctx.heightmap.unwrap_or(ctx.target);
    PassParams::CavityShading(CavityParams {
        intensity: c.intensity,
        radius: c.radius,
        terrain: TerrainParams::bind(&cfg.terrain, &cfg.renderer, hm.width, hm.height),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/passes.rs"]
mod tests;
