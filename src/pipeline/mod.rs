pub(crate) mod params;
pub(crate) mod passes;
pub(crate) mod random;
pub(crate) mod runner;

pub use params::{
    BindContext, CavityParams, DenoiseParams, ErosionParams, MarcherParams, PassParams,
    RidgeParams, ShadowRemovalParams, TerrainParams, denoise_iterations, denoise_step_strength,
    erosion_strength, ridge_sharpness, sun_direction,
};
pub use passes::{HEIGHTMAP_PASSES, PassDescriptor, PassKind, PassTable, SATELLITE_PASSES};
pub use random::RandomDirectionSet;
pub use runner::{OutputSpec, Pipeline, PipelineOpts, RunMode, RunStats};
