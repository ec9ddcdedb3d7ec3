//! terrain-prettifier post-processes terrain heightmaps and satellite imagery.
//!
//! Two fixed pass chains run over double-buffered images:
//!
//! 1. **Height data**: `Denoise -> RidgeSynthesis -> Erosion`
//! 2. **Color data**: `ShadowRemoval -> CavityShading` (cavity shading samples the heightmap)
//!
//! Each pass reads the `current` buffer and writes the `scratch` buffer, after which the two are
//! swapped. Pixel transforms live behind [`PassBackend`]; [`CpuBackend`] is the bundled
//! implementation. [`Prettifier`] ties inputs, both pipelines and the configuration history into
//! one editing session, and the `export` helpers write results back to disk.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: the same input and configuration produce bit-identical output.
//! - **Explicit configuration**: passes only see the [`PrettifierConfig`] value handed to a run.
#![forbid(unsafe_code)]

mod config;
mod export;
mod foundation;
mod pipeline;
mod raster;
mod render;
mod session;

pub use config::history::ConfigHistory;
pub use config::model::{
    CavityConfig, DEFAULT_DIRECTION_SEED, DenoiseConfig, ErosionConfig, HeightmapConfig,
    PrettifierConfig, RendererConfig, RidgeConfig, SatelliteConfig, ShadowRemovalConfig, ranges,
};
pub use export::{
    JPEG_QUALITY, backup, backup_path, ensure_backup, ensure_parent_dir, export_heightmap_png16,
    export_jpeg, export_png, has_backup, processed_output_path, restore,
};
pub use foundation::core::{Rect, Rgb, TerrainBounds, Vec2, Vec3};
pub use foundation::error::{PrettifierError, PrettifierResult};
pub use foundation::math::{Rng64, clamp01, rotate_about_axis};
pub use pipeline::{
    BindContext, CavityParams, DenoiseParams, ErosionParams, HEIGHTMAP_PASSES, MarcherParams,
    OutputSpec, PassDescriptor, PassKind, PassParams, PassTable, Pipeline, PipelineOpts,
    RandomDirectionSet, RidgeParams, RunMode, RunStats, SATELLITE_PASSES, ShadowRemovalParams,
    TerrainParams, denoise_iterations, denoise_step_strength, erosion_strength, ridge_sharpness,
    sun_direction,
};
pub use raster::io::{color_from_dynamic, heightmap_from_dynamic, load_color, load_heightmap};
pub use raster::{BufferId, Image, ImageDesc, MipLevel, PixelFormat};
pub use render::{
    BufferPair, BufferPool, BufferPoolOpts, BufferPoolStats, CpuBackend, CpuBackendOpts,
    PassBackend, PassInputs, render_preview,
};
pub use session::{Prettifier, PrettifierOpts, Retrigger};
