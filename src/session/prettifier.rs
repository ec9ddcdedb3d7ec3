use std::{path::Path, sync::Arc};

use crate::{
    config::{history::ConfigHistory, model::PrettifierConfig},
    export::encode::{export_heightmap_png16, export_jpeg},
    foundation::error::{PrettifierError, PrettifierResult},
    pipeline::{
        params::TerrainParams,
        passes::{HEIGHTMAP_PASSES, SATELLITE_PASSES},
        random::RandomDirectionSet,
        runner::{OutputSpec, Pipeline, PipelineOpts, RunMode, RunStats},
    },
    raster::Image,
    render::{
        backend::PassBackend,
        cpu::{CpuBackend, CpuBackendOpts},
        preview::render_preview,
    },
};

/// Which pipelines a configuration change invalidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Retrigger {
    pub heightmap: bool,
    pub satellite: bool,
}

impl Retrigger {
    pub const NONE: Self = Self {
        heightmap: false,
        satellite: false,
    };

    pub const ALL: Self = Self {
        heightmap: true,
        satellite: true,
    };

    /// Diff two configurations.
    ///
    /// Height settings, terrain bounds and the seed invalidate the heightmap. Satellite settings
    /// and the seed invalidate the satellite image, which also follows the heightmap while
    /// cavity shading is active. Renderer settings invalidate nothing.
    pub fn between(old: &PrettifierConfig, new: &PrettifierConfig) -> Self {
        let seed = old.seed != new.seed;
        let heightmap = old.heightmap != new.heightmap || old.terrain != new.terrain || seed;
        let cavity_active = new.satellite.enabled && new.satellite.cavity.enabled;
        let satellite = old.satellite != new.satellite || seed || (heightmap && cavity_active);
        Self {
            heightmap,
            satellite,
        }
    }

    pub fn any(self) -> bool {
        self.heightmap || self.satellite
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PrettifierOpts {
    pub pipeline: PipelineOpts,
    pub mode: RunMode,
    pub cpu: CpuBackendOpts,
}

/// Processing session over one terrain: raw inputs, both pipelines and the edit history.
pub struct Prettifier<B: PassBackend = CpuBackend> {
    history: ConfigHistory,
    heightmap_pipeline: Pipeline<B>,
    satellite_pipeline: Pipeline<B>,
    heightmap: Option<Image>,
    satellite: Option<Image>,
    mode: RunMode,
}

impl Prettifier<CpuBackend> {
    pub fn new(config: PrettifierConfig, opts: PrettifierOpts) -> PrettifierResult<Self> {
        let heightmap_backend = CpuBackend::new(opts.cpu)?;
        let satellite_backend = CpuBackend::new(opts.cpu)?;
        Self::with_backends(config, heightmap_backend, satellite_backend, opts)
    }
}

impl<B: PassBackend> Prettifier<B> {
    pub fn with_backends(
        config: PrettifierConfig,
        heightmap_backend: B,
        satellite_backend: B,
        opts: PrettifierOpts,
    ) -> PrettifierResult<Self> {
        config.validate()?;
        let directions = RandomDirectionSet::shared(config.seed);
        Ok(Self {
            heightmap_pipeline: Pipeline::new(
                heightmap_backend,
                opts.pipeline,
                OutputSpec::HEIGHTMAP,
                directions.clone(),
            ),
            satellite_pipeline: Pipeline::new(
                satellite_backend,
                opts.pipeline,
                OutputSpec::SATELLITE,
                directions,
            ),
            history: ConfigHistory::new(config),
            heightmap: None,
            satellite: None,
            mode: opts.mode,
        })
    }

    pub fn config(&self) -> &PrettifierConfig {
        self.history.current()
    }

    pub fn history(&self) -> &ConfigHistory {
        &self.history
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RunMode) {
        self.mode = mode;
    }

    /// Replace the raw heightmap. Outputs derived from the previous one are withdrawn: the
    /// processed heightmap, and the satellite result while cavity shading samples it.
    pub fn set_heightmap(&mut self, heightmap: Option<Image>) -> PrettifierResult<()> {
        if let Some(h) = &heightmap
            && h.format().is_color()
        {
            return Err(PrettifierError::validation("heightmap input must be height data"));
        }
        self.heightmap = heightmap;
        self.heightmap_pipeline.invalidate();
        let cavity = &self.history.current().satellite;
        if cavity.enabled && cavity.cavity.enabled {
            self.satellite_pipeline.invalidate();
        }
        Ok(())
    }

    /// Replace the raw satellite image and withdraw the satellite result built from the old one.
    pub fn set_satellite(&mut self, satellite: Option<Image>) {
        self.satellite = satellite;
        self.satellite_pipeline.invalidate();
    }

    pub fn heightmap_input(&self) -> Option<&Image> {
        self.heightmap.as_ref()
    }

    pub fn satellite_input(&self) -> Option<&Image> {
        self.satellite.as_ref()
    }

    pub fn heightmap_output(&self) -> Option<&Image> {
        self.heightmap_pipeline.output()
    }

    pub fn satellite_output(&self) -> Option<&Image> {
        self.satellite_pipeline.output()
    }

    pub fn heightmap_stats(&self) -> &RunStats {
        self.heightmap_pipeline.last_stats()
    }

    pub fn satellite_stats(&self) -> &RunStats {
        self.satellite_pipeline.last_stats()
    }

    /// Latest height data: processed when available, raw otherwise.
    pub fn current_heightmap(&self) -> Option<&Image> {
        self.heightmap_pipeline.output().or(self.heightmap.as_ref())
    }

    #[tracing::instrument(level = "info", skip(self))]
    pub fn process_heightmap(&mut self) -> PrettifierResult<Option<&Image>> {
        self.heightmap_pipeline.run(
            self.heightmap.as_ref(),
            &HEIGHTMAP_PASSES,
            self.history.current(),
            self.mode,
            None,
        )
    }

    /// Run the color pipeline. Cavity shading samples the processed heightmap when one has been
    /// produced, the raw heightmap otherwise.
    #[tracing::instrument(level = "info", skip(self))]
    pub fn process_satellite(&mut self) -> PrettifierResult<Option<&Image>> {
        let heightmap = self
            .heightmap_pipeline
            .output()
            .or(self.heightmap.as_ref());
        self.satellite_pipeline.run(
            self.satellite.as_ref(),
            &SATELLITE_PASSES,
            self.history.current(),
            self.mode,
            heightmap,
        )
    }

    pub fn process_all(&mut self) -> PrettifierResult<()> {
        self.rerun(Retrigger::ALL)
    }

    fn rerun(&mut self, what: Retrigger) -> PrettifierResult<()> {
        if what.heightmap {
            self.process_heightmap()?;
        }
        if what.satellite {
            self.process_satellite()?;
        }
        Ok(())
    }

    fn on_config_changed(&mut self, old: &PrettifierConfig) -> PrettifierResult<Retrigger> {
        let new = self.history.current();
        let what = Retrigger::between(old, new);
        if old.seed != new.seed {
            let directions = RandomDirectionSet::shared(new.seed);
            self.heightmap_pipeline.set_directions(directions.clone());
            self.satellite_pipeline.set_directions(directions);
        }
        tracing::debug!(heightmap = what.heightmap, satellite = what.satellite, "retrigger");
        self.rerun(what)?;
        Ok(what)
    }

    /// Validate and adopt `config`, re-running only the pipelines it invalidates.
    ///
    /// Invalid configurations are rejected and leave the session untouched.
    pub fn apply_config(&mut self, config: PrettifierConfig) -> PrettifierResult<Retrigger> {
        config.validate()?;
        let old = self.history.current().clone();
        if !self.history.record(config) {
            return Ok(Retrigger::NONE);
        }
        self.on_config_changed(&old)
    }

    /// Step back one configuration. `Ok(None)` when there is nothing to undo.
    pub fn undo(&mut self) -> PrettifierResult<Option<Retrigger>> {
        let old = self.history.current().clone();
        if self.history.undo().is_none() {
            return Ok(None);
        }
        self.on_config_changed(&old).map(Some)
    }

    pub fn redo(&mut self) -> PrettifierResult<Option<Retrigger>> {
        let old = self.history.current().clone();
        if self.history.redo().is_none() {
            return Ok(None);
        }
        self.on_config_changed(&old).map(Some)
    }

    /// Lit preview of the latest height data, textured with the latest satellite image.
    pub fn render_preview(&self) -> PrettifierResult<Option<Image>> {
        let Some(heightmap) = self.current_heightmap() else {
            return Ok(None);
        };
        let satellite = self
            .satellite_pipeline
            .output()
            .or(self.satellite.as_ref());
        let cfg = self.history.current();
        let params = TerrainParams::bind(
            &cfg.terrain,
            &cfg.renderer,
            heightmap.width(),
            heightmap.height(),
        );
        render_preview(heightmap, satellite, &params).map(Some)
    }

    /// Write the processed satellite image as JPEG. Returns `false` when nothing was produced.
    pub fn export_satellite(&self, path: &Path) -> PrettifierResult<bool> {
        match self.satellite_output() {
            Some(img) => export_jpeg(img, path).map(|()| true),
            None => Ok(false),
        }
    }

    /// Write the processed heightmap as a 16-bit PNG. Returns `false` when nothing was produced.
    pub fn export_heightmap(&self, path: &Path) -> PrettifierResult<bool> {
        match self.heightmap_output() {
            Some(img) => export_heightmap_png16(img, path).map(|()| true),
            None => Ok(false),
        }
    }

    pub fn directions(&self) -> &Arc<RandomDirectionSet> {
        self.satellite_pipeline.directions()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/prettifier.rs"]
mod tests;
