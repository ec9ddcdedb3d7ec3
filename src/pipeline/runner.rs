use std::sync::Arc;

use crate::{
    foundation::error::PrettifierResult,
    pipeline::{
        params::BindContext,
        passes::{PassDescriptor, PassKind},
        random::RandomDirectionSet,
    },
    raster::{Image, ImageDesc, PixelFormat},
    render::{
        backend::{PassBackend, PassInputs},
        buffer_pool::{BufferPool, BufferPoolOpts, BufferPoolStats},
    },
};

/// Resolution policy of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Interactive iteration: each axis is capped at
    /// [`PipelineOpts::max_preview_resolution`].
    #[default]
    Preview,
    /// Final output at the input's full resolution.
    Export,
}

/// Format and mip policy of a pipeline's buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputSpec {
    /// Buffer format; `None` keeps the input's format.
    pub format: Option<PixelFormat>,
    /// Regenerate mips after the last pass.
    pub mips: bool,
}

impl OutputSpec {
    /// Height data keeps the input format and has no mips.
    pub const HEIGHTMAP: Self = Self {
        format: None,
        mips: false,
    };

    /// Color data is always RGBA8 with a full mip chain.
    pub const SATELLITE: Self = Self {
        format: Some(PixelFormat::Rgba8Unorm),
        mips: true,
    };
}

/// Pipeline construction options.
#[derive(Clone, Copy, Debug)]
pub struct PipelineOpts {
    /// Per-axis cap applied in [`RunMode::Preview`]. Defaults to 1024.
    pub max_preview_resolution: u32,
    /// Allocation limits of the pipeline's buffer pool.
    pub pool: BufferPoolOpts,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            max_preview_resolution: 1024,
            pool: BufferPoolOpts::default(),
        }
    }
}

/// Summary of the most recent successful run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Enabled passes in execution order with their iteration counts.
    pub invocations: Vec<(PassKind, u32)>,
    /// Total backend invocations.
    pub passes_executed: u32,
    /// Buffer swaps; always equal to `passes_executed`.
    pub swaps: u64,
    /// Shape of the produced output.
    pub output: Option<ImageDesc>,
}

impl RunStats {
    /// Iterations `kind` ran for, 0 when it was disabled or absent from the table.
    pub fn iterations_of(&self, kind: PassKind) -> u32 {
        self.invocations
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, n)| *n)
            .sum()
    }
}

/// Drives a fixed pass table over a double-buffered image.
///
/// Each enabled pass reads `current`, writes `scratch`, and the pair is swapped, so `current`
/// always holds the latest result. Runs take `&mut self`, which serializes triggers per pool.
pub struct Pipeline<B: PassBackend> {
    backend: B,
    pool: BufferPool,
    opts: PipelineOpts,
    output: OutputSpec,
    directions: Arc<RandomDirectionSet>,
    last_stats: RunStats,
    produced: bool,
}

impl<B: PassBackend> Pipeline<B> {
    /// Pipeline over `backend`. Buffers are allocated lazily by the first run.
    ///
    /// `directions` is the jitter table handed to shadow removal; swap it with
    /// [`Self::set_directions`] when the seed changes.
    pub fn new(
        backend: B,
        opts: PipelineOpts,
        output: OutputSpec,
        directions: Arc<RandomDirectionSet>,
    ) -> Self {
        Self {
            backend,
            pool: BufferPool::new(opts.pool),
            opts,
            output,
            directions,
            last_stats: RunStats::default(),
            produced: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Counters of the underlying buffer pool.
    pub fn pool_stats(&self) -> BufferPoolStats {
        self.pool.stats()
    }

    pub fn last_stats(&self) -> &RunStats {
        &self.last_stats
    }

    pub fn directions(&self) -> &Arc<RandomDirectionSet> {
        &self.directions
    }

    pub fn set_directions(&mut self, directions: Arc<RandomDirectionSet>) {
        self.directions = directions;
    }

    /// Result of the last successful run, if any.
    pub fn output(&self) -> Option<&Image> {
        if !self.produced {
            return None;
        }
        self.pool.pair().map(|p| p.current())
    }

    /// Withdraw the current output without dropping the buffers, e.g. after the input changed.
    pub fn invalidate(&mut self) {
        self.produced = false;
    }

    /// Drop the buffers; the next run allocates again.
    pub fn release(&mut self) {
        self.pool.release();
        self.produced = false;
    }

    /// Buffer shape a run over `input` would use.
    pub fn target_desc(&self, input: ImageDesc, mode: RunMode) -> ImageDesc {
        let (mut width, mut height) = (input.width, input.height);
        if mode == RunMode::Preview {
            let cap = self.opts.max_preview_resolution.max(1);
            width = width.min(cap);
            height = height.min(cap);
        }
        let format = self.output.format.unwrap_or(input.format);
        ImageDesc::new(width, height, format).with_mips(self.output.mips)
    }

    /// Run every enabled pass of `table` over `input`.
    ///
    /// A missing input is not an error: nothing runs, any previous output is withdrawn and
    /// `Ok(None)` is returned. A refused allocation leaves the previous output exposed. Once the
    /// buffers have been written, a failing pass hides the output until the next successful run.
    #[tracing::instrument(level = "debug", skip_all, fields(mode = ?mode))]
    pub fn run<C>(
        &mut self,
        input: Option<&Image>,
        table: &[PassDescriptor<C>],
        config: &C,
        mode: RunMode,
        heightmap: Option<&Image>,
    ) -> PrettifierResult<Option<&Image>> {
        let Some(input) = input else {
            tracing::debug!("no input bound; run skipped");
            self.produced = false;
            return Ok(None);
        };
        let desc = self.target_desc(input.desc(), mode);

        let Self {
            backend,
            pool,
            directions,
            last_stats,
            produced,
            ..
        } = self;

        let pair = pool.ensure(desc)?;
        *produced = false;
        pair.current_mut().copy_resampled_from(input);
        let swaps_before = pair.swap_count();

        let ctx = BindContext {
            target: desc,
            heightmap: heightmap.map(Image::desc),
            directions: directions.clone(),
        };

        let mut stats = RunStats::default();
        for pass in table {
            if !(pass.is_enabled)(config) {
                tracing::trace!(pass = %pass.kind, "pass disabled");
                continue;
            }
            let iterations = (pass.iteration_count)(config);
            for i in 0..iterations {
                let params = (pass.bind)(config, &ctx, i);
                let (source, target) = pair.split();
                backend.execute(pass.kind, &params, PassInputs { source, heightmap }, target)?;
                pair.swap();
                stats.passes_executed += 1;
            }
            tracing::debug!(pass = %pass.kind, iterations, "pass executed");
            stats.invocations.push((pass.kind, iterations));
        }

        if desc.mips {
            pair.current_mut().generate_mips();
        }

        stats.swaps = pair.swap_count() - swaps_before;
        stats.output = Some(desc);
        *last_stats = stats;
        *produced = true;
        Ok(Some(pair.current()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/runner.rs"]
mod tests;
