use crate::{
    foundation::error::{PrettifierError, PrettifierResult},
    raster::{BufferId, Image, ImageDesc},
};

/// Limits applied when the pool allocates a buffer pair.
#[derive(Debug, Clone, Copy)]
pub struct BufferPoolOpts {
    /// Largest accepted width or height in pixels.
    pub max_dimension: u32,
    /// Largest accepted device byte cost of both buffers together.
    pub max_pair_bytes: usize,
}

impl Default for BufferPoolOpts {
    fn default() -> Self {
        Self {
            max_dimension: 16384,
            max_pair_bytes: 1usize << 31,
        }
    }
}

/// Lifetime counters of a [`BufferPool`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BufferPoolStats {
    /// Pairs allocated over the pool's lifetime.
    pub allocations: u64,
    /// Allocations that replaced an existing pair.
    pub reallocations: u64,
    /// Requests refused by limits or the allocator.
    pub refused: u64,
    /// Device bytes held by the current pair.
    pub retained_bytes: usize,
}

/// Two equally shaped images used to ping-pong a multi-pass transform.
///
/// `current` always holds the most recently written result; `scratch` is undefined until the
/// next write.
#[derive(Debug)]
pub struct BufferPair {
    current: Image,
    scratch: Image,
    swaps: u64,
}

impl BufferPair {
    /// Shape shared by both buffers.
    pub fn desc(&self) -> ImageDesc {
        self.current.desc()
    }

    /// Latest result.
    pub fn current(&self) -> &Image {
        &self.current
    }

    pub fn scratch(&self) -> &Image {
        &self.scratch
    }

    pub fn current_mut(&mut self) -> &mut Image {
        &mut self.current
    }

    /// Read-only source and writable target for one pass.
    pub fn split(&mut self) -> (&Image, &mut Image) {
        (&self.current, &mut self.scratch)
    }

    /// Exchange the labels. No pixel data moves.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.scratch);
        self.swaps = self.swaps.wrapping_add(1);
    }

    /// Swaps since allocation.
    pub fn swap_count(&self) -> u64 {
        self.swaps
    }
}

/// Lazily allocated double buffer, memoized on `(width, height, format)`.
pub struct BufferPool {
    opts: BufferPoolOpts,
    stats: BufferPoolStats,
    next_id: u64,
    pair: Option<BufferPair>,
}

impl BufferPool {
    /// Empty pool. Nothing is allocated until the first [`Self::ensure`].
    pub fn new(opts: BufferPoolOpts) -> Self {
        Self {
            opts,
            stats: BufferPoolStats::default(),
            next_id: 1,
            pair: None,
        }
    }

    pub fn stats(&self) -> BufferPoolStats {
        self.stats.clone()
    }

    /// Current pair, if one has been allocated.
    pub fn pair(&self) -> Option<&BufferPair> {
        self.pair.as_ref()
    }

    /// Return a pair shaped like `desc`, allocating only when the shape or format changed.
    ///
    /// Allocation is all-or-nothing: on failure the previous pair is left in place.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn ensure(&mut self, desc: ImageDesc) -> PrettifierResult<&mut BufferPair> {
        let reuse = self.pair.as_ref().is_some_and(|p| {
            let cur = p.desc();
            cur.width == desc.width && cur.height == desc.height && cur.format == desc.format
        });

        if !reuse {
            let pair = match self.allocate(desc) {
                Ok(pair) => pair,
                Err(e) => {
                    self.stats.refused = self.stats.refused.saturating_add(1);
                    return Err(e);
                }
            };
            if self.pair.is_some() {
                self.stats.reallocations = self.stats.reallocations.saturating_add(1);
            }
            self.stats.allocations = self.stats.allocations.saturating_add(1);
            self.stats.retained_bytes = pair_bytes(desc).unwrap_or(usize::MAX);
            tracing::info!(
                width = desc.width,
                height = desc.height,
                format = ?desc.format,
                "allocated buffer pair"
            );
            self.pair = Some(pair);
        }

        match self.pair.as_mut() {
            Some(pair) => {
                pair.current.set_mips_wanted(desc.mips);
                pair.scratch.set_mips_wanted(desc.mips);
                Ok(pair)
            }
            None => Err(PrettifierError::allocation(
                desc.width,
                desc.height,
                desc.format,
                "pool holds no buffer pair",
            )),
        }
    }

    /// Drop the pair, e.g. when the owning tool shuts down.
    pub fn release(&mut self) {
        self.pair = None;
        self.stats.retained_bytes = 0;
    }

    fn allocate(&mut self, desc: ImageDesc) -> PrettifierResult<BufferPair> {
        let refuse = |reason: String| {
            PrettifierError::allocation(desc.width, desc.height, desc.format, reason)
        };

        if desc.width == 0 || desc.height == 0 {
            return Err(refuse("buffer width/height must be > 0".to_string()));
        }
        if desc.width > self.opts.max_dimension || desc.height > self.opts.max_dimension {
            return Err(refuse(format!(
                "buffer dimension exceeds backend limit of {}",
                self.opts.max_dimension
            )));
        }
        let bytes = pair_bytes(desc).ok_or_else(|| refuse("buffer size overflow".to_string()))?;
        if bytes > self.opts.max_pair_bytes {
            return Err(refuse(format!(
                "buffer pair needs {bytes} bytes, limit is {}",
                self.opts.max_pair_bytes
            )));
        }

        let current_id = BufferId(self.next_id);
        let scratch_id = BufferId(self.next_id + 1);
        let current = Image::try_alloc(current_id, desc).map_err(|e| refuse(e.to_string()))?;
        let scratch = Image::try_alloc(scratch_id, desc).map_err(|e| refuse(e.to_string()))?;
        self.next_id += 2;

        Ok(BufferPair {
            current,
            scratch,
            swaps: 0,
        })
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(BufferPoolOpts::default())
    }
}

fn pair_bytes(desc: ImageDesc) -> Option<usize> {
    desc.byte_len().and_then(|b| b.checked_mul(2))
}

#[cfg(test)]
#[path = "../../tests/unit/render/buffer_pool.rs"]
mod tests;
