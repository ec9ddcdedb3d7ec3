use rayon::prelude::*;

use crate::{
    foundation::{
        error::{PrettifierError, PrettifierResult},
        math::{Rng64, clamp01, lerp, smoothstep},
    },
    pipeline::{
        params::{
            CavityParams, DenoiseParams, ErosionParams, PassParams, RidgeParams,
            ShadowRemovalParams,
        },
        passes::PassKind,
    },
    raster::Image,
    render::backend::{PassBackend, PassInputs},
};

#[derive(Clone, Copy, Debug, Default)]
pub struct CpuBackendOpts {
    /// Worker threads for row-parallel passes. `None` uses rayon's global pool.
    pub threads: Option<usize>,
}

/// Reference backend that runs every pass on the CPU.
///
/// The transforms are compact approximations of the device programs: they honor every bound
/// parameter but are not pixel-exact ports. Each output row depends only on the read-only
/// source, so results do not depend on the thread count.
#[derive(Default)]
pub struct CpuBackend {
    pool: Option<rayon::ThreadPool>,
}

impl CpuBackend {
    pub fn new(opts: CpuBackendOpts) -> PrettifierResult<Self> {
        let pool = match opts.threads {
            Some(n) => Some(build_thread_pool(n)?),
            None => None,
        };
        Ok(Self { pool })
    }

    fn fill_rows<F>(&self, target: &mut Image, f: F)
    where
        F: Fn(u32, u32, &mut [f32]) + Send + Sync,
    {
        let ch = target.channels();
        let row_len = target.width() as usize * ch;
        let data = target.samples_mut();
        let mut run = move || {
            data.par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, px) in row.chunks_exact_mut(ch).enumerate() {
                        f(x as u32, y as u32, px);
                    }
                });
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }

    fn denoise(&self, p: &DenoiseParams, src: &Image, dst: &mut Image) {
        const SIGMA_RANGE: f32 = 0.02;
        let strength = p.strength;
        self.fill_rows(dst, |x, y, px| {
            let (x, y) = (i64::from(x), i64::from(y));
            let center = src.texel(x, y, 0);
            let mut acc = 0.0;
            let mut weight = 0.0;
            for dy in -1..=1i64 {
                for dx in -1..=1i64 {
                    let h = src.texel(x + dx, y + dy, 0);
                    let spatial = if dx == 0 || dy == 0 { 1.0 } else { 0.5 };
                    let d = (h - center) / SIGMA_RANGE;
                    let w = spatial * (-0.5 * d * d).exp();
                    acc += h * w;
                    weight += w;
                }
            }
            px[0] = lerp(center, acc / weight, strength);
            copy_rest(src, x, y, px);
        });
    }

    fn ridges(&self, p: &RidgeParams, src: &Image, dst: &mut Image) {
        let gain = p.strength * 0.01;
        let sharpness = p.sharpness;
        self.fill_rows(dst, |x, y, px| {
            let (x, y) = (i64::from(x), i64::from(y));
            let h = src.texel(x, y, 0);
            let lap = laplacian(src, x, y, 1) - h;
            let focus = lap.abs() / (lap.abs() + sharpness);
            px[0] = (h - gain * lap * focus).max(0.0);
            copy_rest(src, x, y, px);
        });
    }

    fn erosion(&self, p: &ErosionParams, src: &Image, dst: &mut Image) {
        let texel = p.terrain.texel_size[2].max(f32::EPSILON);
        let height_scale = p.terrain.height_scale_offset[0];
        let depth = p.strength * 1e-3;
        let band = (1.0 - p.slope_sharpness).max(1e-3);
        self.fill_rows(dst, |x, y, px| {
            let (xi, yi) = (i64::from(x), i64::from(y));
            let h = src.texel(xi, yi, 0);
            let dx = (src.texel(xi + 1, yi, 0) - src.texel(xi - 1, yi, 0)) * height_scale;
            let dz = (src.texel(xi, yi + 1, 0) - src.texel(xi, yi - 1, 0)) * height_scale;
            let slope = (dx * dx + dz * dz).sqrt() / (2.0 * texel);
            let mask = smoothstep(p.slope_mask, p.slope_mask + band, slope / (1.0 + slope));

            let n = fbm(x as f32 * p.frequency, y as f32 * p.frequency, p.octaves, p.seed);
            let gully = 1.0 - (2.0 * n - 1.0).abs();
            px[0] = (h - depth * mask * gully).max(0.0);
            copy_rest(src, xi, yi, px);
        });
    }

    fn shadow_removal(&self, p: &ShadowRemovalParams, src: &Image, dst: &mut Image) {
        let width = src.width() as usize;
        let reach = p.radius * (p.pass_index + 1) as f32;
        self.fill_rows(dst, |x, y, px| {
            let (xi, yi) = (i64::from(x), i64::from(y));
            let rgb = [src.texel(xi, yi, 0), src.texel(xi, yi, 1), src.texel(xi, yi, 2)];
            let mask = shadow_mask(p, rgb);

            let idx = y as usize * width + x as usize + p.pass_index as usize * 31;
            let dir = p.directions.get(idx);
            let sx = xi + (dir.x as f32 * reach).round() as i64;
            let sy = yi + (dir.y as f32 * reach).round() as i64;
            let lit = [src.texel(sx, sy, 0), src.texel(sx, sy, 1), src.texel(sx, sy, 2)];
            let take = if luminance(lit) > luminance(rgb) {
                mask * (1.0 - shadow_mask(p, lit))
            } else {
                0.0
            };

            for (c, out) in px[..3].iter_mut().enumerate() {
                *out = clamp01(lerp(rgb[c], lit[c], take));
            }
            px[3] = src.texel(xi, yi, 3);
        });
    }

    fn cavity(&self, p: &CavityParams, src: &Image, heightmap: &Image, dst: &mut Image) {
        let (w, h) = (src.width() as f32, src.height() as f32);
        let du = p.radius * p.terrain.pixel_size[0];
        let dv = p.radius * p.terrain.pixel_size[1];
        let world = p.terrain.height_scale_offset[0]
            / (p.radius * p.terrain.texel_size[2]).max(f32::EPSILON);
        self.fill_rows(dst, |x, y, px| {
            let u = (x as f32 + 0.5) / w;
            let v = (y as f32 + 0.5) / h;
            let here = heightmap.sample_bilinear(u, v, 0);
            let mean = 0.25
                * (heightmap.sample_bilinear(u - du, v, 0)
                    + heightmap.sample_bilinear(u + du, v, 0)
                    + heightmap.sample_bilinear(u, v - dv, 0)
                    + heightmap.sample_bilinear(u, v + dv, 0));
            let curvature = ((mean - here) * world).clamp(-1.0, 1.0);
            let shade = (1.0 - p.intensity * curvature).max(0.0);

            let (xi, yi) = (i64::from(x), i64::from(y));
            for (c, out) in px[..3].iter_mut().enumerate() {
                *out = clamp01(src.texel(xi, yi, c) * shade);
            }
            px[3] = src.texel(xi, yi, 3);
        });
    }
}

impl PassBackend for CpuBackend {
    fn execute(
        &mut self,
        kind: PassKind,
        params: &PassParams,
        inputs: PassInputs<'_>,
        target: &mut Image,
    ) -> PrettifierResult<()> {
        let src = inputs.source;
        if (src.width(), src.height()) != (target.width(), target.height()) {
            return Err(PrettifierError::pass(format!(
                "{kind}: source {}x{} does not match target {}x{}",
                src.width(),
                src.height(),
                target.width(),
                target.height()
            )));
        }
        if src.format() != target.format() {
            return Err(PrettifierError::pass(format!(
                "{kind}: source format {:?} does not match target {:?}",
                src.format(),
                target.format()
            )));
        }

        match params {
            PassParams::Denoise(p) => self.denoise(p, src, target),
            PassParams::RidgeSynthesis(p) => self.ridges(p, src, target),
            PassParams::Erosion(p) => self.erosion(p, src, target),
            PassParams::ShadowRemoval(p) => {
                require_color(kind, src)?;
                self.shadow_removal(p, src, target)
            }
            PassParams::CavityShading(p) => {
                require_color(kind, src)?;
                let heightmap = inputs.heightmap.ok_or_else(|| {
                    PrettifierError::pass(format!("{kind}: no heightmap bound"))
                })?;
                self.cavity(p, src, heightmap, target)
            }
        }
        Ok(())
    }
}

fn build_thread_pool(threads: usize) -> PrettifierResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(PrettifierError::validation(
            "cpu backend 'threads' must be >= 1 when set",
        ));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| PrettifierError::pass(format!("failed to build rayon thread pool: {e}")))
}

fn require_color(kind: PassKind, img: &Image) -> PrettifierResult<()> {
    if !img.format().is_color() {
        return Err(PrettifierError::pass(format!(
            "{kind} expects color data, got {:?}",
            img.format()
        )));
    }
    Ok(())
}

/// Copy the channels a height pass does not touch.
fn copy_rest(src: &Image, x: i64, y: i64, px: &mut [f32]) {
    for (c, v) in px.iter_mut().enumerate().skip(1) {
        *v = src.texel(x, y, c);
    }
}

fn laplacian(src: &Image, x: i64, y: i64, r: i64) -> f32 {
    0.25 * (src.texel(x - r, y, 0)
        + src.texel(x + r, y, 0)
        + src.texel(x, y - r, 0)
        + src.texel(x, y + r, 0))
}

fn luminance(rgb: [f32; 3]) -> f32 {
    0.2126 * rgb[0] + 0.7152 * rgb[1] + 0.0722 * rgb[2]
}

fn saturation(rgb: [f32; 3]) -> f32 {
    let max = rgb[0].max(rgb[1]).max(rgb[2]);
    let min = rgb[0].min(rgb[1]).min(rgb[2]);
    if max <= f32::EPSILON { 0.0 } else { (max - min) / max }
}

/// How strongly a color reads as shadow: dark, desaturated, and close to the shadow tint.
fn shadow_mask(p: &ShadowRemovalParams, rgb: [f32; 3]) -> f32 {
    let e = p.edge.max(1e-3);
    let (lum, sat) = (p.luminance_threshold, p.saturation_threshold);
    let dark = 1.0 - smoothstep(lum - e, lum + e, luminance(rgb));
    let flat = 1.0 - smoothstep(sat - e, sat + e, saturation(rgb));
    let tint = p.shadow_color.to_array();
    let dist = rgb
        .iter()
        .zip(tint)
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f32>()
        .sqrt()
        / 3f32.sqrt();
    dark * flat * (1.0 - clamp01(dist))
}

fn lattice(ix: i64, iy: i64, seed: u64) -> f32 {
    let key = (ix as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (iy as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ seed;
    Rng64::new(key).next_f64_01() as f32
}

fn value_noise(x: f32, y: f32, seed: u64) -> f32 {
    let (x0, y0) = (x.floor(), y.floor());
    let (tx, ty) = (x - x0, y - y0);
    let (ix, iy) = (x0 as i64, y0 as i64);
    let sx = tx * tx * (3.0 - 2.0 * tx);
    let sy = ty * ty * (3.0 - 2.0 * ty);
    let top = lerp(lattice(ix, iy, seed), lattice(ix + 1, iy, seed), sx);
    let bottom = lerp(lattice(ix, iy + 1, seed), lattice(ix + 1, iy + 1, seed), sx);
    lerp(top, bottom, sy)
}

fn fbm(x: f32, y: f32, octaves: u32, seed: u64) -> f32 {
    let mut sum = 0.0;
    let mut norm = 0.0;
    let mut amp = 1.0;
    let mut freq = 1.0;
    for o in 0..octaves {
        sum += amp * value_noise(x * freq, y * freq, seed.wrapping_add(u64::from(o)));
        norm += amp;
        amp *= 0.5;
        freq *= 2.0;
    }
    if norm > 0.0 { sum / norm } else { 0.5 }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
