use rayon::prelude::*;

use crate::{
    foundation::{
        core::Vec3,
        error::{PrettifierError, PrettifierResult},
        math::{clamp01, smoothstep},
    },
    pipeline::params::TerrainParams,
    raster::{Image, PixelFormat},
};

const AMBIENT: f32 = 0.15;

/// Top-down lit view of a heightmap, optionally textured with a satellite image.
///
/// The output has the heightmap's resolution and is always `Rgba8Unorm`.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(width = heightmap.width(), height = heightmap.height())
)]
pub fn render_preview(
    heightmap: &Image,
    satellite: Option<&Image>,
    params: &TerrainParams,
) -> PrettifierResult<Image> {
    if heightmap.format().is_color() {
        return Err(PrettifierError::validation(
            "preview expects height data, got color",
        ));
    }
    if let Some(sat) = satellite
        && !sat.format().is_color()
    {
        return Err(PrettifierError::validation(
            "preview albedo must be color data",
        ));
    }

    let (w, h) = (heightmap.width(), heightmap.height());
    let terrain = Terrain::new(heightmap, params);
    let mut data = vec![0.0f32; w as usize * h as usize * 4];
    data.par_chunks_mut(w as usize * 4)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let rgb = shade(&terrain, satellite, params, x as u32, y as u32);
                px[..3].copy_from_slice(&rgb);
                px[3] = 1.0;
            }
        });

    Image::from_samples(w, h, PixelFormat::Rgba8Unorm, data)
}

/// World-space view of a heightmap.
struct Terrain<'a> {
    map: &'a Image,
    params: &'a TerrainParams,
    texel: [f32; 2],
}

impl<'a> Terrain<'a> {
    fn new(map: &'a Image, params: &'a TerrainParams) -> Self {
        let texel = [
            params.size.x / map.width() as f32,
            params.size.z / map.height() as f32,
        ];
        Self { map, params, texel }
    }

    fn height_at_texel(&self, x: i64, y: i64) -> f32 {
        self.params.world_height(self.map.texel(x, y, 0))
    }

    /// Terrain height below a world position, or `None` outside the footprint.
    fn height_at_world(&self, wx: f32, wz: f32) -> Option<f32> {
        let b = self.params.heightmap_bounds;
        let u = (wx - b[0]) * b[2];
        let v = (wz - b[1]) * b[3];
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return None;
        }
        Some(self.params.world_height(self.map.sample_bilinear(u, v, 0)))
    }

    fn position(&self, x: u32, y: u32) -> Vec3 {
        let b = self.params.heightmap_bounds;
        Vec3::new(
            b[0] + (x as f32 + 0.5) * self.texel[0],
            self.height_at_texel(i64::from(x), i64::from(y)),
            b[1] + (y as f32 + 0.5) * self.texel[1],
        )
    }

    fn normal(&self, x: u32, y: u32) -> Vec3 {
        let (x, y) = (i64::from(x), i64::from(y));
        let dx = (self.height_at_texel(x + 1, y) - self.height_at_texel(x - 1, y))
            / (2.0 * self.texel[0]);
        let dz = (self.height_at_texel(x, y + 1) - self.height_at_texel(x, y - 1))
            / (2.0 * self.texel[1]);
        Vec3::new(-dx, 1.0, -dz).normalized()
    }

    /// 1.0 when the sun is visible from `origin`, 0.0 when terrain blocks it.
    fn sun_visibility(&self, origin: Vec3) -> f32 {
        let m = self.params.marcher;
        let sun = self.params.sun_dir;
        if sun.y <= 0.0 {
            return 0.0;
        }
        let step = m.min_step.max(self.texel[0].min(self.texel[1]));
        let top = self.params.height_bounds[1];
        let mut t = step;
        for _ in 0..m.sample_count {
            if t > m.max_dist {
                break;
            }
            let p = origin + sun.scale(t);
            if p.y > top {
                break;
            }
            match self.height_at_world(p.x, p.z) {
                Some(ground) if ground > p.y => return 0.0,
                Some(_) => {}
                None => break,
            }
            t += step;
        }
        1.0
    }
}

fn shade(
    terrain: &Terrain<'_>,
    satellite: Option<&Image>,
    params: &TerrainParams,
    x: u32,
    y: u32,
) -> [f32; 3] {
    let albedo = match satellite {
        Some(sat) if params.albedo => {
            let u = (x as f32 + 0.5) / terrain.map.width() as f32;
            let v = (y as f32 + 0.5) / terrain.map.height() as f32;
            [
                sat.sample_bilinear(u, v, 0),
                sat.sample_bilinear(u, v, 1),
                sat.sample_bilinear(u, v, 2),
            ]
        }
        _ => [1.0; 3],
    };

    let normal = terrain.normal(x, y);
    let light = if params.lighting {
        let lambert = normal.dot(params.sun_dir).max(0.0);
        let visible = if params.shadows && lambert > 0.0 {
            terrain.sun_visibility(terrain.position(x, y))
        } else {
            1.0
        };
        AMBIENT + (1.0 - AMBIENT) * lambert * visible
    } else {
        1.0
    };

    let steepness = 1.0 - normal.y;
    let slope = 1.0 - 0.5 * smoothstep(params.max_slope, 1.0, steepness);
    let k = light * slope * params.exposure;
    albedo.map(|c| clamp01(c * k))
}

#[cfg(test)]
#[path = "../../tests/unit/render/preview.rs"]
mod tests;
