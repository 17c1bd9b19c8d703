//! PNG previews of the terrain inputs and the generated city plan.

use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};

use crate::city::CityScene;
use crate::config::CityConfig;
use crate::error::CityError;
use crate::geometry::Point2;
use crate::roads::HighwayKind;
use crate::terrain::{SampleConvention, TerrainSample, TerrainSampler};

const WATER_DEEP: [f32; 3] = [0.08, 0.20, 0.45];
const WATER_SHALLOW: [f32; 3] = [0.25, 0.50, 0.75];
const ROAD_COLOR: [u8; 3] = [60, 60, 60];
const JOIN_COLOR: [u8; 3] = [230, 140, 30];
const FALLBACK_COLOR: [u8; 3] = [220, 40, 40];

/// Render the sampler over its whole input square.
///
/// Water is shaded blue by depth; land shows height in red and population
/// density in green.
pub fn render_input_maps<S: TerrainSampler + ?Sized>(sampler: &S, config: &CityConfig, side: u32) -> RgbImage {
    let denom = side.saturating_sub(1).max(1) as f64;
    let convention = sampler.convention();

    ImageBuffer::from_fn(side, side, |x, y| {
        let unit = Point2::new(x as f64 / denom, y as f64 / denom);
        let uv = convention.from_centered(SampleConvention::UnitSquare.to_centered(unit));
        Rgb(terrain_color(sampler.sample(uv.x, uv.y), config))
    })
}

/// Write [`render_input_maps`] to a PNG.
pub fn export_input_maps<S: TerrainSampler + ?Sized>(
    sampler: &S,
    config: &CityConfig,
    side: u32,
    path: &Path,
) -> Result<(), CityError> {
    render_input_maps(sampler, config, side).save(path)?;
    Ok(())
}

/// Render a top-down plan of the city: terrain from the validity grid,
/// building footprints, then highways on top.
///
/// Image x grows with world x and image y with world y; the image spans the
/// playable square.
pub fn render_city_plan(scene: &CityScene, config: &CityConfig, pixels: u32) -> RgbImage {
    let extent = scene.grid.world_extent();
    let side = scene.grid.side();
    let plan = PlanTransform::new(extent, pixels);

    let mut img: RgbImage = ImageBuffer::from_fn(pixels, pixels, |x, y| {
        // A grid with no cells leaves the plan as open water
        if side == 0 {
            return Rgb(terrain_color(TerrainSample::default(), config));
        }
        let world = plan.to_world(x, y);
        let col = ((world.x / extent + 0.5) * side as f64).floor().clamp(0.0, (side - 1) as f64) as usize;
        let row = ((world.y / extent + 0.5) * side as f64).floor().clamp(0.0, (side - 1) as f64) as usize;
        Rgb(terrain_color(scene.grid.cell_at(col, row).sample, config))
    });

    for building in &scene.buildings {
        let half = building.footprint_width / 2.0;
        let min = plan.to_pixel(building.base_position - Point2::new(half, half));
        let max = plan.to_pixel(building.base_position + Point2::new(half, half));
        let color = building.color.map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8);

        for py in min.1..=max.1 {
            for px in min.0..=max.0 {
                put_pixel_checked(&mut img, px, py, color);
            }
        }
    }

    for highway in &scene.roads.highways {
        let color = match highway.kind {
            HighwayKind::Extension => ROAD_COLOR,
            HighwayKind::Join => JOIN_COLOR,
            HighwayKind::FallbackSeed => FALLBACK_COLOR,
        };
        let (x0, y0) = plan.to_pixel(highway.segment.start);
        let (x1, y1) = plan.to_pixel(highway.segment.end);
        for (px, py) in bresenham_line(x0, y0, x1, y1) {
            put_pixel_checked(&mut img, px, py, color);
        }
    }

    img
}

/// Write [`render_city_plan`] to a PNG.
pub fn export_city_plan(scene: &CityScene, config: &CityConfig, pixels: u32, path: &Path) -> Result<(), CityError> {
    render_city_plan(scene, config, pixels).save(path)?;
    Ok(())
}

/// Maps between world coordinates and plan pixels
struct PlanTransform {
    extent: f64,
    pixels: f64,
}

impl PlanTransform {
    fn new(extent: f64, pixels: u32) -> Self {
        Self {
            extent,
            pixels: pixels.max(1) as f64,
        }
    }

    /// World position at the center of pixel `(x, y)`.
    fn to_world(&self, x: u32, y: u32) -> Point2 {
        Point2::new(
            ((x as f64 + 0.5) / self.pixels - 0.5) * self.extent,
            ((y as f64 + 0.5) / self.pixels - 0.5) * self.extent,
        )
    }

    /// Pixel containing a world position; may lie outside the image.
    fn to_pixel(&self, world: Point2) -> (i64, i64) {
        (
            ((world.x / self.extent + 0.5) * self.pixels).floor() as i64,
            ((world.y / self.extent + 0.5) * self.pixels).floor() as i64,
        )
    }
}

fn put_pixel_checked(img: &mut RgbImage, x: i64, y: i64, color: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as u64) < img.width() as u64 && (y as u64) < img.height() as u64 {
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }
}

fn terrain_color(sample: TerrainSample, config: &CityConfig) -> [u8; 3] {
    let land = sample.land_height.clamp(0.0, 1.0) as f32;
    let color = if sample.land_height < config.water_threshold {
        let depth = (land / config.water_threshold.max(1e-6) as f32).clamp(0.0, 1.0);
        lerp_color(WATER_DEEP, WATER_SHALLOW, depth)
    } else {
        let density = sample.population_density.clamp(0.0, 1.0) as f32;
        [land * 0.8, 0.3 + 0.6 * density, 0.15]
    };
    color.map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8)
}

fn lerp_color(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// Bresenham's line algorithm, endpoints included
fn bresenham_line(x0: i64, y0: i64, x1: i64, y1: i64) -> Vec<(i64, i64)> {
    let mut path = Vec::new();

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        path.push((x, y));

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }

    path
}
