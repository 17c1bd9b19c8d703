//! Building placement by rejection sampling over the validity grid
//!
//! Each attempt picks a random grid cell. Cells below the land threshold are
//! skipped; the rest get a tower whose height follows the square of the local
//! population density, so dense districts stand out. Buildings may overlap.

use rand::Rng;

use crate::config::CityConfig;
use crate::geometry::{lerp, Point2};
use crate::grid::ValidityGrid;

/// One placed tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingInstance {
    /// Center of the footprint in the world plane
    pub base_position: Point2,
    pub footprint_width: f64,
    pub height: f64,
    /// RGB in `[0, 1]`
    pub color: [f64; 3],
}

/// Tower height for a population density in `[0, 1]`.
///
/// Quadratic in density, so it is strictly increasing on `[0, 1]` whenever the
/// configured maximum exceeds the minimum.
pub fn tower_height(population_density: f64, config: &CityConfig) -> f64 {
    lerp(
        config.min_building_height,
        config.max_building_height,
        population_density * population_density,
    )
}

/// Footprint width for a tower of `height`, `aspect` in `[0, 1]` picking
/// between the narrowest and widest allowed ratio.
pub fn footprint_width(height: f64, aspect: f64, config: &CityConfig) -> f64 {
    lerp(config.min_width_ratio * height, config.max_width_ratio * height, aspect)
}

/// Building color: randomized red channel over fixed green and blue.
pub fn building_color(hue: f64, config: &CityConfig) -> [f64; 3] {
    [
        lerp(config.building_hue_min, config.building_hue_max, hue),
        config.building_green,
        config.building_blue,
    ]
}

/// Scatter buildings over the grid with `attempts` independent draws.
///
/// Each draw either yields one building or is rejected; rejected draws are not
/// retried.
pub fn place_buildings<R: Rng>(
    grid: &ValidityGrid,
    attempts: u32,
    config: &CityConfig,
    rng: &mut R,
) -> Vec<BuildingInstance> {
    let side = grid.side();
    let mut buildings = Vec::new();

    if side == 0 {
        return buildings;
    }

    for _ in 0..attempts {
        let col = rng.gen_range(0..side);
        let row = rng.gen_range(0..side);
        let cell = grid.cell_at(col, row);

        if cell.sample.land_height < config.land_threshold {
            continue;
        }

        let height = tower_height(cell.sample.population_density, config);
        let width = footprint_width(height, rng.gen::<f64>(), config);
        let color = building_color(rng.gen::<f64>(), config);

        buildings.push(BuildingInstance {
            base_position: cell.world_position,
            footprint_width: width,
            height,
            color,
        });
    }

    tracing::debug!(
        attempts,
        placed = buildings.len(),
        "placed buildings"
    );

    buildings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{ConstantSampler, FnSampler, SampleConvention, TerrainSample};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn grid_of(sample: TerrainSample) -> ValidityGrid {
        ValidityGrid::build(&ConstantSampler(sample), 10.0, 10, 10.0)
    }

    #[test]
    fn test_low_land_yields_no_buildings() {
        let config = CityConfig::default();
        let grid = grid_of(TerrainSample::new(0.5, 1.0));
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert!(place_buildings(&grid, 500, &config, &mut rng).is_empty());
        assert!(place_buildings(&grid, 5000, &config, &mut rng).is_empty());
    }

    #[test]
    fn test_all_land_places_every_attempt() {
        let config = CityConfig::default();
        let grid = grid_of(TerrainSample::new(0.9, 0.5));
        let buildings = place_buildings(&grid, 200, &config, &mut ChaCha8Rng::seed_from_u64(2));
        assert_eq!(buildings.len(), 200);
    }

    #[test]
    fn test_height_grows_with_population() {
        let config = CityConfig::default();
        let mut last = tower_height(0.2, &config);
        for step in 1..=7 {
            let density = 0.2 + step as f64 * 0.1;
            let h = tower_height(density, &config);
            assert!(h > last, "height did not grow at density {}", density);
            last = h;
        }
        assert!(tower_height(0.9, &config) > tower_height(0.2, &config));
        assert!((tower_height(0.0, &config) - 0.2).abs() < 1e-12);
        assert!((tower_height(1.0, &config) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_denser_grid_builds_taller_with_same_randomness() {
        let config = CityConfig::default();
        let sparse = grid_of(TerrainSample::new(0.9, 0.2));
        let dense = grid_of(TerrainSample::new(0.9, 0.9));

        let a = place_buildings(&sparse, 50, &config, &mut ChaCha8Rng::seed_from_u64(3));
        let b = place_buildings(&dense, 50, &config, &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(a.len(), b.len());
        for (low, high) in a.iter().zip(&b) {
            assert_eq!(low.base_position, high.base_position);
            assert!(high.height > low.height);
        }
    }

    #[test]
    fn test_building_shape_and_color_ranges() {
        let config = CityConfig::default();
        let grid = grid_of(TerrainSample::new(1.0, 0.7));
        let buildings = place_buildings(&grid, 100, &config, &mut ChaCha8Rng::seed_from_u64(4));

        for b in &buildings {
            assert!(b.footprint_width >= 0.125 * b.height - 1e-12);
            assert!(b.footprint_width <= 0.25 * b.height + 1e-12);
            assert!((0.2..=0.43).contains(&b.color[0]));
            assert_eq!(b.color[1], 0.23);
            assert_eq!(b.color[2], 0.25);
            assert!(b.base_position.within_square(5.0));
        }
    }

    #[test]
    fn test_buildings_only_on_high_ground() {
        // Land rises from west to east; only the eastern strip clears 0.6
        let sampler = FnSampler::new(SampleConvention::UnitSquare, |u, _v| (u, 0.5));
        let grid = ValidityGrid::build(&sampler, 10.0, 10, 10.0);
        let config = CityConfig::default();
        let buildings = place_buildings(&grid, 500, &config, &mut ChaCha8Rng::seed_from_u64(5));

        assert!(!buildings.is_empty());
        assert!(buildings.len() < 500);
        for b in &buildings {
            // u = x / 10 + 0.5 >= 0.6
            assert!(b.base_position.x >= 1.0 - 1e-9);
        }
    }

    #[test]
    fn test_placement_is_deterministic() {
        let config = CityConfig::default();
        let grid = grid_of(TerrainSample::new(0.8, 0.6));
        let a = place_buildings(&grid, 100, &config, &mut ChaCha8Rng::seed_from_u64(6));
        let b = place_buildings(&grid, 100, &config, &mut ChaCha8Rng::seed_from_u64(6));
        assert_eq!(a, b);
    }
}
