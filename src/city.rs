//! City data container and one-shot generation
//!
//! Bundles everything one regeneration produces so callers can hand it to a
//! renderer or an exporter in one piece.

use rand::Rng;

use crate::buildings::{place_buildings, BuildingInstance};
use crate::config::CityConfig;
use crate::grid::ValidityGrid;
use crate::instances::{emit_buildings, emit_grid_overlay, emit_roads, InstanceBuffer};
use crate::roads::{generate_road_network, RoadNetwork};
use crate::terrain::TerrainSampler;

/// All generated city data bundled together
pub struct CityScene {
    /// Committed highways and growth counters
    pub roads: RoadNetwork,
    /// Terrain samples the buildings were placed from
    pub grid: ValidityGrid,
    /// Placed towers
    pub buildings: Vec<BuildingInstance>,
    /// Renderer input for the road strips
    pub road_instances: InstanceBuffer,
    /// Renderer input for the towers
    pub building_instances: InstanceBuffer,
    /// Renderer input for the debug grid overlay
    pub grid_instances: InstanceBuffer,
}

/// Generate a complete city over `sampler`.
///
/// Randomness is drawn from `rng` in a fixed order (roads, then buildings),
/// so the same seed and sampler reproduce the same city exactly. The sampler
/// must not change while this runs.
pub fn generate_city<S, R>(sampler: &S, config: &CityConfig, rng: &mut R) -> CityScene
where
    S: TerrainSampler + ?Sized,
    R: Rng,
{
    let roads = generate_road_network(sampler, config, rng);

    let grid = ValidityGrid::build(
        sampler,
        config.world_extent,
        config.grid_resolution,
        config.terrain_scale,
    );

    let buildings = place_buildings(&grid, config.building_attempts, config, rng);

    let road_instances = emit_roads(&roads.highways, config);
    let building_instances = emit_buildings(&buildings);
    let grid_instances = emit_grid_overlay(&grid);

    tracing::info!(
        highways = roads.len(),
        road_length = roads.total_length(),
        buildings = buildings.len(),
        land_fraction = grid.land_fraction(config.water_threshold),
        "generated city"
    );

    CityScene {
        roads,
        grid,
        buildings,
        road_instances,
        building_instances,
        grid_instances,
    }
}
