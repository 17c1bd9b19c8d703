//! Configuration for city generation.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CityError;

/// Every tunable of the generator. Defaults reproduce the reference city.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    /// World units spanned by the whole terrain input map (default: 10.0).
    pub terrain_scale: f64,

    /// Side of the playable square `[-extent/2, extent/2]²` (default: 10.0).
    pub world_extent: f64,

    /// Validity grid cells per world unit (default: 10).
    pub grid_resolution: u32,

    /// Land height below which a road end counts as water (default: 0.5).
    pub water_threshold: f64,

    /// Land height below which no building is placed (default: 0.6).
    pub land_threshold: f64,

    /// Random points tried when looking for road seeds (default: 60).
    pub max_seed_iters: u32,

    /// Seeds wanted before the search stops early (default: 10).
    pub desired_seed_count: usize,

    /// Minimum distance between two seeds (default: 2.0).
    pub min_seed_separation: f64,

    /// Length of each seed road, pointing along +x (default: 1.0).
    pub seed_length: f64,

    /// Cap on candidates evaluated during growth (default: 600).
    pub max_iterations: u32,

    /// Branches spawned from every extended road (default: 3).
    pub branch_count: u32,

    /// Shortest branch length (default: 0.3).
    pub branch_min_length: f64,

    /// Longest branch length (default: 1.0).
    pub branch_max_length: f64,

    /// Margin excluding crossings near segment tips (default: 1e-4).
    pub intersection_epsilon: f64,

    /// Rejection-sampling draws for buildings (default: 500).
    pub building_attempts: u32,

    /// Height of a building on an empty cell (default: 0.2).
    pub min_building_height: f64,

    /// Height of a building at full population density (default: 3.0).
    pub max_building_height: f64,

    /// Narrowest footprint as a fraction of height (default: 0.125).
    pub min_width_ratio: f64,

    /// Widest footprint as a fraction of height (default: 0.25).
    pub max_width_ratio: f64,

    /// Range of the randomized red channel of building colors (default: 0.2..0.43).
    pub building_hue_min: f64,
    pub building_hue_max: f64,

    /// Fixed green and blue channels of building colors (default: 0.23, 0.25).
    pub building_green: f64,
    pub building_blue: f64,

    /// Width of a road instance across its direction (default: 0.02).
    pub road_width: f64,

    /// Grey level of road instances (default: 0.3).
    pub road_grey: f64,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            terrain_scale: 10.0,
            world_extent: 10.0,
            grid_resolution: 10,
            water_threshold: 0.5,
            land_threshold: 0.6,
            max_seed_iters: 60,
            desired_seed_count: 10,
            min_seed_separation: 2.0,
            seed_length: 1.0,
            max_iterations: 600,
            branch_count: 3,
            branch_min_length: 0.3,
            branch_max_length: 1.0,
            intersection_epsilon: 1e-4,
            building_attempts: 500,
            min_building_height: 0.2,
            max_building_height: 3.0,
            min_width_ratio: 0.125,
            max_width_ratio: 0.25,
            building_hue_min: 0.2,
            building_hue_max: 0.43,
            building_green: 0.23,
            building_blue: 0.25,
            road_width: 0.02,
            road_grey: 0.3,
        }
    }
}

impl CityConfig {
    /// Load a JSON configuration; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, CityError> {
        let text = fs::read_to_string(path).map_err(|source| CityError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: CityConfig = serde_json::from_str(&text).map_err(|source| CityError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Half of the playable square's side.
    pub fn half_extent(&self) -> f64 {
        self.world_extent / 2.0
    }

    /// Number of validity grid cells along one side.
    pub fn grid_side(&self) -> usize {
        (self.world_extent * self.grid_resolution as f64).round() as usize
    }

    /// Check that every value is usable by the generator.
    pub fn validate(&self) -> Result<(), CityError> {
        let finite = [
            ("terrain_scale", self.terrain_scale),
            ("world_extent", self.world_extent),
            ("water_threshold", self.water_threshold),
            ("land_threshold", self.land_threshold),
            ("min_seed_separation", self.min_seed_separation),
            ("seed_length", self.seed_length),
            ("branch_min_length", self.branch_min_length),
            ("branch_max_length", self.branch_max_length),
            ("intersection_epsilon", self.intersection_epsilon),
            ("min_building_height", self.min_building_height),
            ("max_building_height", self.max_building_height),
            ("min_width_ratio", self.min_width_ratio),
            ("max_width_ratio", self.max_width_ratio),
            ("building_hue_min", self.building_hue_min),
            ("building_hue_max", self.building_hue_max),
            ("building_green", self.building_green),
            ("building_blue", self.building_blue),
            ("road_width", self.road_width),
            ("road_grey", self.road_grey),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{} must be finite, got {}", name, value)));
        }

        if self.terrain_scale <= 0.0 {
            return Err(invalid(format!("terrain_scale must be positive, got {}", self.terrain_scale)));
        }
        if self.world_extent <= 0.0 {
            return Err(invalid(format!("world_extent must be positive, got {}", self.world_extent)));
        }
        if self.grid_side() == 0 {
            return Err(invalid(format!(
                "grid has no cells ({} units at {} cells per unit)",
                self.world_extent, self.grid_resolution
            )));
        }
        if self.branch_count == 0 {
            return Err(invalid("branch_count must be at least 1".to_string()));
        }
        if self.seed_length <= 0.0 || self.branch_min_length <= 0.0 {
            return Err(invalid("road lengths must be positive".to_string()));
        }
        if self.branch_min_length > self.branch_max_length {
            return Err(invalid(format!(
                "branch length range is inverted ({} > {})",
                self.branch_min_length, self.branch_max_length
            )));
        }
        if !(0.0..0.5).contains(&self.intersection_epsilon) {
            return Err(invalid(format!(
                "intersection_epsilon must be in [0, 0.5), got {}",
                self.intersection_epsilon
            )));
        }
        if self.min_building_height > self.max_building_height {
            return Err(invalid("building height range is inverted".to_string()));
        }
        if self.min_width_ratio > self.max_width_ratio {
            return Err(invalid("building width ratio range is inverted".to_string()));
        }

        Ok(())
    }
}

fn invalid(message: String) -> CityError {
    CityError::InvalidConfig(message)
}
