//! Validity grid: a precomputed lattice of terrain samples
//!
//! Building placement queries the terrain many times; the grid samples it once
//! per cell so those queries never go back to the sampler.

use crate::geometry::Point2;
use crate::terrain::{sample_world, TerrainSample, TerrainSampler};
use crate::tilemap::Tilemap;

/// One lattice point: the terrain there and where it sits in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridCell {
    pub sample: TerrainSample,
    pub world_position: Point2,
}

/// Immutable lattice of [`GridCell`]s covering `[-extent/2, extent/2]²`.
#[derive(Clone, Debug)]
pub struct ValidityGrid {
    world_extent: f64,
    cells: Tilemap<GridCell>,
}

/// World position of lattice point `(col, row)` on a grid of `side` cells.
///
/// Column 0 sits on the `-extent/2` edge; the last column is one cell short of
/// `+extent/2`.
pub fn grid_to_world(col: usize, row: usize, side: usize, world_extent: f64) -> Point2 {
    let side = side as f64;
    Point2::new(
        (col as f64 / side - 0.5) * world_extent,
        (row as f64 / side - 0.5) * world_extent,
    )
}

impl ValidityGrid {
    /// Sample the terrain at every lattice point.
    ///
    /// The grid has `round(world_extent * resolution_per_unit)` cells per side.
    pub fn build<S: TerrainSampler + ?Sized>(
        sampler: &S,
        world_extent: f64,
        resolution_per_unit: u32,
        terrain_scale: f64,
    ) -> Self {
        let side = (world_extent * resolution_per_unit as f64).round() as usize;
        let cells = Tilemap::from_fn(side, side, |col, row| {
            let world_position = grid_to_world(col, row, side, world_extent);
            GridCell {
                sample: sample_world(sampler, world_position, terrain_scale),
                world_position,
            }
        });

        tracing::debug!(side, world_extent, "built validity grid");

        Self { world_extent, cells }
    }

    /// Cells along one side.
    pub fn side(&self) -> usize {
        self.cells.width
    }

    pub fn world_extent(&self) -> f64 {
        self.world_extent
    }

    /// World-space width of one cell.
    pub fn cell_size(&self) -> f64 {
        self.world_extent / self.side() as f64
    }

    /// The cell at `(col, row)`.
    ///
    /// Panics if either index is outside `[0, side)`.
    pub fn cell_at(&self, col: usize, row: usize) -> &GridCell {
        self.cells.get(col, row)
    }

    /// Iterate over `(col, row, cell)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &GridCell)> {
        self.cells.iter()
    }

    /// Fraction of cells whose land height is at least `threshold`.
    pub fn land_fraction(&self, threshold: f64) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        let land = self
            .iter()
            .filter(|(_, _, cell)| cell.sample.land_height >= threshold)
            .count();
        land as f64 / self.cells.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::terrain::{FnSampler, SampleConvention};

    fn gradient_sampler() -> FnSampler<impl Fn(f64, f64) -> (f64, f64)> {
        FnSampler::new(SampleConvention::UnitSquare, |u, v| (u, v))
    }

    #[test]
    fn test_grid_dimensions() {
        let grid = ValidityGrid::build(&gradient_sampler(), 10.0, 10, 10.0);
        assert_eq!(grid.side(), 100);
        assert!((grid.cell_size() - 0.1).abs() < 1e-12);
        assert_eq!(grid.iter().count(), 100 * 100);
    }

    #[test]
    fn test_world_positions_are_injective() {
        let grid = ValidityGrid::build(&gradient_sampler(), 4.0, 5, 4.0);
        let positions: HashSet<(u64, u64)> = grid
            .iter()
            .map(|(_, _, c)| (c.world_position.x.to_bits(), c.world_position.y.to_bits()))
            .collect();
        assert_eq!(positions.len(), grid.side() * grid.side());
    }

    #[test]
    fn test_grid_covers_world_corners() {
        let extent = 6.0;
        let grid = ValidityGrid::build(&gradient_sampler(), extent, 4, extent);
        let half = extent / 2.0;
        let last = grid.side() - 1;
        let tolerance = grid.cell_size() + 1e-9;

        let corners = [
            (0, 0, Point2::new(-half, -half)),
            (last, 0, Point2::new(half, -half)),
            (0, last, Point2::new(-half, half)),
            (last, last, Point2::new(half, half)),
        ];
        for (col, row, corner) in corners {
            let p = grid.cell_at(col, row).world_position;
            assert!((p.x - corner.x).abs() <= tolerance, "col {} x {}", col, p.x);
            assert!((p.y - corner.y).abs() <= tolerance, "row {} y {}", row, p.y);
        }
    }

    #[test]
    fn test_cells_store_sampler_output() {
        // terrain_scale equal to the extent maps the grid onto the whole unit square
        let grid = ValidityGrid::build(&gradient_sampler(), 10.0, 2, 10.0);
        let cell = grid.cell_at(0, 0);
        assert!(cell.sample.land_height.abs() < 1e-12);

        let cell = grid.cell_at(10, 5);
        assert!((cell.sample.land_height - 0.5).abs() < 1e-12);
        assert!((cell.sample.population_density - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_land_fraction() {
        let grid = ValidityGrid::build(&gradient_sampler(), 10.0, 1, 10.0);
        // u = col / 10 for col in 0..10, so half the columns reach 0.5
        assert!((grid.land_fraction(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_cell_panics() {
        let grid = ValidityGrid::build(&gradient_sampler(), 2.0, 2, 2.0);
        let _ = grid.cell_at(grid.side(), 0);
    }
}
