//! Geometry emission: per-instance transforms for the renderer
//!
//! Every drawable group (roads, buildings, the debug grid) becomes one
//! [`InstanceBuffer`]: four index-aligned arrays the renderer uploads as
//! instanced vertex attributes. The world plane is XZ with +Y up.

use crate::buildings::BuildingInstance;
use crate::config::CityConfig;
use crate::grid::ValidityGrid;
use crate::roads::Highway;

/// Axis-angle rotation that leaves an instance unrotated.
pub const IDENTITY_ROTATION: [f32; 4] = [0.0, 0.0, 1.0, 0.0];

/// Height of the debug grid squares above the ground plane.
const GRID_OVERLAY_HEIGHT: f32 = 0.1;

/// Index-aligned instance attributes for one drawable group.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstanceBuffer {
    /// Translation per instance
    pub positions: Vec<[f32; 3]>,
    /// `[axis.x, axis.y, axis.z, angle]` per instance
    pub rotations: Vec<[f32; 4]>,
    /// Scale per instance, applied before rotation
    pub scales: Vec<[f32; 3]>,
    /// RGBA per instance
    pub colors: Vec<[f32; 4]>,
}

impl InstanceBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            rotations: Vec::with_capacity(capacity),
            scales: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
        }
    }

    /// Append one instance to all four arrays.
    pub fn push(&mut self, position: [f32; 3], rotation: [f32; 4], scale: [f32; 3], color: [f32; 3]) {
        self.positions.push(position);
        self.rotations.push(rotation);
        self.scales.push(scale);
        self.colors.push([color[0], color[1], color[2], 1.0]);
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions flattened to `x, y, z, x, y, z, ...`.
    pub fn flat_positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn flat_rotations(&self) -> &[f32] {
        bytemuck::cast_slice(&self.rotations)
    }

    pub fn flat_scales(&self) -> &[f32] {
        bytemuck::cast_slice(&self.scales)
    }

    pub fn flat_colors(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Raw bytes of each attribute array, ready for a vertex buffer upload.
    pub fn attribute_bytes(&self) -> [&[u8]; 4] {
        [
            bytemuck::cast_slice(&self.positions),
            bytemuck::cast_slice(&self.rotations),
            bytemuck::cast_slice(&self.scales),
            bytemuck::cast_slice(&self.colors),
        ]
    }
}

/// Road instances for a unit-length strip spanning `[0, 1]` along +x.
///
/// The strip is stretched to the highway's length, turned clockwise about +Y
/// by the highway's angle, and placed at its start point.
pub fn emit_roads(highways: &[Highway], config: &CityConfig) -> InstanceBuffer {
    let mut buffer = InstanceBuffer::with_capacity(highways.len());
    let grey = config.road_grey as f32;

    for highway in highways {
        let start = highway.segment.start;
        buffer.push(
            [start.x as f32, 0.0, start.y as f32],
            // The plane's second axis is +Z, so a counter-clockwise angle in
            // the plane is a clockwise turn about +Y
            [0.0, -1.0, 0.0, highway.angle as f32],
            [highway.length as f32, 1.0, config.road_width as f32],
            [grey, grey, grey],
        );
    }

    buffer
}

/// Building instances for a unit cylinder standing on the origin.
pub fn emit_buildings(buildings: &[BuildingInstance]) -> InstanceBuffer {
    let mut buffer = InstanceBuffer::with_capacity(buildings.len());

    for building in buildings {
        let base = building.base_position;
        let width = building.footprint_width as f32;
        buffer.push(
            [base.x as f32, 0.0, base.y as f32],
            IDENTITY_ROTATION,
            [width, building.height as f32, width],
            building.color.map(|c| c as f32),
        );
    }

    buffer
}

/// One grey square per grid cell, brightness from population density.
pub fn emit_grid_overlay(grid: &ValidityGrid) -> InstanceBuffer {
    let mut buffer = InstanceBuffer::with_capacity(grid.side() * grid.side());
    let size = grid.cell_size() as f32;

    for (_, _, cell) in grid.iter() {
        let p = cell.world_position;
        let grey = cell.sample.population_density as f32;
        buffer.push(
            [p.x as f32, GRID_OVERLAY_HEIGHT, p.y as f32],
            IDENTITY_ROTATION,
            [size, 1.0, size],
            [grey, grey, grey],
        );
    }

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point2, Segment};
    use crate::roads::HighwayKind;
    use crate::terrain::{ConstantSampler, TerrainSample};

    fn highway(start: Point2, end: Point2) -> Highway {
        let segment = Segment::new(start, end);
        Highway {
            segment,
            kind: HighwayKind::Extension,
            length: segment.length(),
            angle: segment.angle(),
        }
    }

    #[test]
    fn test_road_instances() {
        let config = CityConfig::default();
        let roads = [
            highway(Point2::new(1.0, 2.0), Point2::new(1.0, 4.0)),
            highway(Point2::new(0.0, 0.0), Point2::new(-3.0, 0.0)),
        ];
        let buffer = emit_roads(&roads, &config);

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.positions[0], [1.0, 0.0, 2.0]);
        assert_eq!(buffer.scales[0], [2.0, 1.0, 0.02]);
        let [ax, ay, az, _] = buffer.rotations[0];
        assert_eq!([ax, ay, az], [0.0, -1.0, 0.0]);
        assert!((buffer.rotations[0][3] - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((buffer.rotations[1][3] - std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(buffer.colors[1], [0.3, 0.3, 0.3, 1.0]);
    }

    #[test]
    fn test_rotation_maps_template_onto_segment() {
        // Rotating (1, 0, 0) clockwise about +Y by θ gives (cos θ, 0, sin θ),
        // which is the segment direction in the XZ plane
        let road = highway(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let buffer = emit_roads(&[road], &CityConfig::default());
        let [kx, ky, kz, angle] = buffer.rotations[0];

        // Rodrigues' formula: v cos θ + (k × v) sin θ + k (k · v)(1 - cos θ)
        let v = [1.0f32, 0.0, 0.0];
        let cross = [ky * v[2] - kz * v[1], kz * v[0] - kx * v[2], kx * v[1] - ky * v[0]];
        let dot = kx * v[0] + ky * v[1] + kz * v[2];
        let (s, c) = angle.sin_cos();
        let k = [kx, ky, kz];
        let rotated: Vec<f32> = (0..3)
            .map(|i| v[i] * c + cross[i] * s + k[i] * dot * (1.0 - c))
            .collect();

        let expected = [std::f32::consts::FRAC_1_SQRT_2, 0.0, std::f32::consts::FRAC_1_SQRT_2];
        for (got, want) in rotated.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "{:?}", rotated);
        }
    }

    #[test]
    fn test_building_instances() {
        let buildings = [BuildingInstance {
            base_position: Point2::new(-1.5, 2.5),
            footprint_width: 0.5,
            height: 2.0,
            color: [0.25, 0.23, 0.25],
        }];
        let buffer = emit_buildings(&buildings);

        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.positions[0], [-1.5, 0.0, 2.5]);
        assert_eq!(buffer.rotations[0], IDENTITY_ROTATION);
        assert_eq!(buffer.scales[0], [0.5, 2.0, 0.5]);
        assert_eq!(buffer.colors[0], [0.25, 0.23, 0.25, 1.0]);
    }

    #[test]
    fn test_grid_overlay_covers_every_cell() {
        let grid = ValidityGrid::build(&ConstantSampler(TerrainSample::new(1.0, 0.5)), 2.0, 4, 2.0);
        let buffer = emit_grid_overlay(&grid);

        assert_eq!(buffer.len(), 64);
        assert_eq!(buffer.scales[0], [0.25, 1.0, 0.25]);
        assert_eq!(buffer.positions[0], [-1.0, 0.1, -1.0]);
        assert!(buffer.colors.iter().all(|c| *c == [0.5, 0.5, 0.5, 1.0]));
    }

    #[test]
    fn test_arrays_stay_index_aligned() {
        let buffer = emit_roads(&[highway(Point2::ORIGIN, Point2::new(1.0, 0.0))], &CityConfig::default());
        assert_eq!(buffer.flat_positions().len(), 3);
        assert_eq!(buffer.flat_rotations().len(), 4);
        assert_eq!(buffer.flat_scales().len(), 3);
        assert_eq!(buffer.flat_colors().len(), 4);

        let [pos, rot, scale, color] = buffer.attribute_bytes();
        assert_eq!(pos.len(), 12);
        assert_eq!(rot.len(), 16);
        assert_eq!(scale.len(), 12);
        assert_eq!(color.len(), 16);
    }

    #[test]
    fn test_empty_inputs_emit_nothing() {
        assert!(emit_roads(&[], &CityConfig::default()).is_empty());
        assert!(emit_buildings(&[]).is_empty());
    }
}
