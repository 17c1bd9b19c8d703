//! Terrain sampling: land height and population density on demand
//!
//! The host supplies a sampler that answers `(land_height, population_density)`
//! for a normalized coordinate. Samplers declare which normalized square they
//! expect, so world positions are mapped explicitly rather than by assumption.

use noise::{NoiseFn, Perlin, Seedable};

use crate::geometry::Point2;
use crate::tilemap::Tilemap;

/// One terrain sample. Both values are nominally in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TerrainSample {
    pub land_height: f64,
    pub population_density: f64,
}

impl TerrainSample {
    pub const fn new(land_height: f64, population_density: f64) -> Self {
        Self {
            land_height,
            population_density,
        }
    }
}

/// Normalized coordinate square a sampler expects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SampleConvention {
    /// `(u, v)` in `[0, 1]²`, origin at a corner
    #[default]
    UnitSquare,
    /// `(u, v)` in `[-1, 1]²`, origin at the center
    SignedUnitSquare,
}

impl SampleConvention {
    /// Map a centered coordinate in `[-0.5, 0.5]²` into this convention.
    pub fn from_centered(self, centered: Point2) -> Point2 {
        match self {
            SampleConvention::UnitSquare => centered + Point2::new(0.5, 0.5),
            SampleConvention::SignedUnitSquare => centered * 2.0,
        }
    }

    /// Inverse of [`SampleConvention::from_centered`].
    pub fn to_centered(self, normalized: Point2) -> Point2 {
        match self {
            SampleConvention::UnitSquare => normalized - Point2::new(0.5, 0.5),
            SampleConvention::SignedUnitSquare => normalized * 0.5,
        }
    }

    /// Map a coordinate in this convention into `[0, 1]²`.
    pub fn to_unit(self, normalized: Point2) -> Point2 {
        SampleConvention::UnitSquare.from_centered(self.to_centered(normalized))
    }
}

/// Source of terrain data for the generator.
///
/// Implementations must be total over their declared square and must not
/// change while a city is being generated.
pub trait TerrainSampler {
    /// The normalized square `sample` expects its arguments in.
    fn convention(&self) -> SampleConvention;

    /// Sample the terrain at normalized coordinate `(u, v)`.
    fn sample(&self, u: f64, v: f64) -> TerrainSample;
}

impl<S: TerrainSampler + ?Sized> TerrainSampler for &S {
    fn convention(&self) -> SampleConvention {
        (**self).convention()
    }

    fn sample(&self, u: f64, v: f64) -> TerrainSample {
        (**self).sample(u, v)
    }
}

/// Map a world position into the sampler's normalized square.
///
/// `terrain_scale` world units span the whole input map, so
/// `[-terrain_scale/2, terrain_scale/2]²` lands on `[-0.5, 0.5]²` before the
/// convention is applied.
pub fn world_to_normalized(world: Point2, terrain_scale: f64, convention: SampleConvention) -> Point2 {
    convention.from_centered(world * (1.0 / terrain_scale))
}

/// Sample the terrain at a world position.
pub fn sample_world<S: TerrainSampler + ?Sized>(sampler: &S, world: Point2, terrain_scale: f64) -> TerrainSample {
    let uv = world_to_normalized(world, terrain_scale, sampler.convention());
    sampler.sample(uv.x, uv.y)
}

// =============================================================================
// CLOSURE SAMPLER
// =============================================================================

/// Adapts a host callback `(u, v) -> (land_height, population_density)`.
pub struct FnSampler<F> {
    convention: SampleConvention,
    f: F,
}

impl<F> FnSampler<F>
where
    F: Fn(f64, f64) -> (f64, f64),
{
    pub fn new(convention: SampleConvention, f: F) -> Self {
        Self { convention, f }
    }
}

impl<F> TerrainSampler for FnSampler<F>
where
    F: Fn(f64, f64) -> (f64, f64),
{
    fn convention(&self) -> SampleConvention {
        self.convention
    }

    fn sample(&self, u: f64, v: f64) -> TerrainSample {
        let (land_height, population_density) = (self.f)(u, v);
        TerrainSample::new(land_height, population_density)
    }
}

/// Sampler returning the same values everywhere.
#[derive(Clone, Copy, Debug)]
pub struct ConstantSampler(pub TerrainSample);

impl TerrainSampler for ConstantSampler {
    fn convention(&self) -> SampleConvention {
        SampleConvention::UnitSquare
    }

    fn sample(&self, _u: f64, _v: f64) -> TerrainSample {
        self.0
    }
}

// =============================================================================
// RASTER SAMPLER
// =============================================================================

/// Default side length of a baked input raster.
pub const DEFAULT_RASTER_SIDE: usize = 1024;

/// A square raster of terrain samples, read with nearest-lower lookup.
///
/// Coordinate `u` selects column `floor((side - 1) * u)`, matching how an
/// input texture read back from the GPU is indexed. Coordinates outside the
/// square clamp to its border.
#[derive(Clone, Debug)]
pub struct RasterSampler {
    convention: SampleConvention,
    texels: Tilemap<TerrainSample>,
}

impl RasterSampler {
    /// Wrap an existing raster. Row `y` of the raster holds `v = y / (side - 1)`.
    pub fn new(convention: SampleConvention, texels: Tilemap<TerrainSample>) -> Self {
        assert!(
            texels.width == texels.height && !texels.is_empty(),
            "raster must be square and non-empty, got {}x{}",
            texels.width,
            texels.height
        );
        Self { convention, texels }
    }

    /// Rasterize another sampler into a `side × side` grid.
    pub fn bake<S: TerrainSampler + Sync + ?Sized>(source: &S, side: usize) -> Self {
        let convention = source.convention();
        let denom = side.saturating_sub(1).max(1) as f64;
        let texels = Tilemap::par_from_fn(side, side, |x, y| {
            let unit = Point2::new(x as f64 / denom, y as f64 / denom);
            let uv = convention.from_centered(SampleConvention::UnitSquare.to_centered(unit));
            source.sample(uv.x, uv.y)
        });
        Self::new(convention, texels)
    }

    pub fn side(&self) -> usize {
        self.texels.width
    }

    fn texel_index(&self, unit: f64) -> usize {
        let max = self.side() - 1;
        let idx = (max as f64 * unit.clamp(0.0, 1.0)).floor() as usize;
        idx.min(max)
    }
}

impl TerrainSampler for RasterSampler {
    fn convention(&self) -> SampleConvention {
        self.convention
    }

    fn sample(&self, u: f64, v: f64) -> TerrainSample {
        let unit = self.convention.to_unit(Point2::new(u, v));
        *self.texels.get(self.texel_index(unit.x), self.texel_index(unit.y))
    }
}

// =============================================================================
// PROCEDURAL NOISE SAMPLER
// =============================================================================

/// Parameters for the procedural input maps
#[derive(Clone, Debug)]
pub struct NoiseParams {
    /// Base frequency across the unit square (higher = smaller islands)
    pub land_frequency: f64,
    /// Base frequency of the population field
    pub population_frequency: f64,
    /// Number of fBm octaves
    pub octaves: u32,
    /// Amplitude decay per octave
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
    /// Land height at the center of the map before noise is added
    pub base_land: f64,
    /// How strongly land sinks toward the map border (island falloff)
    pub edge_falloff: f64,
    /// Land height below which the population field is suppressed
    pub shoreline: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            land_frequency: 3.0,
            population_frequency: 4.0,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            base_land: 0.65,
            edge_falloff: 0.45,
            shoreline: 0.5,
        }
    }
}

/// Procedural land height and population density from seeded Perlin fBm.
pub struct NoiseSampler {
    convention: SampleConvention,
    params: NoiseParams,
    land_noise: Perlin,
    population_noise: Perlin,
}

impl NoiseSampler {
    pub fn new(seed: u64, convention: SampleConvention) -> Self {
        Self::with_params(seed, convention, NoiseParams::default())
    }

    pub fn with_params(seed: u64, convention: SampleConvention, params: NoiseParams) -> Self {
        Self {
            convention,
            params,
            land_noise: Perlin::new(1).set_seed(seed as u32),
            population_noise: Perlin::new(1).set_seed((seed as u32).wrapping_add(7919)),
        }
    }

    fn fbm(&self, noise: &Perlin, x: f64, y: f64, frequency: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut freq = frequency;
        let mut max_amplitude = 0.0;

        for _ in 0..self.params.octaves.max(1) {
            total += noise.get([x * freq, y * freq]) * amplitude;
            max_amplitude += amplitude;
            amplitude *= self.params.persistence;
            freq *= self.params.lacunarity;
        }

        total / max_amplitude
    }
}

impl TerrainSampler for NoiseSampler {
    fn convention(&self) -> SampleConvention {
        self.convention
    }

    fn sample(&self, u: f64, v: f64) -> TerrainSample {
        let unit = self.convention.to_unit(Point2::new(u, v));
        let centered = SampleConvention::UnitSquare.to_centered(unit);
        // 0.0 at the center, 1.0 at the corners of the square
        let radial = (centered.length() / std::f64::consts::FRAC_1_SQRT_2).min(1.0);

        let land_noise = self.fbm(&self.land_noise, unit.x, unit.y, self.params.land_frequency);
        let land_height = (self.params.base_land + 0.5 * land_noise
            - self.params.edge_falloff * radial * radial)
            .clamp(0.0, 1.0);

        let pop_noise = self.fbm(&self.population_noise, unit.x, unit.y, self.params.population_frequency);
        let coastal = ((land_height - self.params.shoreline) / (1.0 - self.params.shoreline).max(1e-6))
            .clamp(0.0, 1.0);
        let population_density = ((0.5 + 0.6 * pop_noise) * coastal.sqrt()).clamp(0.0, 1.0);

        TerrainSample::new(land_height, population_density)
    }
}
