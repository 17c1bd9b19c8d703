//! Road network generation by breadth-first frontier growth
//!
//! Roads start from a handful of seed segments on land and grow outward:
//! - Each accepted road spawns a fan of branches from its end point
//! - A candidate that crosses an existing road is cut at the crossing (a join)
//!   and stops growing
//! - Candidates ending in water or outside the world are dropped
//!
//! Candidates are processed oldest first so the network grows evenly around
//! every seed instead of one arm racing ahead. Growth stops when the queue
//! runs dry or the iteration cap is hit.

use std::collections::VecDeque;
use std::f64::consts::PI;

use rand::Rng;

use crate::config::CityConfig;
use crate::geometry::{lerp, Point2, Segment};
use crate::terrain::{sample_world, TerrainSampler};

/// A proposed or committed straight road piece.
pub type RoadSegment = Segment;

/// How a highway came to be committed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HighwayKind {
    /// A candidate accepted whole; it spawned branches
    Extension,
    /// A candidate cut short where it met an earlier highway
    Join,
    /// The origin seed used when no seed was found on land; committed
    /// without terrain checks so the network is never empty
    FallbackSeed,
}

/// A committed road with the values the renderer needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Highway {
    pub segment: RoadSegment,
    pub kind: HighwayKind,
    pub length: f64,
    /// Direction of travel, `atan2(dy, dx)`
    pub angle: f64,
}

impl Highway {
    fn new(segment: RoadSegment, kind: HighwayKind) -> Self {
        Self {
            segment,
            kind,
            length: segment.length(),
            angle: segment.angle(),
        }
    }
}

/// Counters describing one growth run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GrowthStats {
    /// Seeds accepted from the random search (0 if the fallback was used)
    pub seeds: usize,
    /// True if no seed was found and the origin seed was used instead
    pub used_fallback_seed: bool,
    /// Candidates taken off the queue
    pub iterations: usize,
    pub extensions: usize,
    pub joins: usize,
    /// Candidates dropped because they ended in water
    pub pruned_water: usize,
    /// Candidates dropped because they ended outside the world
    pub pruned_bounds: usize,
    /// Candidates still queued when growth stopped
    pub abandoned: usize,
}

/// The committed road network, in discovery order.
#[derive(Clone, Debug, Default)]
pub struct RoadNetwork {
    pub highways: Vec<Highway>,
    pub stats: GrowthStats,
}

impl RoadNetwork {
    pub fn len(&self) -> usize {
        self.highways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.highways.is_empty()
    }

    /// Total length of all highways.
    pub fn total_length(&self) -> f64 {
        self.highways.iter().map(|h| h.length).sum()
    }
}

/// What happened to one candidate
#[derive(Clone, Copy, Debug, PartialEq)]
enum Evaluation {
    Join(RoadSegment),
    Extend(RoadSegment),
    InWater,
    OutOfBounds,
}

/// Grow a road network over the terrain.
pub fn generate_road_network<S, R>(sampler: &S, config: &CityConfig, rng: &mut R) -> RoadNetwork
where
    S: TerrainSampler + ?Sized,
    R: Rng,
{
    let mut stats = GrowthStats::default();
    let mut queue = find_seed_roads(sampler, config, rng, &mut stats);
    let mut highways: Vec<Highway> = Vec::new();

    if queue.is_empty() {
        let seed = fallback_seed(config);
        tracing::debug!("no seed found on land, using the origin seed");
        stats.used_fallback_seed = true;
        highways.push(Highway::new(seed, HighwayKind::FallbackSeed));
        queue.extend(spawn_branches(&seed, config, rng));
    } else {
        tracing::debug!(seeds = queue.len(), "seeded road network");
    }

    grow_network(&mut queue, &mut highways, sampler, config, rng, &mut stats);

    tracing::debug!(
        highways = highways.len(),
        joins = stats.joins,
        pruned_water = stats.pruned_water,
        pruned_bounds = stats.pruned_bounds,
        abandoned = stats.abandoned,
        "road growth finished"
    );

    RoadNetwork { highways, stats }
}

/// Work through the candidate queue oldest first, committing onto `highways`.
///
/// Stops when the queue is empty or `max_iterations` candidates have been
/// evaluated; whatever is still queued is counted as abandoned.
fn grow_network<S, R>(
    queue: &mut VecDeque<RoadSegment>,
    highways: &mut Vec<Highway>,
    sampler: &S,
    config: &CityConfig,
    rng: &mut R,
    stats: &mut GrowthStats,
) where
    S: TerrainSampler + ?Sized,
    R: Rng,
{
    while stats.iterations < config.max_iterations as usize {
        let Some(candidate) = queue.pop_front() else {
            break;
        };
        stats.iterations += 1;

        match evaluate_candidate(&candidate, highways, sampler, config) {
            Evaluation::Join(joined) => {
                stats.joins += 1;
                highways.push(Highway::new(joined, HighwayKind::Join));
            }
            Evaluation::Extend(road) => {
                stats.extensions += 1;
                highways.push(Highway::new(road, HighwayKind::Extension));
                queue.extend(spawn_branches(&road, config, rng));
            }
            Evaluation::InWater => {
                stats.pruned_water += 1;
                tracing::trace!(x = candidate.end.x, y = candidate.end.y, "candidate ends in water");
            }
            Evaluation::OutOfBounds => {
                stats.pruned_bounds += 1;
                tracing::trace!(x = candidate.end.x, y = candidate.end.y, "candidate leaves the world");
            }
        }
    }

    stats.abandoned = queue.len();
}

/// Seed road used when no random point qualifies.
pub fn fallback_seed(config: &CityConfig) -> RoadSegment {
    Segment::new(Point2::ORIGIN, Point2::new(config.seed_length, 0.0))
}

/// Pick seed roads on land inside the world, spaced apart from each other.
///
/// May return no seeds at all; the caller falls back to [`fallback_seed`].
fn find_seed_roads<S, R>(
    sampler: &S,
    config: &CityConfig,
    rng: &mut R,
    stats: &mut GrowthStats,
) -> VecDeque<RoadSegment>
where
    S: TerrainSampler + ?Sized,
    R: Rng,
{
    let mut queue = VecDeque::new();
    let seed_offset = Point2::new(config.seed_length, 0.0);

    for _ in 0..config.max_seed_iters {
        if queue.len() >= config.desired_seed_count {
            break;
        }

        let start = Point2::new(
            config.world_extent * (rng.gen::<f64>() - 0.5),
            config.world_extent * (rng.gen::<f64>() - 0.5),
        );

        if sample_world(sampler, start, config.terrain_scale).land_height < config.water_threshold {
            continue;
        }

        let too_close = queue
            .iter()
            .any(|seed: &RoadSegment| seed.start.distance(start) < config.min_seed_separation);
        if too_close {
            continue;
        }

        queue.push_back(Segment::new(start, start + seed_offset));
    }

    stats.seeds = queue.len();
    queue
}

/// Decide the fate of one candidate against the current network.
fn evaluate_candidate<S>(
    candidate: &RoadSegment,
    highways: &[Highway],
    sampler: &S,
    config: &CityConfig,
) -> Evaluation
where
    S: TerrainSampler + ?Sized,
{
    if let Some(point) = first_intersection(candidate, highways, config.intersection_epsilon) {
        return Evaluation::Join(candidate.with_end(point));
    }

    let end = sample_world(sampler, candidate.end, config.terrain_scale);
    if end.land_height < config.water_threshold {
        return Evaluation::InWater;
    }

    if !candidate.end.within_square(config.half_extent()) {
        return Evaluation::OutOfBounds;
    }

    Evaluation::Extend(*candidate)
}

/// Crossing with the existing network closest to the candidate's start.
pub fn first_intersection(candidate: &RoadSegment, highways: &[Highway], epsilon: f64) -> Option<Point2> {
    highways
        .iter()
        .filter_map(|other| candidate.intersect(&other.segment, epsilon))
        .map(|hit| (candidate.start.distance(hit.point), hit.point))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, point)| point)
}

/// Fan out new candidates from the end of an accepted road.
///
/// Branches are spaced `2π / (n + 1)` apart, starting one step past the
/// reverse of the parent's direction, so none of them doubles back.
pub fn spawn_branches<R>(parent: &RoadSegment, config: &CityConfig, rng: &mut R) -> Vec<RoadSegment>
where
    R: Rng,
{
    let count = config.branch_count;
    let spacing = 2.0 * PI / (1.0 + count as f64);
    let start_angle = PI + parent.angle() + spacing;

    (0..count)
        .map(|j| {
            let angle = start_angle + j as f64 * spacing;
            let length = lerp(config.branch_min_length, config.branch_max_length, rng.gen::<f64>());
            Segment::from_polar(parent.end, angle, length)
        })
        .collect()
}
