//! Board representation: tiles, number tokens and harbors.
//!
//! This module contains:
//! - Resource and tile types
//! - Standard radius-2 board generation (canonical or seeded shuffle)
//! - Harbor placement along the coast
//! - Board validation and query methods

use crate::error::{AdvisorError, Result};
use crate::hex::{CornerKey, HexCoord};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// The only board radius the standard distribution fits
pub const STANDARD_RADIUS: u32 = 2;

/// Resource types produced by land tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Wood,
    Sheep,
    Wheat,
    Brick,
    Ore,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Brick,
        Resource::Ore,
    ];

    /// Lowercase name, as used in reports and saved files
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Wood => "wood",
            Resource::Sheep => "sheep",
            Resource::Wheat => "wheat",
            Resource::Brick => "brick",
            Resource::Ore => "ore",
        }
    }
}

/// Type of hex tile on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileType {
    /// Produces a resource when its number is rolled
    Resource(Resource),
    /// Desert - no production
    Desert,
}

/// Harbor types for maritime trading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Harbor {
    /// 3:1 trade any resource
    Generic,
    /// 2:1 trade for a specific resource
    Specific(Resource),
}

impl Harbor {
    /// The exchange rate for this harbor
    pub fn rate(&self) -> u32 {
        match self {
            Harbor::Generic => 3,
            Harbor::Specific(_) => 2,
        }
    }
}

/// Dice-probability weight of a number token: the number of ways two dice roll it.
///
/// 6 and 8 give 5, 5 and 9 give 4, down to 2 and 12 giving 1. No token gives 0.
pub fn pip_count(number: Option<u8>) -> u32 {
    match number {
        Some(6 | 8) => 5,
        Some(5 | 9) => 4,
        Some(4 | 10) => 3,
        Some(3 | 11) => 2,
        Some(2 | 12) => 1,
        _ => 0,
    }
}

/// A single hex tile on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Position on the hex grid
    pub coord: HexCoord,
    /// Resource tile or desert
    pub tile_type: TileType,
    /// Dice number that triggers production (2-12, None for desert)
    pub dice_number: Option<u8>,
}

impl Tile {
    /// Create a new resource tile
    pub fn new_resource(coord: HexCoord, resource: Resource, dice_number: u8) -> Self {
        Self {
            coord,
            tile_type: TileType::Resource(resource),
            dice_number: Some(dice_number),
        }
    }

    /// Create a desert tile
    pub fn desert(coord: HexCoord) -> Self {
        Self {
            coord,
            tile_type: TileType::Desert,
            dice_number: None,
        }
    }

    /// Get the resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self.tile_type {
            TileType::Resource(r) => Some(r),
            TileType::Desert => None,
        }
    }

    /// Pip count of this tile's token
    pub fn pips(&self) -> u32 {
        pip_count(self.dice_number)
    }

    /// 6 and 8 - the most likely rolls and the usual robber targets
    pub fn is_high_probability(&self) -> bool {
        matches!(self.dice_number, Some(6 | 8))
    }
}

/// Harbor placement on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarborPlacement {
    /// The two corners of the coastal edge where ships dock
    pub corners: [CornerKey; 2],
    /// The land tile the edge belongs to
    pub tile: HexCoord,
    /// Type of harbor (generic or specific resource)
    pub harbor_type: Harbor,
}

/// How resources are laid out on a generated board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Resources follow the fixed canonical list in scan order
    #[default]
    Canonical,
    /// Resources are shuffled with the seeded RNG
    Shuffled,
}

/// Parameters for standard board generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Board radius in rings around the centre tile
    pub radius: u32,
    /// Seed for every random choice made while building the board
    pub seed: u64,
    /// Resource layout mode
    pub layout: LayoutMode,
    /// Re-deal number tokens so that no two 6/8 tokens sit on neighbouring tiles
    pub balanced_numbers: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            radius: STANDARD_RADIUS,
            seed: 0,
            layout: LayoutMode::Canonical,
            balanced_numbers: false,
        }
    }
}

impl BoardConfig {
    /// Config with the given seed and layout, other fields default
    pub fn new(seed: u64, layout: LayoutMode) -> Self {
        Self {
            seed,
            layout,
            ..Self::default()
        }
    }
}

/// Standard tile distribution:
/// 4 Wood, 3 Brick, 4 Sheep, 4 Wheat, 3 Ore, 1 Desert (None)
const CANONICAL_RESOURCES: [Option<Resource>; 19] = [
    Some(Resource::Wood),
    Some(Resource::Wood),
    Some(Resource::Wood),
    Some(Resource::Wood),
    Some(Resource::Brick),
    Some(Resource::Brick),
    Some(Resource::Brick),
    Some(Resource::Sheep),
    Some(Resource::Sheep),
    Some(Resource::Sheep),
    Some(Resource::Sheep),
    Some(Resource::Wheat),
    Some(Resource::Wheat),
    Some(Resource::Wheat),
    Some(Resource::Wheat),
    Some(Resource::Ore),
    Some(Resource::Ore),
    Some(Resource::Ore),
    None,
];

/// Standard dice number distribution (one 2 and one 12, two of everything else, no 7)
pub const STANDARD_TOKENS: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Standard harbors: 4 generic (3:1) and 5 specific (2:1, one per resource)
const CANONICAL_HARBORS: [Harbor; 9] = [
    Harbor::Generic,
    Harbor::Specific(Resource::Wheat),
    Harbor::Generic,
    Harbor::Specific(Resource::Ore),
    Harbor::Generic,
    Harbor::Specific(Resource::Sheep),
    Harbor::Generic,
    Harbor::Specific(Resource::Brick),
    Harbor::Specific(Resource::Wood),
];

/// Positions along the 30 coastal edges (in perimeter order) that receive a harbor
const HARBOR_SLOTS: [usize; 9] = [0, 3, 7, 10, 13, 17, 20, 23, 27];

const MAX_TOKEN_ATTEMPTS: usize = 100;

/// The complete game board
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Tiles in scan order (by row, then column)
    tiles: Vec<Tile>,
    /// Position of each tile in `tiles`
    index: HashMap<HexCoord, usize>,
    /// Harbors on coastal edges
    harbors: Vec<HarborPlacement>,
}

impl Board {
    /// Create the standard 19-tile board.
    ///
    /// Same config, same board: every random choice is drawn from a `StdRng`
    /// seeded with `config.seed`, in a fixed order (resources, tokens, harbors).
    pub fn create_standard(config: &BoardConfig) -> Result<Self> {
        if config.radius != STANDARD_RADIUS {
            return Err(AdvisorError::Geometry {
                radius: config.radius,
            });
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let coords = HexCoord::within(config.radius);

        let mut tile_types = CANONICAL_RESOURCES.to_vec();
        if config.layout == LayoutMode::Shuffled {
            tile_types.shuffle(&mut rng);
        }

        let resource_coords: Vec<HexCoord> = coords
            .iter()
            .zip(&tile_types)
            .filter(|(_, t)| t.is_some())
            .map(|(c, _)| *c)
            .collect();

        let numbers = if config.balanced_numbers {
            assign_numbers_avoiding_adjacent_68(&resource_coords, &mut rng)
        } else {
            let mut numbers = STANDARD_TOKENS.to_vec();
            numbers.shuffle(&mut rng);
            numbers
        };

        let mut numbers_iter = numbers.into_iter();
        let mut tiles = Vec::with_capacity(coords.len());
        for (coord, tile_type) in coords.iter().zip(tile_types) {
            let tile = match tile_type {
                Some(resource) => {
                    let number = numbers_iter.next().ok_or_else(|| {
                        AdvisorError::InvalidBoard("ran out of number tokens".to_string())
                    })?;
                    Tile::new_resource(*coord, resource, number)
                }
                None => Tile::desert(*coord),
            };
            tiles.push(tile);
        }

        let mut harbor_types = CANONICAL_HARBORS.to_vec();
        if config.layout == LayoutMode::Shuffled {
            harbor_types.shuffle(&mut rng);
        }

        let mut board = Self::assemble(tiles);
        board.harbors = board.place_harbors(&harbor_types);
        board.validate()?;

        debug!(
            seed = config.seed,
            layout = ?config.layout,
            tiles = board.tiles.len(),
            "generated standard board"
        );
        Ok(board)
    }

    /// Build a board from an explicit tile list (any order).
    ///
    /// The tiles must cover exactly the radius-2 hexagon with the standard
    /// distribution. Harbors get the canonical placement.
    pub fn from_tiles(tiles: Vec<Tile>) -> Result<Self> {
        let mut board = Self::assemble(tiles);
        board.validate()?;
        board.harbors = board.place_harbors(&CANONICAL_HARBORS);
        Ok(board)
    }

    fn assemble(mut tiles: Vec<Tile>) -> Self {
        tiles.sort_by_key(|t| (t.coord.r, t.coord.q));
        let index = tiles
            .iter()
            .enumerate()
            .map(|(i, t)| (t.coord, i))
            .collect();
        Self {
            tiles,
            index,
            harbors: Vec::new(),
        }
    }

    /// Coastal edges (corner pairs belonging to a single tile), in perimeter order
    fn coastal_edges(&self) -> Vec<(HexCoord, [CornerKey; 2])> {
        let mut edge_counts: HashMap<(CornerKey, CornerKey), usize> = HashMap::new();
        for tile in &self.tiles {
            for (a, b) in corner_pairs(&tile.coord) {
                *edge_counts.entry(edge_key(a, b)).or_insert(0) += 1;
            }
        }

        let coastal: Vec<(HexCoord, [CornerKey; 2])> = HexCoord::ring(STANDARD_RADIUS)
            .filter(|coord| self.index.contains_key(coord))
            .flat_map(|coord| {
                corner_pairs(&coord)
                    .into_iter()
                    .filter(|(a, b)| edge_counts.get(&edge_key(*a, *b)) == Some(&1))
                    .map(move |(a, b)| (coord, [a, b]))
                    .collect::<Vec<_>>()
            })
            .collect();

        // Chain edges end to end so that neighbours in the list share a corner
        let Some(&first) = coastal.first() else {
            return Vec::new();
        };
        let mut used = vec![false; coastal.len()];
        used[0] = true;
        let mut ordered = vec![first];
        let mut end = first.1[1];
        while ordered.len() < coastal.len() {
            let Some(i) = (0..coastal.len()).find(|&i| !used[i] && coastal[i].1.contains(&end))
            else {
                break;
            };
            used[i] = true;
            let (tile, [a, b]) = coastal[i];
            let edge = if a == end { [a, b] } else { [b, a] };
            end = edge[1];
            ordered.push((tile, edge));
        }
        ordered
    }

    fn place_harbors(&self, harbor_types: &[Harbor]) -> Vec<HarborPlacement> {
        let coastal = self.coastal_edges();
        HARBOR_SLOTS
            .iter()
            .zip(harbor_types)
            .filter_map(|(&slot, &harbor_type)| {
                coastal.get(slot).map(|(tile, corners)| HarborPlacement {
                    corners: *corners,
                    tile: *tile,
                    harbor_type,
                })
            })
            .collect()
    }

    // ==================== Query Methods ====================

    /// Get a tile by coordinate
    pub fn tile_at(&self, coord: &HexCoord) -> Result<&Tile> {
        self.index
            .get(coord)
            .map(|&i| &self.tiles[i])
            .ok_or(AdvisorError::TileNotFound(*coord))
    }

    /// All tiles in scan order
    pub fn all_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Number of tiles on the board
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Harbors on the coast
    pub fn harbors(&self) -> &[HarborPlacement] {
        &self.harbors
    }

    /// Harbor whose docking edge ends at this corner, if any
    pub fn harbor_at_corner(&self, corner: &CornerKey) -> Option<Harbor> {
        self.harbors
            .iter()
            .find(|h| h.corners.contains(corner))
            .map(|h| h.harbor_type)
    }

    /// Pairs of neighbouring tiles that both carry a 6 or an 8
    pub fn adjacent_high_numbers(&self) -> Vec<(HexCoord, HexCoord)> {
        let mut pairs = Vec::new();
        for tile in self.tiles.iter().filter(|t| t.is_high_probability()) {
            for neighbor in tile.coord.neighbors() {
                let Ok(other) = self.tile_at(&neighbor) else {
                    continue;
                };
                if other.is_high_probability() && tile.coord < neighbor {
                    pairs.push((tile.coord, neighbor));
                }
            }
        }
        pairs
    }

    // ==================== Validation Methods ====================

    /// Check the board against the standard composition.
    ///
    /// 19 tiles on the radius-2 hexagon, 4 wood / 4 sheep / 4 wheat / 3 brick /
    /// 3 ore / 1 desert, the standard token multiset, and no token on the desert.
    pub fn validate(&self) -> Result<()> {
        let expected: Vec<HexCoord> = HexCoord::within(STANDARD_RADIUS);
        let actual: Vec<HexCoord> = self.tiles.iter().map(|t| t.coord).collect();
        if actual != expected {
            return Err(AdvisorError::InvalidBoard(format!(
                "expected the {} hexes within radius {}, got {} tiles",
                expected.len(),
                STANDARD_RADIUS,
                actual.len()
            )));
        }

        let mut resource_counts: BTreeMap<Option<Resource>, usize> = BTreeMap::new();
        let mut numbers: Vec<u8> = Vec::new();
        for tile in &self.tiles {
            *resource_counts.entry(tile.resource()).or_insert(0) += 1;
            match (tile.tile_type, tile.dice_number) {
                (TileType::Desert, Some(n)) => {
                    return Err(AdvisorError::InvalidBoard(format!(
                        "desert at {} carries token {}",
                        tile.coord, n
                    )));
                }
                (TileType::Resource(r), None) => {
                    return Err(AdvisorError::InvalidBoard(format!(
                        "{} tile at {} has no token",
                        r.name(),
                        tile.coord
                    )));
                }
                (_, Some(n)) => numbers.push(n),
                (TileType::Desert, None) => {}
            }
        }

        let mut expected_counts: BTreeMap<Option<Resource>, usize> = BTreeMap::new();
        for resource in CANONICAL_RESOURCES {
            *expected_counts.entry(resource).or_insert(0) += 1;
        }
        if resource_counts != expected_counts {
            return Err(AdvisorError::InvalidBoard(
                "resource distribution differs from the standard set".to_string(),
            ));
        }

        numbers.sort_unstable();
        if numbers != STANDARD_TOKENS {
            return Err(AdvisorError::InvalidBoard(format!(
                "number tokens {:?} differ from the standard set",
                numbers
            )));
        }

        Ok(())
    }

    /// Convert to a JSON-friendly representation
    pub fn to_json_friendly(&self) -> BoardJson {
        BoardJson {
            tiles: self
                .tiles
                .iter()
                .map(|tile| TileJson {
                    q: tile.coord.q,
                    r: tile.coord.r,
                    tile_type: tile.tile_type,
                    dice_number: tile.dice_number,
                })
                .collect(),
            harbors: self.harbors.clone(),
        }
    }

    /// Rebuild a board from its JSON-friendly representation
    pub fn from_json_friendly(json: BoardJson) -> Result<Self> {
        let tiles = json
            .tiles
            .into_iter()
            .map(|t| Tile {
                coord: HexCoord::new(t.q, t.r),
                tile_type: t.tile_type,
                dice_number: t.dice_number,
            })
            .collect();
        let mut board = Self::assemble(tiles);
        board.validate()?;

        board.check_harbors(&json.harbors)?;
        board.harbors = json.harbors;
        Ok(board)
    }

    /// Loaded harbors must match the standard set: 9 harbors with the
    /// standard type mix, each on its own coastal edge.
    fn check_harbors(&self, harbors: &[HarborPlacement]) -> Result<()> {
        if harbors.len() != CANONICAL_HARBORS.len() {
            return Err(AdvisorError::InvalidBoard(format!(
                "expected {} harbors, found {}",
                CANONICAL_HARBORS.len(),
                harbors.len()
            )));
        }

        let coastal = self.coastal_edges();
        let mut used = BTreeSet::new();
        for harbor in harbors {
            let key = edge_key(harbor.corners[0], harbor.corners[1]);
            let on_coast = coastal.iter().any(|(tile, corners)| {
                *tile == harbor.tile && edge_key(corners[0], corners[1]) == key
            });
            if !on_coast {
                return Err(AdvisorError::InvalidBoard(format!(
                    "harbor at {} is not on a coastal edge",
                    harbor.tile
                )));
            }
            if !used.insert(key) {
                return Err(AdvisorError::InvalidBoard(format!(
                    "two harbors share the edge at {}",
                    harbor.tile
                )));
            }
        }

        let mut remaining: Vec<Harbor> = harbors.iter().map(|h| h.harbor_type).collect();
        for expected in CANONICAL_HARBORS {
            match remaining.iter().position(|&h| h == expected) {
                Some(i) => {
                    remaining.swap_remove(i);
                }
                None => {
                    return Err(AdvisorError::InvalidBoard(
                        "harbor types differ from 4 generic and one per resource".to_string(),
                    ))
                }
            }
        }
        Ok(())
    }
}

/// JSON-friendly board representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardJson {
    pub tiles: Vec<TileJson>,
    pub harbors: Vec<HarborPlacement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileJson {
    pub q: i32,
    pub r: i32,
    pub tile_type: TileType,
    pub dice_number: Option<u8>,
}

/// Consecutive corner pairs of a hex, i.e. its six edges
fn corner_pairs(coord: &HexCoord) -> [(CornerKey, CornerKey); 6] {
    let corners = coord.corners();
    std::array::from_fn(|i| (corners[i], corners[(i + 1) % 6]))
}

fn edge_key(a: CornerKey, b: CornerKey) -> (CornerKey, CornerKey) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Deal tokens to resource tiles, reshuffling until no 6/8 tokens are neighbours
fn assign_numbers_avoiding_adjacent_68<R: Rng>(
    resource_coords: &[HexCoord],
    rng: &mut R,
) -> Vec<u8> {
    let mut numbers = STANDARD_TOKENS.to_vec();

    for _ in 0..MAX_TOKEN_ATTEMPTS {
        numbers.shuffle(rng);
        if is_valid_number_placement(resource_coords, &numbers) {
            return numbers;
        }
    }

    // Rare: keep the last deal rather than fail
    debug!("no 6/8-separated token deal found, keeping last shuffle");
    numbers
}

/// Check if a number placement is valid (no adjacent 6 and 8)
fn is_valid_number_placement(resource_coords: &[HexCoord], numbers: &[u8]) -> bool {
    let coord_to_number: HashMap<HexCoord, u8> = resource_coords
        .iter()
        .copied()
        .zip(numbers.iter().copied())
        .collect();

    coord_to_number.iter().all(|(coord, &number)| {
        !matches!(number, 6 | 8)
            || coord.neighbors().iter().all(|neighbor| {
                !matches!(coord_to_number.get(neighbor), Some(6 | 8))
            })
    })
}
