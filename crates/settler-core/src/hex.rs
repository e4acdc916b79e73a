//! Hex coordinate system using axial coordinates (q, r).
//!
//! This module provides the foundational coordinate types for the board:
//! - `HexCoord`: Identifies individual hex tiles
//! - `Ring`: Lazy walk over all hexes at a fixed distance from the origin
//! - `CornerKey`: Exact identity of a hex corner, where settlements are placed
//!
//! Tiles are laid out flat-top. Corner positions are kept as scaled integers so
//! that the corner shared by two or three neighbouring hexes has exactly one
//! representation and merging corners into vertices needs no float tolerance.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Axial offsets of the six neighbours, in the fixed order
/// East, NorthEast, NorthWest, West, SouthWest, SouthEast.
const DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// Corner offsets from a hex centre in `CornerKey` units, at 0°, 60°, ..., 300°.
const CORNER_OFFSETS: [(i32, i32); 6] = [(2, 0), (1, 1), (-1, 1), (-2, 0), (-1, -1), (1, -1)];

/// Index into `DIRECTIONS` where every ring walk starts.
const RING_START: usize = 4;

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east (right)
/// - `r` increases going south
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    /// Column (increases going east)
    pub q: i32,
    /// Row (increases going south)
    pub r: i32,
}

impl HexCoord {
    /// The centre of the board
    pub const ORIGIN: HexCoord = HexCoord::new(0, 0);

    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    fn offset(&self, (dq, dr): (i32, i32), times: i32) -> HexCoord {
        HexCoord::new(self.q + dq * times, self.r + dr * times)
    }

    /// The six neighboring hexes, starting East and turning counter-clockwise
    pub fn neighbors(&self) -> [HexCoord; 6] {
        DIRECTIONS.map(|d| self.offset(d, 1))
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        ((dq.abs() + dr.abs() + (dq + dr).abs()) / 2) as u32
    }

    /// Distance from the origin, i.e. which ring this hex sits on
    pub fn ring_distance(&self) -> u32 {
        self.q.abs().max(self.r.abs()).max((self.q + self.r).abs()) as u32
    }

    /// All hexes at exactly `radius` steps from the origin
    pub fn ring(radius: u32) -> Ring {
        Ring::new(radius)
    }

    /// All hexes within `radius` steps of the origin, in scan order
    /// (sorted by row, then column).
    pub fn within(radius: u32) -> Vec<HexCoord> {
        let r = radius as i32;
        let mut coords: Vec<HexCoord> = (-r..=r)
            .flat_map(|q| (-r..=r).map(move |rr| HexCoord::new(q, rr)))
            .filter(|c| c.ring_distance() <= radius)
            .collect();
        coords.sort_by_key(|c| (c.r, c.q));
        coords
    }

    /// The six corners of this hex in angular order (0°, 60°, ..., 300°)
    pub fn corners(&self) -> [CornerKey; 6] {
        let (cx, cy) = self.center_key();
        CORNER_OFFSETS.map(|(dx, dy)| CornerKey::new(cx + dx, cy + dy))
    }

    fn center_key(&self) -> (i32, i32) {
        (3 * self.q, self.q + 2 * self.r)
    }

    /// Convert to pixel coordinates (center of hex)
    /// Uses flat-top orientation with the given hex size (radius)
    pub fn to_pixel(&self, hex_size: f64) -> (f64, f64) {
        let x = hex_size * (1.5 * self.q as f64);
        let y = hex_size * (3.0_f64.sqrt() / 2.0 * self.q as f64 + 3.0_f64.sqrt() * self.r as f64);
        (x, y)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Lazy iterator over one ring of hexes.
///
/// The walk starts at `radius` steps South-West of the origin and follows the
/// six directions in `HexCoord::neighbors` order, so every consumer sees the
/// ring in the same angular order.
#[derive(Debug, Clone)]
pub struct Ring {
    radius: u32,
    current: HexCoord,
    side: usize,
    step: u32,
}

impl Ring {
    fn new(radius: u32) -> Self {
        Self {
            radius,
            current: HexCoord::ORIGIN.offset(DIRECTIONS[RING_START], radius as i32),
            side: 0,
            step: 0,
        }
    }

    fn remaining(&self) -> usize {
        if self.radius == 0 {
            return usize::from(self.side == 0);
        }
        let radius = self.radius as usize;
        (DIRECTIONS.len().saturating_sub(self.side)) * radius - self.step as usize
    }
}

impl Iterator for Ring {
    type Item = HexCoord;

    fn next(&mut self) -> Option<HexCoord> {
        if self.radius == 0 {
            if self.side == 0 {
                self.side = DIRECTIONS.len();
                return Some(self.current);
            }
            return None;
        }
        if self.side >= DIRECTIONS.len() {
            return None;
        }

        let item = self.current;
        self.current = self.current.offset(DIRECTIONS[self.side], 1);
        self.step += 1;
        if self.step == self.radius {
            self.step = 0;
            self.side += 1;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Ring {}

/// Exact position of a hex corner.
///
/// `x` is measured in half hex-sizes and `y` in units of √3/2 hex-size, which
/// puts every corner of a flat-top grid on integer coordinates. Two hexes that
/// share a corner produce the same key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CornerKey {
    pub x: i32,
    pub y: i32,
}

impl CornerKey {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert to pixel coordinates for a given hex size
    pub fn to_pixel(&self, hex_size: f64) -> (f64, f64) {
        (
            self.x as f64 * hex_size / 2.0,
            self.y as f64 * hex_size * 3.0_f64.sqrt() / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_hex_neighbors() {
        let center = HexCoord::new(0, 0);
        let neighbors = center.neighbors();

        // Should have 6 unique neighbors
        let unique: HashSet<_> = neighbors.iter().collect();
        assert_eq!(unique.len(), 6);

        // Each neighbor should be distance 1 away
        for neighbor in &neighbors {
            assert_eq!(center.distance_to(neighbor), 1);
        }
    }

    #[test]
    fn test_neighbor_order_is_fixed() {
        let hex = HexCoord::new(1, -1);
        assert_eq!(
            hex.neighbors(),
            [
                HexCoord::new(2, -1),
                HexCoord::new(2, -2),
                HexCoord::new(1, -2),
                HexCoord::new(0, -1),
                HexCoord::new(0, 0),
                HexCoord::new(1, 0),
            ]
        );
    }

    #[test]
    fn test_hex_distance() {
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(2, -1);
        assert_eq!(a.distance_to(&b), 2);

        let c = HexCoord::new(-3, 3);
        assert_eq!(a.distance_to(&c), 3);

        assert_eq!(b.distance_to(&c), 5);
        assert_eq!(c.distance_to(&b), 5);
    }

    #[test]
    fn test_ring_distance_matches_distance_from_origin() {
        for coord in HexCoord::within(3) {
            assert_eq!(coord.ring_distance(), coord.distance_to(&HexCoord::ORIGIN));
        }
    }

    #[test]
    fn test_ring_sizes() {
        assert_eq!(HexCoord::ring(0).collect::<Vec<_>>(), vec![HexCoord::ORIGIN]);
        assert_eq!(HexCoord::ring(1).count(), 6);
        assert_eq!(HexCoord::ring(2).count(), 12);
        assert_eq!(HexCoord::ring(2).len(), 12);
    }

    #[test]
    fn test_ring_members_are_at_radius_and_unique() {
        for radius in 1..4 {
            let ring: Vec<_> = HexCoord::ring(radius).collect();
            let unique: HashSet<_> = ring.iter().collect();
            assert_eq!(unique.len(), ring.len());
            assert!(ring.iter().all(|c| c.ring_distance() == radius));
        }
    }

    #[test]
    fn test_ring_order_is_a_walk() {
        let ring: Vec<_> = HexCoord::ring(2).collect();
        assert_eq!(ring[0], HexCoord::new(-2, 2));
        for pair in ring.windows(2) {
            assert_eq!(pair[0].distance_to(&pair[1]), 1);
        }
        // Closes the loop
        assert_eq!(ring[ring.len() - 1].distance_to(&ring[0]), 1);
    }

    #[test]
    fn test_within_radius_two_has_nineteen_cells_in_scan_order() {
        let cells = HexCoord::within(2);
        assert_eq!(cells.len(), 19);
        for pair in cells.windows(2) {
            assert!((pair[0].r, pair[0].q) < (pair[1].r, pair[1].q));
        }
    }

    #[test]
    fn test_neighbouring_hexes_share_two_corners() {
        let center = HexCoord::ORIGIN;
        let own: HashSet<_> = center.corners().into_iter().collect();
        for neighbor in center.neighbors() {
            let shared = neighbor
                .corners()
                .into_iter()
                .filter(|c| own.contains(c))
                .count();
            assert_eq!(shared, 2, "Neighbor {} should share one edge", neighbor);
        }
    }

    #[test]
    fn test_interior_corner_shared_by_three_hexes() {
        let mut counts: HashMap<CornerKey, usize> = HashMap::new();
        for hex in HexCoord::within(1) {
            for corner in hex.corners() {
                *counts.entry(corner).or_insert(0) += 1;
            }
        }
        // Every corner of the centre hex is shared by the centre and two ring-1 hexes
        for corner in HexCoord::ORIGIN.corners() {
            assert_eq!(counts[&corner], 3);
        }
    }

    #[test]
    fn test_corner_keys_match_float_geometry() {
        let hex = HexCoord::new(-1, 2);
        let (cx, cy) = hex.to_pixel(1.0);
        for (i, corner) in hex.corners().iter().enumerate() {
            let angle = (60.0 * i as f64).to_radians();
            let (x, y) = corner.to_pixel(1.0);
            assert!((x - (cx + angle.cos())).abs() < 1e-9);
            assert!((y - (cy + angle.sin())).abs() < 1e-9);
        }
    }
}
