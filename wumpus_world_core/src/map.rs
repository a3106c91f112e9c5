use std::ops::{Index, IndexMut};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{GRID_SIZE, PIT_COUNT, Position, WUMPUS_COUNT};

/// Attempts allowed per hazard placement before generation gives up.
///
/// Rejection sampling has no hard termination guarantee; the cap converts a
/// (vanishingly unlikely) endless loop into an explicit error.
const PLACEMENT_ATTEMPTS: usize = 10_000;

/// Represents errors that can occur within the grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Coordinates ({x}, {y}) are out of bounds for grid side {side}")]
    OutOfBounds { x: i32, y: i32, side: i32 },
}

/// Represents errors that can occur while generating a world.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("No empty tile found for {tile:?} after {attempts} attempts")]
    PlacementExhausted { tile: Tile, attempts: usize },
}

/// The value stored per grid cell.
///
/// `Pit`, `Gold` and `Wumpus` are placed by generation; `Breeze` and `Stench`
/// are perception markers spread onto tiles that were still empty when the
/// neighboring hazard was placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    Pit,
    Gold,
    Wumpus,
    Breeze,
    Stench,
}

/// A square board of [`Tile`]s.
///
/// Stores tiles in a flat vector using row-major order. Checked access goes
/// through [`Grid::get`]/[`Grid::set`]; indexing by [`Position`] panics on
/// out-of-bounds coordinates, which callers treat as a contract violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    side: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates an empty grid with the given side length.
    ///
    /// # Panics
    ///
    /// Panics if `side` is not positive.
    pub fn new(side: i32) -> Self {
        assert!(side > 0, "grid side must be positive, got {side}");
        Grid {
            side,
            tiles: vec![Tile::Empty; (side * side) as usize],
        }
    }

    /// Returns the side length of the grid.
    #[inline]
    pub fn side(&self) -> i32 {
        self.side
    }

    /// Checks if the given position is within the grid boundaries.
    ///
    /// This is the move validator: a candidate position is legal terrain
    /// exactly when it lies inside the grid.
    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.side && pos.y >= 0 && pos.y < self.side
    }

    /// Converts a position to a flat vector index.
    ///
    /// Returns `None` if the position is out of bounds.
    #[inline]
    fn index_of(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.y * self.side + pos.x) as usize)
    }

    /// Gets the tile at the given position.
    ///
    /// Returns `None` if the position is out of bounds.
    pub fn get(&self, pos: Position) -> Option<Tile> {
        self.index_of(pos).map(|index| self.tiles[index])
    }

    /// Sets the tile at the given position.
    ///
    /// Returns `Ok(())` on success, or `Err(GridError::OutOfBounds)` if the
    /// position is invalid.
    pub fn set(&mut self, pos: Position, tile: Tile) -> Result<(), GridError> {
        let index = self.index_of(pos).ok_or(GridError::OutOfBounds {
            x: pos.x,
            y: pos.y,
            side: self.side,
        })?;
        self.tiles[index] = tile;
        Ok(())
    }

    /// Returns an iterator that yields `(Position, Tile)` for each cell in
    /// row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, Tile)> + '_ {
        self.tiles.iter().enumerate().map(|(index, tile)| {
            let index = index as i32;
            (Position::new(index % self.side, index / self.side), *tile)
        })
    }
}

/// Allows indexing the grid by [`Position`] for immutable access.
impl Index<Position> for Grid {
    type Output = Tile;

    #[inline]
    fn index(&self, pos: Position) -> &Self::Output {
        match self.index_of(pos) {
            Some(index) => &self.tiles[index],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid side {}",
                pos.x, pos.y, self.side
            ),
        }
    }
}

/// Allows indexing the grid by [`Position`] for mutable access.
impl IndexMut<Position> for Grid {
    #[inline]
    fn index_mut(&mut self, pos: Position) -> &mut Self::Output {
        let side = self.side;
        match self.index_of(pos) {
            Some(index) => &mut self.tiles[index],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid side {}",
                pos.x, pos.y, side
            ),
        }
    }
}

/// Spreads a perception marker onto the orthogonal neighbors of `source`.
///
/// Only in-bounds neighbors that still hold [`Tile::Empty`] are marked;
/// hazards, gold and existing markers are never overwritten. Calling this
/// twice with the same arguments is a no-op the second time.
pub fn spread_marker(grid: &mut Grid, source: Position, marker: Tile) {
    for neighbor in source.orthogonal_neighbors() {
        if grid.in_bounds(neighbor) && grid[neighbor] == Tile::Empty {
            grid[neighbor] = marker;
        }
    }
}

/// Generates a world grid with the standard side length.
///
/// Placement order: both Wumpuses (each spreading stench), then all pits
/// (each spreading breeze), then the gold. Because markers count as occupied
/// tiles, the gold can only land on a tile untouched by any propagation, and
/// it is never overwritten by a later placement.
pub fn generate_grid<R: Rng + ?Sized>(rng: &mut R) -> Result<Grid, GenerationError> {
    generate_grid_sized(rng, GRID_SIZE)
}

/// Like [`generate_grid`], but with an explicit side length.
///
/// Boards too small to host the full hazard budget fail with
/// [`GenerationError::PlacementExhausted`] once the attempt cap is reached.
pub fn generate_grid_sized<R: Rng + ?Sized>(
    rng: &mut R,
    side: i32,
) -> Result<Grid, GenerationError> {
    let mut grid = Grid::new(side);

    for _ in 0..WUMPUS_COUNT {
        let lair = place_on_empty(&mut grid, rng, Tile::Wumpus)?;
        spread_marker(&mut grid, lair, Tile::Stench);
    }
    for _ in 0..PIT_COUNT {
        let pit = place_on_empty(&mut grid, rng, Tile::Pit)?;
        spread_marker(&mut grid, pit, Tile::Breeze);
    }
    place_on_empty(&mut grid, rng, Tile::Gold)?;

    Ok(grid)
}

/// Samples random positions until one passes the acceptance test, then
/// places `tile` there and returns the position.
///
/// A candidate is rejected if it is one of the two agent start tiles or if
/// the tile there is not currently empty.
fn place_on_empty<R: Rng + ?Sized>(
    grid: &mut Grid,
    rng: &mut R,
    tile: Tile,
) -> Result<Position, GenerationError> {
    let side = grid.side();
    for _ in 0..PLACEMENT_ATTEMPTS {
        let pos = Position::new(rng.random_range(0..side), rng.random_range(0..side));
        if pos == Position::player_start() || pos == Position::ai_start(side) {
            continue;
        }
        if grid[pos] != Tile::Empty {
            continue;
        }
        grid[pos] = tile;
        return Ok(pos);
    }
    Err(GenerationError::PlacementExhausted {
        tile,
        attempts: PLACEMENT_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn count_tiles(grid: &Grid, tile: Tile) -> usize {
        grid.enumerate().filter(|(_, t)| *t == tile).count()
    }

    #[test]
    fn in_bounds_accepts_the_whole_board() {
        let grid = Grid::new(GRID_SIZE);
        for x in 0..GRID_SIZE {
            for y in 0..GRID_SIZE {
                assert!(grid.in_bounds(Position::new(x, y)));
            }
        }
    }

    #[test]
    fn in_bounds_rejects_each_edge() {
        let grid = Grid::new(GRID_SIZE);
        assert!(!grid.in_bounds(Position::new(-1, 0)));
        assert!(!grid.in_bounds(Position::new(8, 0)));
        assert!(!grid.in_bounds(Position::new(0, -1)));
        assert!(!grid.in_bounds(Position::new(0, 8)));
    }

    #[test]
    fn checked_access_mirrors_bounds() {
        let mut grid = Grid::new(4);
        assert_eq!(
            grid.set(Position::new(4, 0), Tile::Pit),
            Err(GridError::OutOfBounds {
                x: 4,
                y: 0,
                side: 4
            })
        );
        assert_eq!(grid.get(Position::new(4, 0)), None);

        grid.set(Position::new(3, 0), Tile::Pit).unwrap();
        assert_eq!(grid.get(Position::new(3, 0)), Some(Tile::Pit));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn indexing_out_of_bounds_panics() {
        let grid = Grid::new(4);
        let _ = grid[Position::new(0, -1)];
    }

    #[test]
    fn spread_marker_only_touches_empty_neighbors() {
        let mut grid = Grid::new(4);
        grid[Position::new(1, 1)] = Tile::Pit;
        grid[Position::new(2, 2)] = Tile::Gold;
        spread_marker(&mut grid, Position::new(2, 1), Tile::Breeze);

        assert_eq!(grid[Position::new(1, 1)], Tile::Pit);
        assert_eq!(grid[Position::new(2, 2)], Tile::Gold);
        assert_eq!(grid[Position::new(3, 1)], Tile::Breeze);
        assert_eq!(grid[Position::new(2, 0)], Tile::Breeze);
    }

    #[test]
    fn spread_marker_handles_corner_sources() {
        let mut grid = Grid::new(4);
        spread_marker(&mut grid, Position::new(0, 0), Tile::Stench);
        assert_eq!(grid[Position::new(1, 0)], Tile::Stench);
        assert_eq!(grid[Position::new(0, 1)], Tile::Stench);
        assert_eq!(count_tiles(&grid, Tile::Stench), 2);
    }

    #[test]
    fn spread_marker_is_idempotent() {
        let mut once = Grid::new(4);
        once[Position::new(1, 1)] = Tile::Wumpus;
        let mut twice = once.clone();

        spread_marker(&mut once, Position::new(1, 1), Tile::Stench);
        spread_marker(&mut twice, Position::new(1, 1), Tile::Stench);
        spread_marker(&mut twice, Position::new(1, 1), Tile::Stench);

        assert_eq!(once, twice);
    }

    #[test]
    fn generated_grids_hold_exact_hazard_counts() {
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = generate_grid(&mut rng).unwrap();
            assert_eq!(count_tiles(&grid, Tile::Gold), 1, "seed {seed}");
            assert_eq!(count_tiles(&grid, Tile::Wumpus), WUMPUS_COUNT, "seed {seed}");
            assert_eq!(count_tiles(&grid, Tile::Pit), PIT_COUNT, "seed {seed}");
        }
    }

    #[test]
    fn start_tiles_never_hold_hazards_or_gold() {
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = generate_grid(&mut rng).unwrap();
            for start in [Position::player_start(), Position::ai_start(GRID_SIZE)] {
                assert!(
                    !matches!(grid[start], Tile::Pit | Tile::Gold | Tile::Wumpus),
                    "seed {seed}: start tile {start:?} holds {:?}",
                    grid[start]
                );
            }
        }
    }

    #[test]
    fn hazard_neighbors_are_never_empty() {
        // Every tile next to a pit was either marked Breeze or already held
        // something else; likewise for Wumpus and Stench. Either way no
        // neighbor of a hazard may remain Empty.
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = generate_grid(&mut rng).unwrap();
            for (pos, tile) in grid.enumerate() {
                if !matches!(tile, Tile::Pit | Tile::Wumpus) {
                    continue;
                }
                for neighbor in pos.orthogonal_neighbors() {
                    if grid.in_bounds(neighbor) {
                        assert_ne!(
                            grid[neighbor],
                            Tile::Empty,
                            "seed {seed}: {tile:?} at {pos:?} has an unmarked neighbor"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn same_seed_generates_the_same_grid() {
        let mut first = StdRng::seed_from_u64(42);
        let mut second = StdRng::seed_from_u64(42);
        assert_eq!(
            generate_grid(&mut first).unwrap(),
            generate_grid(&mut second).unwrap()
        );
    }

    #[test]
    fn generation_fails_fast_on_boards_too_small() {
        // On a 2x2 board the two start tiles plus the first Wumpus and its
        // stench leave no empty tile for the second Wumpus.
        let mut rng = StdRng::seed_from_u64(0);
        let result = generate_grid_sized(&mut rng, 2);
        assert!(matches!(
            result,
            Err(GenerationError::PlacementExhausted {
                tile: Tile::Wumpus,
                ..
            })
        ));
    }
}
