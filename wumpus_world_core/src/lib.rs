use serde::{Deserialize, Serialize};

pub mod agent;
pub mod environment;
pub mod map;

/// Side length of a generated world.
pub const GRID_SIZE: i32 = 8;

/// Number of Wumpus lairs placed during generation.
pub const WUMPUS_COUNT: usize = 2;

/// Number of pits placed during generation.
pub const PIT_COUNT: usize = 6;

/// Represents a 2D coordinate.
///
/// Coordinates are signed so that off-grid candidates (e.g. x = -1) are
/// representable and can be rejected by bounds checks instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// The player's fixed starting tile.
    pub const fn player_start() -> Self {
        Position::new(0, 0)
    }

    /// The AI's fixed starting tile on a grid of the given side length.
    pub const fn ai_start(side: i32) -> Self {
        Position::new(side - 1, 0)
    }

    /// Returns the position one step in the given direction.
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Position::new(self.x + dx, self.y + dy)
    }

    /// Returns manhattan distance to another position.
    pub fn manhattan_distance(self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// The four orthogonal neighbors, possibly out of bounds.
    ///
    /// The order (+x, -x, +y, -y) is fixed: the opponent policy breaks score
    /// ties by keeping the first candidate seen.
    pub fn orthogonal_neighbors(self) -> [Position; 4] {
        [
            Position::new(self.x + 1, self.y),
            Position::new(self.x - 1, self.y),
            Position::new(self.x, self.y + 1),
            Position::new(self.x, self.y - 1),
        ]
    }
}

/// A single-step movement direction on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The (dx, dy) offset of one step in this direction.
    ///
    /// `Up` decreases y: the grid origin is the top-left corner.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Identifies one of the two competing agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    Player,
    Ai,
}

impl AgentKind {
    /// The other agent.
    pub fn rival(self) -> AgentKind {
        match self {
            AgentKind::Player => AgentKind::Ai,
            AgentKind::Ai => AgentKind::Player,
        }
    }
}
