use serde::{Deserialize, Serialize};

use crate::{
    AgentKind, Position,
    map::{Grid, Tile},
};

const PIT_REWARD: i32 = -50;
const WUMPUS_REWARD: i32 = -100;
const GOLD_REWARD: i32 = 100;
const STEP_COST: i32 = -1;

/// Numeric reward for the agent that just entered the given tile.
///
/// Empty tiles and perception markers charge the per-step cost.
///
/// # Panics
///
/// Panics if `pos` is out of bounds; callers validate positions before
/// resolving them.
pub fn reward(grid: &Grid, pos: Position) -> i32 {
    match grid[pos] {
        Tile::Pit => PIT_REWARD,
        Tile::Wumpus => WUMPUS_REWARD,
        Tile::Gold => GOLD_REWARD,
        Tile::Empty | Tile::Breeze | Tile::Stench => STEP_COST,
    }
}

/// Result of resolving a move, relative to the agent that made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    Ongoing,
    /// The mover reached the gold.
    MoverWins,
    /// The mover stepped into a pit or a Wumpus lair.
    MoverLoses,
}

/// Determines whether entering the given tile ends the game.
///
/// # Panics
///
/// Panics if `pos` is out of bounds; callers validate positions before
/// resolving them.
pub fn evaluate(grid: &Grid, pos: Position) -> MoveOutcome {
    match grid[pos] {
        Tile::Gold => MoveOutcome::MoverWins,
        Tile::Pit | Tile::Wumpus => MoveOutcome::MoverLoses,
        Tile::Empty | Tile::Breeze | Tile::Stench => MoveOutcome::Ongoing,
    }
}

/// Session-level game state: still running, or won by one of the agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Ongoing,
    Won(AgentKind),
}

impl Outcome {
    /// Returns true once a winner has been decided.
    pub fn is_over(self) -> bool {
        matches!(self, Outcome::Won(_))
    }
}

/// Represents errors that reject a candidate move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("The game is already over")]
    GameOver,
    #[error("Target position ({x}, {y}) is out of bounds")]
    OutOfBounds { x: i32, y: i32 },
    #[error("Move from {from:?} to {to:?} is not a single orthogonal step")]
    IllegalStep { from: Position, to: Position },
}

/// Holds the position and accumulated score of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    pub position: Position,
    pub score: i32,
}

/// One full game between the player and the AI on a shared grid.
///
/// The session owns the grid exclusively and never mutates it after
/// generation: visiting a tile does not clear it. All turn sequencing flows
/// through [`GameSession::apply_move`], which validates the move, accrues the
/// reward to the mover and derives the session outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    grid: Grid,
    player: AgentState,
    ai: AgentState,
    turn: AgentKind,
    outcome: Outcome,
}

impl GameSession {
    /// Starts a fresh game on the given grid.
    ///
    /// The player opens at (0, 0), the AI at (side - 1, 0), and the player
    /// moves first.
    pub fn new(grid: Grid) -> Self {
        let side = grid.side();
        GameSession {
            grid,
            player: AgentState {
                position: Position::player_start(),
                score: 0,
            },
            ai: AgentState {
                position: Position::ai_start(side),
                score: 0,
            },
            turn: AgentKind::Player,
            outcome: Outcome::Ongoing,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn agent(&self, kind: AgentKind) -> &AgentState {
        match kind {
            AgentKind::Player => &self.player,
            AgentKind::Ai => &self.ai,
        }
    }

    fn agent_mut(&mut self, kind: AgentKind) -> &mut AgentState {
        match kind {
            AgentKind::Player => &mut self.player,
            AgentKind::Ai => &mut self.ai,
        }
    }

    /// The agent whose move is expected next.
    pub fn turn(&self) -> AgentKind {
        self.turn
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Moves the current-turn agent to `target`.
    ///
    /// A move is accepted only while the game is running, when `target` lies
    /// on the grid, and when it is exactly one orthogonal step away from the
    /// mover (no diagonals, no teleports, no staying put). On success the
    /// mover's score accrues the tile reward, the outcome is re-derived
    /// (gold crowns the mover, hazards crown the rival) and the turn passes
    /// to the other agent.
    pub fn apply_move(&mut self, target: Position) -> Result<MoveOutcome, MoveError> {
        if self.outcome.is_over() {
            return Err(MoveError::GameOver);
        }
        if !self.grid.in_bounds(target) {
            return Err(MoveError::OutOfBounds {
                x: target.x,
                y: target.y,
            });
        }

        let mover = self.turn;
        let from = self.agent(mover).position;
        if from.manhattan_distance(target) != 1 {
            return Err(MoveError::IllegalStep { from, to: target });
        }

        let gained = reward(&self.grid, target);
        let result = evaluate(&self.grid, target);

        let state = self.agent_mut(mover);
        state.position = target;
        state.score += gained;

        self.outcome = match result {
            MoveOutcome::Ongoing => Outcome::Ongoing,
            MoveOutcome::MoverWins => Outcome::Won(mover),
            MoveOutcome::MoverLoses => Outcome::Won(mover.rival()),
        };
        self.turn = mover.rival();

        Ok(result)
    }

    /// Resets the session onto a freshly generated grid.
    ///
    /// Positions, scores, turn order and outcome all return to their
    /// starting values.
    pub fn restart(&mut self, grid: Grid) {
        *self = GameSession::new(grid);
    }
}
