use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    Position,
    environment::reward,
    map::{Grid, Tile},
};

/// Trait defining the move selection of an opponent.
///
/// `rival` is the other agent's current position. The built-in policies do
/// not consult it; it is part of the seam so an adversarial policy can be
/// added without changing call sites.
pub trait Agent {
    /// Chooses the opponent's next position given the current grid.
    ///
    /// Implementations must return `current` itself when no legal single
    /// step exists, so that callers always receive a defined position.
    fn select_move(&mut self, grid: &Grid, current: Position, rival: Position) -> Position;
}

/// The gold-seeking opponent: a greedy one-ply lookahead.
///
/// Each legal single-step candidate is scored as the tile reward plus an
/// inverse-distance pull toward the gold, `10 / (manhattan + 1)`. The
/// candidate with the strictly greatest score wins; ties keep the first
/// candidate seen. The policy has no memory of past positions and can
/// oscillate between two tiles indefinitely, which is accepted behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyAgent;

impl GreedyAgent {
    pub fn new() -> Self {
        GreedyAgent
    }
}

impl Agent for GreedyAgent {
    fn select_move(&mut self, grid: &Grid, current: Position, _rival: Position) -> Position {
        let mut best: Option<(Position, f64)> = None;

        for candidate in current.orthogonal_neighbors() {
            if !grid.in_bounds(candidate) {
                continue;
            }
            let score = f64::from(reward(grid, candidate)) + gold_heuristic(grid, candidate);
            let better = match best {
                // Strict comparison: ties keep the first candidate seen.
                Some((_, best_score)) => score > best_score,
                None => true,
            };
            if better {
                best = Some((candidate, score));
            }
        }

        // No legal step (only possible on degenerate boards): stay in place.
        best.map_or(current, |(pos, _)| pos)
    }
}

/// Inverse-distance pull toward the gold tile, zero when the grid has none.
///
/// The gold is looked up with a fresh scan on every call; nothing is cached.
fn gold_heuristic(grid: &Grid, pos: Position) -> f64 {
    match find_gold(grid) {
        Some(gold) => 10.0 / f64::from(pos.manhattan_distance(gold) + 1),
        None => 0.0,
    }
}

fn find_gold(grid: &Grid) -> Option<Position> {
    grid.enumerate()
        .find_map(|(pos, tile)| (tile == Tile::Gold).then_some(pos))
}

/// An opponent that steps to a uniformly random legal neighbor.
#[derive(Debug)]
pub struct RandomWalker {
    rng: StdRng,
}

impl RandomWalker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomWalker {
    fn select_move(&mut self, grid: &Grid, current: Position, _rival: Position) -> Position {
        let candidates: Vec<Position> = current
            .orthogonal_neighbors()
            .into_iter()
            .filter(|pos| grid.in_bounds(*pos))
            .collect();

        if candidates.is_empty() {
            return current;
        }
        candidates[self.rng.random_range(0..candidates.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greedy_steps_toward_the_gold() {
        let mut grid = Grid::new(8);
        grid[Position::new(7, 7)] = Tile::Gold;

        let mut agent = GreedyAgent::new();
        let chosen = agent.select_move(&grid, Position::new(5, 7), Position::new(0, 0));
        assert_eq!(chosen, Position::new(6, 7));
    }

    #[test]
    fn greedy_prefers_a_detour_over_a_pit() {
        let mut grid = Grid::new(8);
        grid[Position::new(0, 3)] = Tile::Gold;
        grid[Position::new(0, 2)] = Tile::Pit;

        let mut agent = GreedyAgent::new();
        let chosen = agent.select_move(&grid, Position::new(0, 1), Position::new(7, 0));
        assert_eq!(chosen, Position::new(1, 1));
    }

    #[test]
    fn greedy_ties_keep_the_first_candidate() {
        // Without gold the heuristic is zero and every empty neighbor scores
        // the per-step cost, so the +x candidate must win.
        let grid = Grid::new(8);
        let mut agent = GreedyAgent::new();
        let chosen = agent.select_move(&grid, Position::new(3, 3), Position::new(0, 0));
        assert_eq!(chosen, Position::new(4, 3));
    }

    #[test]
    fn greedy_can_oscillate_between_two_tiles() {
        // Gold behind a pit: from (0, 1) the best step is (1, 1), and from
        // (1, 1) the best step is back to (0, 1). The policy is memoryless,
        // so it revisits these two tiles forever.
        let mut grid = Grid::new(8);
        grid[Position::new(0, 3)] = Tile::Gold;
        grid[Position::new(0, 2)] = Tile::Pit;

        let mut agent = GreedyAgent::new();
        let rival = Position::new(7, 0);
        let there = agent.select_move(&grid, Position::new(0, 1), rival);
        assert_eq!(there, Position::new(1, 1));
        let back = agent.select_move(&grid, there, rival);
        assert_eq!(back, Position::new(0, 1));
    }

    #[test]
    fn greedy_stays_put_without_legal_moves() {
        let grid = Grid::new(1);
        let mut agent = GreedyAgent::new();
        let chosen = agent.select_move(&grid, Position::new(0, 0), Position::new(0, 0));
        assert_eq!(chosen, Position::new(0, 0));
    }

    #[test]
    fn greedy_ignores_the_rival_position() {
        let mut grid = Grid::new(8);
        grid[Position::new(7, 7)] = Tile::Gold;

        let mut agent = GreedyAgent::new();
        let current = Position::new(4, 4);
        let near = agent.select_move(&grid, current, Position::new(4, 5));
        let far = agent.select_move(&grid, current, Position::new(0, 0));
        assert_eq!(near, far);
    }

    #[test]
    fn random_walker_is_deterministic_per_seed() {
        let grid = Grid::new(8);
        let mut first = RandomWalker::new(7);
        let mut second = RandomWalker::new(7);
        let rival = Position::new(0, 0);

        let mut pos_a = Position::new(4, 4);
        let mut pos_b = Position::new(4, 4);
        for _ in 0..20 {
            pos_a = first.select_move(&grid, pos_a, rival);
            pos_b = second.select_move(&grid, pos_b, rival);
            assert_eq!(pos_a, pos_b);
        }
    }

    #[test]
    fn random_walker_always_takes_a_legal_step() {
        let grid = Grid::new(8);
        let mut walker = RandomWalker::new(99);
        let rival = Position::new(0, 0);

        let mut pos = Position::new(0, 0);
        for _ in 0..200 {
            let next = walker.select_move(&grid, pos, rival);
            assert!(grid.in_bounds(next));
            assert_eq!(pos.manhattan_distance(next), 1);
            pos = next;
        }
    }

    #[test]
    fn random_walker_stays_put_without_legal_moves() {
        let grid = Grid::new(1);
        let mut walker = RandomWalker::new(1);
        let chosen = walker.select_move(&grid, Position::new(0, 0), Position::new(0, 0));
        assert_eq!(chosen, Position::new(0, 0));
    }
}
