//! # Maze Generation
//!
//! Randomized depth-first spanning-tree carving.
//!
//! Odd interior coordinates act as graph nodes two cells apart. The walk starts
//! at (1,1), repeatedly carves into a random unvisited node together with the
//! wall between them, and backtracks when stuck. The result is a perfect maze:
//! every open cell is reachable from every other one.
//!
//! After carving, the border ring is forced to wall, open cells are filled
//! with dots and power pellets, and the player spawn and pursuer anchor are
//! located by breadth-first search.

use crate::game::{CellContent, Grid, Position};
use crate::utils::{nearest_cell, reachable_cells};
use crate::{config, create_rng, ChaseError, ChaseResult, GenerationConfig, Generator};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::Rng;

/// Node offsets two cells apart.
const NODE_STEPS: [(i32, i32); 4] = [(-2, 0), (0, 2), (2, 0), (0, -2)];

/// Spanning-tree maze generator.
#[derive(Debug, Clone, Default)]
pub struct MazeGenerator;

impl MazeGenerator {
    pub fn new() -> Self {
        Self
    }

    fn is_node(rows: usize, cols: usize, pos: Position) -> bool {
        pos.row > 0
            && pos.col > 0
            && (pos.row as usize) < rows - 1
            && (pos.col as usize) < cols - 1
            && pos.row % 2 == 1
            && pos.col % 2 == 1
    }

    /// Carves passages with an explicit stack.
    fn carve(&self, grid: &mut Grid, rng: &mut StdRng) {
        let (rows, cols) = (grid.rows(), grid.cols());
        let start = Position::new(1, 1);
        let mut visited = vec![false; rows * cols];
        let index = move |pos: Position| pos.row as usize * cols + pos.col as usize;

        grid.set_content(start, CellContent::Empty);
        visited[index(start)] = true;
        let mut stack = vec![start];

        while let Some(&current) = stack.last() {
            let unvisited: Vec<Position> = NODE_STEPS
                .iter()
                .map(|&(dr, dc)| Position::new(current.row + dr, current.col + dc))
                .filter(|&next| Self::is_node(rows, cols, next) && !visited[index(next)])
                .collect();

            if unvisited.is_empty() {
                stack.pop();
                continue;
            }

            let next = unvisited[rng.gen_range(0..unvisited.len())];
            let between = Position::new(
                current.row + (next.row - current.row) / 2,
                current.col + (next.col - current.col) / 2,
            );
            grid.set_content(next, CellContent::Empty);
            grid.set_content(between, CellContent::Empty);
            visited[index(next)] = true;
            visited[index(between)] = true;
            stack.push(next);
        }
    }

    fn seal_border(&self, grid: &mut Grid) {
        let border: Vec<Position> = grid.positions().filter(|&pos| grid.is_border(pos)).collect();
        for pos in border {
            grid.set_content(pos, CellContent::Wall);
        }
    }

    fn fill_collectibles(&self, grid: &mut Grid, dot_chance: f64, rng: &mut StdRng) {
        let open: Vec<Position> = grid
            .interior_positions()
            .filter(|&pos| grid.content(pos) == Some(&CellContent::Empty))
            .collect();
        for pos in open {
            let content = if rng.gen_bool(dot_chance) {
                CellContent::Dot
            } else {
                CellContent::PowerPellet
            };
            grid.set_content(pos, content);
        }
    }

    /// Nearest empty or dotted cell to `target`, searching through walls.
    fn nearest_open(grid: &Grid, target: Position) -> Option<Position> {
        nearest_cell(grid, target, true, |pos| {
            matches!(grid.content(pos), Some(CellContent::Empty | CellContent::Dot))
        })
    }

    fn place_spawns(&self, grid: &mut Grid) {
        let center = Grid::default_player_spawn(grid.rows(), grid.cols());
        let spawn = Self::nearest_open(grid, center).unwrap_or_else(|| {
            warn!("no open cell near the centre, using default player spawn {}", center);
            center
        });
        grid.set_content(spawn, CellContent::Empty);
        grid.set_player_spawn(spawn);

        let corner = Position::new(1, 1);
        let anchor = Self::nearest_open(grid, corner).unwrap_or(corner);
        if anchor != spawn {
            grid.set_content(anchor, CellContent::Empty);
        }
        grid.set_pursuer_anchor(anchor);
    }
}

impl Generator<Grid> for MazeGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> ChaseResult<Grid> {
        if config.rows < config::MIN_MAZE_DIMENSION || config.cols < config::MIN_MAZE_DIMENSION {
            return Err(ChaseError::GenerationFailed(format!(
                "maze of {}x{} is below the {}x{} minimum",
                config.rows,
                config.cols,
                config::MIN_MAZE_DIMENSION,
                config::MIN_MAZE_DIMENSION
            )));
        }
        if !(0.0..=1.0).contains(&config.dot_chance) {
            return Err(ChaseError::GenerationFailed(format!(
                "dot chance {} is not a probability",
                config.dot_chance
            )));
        }

        let mut grid = Grid::new(config.rows, config.cols);
        self.carve(&mut grid, rng);
        self.seal_border(&mut grid);
        self.fill_collectibles(&mut grid, config.dot_chance, rng);
        self.place_spawns(&mut grid);

        debug!(
            "{} carved {}x{} maze with {} open cells, spawn {}",
            self.generator_type(),
            config.rows,
            config.cols,
            grid.open_cell_count(),
            grid.player_spawn()
        );
        Ok(grid)
    }

    fn validate(&self, grid: &Grid, config: &GenerationConfig) -> ChaseResult<()> {
        if grid.rows() != config.rows || grid.cols() != config.cols {
            return Err(ChaseError::GenerationFailed(format!(
                "board is {}x{}, expected {}x{}",
                grid.rows(),
                grid.cols(),
                config.rows,
                config.cols
            )));
        }

        if let Some(leak) = grid
            .positions()
            .find(|&pos| grid.is_border(pos) && grid.is_passable(pos))
        {
            return Err(ChaseError::GenerationFailed(format!(
                "border cell {} is open",
                leak
            )));
        }

        let open = grid.open_cell_count();
        let ratio = open as f64 / (grid.rows() * grid.cols()) as f64;
        if ratio < config.min_open_ratio {
            return Err(ChaseError::GenerationFailed(format!(
                "only {:.1}% of the board is open",
                ratio * 100.0
            )));
        }

        let reached = reachable_cells(grid, grid.player_spawn()).len();
        if reached != open {
            return Err(ChaseError::GenerationFailed(format!(
                "{} of {} open cells reachable from spawn {}",
                reached,
                open,
                grid.player_spawn()
            )));
        }

        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "MazeGenerator"
    }
}

/// Generates a maze with the classic settings.
///
/// # Examples
///
/// ```
/// use mazechase::{generate_maze, Position};
///
/// let grid = generate_maze(20, 25, 7).unwrap();
/// assert!(!grid.is_passable(Position::new(0, 0)));
/// assert!(grid.is_passable(grid.player_spawn()));
/// ```
pub fn generate_maze(rows: usize, cols: usize, seed: u64) -> ChaseResult<Grid> {
    let config = GenerationConfig::new(rows, cols, seed);
    let mut rng = create_rng(&config);
    MazeGenerator::new().generate(&config, &mut rng)
}
