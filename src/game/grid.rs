//! # Grid Model
//!
//! The board substrate: a fixed `rows x cols` array of cells with validity and
//! passability queries. Cells carry their static content (wall, collectible,
//! power-up) separately from the transient occupant tag stamped every tick.

use crate::game::{PowerUp, Position};
use serde::{Deserialize, Serialize};

/// What lies on a cell, independent of who stands on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellContent {
    Empty,
    Wall,
    Dot,
    PowerPellet,
    PowerUp(PowerUp),
}

impl CellContent {
    /// Whether the content can be picked up.
    pub fn is_collectible(&self) -> bool {
        matches!(
            self,
            CellContent::Dot | CellContent::PowerPellet | CellContent::PowerUp(_)
        )
    }
}

/// Entity standing on a cell as of the last completed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupant {
    Player,
    Pursuer(usize),
}

/// Flat tag of a cell as an external renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Empty,
    Wall,
    Dot,
    PowerPellet,
    Player,
    Pursuer,
    PowerUp,
}

/// A single board cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub content: CellContent,
    pub occupant: Option<Occupant>,
}

impl Cell {
    pub fn new(content: CellContent) -> Self {
        Self {
            content,
            occupant: None,
        }
    }

    pub fn wall() -> Self {
        Self::new(CellContent::Wall)
    }

    pub fn is_passable(&self) -> bool {
        self.content != CellContent::Wall
    }

    pub fn is_wall(&self) -> bool {
        self.content == CellContent::Wall
    }

    /// The rendered tag: occupants take precedence over content.
    pub fn kind(&self) -> CellKind {
        match self.occupant {
            Some(Occupant::Player) => CellKind::Player,
            Some(Occupant::Pursuer(_)) => CellKind::Pursuer,
            None => match self.content {
                CellContent::Empty => CellKind::Empty,
                CellContent::Wall => CellKind::Wall,
                CellContent::Dot => CellKind::Dot,
                CellContent::PowerPellet => CellKind::PowerPellet,
                CellContent::PowerUp(_) => CellKind::PowerUp,
            },
        }
    }

    /// Identifier of the pursuer standing here, if any.
    pub fn pursuer_id(&self) -> Option<usize> {
        match self.occupant {
            Some(Occupant::Pursuer(id)) => Some(id),
            _ => None,
        }
    }

    pub fn power_up(&self) -> Option<&PowerUp> {
        match &self.content {
            CellContent::PowerUp(power_up) => Some(power_up),
            _ => None,
        }
    }

    /// Removes any collectible, leaving walls untouched.
    pub fn clear(&mut self) {
        if self.content.is_collectible() {
            self.content = CellContent::Empty;
        }
    }
}

/// The maze board.
///
/// # Examples
///
/// ```
/// use mazechase::{Grid, Position};
///
/// let grid = Grid::new(10, 12);
/// assert!(grid.is_valid_position(Position::new(9, 11)));
/// assert!(!grid.is_passable(Position::new(3, 3))); // starts solid
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    player_spawn: Position,
    pursuer_anchor: Position,
}

impl Grid {
    /// Creates a grid filled entirely with walls.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::wall(); rows * cols],
            player_spawn: Self::default_player_spawn(rows, cols),
            pursuer_anchor: Position::new(1, 1),
        }
    }

    /// Fallback spawn used when no open cell can be found.
    pub fn default_player_spawn(rows: usize, cols: usize) -> Position {
        Position::new((rows / 2) as i32, (cols / 2) as i32)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn player_spawn(&self) -> Position {
        self.player_spawn
    }

    pub fn set_player_spawn(&mut self, position: Position) {
        self.player_spawn = position;
    }

    pub fn pursuer_anchor(&self) -> Position {
        self.pursuer_anchor
    }

    pub fn set_pursuer_anchor(&mut self, position: Position) {
        self.pursuer_anchor = position;
    }

    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.col >= 0 && (pos.row as usize) < self.rows && (pos.col as usize) < self.cols
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.is_valid_position(pos) {
            Some(pos.row as usize * self.cols + pos.col as usize)
        } else {
            None
        }
    }

    pub fn get(&self, pos: Position) -> Option<&Cell> {
        let index = self.index(pos)?;
        self.cells.get(index)
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        let index = self.index(pos)?;
        self.cells.get_mut(index)
    }

    /// Out-of-bounds positions count as walls.
    pub fn is_passable(&self, pos: Position) -> bool {
        self.get(pos).map_or(false, Cell::is_passable)
    }

    pub fn is_border(&self, pos: Position) -> bool {
        pos.row == 0
            || pos.col == 0
            || pos.row as usize == self.rows.saturating_sub(1)
            || pos.col as usize == self.cols.saturating_sub(1)
    }

    /// Out-of-bounds positions report [`CellKind::Wall`].
    pub fn cell_kind(&self, pos: Position) -> CellKind {
        self.get(pos).map_or(CellKind::Wall, Cell::kind)
    }

    pub fn content(&self, pos: Position) -> Option<&CellContent> {
        self.get(pos).map(|cell| &cell.content)
    }

    /// Replaces the content of a cell. Returns false when out of bounds.
    pub fn set_content(&mut self, pos: Position, content: CellContent) -> bool {
        match self.get_mut(pos) {
            Some(cell) => {
                cell.content = content;
                true
            }
            None => false,
        }
    }

    /// Iterates over every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.cols).map(move |col| Position::new(row as i32, col as i32))
        })
    }

    /// Iterates over positions that are not on the border ring.
    pub fn interior_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(move |&pos| !self.is_border(pos))
    }

    /// Passable cardinal neighbours of a position.
    pub fn passable_neighbors(&self, pos: Position) -> Vec<Position> {
        pos.cardinal_adjacent_positions()
            .into_iter()
            .filter(|&p| self.is_passable(p))
            .collect()
    }

    pub fn count_content(&self, predicate: impl Fn(&CellContent) -> bool) -> usize {
        self.cells.iter().filter(|cell| predicate(&cell.content)).count()
    }

    pub fn open_cell_count(&self) -> usize {
        self.count_content(|content| *content != CellContent::Wall)
    }

    /// Drops every occupant tag.
    pub fn clear_occupants(&mut self) {
        for cell in &mut self.cells {
            cell.occupant = None;
        }
    }

    /// Tags a cell with an occupant. Returns false when out of bounds.
    pub fn stamp_occupant(&mut self, pos: Position, occupant: Occupant) -> bool {
        match self.get_mut(pos) {
            Some(cell) => {
                cell.occupant = Some(occupant);
                true
            }
            None => false,
        }
    }

    /// Flat kind matrix, row by row.
    pub fn kinds(&self) -> Vec<Vec<CellKind>> {
        self.cells
            .chunks(self.cols.max(1))
            .map(|row| row.iter().map(Cell::kind).collect())
            .collect()
    }
}
