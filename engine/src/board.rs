use rand::Rng;
use tracing::{debug, instrument, trace};

use minesweeper_common::models::{CellView, ClickAction, GameStatus, Pos};

use crate::{cell::Cell, error::BoardError};

/// The grid of a single game. Cells live in a flat arena indexed by
/// `x + y * columns`.
#[derive(Debug, Clone)]
pub struct Board {
    columns: usize,
    rows: usize,
    mines: usize,
    cells: Vec<Cell>,
    status: GameStatus,
}

fn validate(columns: usize, rows: usize, mines: usize) -> Result<usize, BoardError> {
    match columns.checked_mul(rows) {
        Some(total) if total > 0 && mines <= total => Ok(total),
        _ => Err(BoardError::InvalidConfiguration {
            columns,
            rows,
            mines,
        }),
    }
}

impl Board {
    /// Places `mines` mines uniformly at random.
    ///
    /// The first `mines` entries of a pool of `columns * rows` cells are
    /// mines; the grid is filled column by column by drawing from the pool
    /// without replacement, so the mine count is always exact.
    #[instrument(level = "trace", skip(rng))]
    pub fn generate<R: Rng + ?Sized>(
        columns: usize,
        rows: usize,
        mines: usize,
        rng: &mut R,
    ) -> Result<Self, BoardError> {
        let total = validate(columns, rows, mines)?;

        let mut pool: Vec<bool> = (0..total).map(|i| i < mines).collect();
        let mut layout = vec![false; total];
        for x in 0..columns {
            for y in 0..rows {
                let pick = rng.random_range(0..pool.len());
                layout[x + y * columns] = pool.swap_remove(pick);
            }
        }

        debug!("Generated {}x{} board with {} mines", columns, rows, mines);
        Ok(Self::from_layout(columns, rows, mines, layout))
    }

    /// Builds a board with mines at exactly the given positions. Duplicate
    /// positions count once.
    pub fn from_mines(
        columns: usize,
        rows: usize,
        mine_positions: impl IntoIterator<Item = Pos>,
    ) -> Result<Self, BoardError> {
        let total = validate(columns, rows, 0)?;

        let mut layout = vec![false; total];
        for pos in mine_positions {
            if pos.x >= columns || pos.y >= rows {
                return Err(BoardError::OutOfBounds { pos, columns, rows });
            }
            layout[pos.x + pos.y * columns] = true;
        }

        let mines = layout.iter().filter(|&&mine| mine).count();
        Ok(Self::from_layout(columns, rows, mines, layout))
    }

    fn from_layout(columns: usize, rows: usize, mines: usize, layout: Vec<bool>) -> Self {
        let mut board = Self {
            columns,
            rows,
            mines,
            cells: layout.into_iter().map(Cell::new).collect(),
            status: GameStatus::Playing,
        };
        board.link_all();
        board
    }

    /// Links every cell to its neighbors, then counts adjacent mines once
    /// all links exist.
    fn link_all(&mut self) {
        let columns = self.columns;
        let rows = self.rows;
        for (index, cell) in self.cells.iter_mut().enumerate() {
            cell.link_neighbors(columns, rows, index % columns, index / columns);
        }

        let mine_mask: Vec<bool> = self.cells.iter().map(Cell::is_mine).collect();
        for cell in &mut self.cells {
            cell.compute_adjacent_mines(&mine_mask);
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn mines(&self) -> usize {
        self.mines
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    fn index(&self, pos: Pos) -> Result<usize, BoardError> {
        if pos.x < self.columns && pos.y < self.rows {
            Ok(pos.x + pos.y * self.columns)
        } else {
            Err(BoardError::OutOfBounds {
                pos,
                columns: self.columns,
                rows: self.rows,
            })
        }
    }

    fn pos_of(&self, index: usize) -> Pos {
        Pos::new(index % self.columns, index / self.columns)
    }

    pub fn cell(&self, pos: Pos) -> Option<&Cell> {
        self.index(pos).ok().map(|index| &self.cells[index])
    }

    pub fn view(&self, pos: Pos) -> Option<CellView> {
        self.cell(pos).map(Cell::view)
    }

    /// Render state of the whole grid, one `Vec` per row.
    pub fn views(&self) -> Vec<Vec<CellView>> {
        self.cells
            .chunks(self.columns)
            .map(|row| row.iter().map(Cell::view).collect())
            .collect()
    }

    pub fn mine_positions(&self) -> Vec<Pos> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_mine())
            .map(|(index, _)| self.pos_of(index))
            .collect()
    }

    pub fn flag_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_flagged()).count()
    }

    pub fn covered_safe_cells(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| !cell.is_mine() && cell.is_covered())
            .count()
    }

    /// Applies one player action and re-evaluates the win condition.
    ///
    /// Clicks on a finished game change nothing and return the final status.
    #[instrument(level = "trace", skip(self), fields(x = pos.x, y = pos.y))]
    pub fn click(&mut self, pos: Pos, action: ClickAction) -> Result<GameStatus, BoardError> {
        let index = self.index(pos)?;

        if self.status.is_finished() {
            debug!("Ignoring {:?} on finished board", action);
            return Ok(self.status);
        }

        match action {
            ClickAction::Flag => self.cells[index].toggle_flag(),
            ClickAction::Reveal => {
                let cell = &self.cells[index];
                if cell.is_flagged() {
                    debug!("Ignoring reveal on flagged cell ({}, {})", pos.x, pos.y);
                } else if cell.is_mine() {
                    debug!("Mine revealed at ({}, {})", pos.x, pos.y);
                    self.status = GameStatus::Lost;
                    return Ok(self.status);
                } else {
                    self.reveal_index(index);
                }
            }
        }

        if self.check_win() {
            debug!("All safe cells revealed");
            self.status = GameStatus::Won;
        }
        Ok(self.status)
    }

    /// Uncovers the cell at `pos`, flooding outwards first when it has no
    /// adjacent mines. Returns how many cells were uncovered.
    ///
    /// This is the raw uncover step and skips every guard `click` applies:
    /// flagged cells are uncovered, a mine is uncovered without losing the
    /// game, finished games are not protected and the win is not re-checked.
    /// Hosts handling player input must go through [`Board::click`].
    pub fn reveal(&mut self, pos: Pos) -> Result<usize, BoardError> {
        let index = self.index(pos)?;
        Ok(self.reveal_index(index))
    }

    fn reveal_index(&mut self, index: usize) -> usize {
        if !self.cells[index].is_covered() {
            return 0;
        }
        if self.cells[index].adjacent_mines() == 0 {
            return self.flood_reveal(index);
        }
        usize::from(self.cells[index].uncover())
    }

    /// Depth-first uncover of the zero region containing `start` plus its
    /// border. A cell is uncovered before it is pushed, so each cell enters
    /// the stack at most once.
    fn flood_reveal(&mut self, start: usize) -> usize {
        let mut uncovered = usize::from(self.cells[start].uncover());
        let mut stack = vec![start];

        while let Some(index) = stack.pop() {
            let neighbors = self.cells[index].neighbors().to_vec();
            for neighbor in neighbors {
                let cell = &mut self.cells[neighbor];
                if cell.uncover() {
                    uncovered += 1;
                    if cell.adjacent_mines() == 0 {
                        stack.push(neighbor);
                    }
                }
            }
        }

        trace!("Flood reveal uncovered {} cells", uncovered);
        uncovered
    }

    /// `true` when no safe cell is covered and no safe cell is flagged.
    /// A flag left on a safe cell blocks the win even once it is uncovered.
    pub fn check_win(&self) -> bool {
        self.cells
            .iter()
            .filter(|cell| !cell.is_mine())
            .all(|cell| !cell.is_covered() && !cell.is_flagged())
    }
}
