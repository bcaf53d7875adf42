use minesweeper_common::models::CellView;

/// Neighbor offsets in enumeration order: top-left, top, top-right, left,
/// right, bottom-left, bottom, bottom-right.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// One grid position.
///
/// `neighbors` holds arena indices into the owning board's cell storage,
/// never the cells themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    mine: bool,
    covered: bool,
    flagged: bool,
    adjacent_mines: u8,
    neighbors: Vec<usize>,
}

impl Cell {
    pub fn new(mine: bool) -> Self {
        Self {
            mine,
            covered: true,
            flagged: false,
            adjacent_mines: 0,
            neighbors: Vec::new(),
        }
    }

    pub fn is_mine(&self) -> bool {
        self.mine
    }

    pub fn is_covered(&self) -> bool {
        self.covered
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }

    pub fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }

    pub fn neighbors(&self) -> &[usize] {
        &self.neighbors
    }

    /// Records the arena index of every in-bounds cell around `(x, y)`.
    pub(crate) fn link_neighbors(&mut self, columns: usize, rows: usize, x: usize, y: usize) {
        self.neighbors.clear();
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy)) else {
                continue;
            };
            if nx < columns && ny < rows {
                self.neighbors.push(nx + ny * columns);
            }
        }
    }

    /// Counts mines among the linked neighbors. A mine counts every linked
    /// neighbor instead; renderers never show a mine's count.
    pub(crate) fn compute_adjacent_mines(&mut self, mine_mask: &[bool]) {
        let count = if self.mine {
            self.neighbors.len()
        } else {
            self.neighbors
                .iter()
                .filter(|&&index| mine_mask[index])
                .count()
        };
        self.adjacent_mines = count as u8;
    }

    pub fn toggle_flag(&mut self) {
        self.flagged = !self.flagged;
    }

    /// Returns `true` if the cell was covered before the call.
    pub(crate) fn uncover(&mut self) -> bool {
        std::mem::replace(&mut self.covered, false)
    }

    pub fn view(&self) -> CellView {
        match (self.covered, self.flagged) {
            (true, true) => CellView::Flagged,
            (true, false) => CellView::Covered,
            _ if self.mine => CellView::Mine,
            _ if self.adjacent_mines == 0 => CellView::Empty,
            _ => CellView::Numbered {
                adjacent: self.adjacent_mines,
            },
        }
    }
}
