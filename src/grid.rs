//! Static structural model of a crossword grid.
//!
//! A grid is a rectangle of open and blocked cells. Every maximal run of two
//! or more open cells — across or down — is a [`Slot`]: one variable of the
//! fill problem. Wherever an across slot and a down slot share a cell, an
//! [`Overlap`] records the index of that cell within each slot; those index
//! pairs are the only constraints between slots.
//!
//! The model is immutable once built: slots and overlaps are computed exactly
//! once from the cell layout and never change during solving.

use itertools::iproduct;
use smallvec::SmallVec;

use crate::errors::GridError;
use crate::MAX_SLOT_LENGTH;

/// An identifier for a slot, based on its index in the grid's `slots` field.
pub type SlotId = usize;

/// Zero-indexed (row, col) coordinates for a cell, where row 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Across,
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A maximal run of open cells in one orientation; one variable of the fill.
///
/// Immutable after grid construction.
#[derive(Debug, Clone)]
pub struct Slot {
    pub id: SlotId,
    pub start: GridCoord,
    pub direction: Direction,
    pub length: usize,
    pub cells: SmallVec<[GridCoord; MAX_SLOT_LENGTH]>,
}

/// A shared cell between two distinct slots.
///
/// `a_index` and `b_index` are the zero-based positions of the shared cell
/// within slot `a` and slot `b` respectively; they always name the same
/// physical cell, so a consistent assignment must place the same letter at
/// both positions. Slot `a` always runs across and slot `b` down — two slots
/// of the same orientation never intersect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub a: SlotId,
    pub b: SlotId,
    pub a_index: usize,
    pub b_index: usize,
}

/// The puzzle structure: cells, slots, and the overlaps between slots.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    open: Vec<Vec<bool>>,
    slots: Vec<Slot>,
    overlaps: Vec<Overlap>,
}

impl Grid {
    /// Build a grid from a cell layout: `true` is an open (fillable) cell.
    ///
    /// # Errors
    ///
    /// Returns a [`GridError`] if the layout is empty or ragged, if an open
    /// cell belongs to no slot (a would-be slot of length one is not a real
    /// word slot), or if the layout contains no slots at all.
    pub fn from_cells(open: Vec<Vec<bool>>) -> Result<Grid, GridError> {
        let height = open.len();
        let width = open.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(GridError::EmptyLayout);
        }
        for (row, cells) in open.iter().enumerate() {
            if cells.len() != width {
                return Err(GridError::RaggedLayout { row, expected: width, found: cells.len() });
            }
        }

        let slots = scan_slots(&open, width, height);

        // Every open cell must be covered by at least one slot. A lone open
        // cell would otherwise be a length-one "slot", which is not a word.
        let mut covered = vec![vec![false; width]; height];
        for slot in &slots {
            for &(r, c) in &slot.cells {
                covered[r][c] = true;
            }
        }
        for (row, col) in iproduct!(0..height, 0..width) {
            if open[row][col] && !covered[row][col] {
                return Err(GridError::IsolatedCell { row, col });
            }
        }

        if slots.is_empty() {
            return Err(GridError::NoSlots);
        }

        let overlaps = compute_overlaps(&slots);
        log::debug!(
            "grid {width}x{height}: {} slots, {} overlaps",
            slots.len(),
            overlaps.len()
        );

        Ok(Grid { width, height, open, slots, overlaps })
    }

    /// Parse a grid from in-memory layout text: one row per line, `_` or `.`
    /// for an open cell, `#` for a blocked cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnexpectedCharacter`] for any other character, and
    /// the structural errors of [`Grid::from_cells`].
    pub fn parse_from_str(layout: &str) -> Result<Grid, GridError> {
        let mut cells: Vec<Vec<bool>> = Vec::new();
        for (row, line) in layout.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            let mut row_cells = Vec::with_capacity(line.len());
            for (col, ch) in line.chars().enumerate() {
                match ch {
                    '_' | '.' => row_cells.push(true),
                    '#' => row_cells.push(false),
                    _ => return Err(GridError::UnexpectedCharacter { ch, row, col }),
                }
            }
            cells.push(row_cells);
        }
        Self::from_cells(cells)
    }

    /// Convenience method: read a layout file and parse it.
    ///
    /// # Errors
    ///
    /// Will return an `Error` if the file cannot be read or the layout is
    /// malformed (the [`GridError`] is converted to `io::Error`).
    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<Grid> {
        let path_ref = path.as_ref();
        let data = std::fs::read_to_string(path_ref).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("failed to read grid layout from '{}': {}", path_ref.display(), e),
            )
        })?;
        Ok(Self::parse_from_str(&data)?)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the cell at (row, col) is fillable.
    #[must_use]
    pub fn is_open(&self, row: usize, col: usize) -> bool {
        self.open[row][col]
    }

    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    #[must_use]
    pub fn slot(&self, id: SlotId) -> &Slot {
        &self.slots[id]
    }

    #[must_use]
    pub fn overlaps(&self) -> &[Overlap] {
        &self.overlaps
    }
}

/// Extract every maximal run of >= 2 open cells, across rows first, then down
/// columns. Slot ids are assigned in scan order, so they are deterministic for
/// a given layout.
fn scan_slots(open: &[Vec<bool>], width: usize, height: usize) -> Vec<Slot> {
    let mut slots: Vec<Slot> = Vec::new();

    let mut push_run = |cells: &mut SmallVec<[GridCoord; MAX_SLOT_LENGTH]>, direction: Direction| {
        if cells.len() >= 2 {
            slots.push(Slot {
                id: slots.len(),
                start: cells[0],
                direction,
                length: cells.len(),
                cells: std::mem::take(cells),
            });
        } else {
            cells.clear();
        }
    };

    for row in 0..height {
        let mut run: SmallVec<[GridCoord; MAX_SLOT_LENGTH]> = SmallVec::new();
        for col in 0..width {
            if open[row][col] {
                run.push((row, col));
            } else {
                push_run(&mut run, Direction::Across);
            }
        }
        push_run(&mut run, Direction::Across);
    }

    for col in 0..width {
        let mut run: SmallVec<[GridCoord; MAX_SLOT_LENGTH]> = SmallVec::new();
        for row in 0..height {
            if open[row][col] {
                run.push((row, col));
            } else {
                push_run(&mut run, Direction::Down);
            }
        }
        push_run(&mut run, Direction::Down);
    }

    slots
}

/// Pair up across and down slots that share a cell. An across/down pair can
/// share at most one cell, and same-orientation slots never intersect, so a
/// cell-to-across map is enough to find every overlap in one pass.
fn compute_overlaps(slots: &[Slot]) -> Vec<Overlap> {
    let mut across_at: std::collections::HashMap<GridCoord, (SlotId, usize)> =
        std::collections::HashMap::new();
    for slot in slots.iter().filter(|s| s.direction == Direction::Across) {
        for (i, &cell) in slot.cells.iter().enumerate() {
            across_at.insert(cell, (slot.id, i));
        }
    }

    let mut overlaps = Vec::new();
    for slot in slots.iter().filter(|s| s.direction == Direction::Down) {
        for (b_index, cell) in slot.cells.iter().enumerate() {
            if let Some(&(a, a_index)) = across_at.get(cell) {
                overlaps.push(Overlap { a, b: slot.id, a_index, b_index });
            }
        }
    }
    overlaps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_row_is_one_across_slot() {
        let grid = Grid::parse_from_str("_____").unwrap();

        assert_eq!(grid.slots().len(), 1);
        let slot = grid.slot(0);
        assert_eq!(slot.direction, Direction::Across);
        assert_eq!(slot.length, 5);
        assert_eq!(slot.start, (0, 0));
        assert!(grid.overlaps().is_empty());
    }

    #[test]
    fn test_open_square_has_four_slots() {
        let grid = Grid::parse_from_str("__\n__").unwrap();

        assert_eq!(grid.slots().len(), 4);
        let across: Vec<_> =
            grid.slots().iter().filter(|s| s.direction == Direction::Across).collect();
        let down: Vec<_> =
            grid.slots().iter().filter(|s| s.direction == Direction::Down).collect();
        assert_eq!(across.len(), 2);
        assert_eq!(down.len(), 2);
        // every across/down pair shares exactly one cell
        assert_eq!(grid.overlaps().len(), 4);
    }

    #[test]
    fn test_overlap_indices_name_the_same_cell() {
        let grid = Grid::parse_from_str("___\n#_#\n#_#").unwrap();

        // one across slot (row 0) and one down slot (column 1)
        assert_eq!(grid.slots().len(), 2);
        assert_eq!(grid.overlaps().len(), 1);

        let overlap = grid.overlaps()[0];
        let a = grid.slot(overlap.a);
        let b = grid.slot(overlap.b);
        assert_eq!(a.direction, Direction::Across);
        assert_eq!(b.direction, Direction::Down);
        assert_eq!(a.cells[overlap.a_index], b.cells[overlap.b_index]);
        assert_eq!(a.cells[overlap.a_index], (0, 1));
        assert_eq!(overlap.a_index, 1);
        assert_eq!(overlap.b_index, 0);
    }

    #[test]
    fn test_blocked_cells_split_runs() {
        let grid = Grid::parse_from_str("__#__").unwrap();

        assert_eq!(grid.slots().len(), 2);
        assert_eq!(grid.slot(0).length, 2);
        assert_eq!(grid.slot(1).start, (0, 3));
    }

    #[test]
    fn test_dot_is_an_open_cell() {
        let grid = Grid::parse_from_str("..\n..").unwrap();
        assert_eq!(grid.slots().len(), 4);
        assert!(grid.is_open(0, 0));
    }

    #[test]
    fn test_ragged_layout_is_rejected() {
        let err = Grid::parse_from_str("___\n__").unwrap_err();
        assert!(matches!(
            err,
            GridError::RaggedLayout { row: 1, expected: 3, found: 2 }
        ));
    }

    #[test]
    fn test_empty_layout_is_rejected() {
        assert!(matches!(Grid::parse_from_str(""), Err(GridError::EmptyLayout)));
        assert!(matches!(Grid::from_cells(vec![]), Err(GridError::EmptyLayout)));
    }

    #[test]
    fn test_unexpected_character_is_rejected() {
        let err = Grid::parse_from_str("__\n_x").unwrap_err();
        assert!(matches!(
            err,
            GridError::UnexpectedCharacter { ch: 'x', row: 1, col: 1 }
        ));
    }

    #[test]
    fn test_isolated_cell_is_rejected() {
        // the centre cell touches nothing: no run of length >= 2 covers it
        let err = Grid::parse_from_str("__#\n##_\n###").unwrap_err();
        assert!(matches!(err, GridError::IsolatedCell { row: 1, col: 2 }));
    }

    #[test]
    fn test_all_blocked_has_no_slots() {
        let err = Grid::parse_from_str("##\n##").unwrap_err();
        assert!(matches!(err, GridError::NoSlots));
    }

    #[test]
    fn test_cell_in_long_crossing_run_is_not_isolated() {
        // column 0 is a down slot; its cells form length-1 across runs, which
        // is fine because the down slot covers them
        let grid = Grid::parse_from_str("_#\n_#\n_#").unwrap();
        assert_eq!(grid.slots().len(), 1);
        assert_eq!(grid.slot(0).direction, Direction::Down);
    }

    #[test]
    fn test_slot_ids_are_scan_ordered() {
        let grid = Grid::parse_from_str("___\n___\n___").unwrap();

        // three across rows first, then three down columns
        for id in 0..3 {
            assert_eq!(grid.slot(id).direction, Direction::Across);
            assert_eq!(grid.slot(id).start, (id, 0));
        }
        for id in 3..6 {
            assert_eq!(grid.slot(id).direction, Direction::Down);
            assert_eq!(grid.slot(id).start, (0, id - 3));
        }
        assert_eq!(grid.overlaps().len(), 9);
    }
}
