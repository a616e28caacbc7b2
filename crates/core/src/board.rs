//! Board module - manages the playfield grid
//!
//! The board is a `width` x `height` grid where each cell is empty or holds the
//! kind whose color it shows. Cells live in one flat, row-major vector.
//! Coordinates: `(x, y)` with `x` in `0..width` (left to right) and `y` in
//! `0..height` (top to bottom).

use crate::types::Cell;

/// The playfield grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    /// Rebuild a board from rows; `None` unless every row is `width` long
    pub fn from_rows(rows: &[Vec<Cell>], width: usize) -> Option<Self> {
        if rows.iter().any(|row| row.len() != width) {
            return None;
        }
        Some(Self {
            width,
            height: rows.len(),
            cells: rows.iter().flatten().copied().collect(),
        })
    }

    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some((y as usize) * self.width + (x as usize))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        self.row(y)
            .map(|row| row.iter().all(|cell| cell.is_some()))
            .unwrap_or(false)
    }

    /// Whether any cell of the top visible row is filled
    pub fn top_row_occupied(&self) -> bool {
        self.row(0)
            .map(|row| row.iter().any(|cell| cell.is_some()))
            .unwrap_or(false)
    }

    /// One row of cells
    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        Some(&self.cells[start..start + self.width])
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        // chunks() panics on zero; an empty board yields no rows either way.
        self.cells.chunks(self.width.max(1))
    }

    /// Remove every full row, shift the rest down and pad empty rows on top.
    /// Returns the number of rows removed.
    ///
    /// Two-pointer compaction, bottom to top, in place.
    pub fn clear_full_rows(&mut self) -> usize {
        let width = self.width;
        let mut write_y = self.height;

        for read_y in (0..self.height).rev() {
            if self.is_row_full(read_y) {
                continue;
            }
            write_y -= 1;
            if write_y != read_y {
                let src_start = read_y * width;
                self.cells
                    .copy_within(src_start..src_start + width, write_y * width);
            }
        }

        // Whatever is left above the write pointer becomes fresh empty rows.
        self.cells[..write_y * width].fill(None);
        write_y
    }

    /// Copy of the grid as rows
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.rows().map(<[Cell]>::to_vec).collect()
    }

    /// Count of filled cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceKind;

    fn fill_row(board: &mut Board, y: i32) {
        for x in 0..board.width() as i32 {
            board.set(x, y, Some(PieceKind::I));
        }
    }

    #[test]
    fn test_board_bounds() {
        let board = Board::new(10, 20);
        assert_eq!(board.get(0, 0), Some(None));
        assert_eq!(board.get(9, 19), Some(None));
        assert_eq!(board.get(-1, 0), None);
        assert_eq!(board.get(10, 0), None);
        assert_eq!(board.get(0, 20), None);
    }

    #[test]
    fn test_board_flat_layout() {
        let mut board = Board::new(7, 9);
        board.set(5, 2, Some(PieceKind::T));
        assert_eq!(board.cells[2 * 7 + 5], Some(PieceKind::T));
        assert_eq!(board.rows().count(), 9);
        assert!(board.rows().all(|row| row.len() == 7));
    }

    #[test]
    fn test_clear_keeps_order_of_remaining_rows() {
        let mut board = Board::new(4, 6);
        board.set(0, 1, Some(PieceKind::S));
        fill_row(&mut board, 2);
        board.set(3, 3, Some(PieceKind::Z));
        fill_row(&mut board, 4);
        fill_row(&mut board, 5);

        assert_eq!(board.clear_full_rows(), 3);
        assert_eq!(board.rows().count(), 6);
        // S moved from row 1 to row 4, Z from row 3 to row 5.
        assert_eq!(board.get(0, 4), Some(Some(PieceKind::S)));
        assert_eq!(board.get(3, 5), Some(Some(PieceKind::Z)));
        assert_eq!(board.filled_count(), 2);
    }

    #[test]
    fn test_clear_without_full_rows_is_noop() {
        let mut board = Board::new(5, 5);
        board.set(1, 4, Some(PieceKind::O));
        let before = board.clone();
        assert_eq!(board.clear_full_rows(), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_top_row_detection() {
        let mut board = Board::new(5, 5);
        assert!(!board.top_row_occupied());
        board.set(4, 0, Some(PieceKind::L));
        assert!(board.top_row_occupied());
    }

    #[test]
    fn test_rows_roundtrip() {
        let mut board = Board::new(3, 2);
        board.set(2, 1, Some(PieceKind::J));
        let rows = board.to_rows();
        assert_eq!(Board::from_rows(&rows, 3), Some(board));
        assert_eq!(Board::from_rows(&[vec![None; 2]], 3), None);
    }
}
