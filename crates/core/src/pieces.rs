//! Pieces module - the piece catalog and occupancy matrices
//!
//! Every kind is described by a square occupancy matrix whose edge equals the
//! kind's native size (4 for tetrominoes up to 7 for heptominoes). Rotation is
//! a plain clockwise matrix rotation: `rotated[j][n - 1 - i] = shape[i][j]`.

use arrayvec::ArrayVec;

use crate::types::{PieceKind, Rgb, MAX_PIECE_SIZE, MIN_PIECE_SIZE};

/// Largest matrix edge
pub const MAX_EDGE: usize = MAX_PIECE_SIZE as usize;

/// Offset of a single occupied cell relative to the matrix origin, `(column, row)`
pub type CellOffset = (i32, i32);

/// Occupied offsets of a matrix, stack-only
pub type CellOffsets = ArrayVec<CellOffset, { MAX_EDGE * MAX_EDGE }>;

/// Square occupancy matrix of a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeMatrix {
    size: u8,
    cells: [[bool; MAX_EDGE]; MAX_EDGE],
}

impl ShapeMatrix {
    /// Build from text rows where `#` marks an occupied cell.
    ///
    /// The edge is the number of rows; characters beyond it are ignored.
    fn from_rows(rows: &[&str]) -> Self {
        let size = rows.len().min(MAX_EDGE);
        let mut cells = [[false; MAX_EDGE]; MAX_EDGE];
        for (i, row) in rows.iter().take(size).enumerate() {
            for (j, ch) in row.chars().take(size).enumerate() {
                cells[i][j] = ch == '#';
            }
        }
        Self {
            size: size as u8,
            cells,
        }
    }

    /// Build from an `n`x`n` grid of 0/1 values.
    ///
    /// Returns `None` when the grid is empty, not square, or larger than the
    /// biggest supported piece.
    pub fn from_grid(rows: &[Vec<u8>]) -> Option<Self> {
        let size = rows.len();
        if size == 0 || size > MAX_EDGE || rows.iter().any(|row| row.len() != size) {
            return None;
        }
        let mut cells = [[false; MAX_EDGE]; MAX_EDGE];
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                cells[i][j] = v != 0;
            }
        }
        Some(Self {
            size: size as u8,
            cells,
        })
    }

    /// Matrix as a grid of 0/1 values (the inverse of [`ShapeMatrix::from_grid`])
    pub fn to_grid(&self) -> Vec<Vec<u8>> {
        let n = self.size as usize;
        (0..n)
            .map(|i| (0..n).map(|j| u8::from(self.cells[i][j])).collect())
            .collect()
    }

    /// Edge length of the matrix
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Whether the cell at `(row, col)` is occupied; out of range is empty
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.size as usize && col < self.size as usize && self.cells[row][col]
    }

    /// Number of occupied cells
    pub fn cell_count(&self) -> usize {
        self.offsets().len()
    }

    /// Occupied cells as `(column, row)` offsets, row-major order
    pub fn offsets(&self) -> CellOffsets {
        let n = self.size as usize;
        let mut out = CellOffsets::new();
        for i in 0..n {
            for j in 0..n {
                if self.cells[i][j] {
                    out.push((j as i32, i as i32));
                }
            }
        }
        out
    }

    /// Matrix rotated 90° clockwise
    pub fn rotated_cw(&self) -> Self {
        let n = self.size as usize;
        let mut cells = [[false; MAX_EDGE]; MAX_EDGE];
        for i in 0..n {
            for j in 0..n {
                cells[j][n - 1 - i] = self.cells[i][j];
            }
        }
        Self {
            size: self.size,
            cells,
        }
    }
}

/// A piece: kind, occupancy matrix, color and top-left anchor on the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: ShapeMatrix,
    pub color: Rgb,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Create a piece in its catalog orientation, anchored at the origin
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: shape(kind),
            color: color(kind),
            x: 0,
            y: 0,
        }
    }

    /// Width of the occupancy matrix
    pub fn width(&self) -> i32 {
        self.shape.size() as i32
    }

    /// Absolute field coordinates of every occupied cell
    pub fn cells(&self) -> CellOffsets {
        self.shape
            .offsets()
            .into_iter()
            .map(|(dx, dy)| (self.x + dx, self.y + dy))
            .collect()
    }
}

/// Catalog occupancy matrix of a kind
pub fn shape(kind: PieceKind) -> ShapeMatrix {
    ShapeMatrix::from_rows(rows(kind))
}

/// Display color of a kind
pub fn color(kind: PieceKind) -> Rgb {
    use PieceKind::*;
    match kind {
        I => Rgb::new(80, 220, 220),
        O => Rgb::new(240, 220, 80),
        T => Rgb::new(200, 120, 220),
        S => Rgb::new(100, 220, 120),
        Z => Rgb::new(220, 80, 80),
        J => Rgb::new(80, 120, 220),
        L => Rgb::new(255, 165, 0),
        F5 => Rgb::new(255, 120, 160),
        I5 => Rgb::new(120, 240, 255),
        L5 => Rgb::new(255, 190, 60),
        N5 => Rgb::new(170, 110, 60),
        P5 => Rgb::new(150, 200, 255),
        T5 => Rgb::new(220, 150, 255),
        U5 => Rgb::new(255, 230, 140),
        V5 => Rgb::new(130, 255, 170),
        W5 => Rgb::new(255, 140, 90),
        X5 => Rgb::new(240, 240, 240),
        Y5 => Rgb::new(180, 230, 90),
        Z5 => Rgb::new(255, 100, 120),
        I6 => Rgb::new(60, 190, 200),
        L6 => Rgb::new(230, 130, 30),
        J6 => Rgb::new(90, 90, 230),
        O6 => Rgb::new(230, 200, 40),
        T6 => Rgb::new(170, 80, 200),
        Y6 => Rgb::new(110, 200, 60),
        S6 => Rgb::new(60, 170, 100),
        U6 => Rgb::new(200, 90, 140),
        I7 => Rgb::new(40, 160, 180),
        L7 => Rgb::new(210, 110, 20),
        J7 => Rgb::new(70, 70, 200),
        T7 => Rgb::new(150, 60, 180),
        U7 => Rgb::new(180, 70, 120),
        H7 => Rgb::new(200, 200, 200),
        P7 => Rgb::new(120, 150, 220),
        S7 => Rgb::new(50, 150, 80),
    }
}

/// Kinds available at a piece size: every kind whose native size is not larger.
///
/// Sizes below the smallest catalog size fall back to tetrominoes.
pub fn available(piece_size: u8) -> Vec<PieceKind> {
    let limit = piece_size.max(MIN_PIECE_SIZE);
    PieceKind::ALL
        .iter()
        .copied()
        .filter(|kind| kind.native_size() <= limit)
        .collect()
}

fn rows(kind: PieceKind) -> &'static [&'static str] {
    use PieceKind::*;
    match kind {
        I => &["....", "####", "....", "...."],
        O => &[".##.", ".##.", "....", "...."],
        T => &[".#..", "###.", "....", "...."],
        S => &[".##.", "##..", "....", "...."],
        Z => &["##..", ".##.", "....", "...."],
        J => &["#...", "###.", "....", "...."],
        L => &["..#.", "###.", "....", "...."],

        F5 => &[".##..", "##...", ".#...", ".....", "....."],
        I5 => &[".....", ".....", "#####", ".....", "....."],
        L5 => &["#....", "####.", ".....", ".....", "....."],
        N5 => &["##...", ".###.", ".....", ".....", "....."],
        P5 => &["##...", "##...", "#....", ".....", "....."],
        T5 => &["###..", ".#...", ".#...", ".....", "....."],
        U5 => &["#.#..", "###..", ".....", ".....", "....."],
        V5 => &["#....", "#....", "###..", ".....", "....."],
        W5 => &["#....", "##...", ".##..", ".....", "....."],
        X5 => &[".#...", "###..", ".#...", ".....", "....."],
        Y5 => &["..#..", "####.", ".....", ".....", "....."],
        Z5 => &["##...", ".#...", ".##..", ".....", "....."],

        I6 => &["......", "......", "######", "......", "......", "......"],
        L6 => &["#.....", "#####.", "......", "......", "......", "......"],
        J6 => &["....#.", "#####.", "......", "......", "......", "......"],
        O6 => &[".###..", ".###..", "......", "......", "......", "......"],
        T6 => &["####..", ".#....", ".#....", "......", "......", "......"],
        Y6 => &["..#...", "#####.", "......", "......", "......", "......"],
        S6 => &["..###.", "###...", "......", "......", "......", "......"],
        U6 => &["#..#..", "####..", "......", "......", "......", "......"],

        I7 => &[
            ".......", ".......", ".......", "#######", ".......", ".......", ".......",
        ],
        L7 => &[
            "#......", "######.", ".......", ".......", ".......", ".......", ".......",
        ],
        J7 => &[
            ".....#.", "######.", ".......", ".......", ".......", ".......", ".......",
        ],
        T7 => &[
            "#####..", "..#....", "..#....", ".......", ".......", ".......", ".......",
        ],
        U7 => &[
            "#...#..", "#####..", ".......", ".......", ".......", ".......", ".......",
        ],
        H7 => &[
            "#.#....", "###....", "#.#....", ".......", ".......", ".......", ".......",
        ],
        P7 => &[
            "###....", "###....", "#......", ".......", ".......", ".......", ".......",
        ],
        S7 => &[
            "...###.", "####...", ".......", ".......", ".......", ".......", ".......",
        ],
    }
}
