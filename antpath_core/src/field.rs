use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::Position;

/// Represents structural errors in the geometry handed to the checker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Field size ({width}, {height}) must be positive in both dimensions")]
    NonPositiveSize { width: i32, height: i32 },
    #[error("Start position {position} is outside the field of size ({width}, {height})")]
    StartOutsideField {
        position: Position,
        width: i32,
        height: i32,
    },
    #[error("End position {position} is outside the field of size ({width}, {height})")]
    EndOutsideField {
        position: Position,
        width: i32,
        height: i32,
    },
}

/// The bounded playing field of an assignment.
///
/// Valid cells are `[1, width] × [1, height]`, both bounds inclusive.
/// `start` and `end` are always inside the field. They may coincide here;
/// rejecting such puzzles is up to the assignment validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameField {
    width: i32,
    height: i32,
    start: Position,
    end: Position,
}

impl GameField {
    /// Creates a new field, checking that the size is positive and that both
    /// start and end lie within it.
    pub fn new(width: i32, height: i32, start: Position, end: Position) -> Result<Self, FieldError> {
        if width < 1 || height < 1 {
            return Err(FieldError::NonPositiveSize { width, height });
        }
        let field = GameField {
            width,
            height,
            start,
            end,
        };
        if !field.contains(start) {
            return Err(FieldError::StartOutsideField {
                position: start,
                width,
                height,
            });
        }
        if !field.contains(end) {
            return Err(FieldError::EndOutsideField {
                position: end,
                width,
                height,
            });
        }
        Ok(field)
    }

    /// Returns the width of the field.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Returns the height of the field.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn start(&self) -> Position {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Position {
        self.end
    }

    /// Checks if the given position is within the field boundaries.
    #[inline]
    pub fn contains(&self, position: Position) -> bool {
        (1..=self.width).contains(&position.x) && (1..=self.height).contains(&position.y)
    }

    /// Returns an iterator over every cell of the field in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (1..=self.height).flat_map(move |y| (1..=self.width).map(move |x| Position { x, y }))
    }
}

/// The set of cells the agent may not land on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObstacleSet {
    cells: HashSet<Position>,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an obstacle. Returns `false` if the cell was already blocked.
    pub fn insert(&mut self, position: Position) -> bool {
        self.cells.insert(position)
    }

    #[inline]
    pub fn contains(&self, position: Position) -> bool {
        self.cells.contains(&position)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.cells.iter()
    }
}

impl FromIterator<Position> for ObstacleSet {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        ObstacleSet {
            cells: iter.into_iter().collect(),
        }
    }
}

impl Extend<Position> for ObstacleSet {
    fn extend<I: IntoIterator<Item = Position>>(&mut self, iter: I) {
        self.cells.extend(iter);
    }
}
