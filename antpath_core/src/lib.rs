use std::fmt;

use serde::{Deserialize, Serialize};

pub mod action;
pub mod assignment;
pub mod checker;
pub mod config;
pub mod field;
pub mod solution;
pub mod solver;
pub mod validator;

pub use action::{Action, ActionCatalog, CatalogError};
pub use assignment::{Assignment, AssignmentDraft, AssignmentError};
pub use checker::{CheckError, Replay, Verdict, check, check_answer};
pub use config::{ConfigError, Settings, ValidationSettings};
pub use field::{FieldError, GameField, ObstacleSet};
pub use solution::{SolutionAttempt, SolutionError, SolutionStatus};
pub use validator::GeometryError;

/// Identifier of an action in the action catalog.
pub type ActionId = u32;

/// Represents a 2D grid coordinate.
///
/// Coordinates are 1-based: the top-left cell of a field is `(1, 1)`, `x` grows
/// to the right and `y` grows downwards. The components are signed so that a
/// position that has stepped off the field can still be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Returns the position shifted by `(dx, dy)`, or `None` if either
    /// component overflows.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Position> {
        Some(Position {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Position { x, y }
    }
}

/// Anything that moves the agent by a signed `(dx, dy)` step.
pub trait Displacement {
    fn displacement(&self) -> (i32, i32);
}

impl Displacement for (i32, i32) {
    fn displacement(&self) -> (i32, i32) {
        *self
    }
}

impl<T: Displacement + ?Sized> Displacement for &T {
    fn displacement(&self) -> (i32, i32) {
        (**self).displacement()
    }
}
