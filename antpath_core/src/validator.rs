//! Well-formedness rules for a puzzle, applied once when an assignment is
//! created. Each rule has its own error variant so callers can report exactly
//! what is wrong.

use tracing::warn;

use crate::{assignment::AssignmentDraft, config::ValidationSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("Field width {width} is outside the allowed range {min}..={max}")]
    FieldWidthOutOfRange { width: i32, min: i32, max: i32 },
    #[error("Field height {height} is outside the allowed range {min}..={max}")]
    FieldHeightOutOfRange { height: i32, min: i32, max: i32 },
    #[error("Start position can't be the same as end position")]
    SameStartEnd,
    #[error("Start position x {x} cannot be smaller than {min}")]
    StartXTooSmall { x: i32, min: i32 },
    #[error("Start position x {x} cannot be larger than field max width {max}")]
    StartXTooLarge { x: i32, max: i32 },
    #[error("End position x {x} cannot be smaller than {min}")]
    EndXTooSmall { x: i32, min: i32 },
    #[error("End position x {x} cannot be larger than field max width {max}")]
    EndXTooLarge { x: i32, max: i32 },
    #[error("Start position y {y} cannot be smaller than {min}")]
    StartYTooSmall { y: i32, min: i32 },
    #[error("Start position y {y} cannot be larger than field max height {max}")]
    StartYTooLarge { y: i32, max: i32 },
    #[error("End position y {y} cannot be smaller than {min}")]
    EndYTooSmall { y: i32, min: i32 },
    #[error("End position y {y} cannot be larger than field max height {max}")]
    EndYTooLarge { y: i32, max: i32 },
}

/// Checks the field size against the configured bounds.
pub fn validate_game_field(
    width: i32,
    height: i32,
    settings: &ValidationSettings,
) -> Result<(), GeometryError> {
    if !(settings.min_width..=settings.max_width).contains(&width) {
        return Err(GeometryError::FieldWidthOutOfRange {
            width,
            min: settings.min_width,
            max: settings.max_width,
        });
    }
    if !(settings.min_height..=settings.max_height).contains(&height) {
        return Err(GeometryError::FieldHeightOutOfRange {
            height,
            min: settings.min_height,
            max: settings.max_height,
        });
    }
    Ok(())
}

/// Checks start and end. The first violated rule is reported, x axis before y.
pub fn validate_positions(
    draft: &AssignmentDraft,
    settings: &ValidationSettings,
) -> Result<(), GeometryError> {
    let min = settings.counting_field_from;
    let max_x = settings.max_width;
    let max_y = settings.max_height;

    if (draft.start_x, draft.start_y) == (draft.end_x, draft.end_y) {
        return Err(GeometryError::SameStartEnd);
    }

    let (sx, ex) = (draft.start_x, draft.end_x);
    if sx < min {
        return Err(GeometryError::StartXTooSmall { x: sx, min });
    }
    if sx > max_x {
        return Err(GeometryError::StartXTooLarge { x: sx, max: max_x });
    }
    if ex < min {
        return Err(GeometryError::EndXTooSmall { x: ex, min });
    }
    if ex > max_x {
        return Err(GeometryError::EndXTooLarge { x: ex, max: max_x });
    }

    let (sy, ey) = (draft.start_y, draft.end_y);
    if sy < min {
        return Err(GeometryError::StartYTooSmall { y: sy, min });
    }
    if sy > max_y {
        return Err(GeometryError::StartYTooLarge { y: sy, max: max_y });
    }
    if ey < min {
        return Err(GeometryError::EndYTooSmall { y: ey, min });
    }
    if ey > max_y {
        return Err(GeometryError::EndYTooLarge { y: ey, max: max_y });
    }

    Ok(())
}

/// Runs the field check followed by the position check.
pub fn validate_assignment(
    draft: &AssignmentDraft,
    settings: &ValidationSettings,
) -> Result<(), GeometryError> {
    validate_game_field(draft.field_width, draft.field_height, settings)
        .and_then(|()| validate_positions(draft, settings))
        .inspect_err(|err| warn!(name = %draft.name, %err, "assignment rejected"))
}
