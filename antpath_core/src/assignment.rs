use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    ActionId, Position,
    action::{ActionCatalog, CatalogError},
    checker::{CheckError, Verdict, check_answer},
    config::Settings,
    field::{FieldError, GameField, ObstacleSet},
    solver,
    validator::{GeometryError, validate_assignment},
};

/// Represents errors that can occur while building an assignment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("Element {element_id} at {position} is outside the field")]
    ElementOutsideField { element_id: u32, position: Position },
}

/// Represents errors in a text map.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("Map string is empty")]
    Empty,
    #[error("Inconsistent width at row {row}: expected {expected}, found {found}")]
    InconsistentWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Map dimensions exceed the coordinate range")]
    TooLarge,
    #[error("Unknown map code '{code}' at {position}")]
    UnknownCode { code: String, position: Position },
    #[error("Multiple '{code}' markers found")]
    DuplicateMarker { code: &'static str },
    #[error("No '{code}' marker found in map")]
    MissingMarker { code: &'static str },
}

/// Candidate puzzle as submitted by a teacher, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDraft {
    pub course_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub field_width: i32,
    pub field_height: i32,
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
}

/// Stored assignment geometry, one row per assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub assignment_id: Uuid,
    pub course_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub field_width: i32,
    pub field_height: i32,
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
}

/// Element placed on an assignment's field, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub element_id: u32,
    pub name: String,
    pub pos_x: i32,
    pub pos_y: i32,
}

/// An obstacle on the field, such as a wall or a pit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub element_id: u32,
    pub name: String,
    pub position: Position,
}

impl From<ElementRecord> for Element {
    fn from(record: ElementRecord) -> Self {
        Element {
            element_id: record.element_id,
            name: record.name,
            position: Position::new(record.pos_x, record.pos_y),
        }
    }
}

pub const WALL_ELEMENT_ID: u32 = 1;
pub const PIT_ELEMENT_ID: u32 = 2;

/// A validated puzzle: field, obstacles and the actions it permits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub id: Uuid,
    pub course_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    field: GameField,
    elements: Vec<Element>,
    obstacles: ObstacleSet,
    actions: ActionCatalog,
}

impl Assignment {
    /// Validates a new puzzle and assembles it.
    ///
    /// `permitted` restricts the catalog to the actions students may use; `None`
    /// permits the whole catalog.
    pub fn create(
        draft: AssignmentDraft,
        elements: Vec<Element>,
        permitted: Option<&[ActionId]>,
        catalog: &ActionCatalog,
        settings: &Settings,
    ) -> Result<Self, AssignmentError> {
        validate_assignment(&draft, &settings.validation)?;

        let actions = match permitted {
            Some(ids) => catalog.restrict(ids.iter().copied())?,
            None => catalog.clone(),
        };
        let assignment = Self::assemble(
            Uuid::new_v4(),
            draft.course_id,
            draft.name,
            draft.description,
            (draft.field_width, draft.field_height),
            (
                Position::new(draft.start_x, draft.start_y),
                Position::new(draft.end_x, draft.end_y),
            ),
            elements,
            actions,
        )?;
        info!(id = %assignment.id, name = %assignment.name, "assignment created");
        Ok(assignment)
    }

    /// Rebuilds an assignment from stored rows.
    ///
    /// The geometry rules are not re-applied here; stored puzzles were
    /// validated when created. Structural problems are still reported.
    pub fn from_records(
        record: AssignmentRecord,
        elements: Vec<ElementRecord>,
        permitted: &[ActionId],
        catalog: &ActionCatalog,
    ) -> Result<Self, AssignmentError> {
        let actions = catalog.restrict(permitted.iter().copied())?;
        Self::assemble(
            record.assignment_id,
            record.course_id,
            record.name,
            record.description,
            (record.field_width, record.field_height),
            (
                Position::new(record.start_x, record.start_y),
                Position::new(record.end_x, record.end_y),
            ),
            elements.into_iter().map(Element::from).collect(),
            actions,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        id: Uuid,
        course_id: Uuid,
        name: String,
        description: Option<String>,
        (width, height): (i32, i32),
        (start, end): (Position, Position),
        elements: Vec<Element>,
        actions: ActionCatalog,
    ) -> Result<Self, AssignmentError> {
        let field = GameField::new(width, height, start, end)?;

        if let Some(outside) = elements.iter().find(|e| !field.contains(e.position)) {
            return Err(AssignmentError::ElementOutsideField {
                element_id: outside.element_id,
                position: outside.position,
            });
        }
        let obstacles = elements.iter().map(|e| e.position).collect();

        Ok(Assignment {
            id,
            course_id,
            name,
            description,
            field,
            elements,
            obstacles,
            actions,
        })
    }

    pub fn field(&self) -> &GameField {
        &self.field
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    /// The actions students may use on this assignment.
    pub fn actions(&self) -> &ActionCatalog {
        &self.actions
    }

    /// Checks an answer against this assignment using its permitted actions.
    pub fn check(&self, answer: &[ActionId]) -> Result<Verdict, CheckError> {
        check_answer(answer, &self.actions, &self.field, &self.obstacles)
    }

    /// Finds a shortest answer with the permitted actions, if one exists.
    pub fn solve(&self) -> Option<Vec<ActionId>> {
        solver::solve(&self.field, &self.obstacles, &self.actions)
    }

    pub fn is_solvable(&self) -> bool {
        self.solve().is_some()
    }

    /// Converts back into the stored geometry row.
    pub fn to_record(&self) -> AssignmentRecord {
        AssignmentRecord {
            assignment_id: self.id,
            course_id: self.course_id,
            name: self.name.clone(),
            description: self.description.clone(),
            field_width: self.field.width(),
            field_height: self.field.height(),
            start_x: self.field.start().x,
            start_y: self.field.start().y,
            end_x: self.field.end().x,
            end_y: self.field.end().y,
        }
    }
}

/// Parsed contents of a text map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapLayout {
    pub width: i32,
    pub height: i32,
    pub start: Position,
    pub end: Position,
    pub elements: Vec<Element>,
}

impl MapLayout {
    /// Turns the layout into a draft for [`Assignment::create`].
    pub fn into_draft(self, name: impl Into<String>) -> (AssignmentDraft, Vec<Element>) {
        let draft = AssignmentDraft {
            name: name.into(),
            field_width: self.width,
            field_height: self.height,
            start_x: self.start.x,
            start_y: self.start.y,
            end_x: self.end.x,
            end_y: self.end.y,
            ..AssignmentDraft::default()
        };
        (draft, self.elements)
    }
}

/// Parses a map made of whitespace separated two-letter codes, one row per line.
///
/// `ST` start, `EN` end, `BL` empty cell, `WL` wall, `PT` pit. The first line
/// is row `y = 1` and the first code of a line is column `x = 1`.
pub fn parse_map(map_string: &str) -> Result<MapLayout, MapError> {
    let lines: Vec<&str> = map_string.trim().lines().collect();
    if lines.is_empty() {
        return Err(MapError::Empty);
    }

    let mut width = 0;
    let mut parsed_rows: Vec<Vec<&str>> = Vec::with_capacity(lines.len());
    for (row, line) in lines.iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if row == 0 {
            width = tokens.len();
            if width == 0 {
                return Err(MapError::Empty);
            }
        } else if tokens.len() != width {
            return Err(MapError::InconsistentWidth {
                row: row + 1,
                expected: width,
                found: tokens.len(),
            });
        }
        parsed_rows.push(tokens);
    }

    let width = i32::try_from(width).map_err(|_| MapError::TooLarge)?;
    let height = i32::try_from(parsed_rows.len()).map_err(|_| MapError::TooLarge)?;

    let mut start = None;
    let mut end = None;
    let mut elements = Vec::new();

    for (y, row_tokens) in (1..).zip(&parsed_rows) {
        for (x, token) in (1..).zip(row_tokens) {
            let position = Position { x, y };
            match *token {
                "ST" => {
                    if start.replace(position).is_some() {
                        return Err(MapError::DuplicateMarker { code: "ST" });
                    }
                }
                "EN" => {
                    if end.replace(position).is_some() {
                        return Err(MapError::DuplicateMarker { code: "EN" });
                    }
                }
                "BL" => {}
                "WL" => elements.push(Element {
                    element_id: WALL_ELEMENT_ID,
                    name: "wall".to_string(),
                    position,
                }),
                "PT" => elements.push(Element {
                    element_id: PIT_ELEMENT_ID,
                    name: "pit".to_string(),
                    position,
                }),
                unknown => {
                    return Err(MapError::UnknownCode {
                        code: unknown.to_string(),
                        position,
                    });
                }
            }
        }
    }

    let start = start.ok_or(MapError::MissingMarker { code: "ST" })?;
    let end = end.ok_or(MapError::MissingMarker { code: "EN" })?;
    debug!(width, height, elements = elements.len(), "map parsed");

    Ok(MapLayout {
        width,
        height,
        start,
        end,
        elements,
    })
}

/// Parses a text map and validates it as a new assignment permitting every
/// action of the settings' catalog.
pub fn load_assignment_from_string(
    map_string: &str,
    name: &str,
    settings: &Settings,
) -> Result<Assignment, AssignmentError> {
    let catalog = settings.catalog()?;
    let (draft, elements) = parse_map(map_string)?.into_draft(name);
    Assignment::create(draft, elements, None, &catalog, settings)
}
