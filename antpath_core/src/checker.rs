use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    ActionId, Displacement, Position,
    action::ActionCatalog,
    field::{GameField, ObstacleSet},
};

/// Represents structural errors in an answer that prevent it from being replayed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error("Action id {id} at step {step} is not in the action catalog")]
    UnknownAction { step: usize, id: ActionId },
}

/// Outcome of replaying an attempt.
///
/// Every variant other than `Success` is a failed attempt. `step` is the
/// 0-based index of the action that caused the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Success,
    OutOfBounds { step: usize, position: Position },
    Collision { step: usize, position: Position },
    WrongEnd { position: Position },
}

impl Verdict {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Success)
    }

    /// Index of the action that stopped the replay, if any.
    pub fn failed_step(&self) -> Option<usize> {
        match self {
            Verdict::OutOfBounds { step, .. } | Verdict::Collision { step, .. } => Some(*step),
            Verdict::Success | Verdict::WrongEnd { .. } => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Success => write!(f, "The ant reached the end position."),
            Verdict::OutOfBounds { step, position } => write!(
                f,
                "Step {} leaves the field at {}.",
                step + 1,
                position
            ),
            Verdict::Collision { step, position } => {
                write!(f, "Step {} runs into an obstacle at {}.", step + 1, position)
            }
            Verdict::WrongEnd { position } => write!(
                f,
                "The ant stopped at {} instead of the end position.",
                position
            ),
        }
    }
}

/// Result of applying a single step to a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Moved(Position),
    Failed(Verdict),
}

/// Step-by-step simulation of an attempt on a field.
///
/// Borrows the field and obstacles immutably. Once a step fails the replay is
/// stopped: further steps are ignored and report the same failure.
#[derive(Debug, Clone)]
pub struct Replay<'a> {
    field: &'a GameField,
    obstacles: &'a ObstacleSet,
    position: Position,
    steps_taken: usize,
    failure: Option<Verdict>,
}

impl<'a> Replay<'a> {
    pub fn new(field: &'a GameField, obstacles: &'a ObstacleSet) -> Self {
        Replay {
            field,
            obstacles,
            position: field.start(),
            steps_taken: 0,
            failure: None,
        }
    }

    /// Current position of the agent.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Number of steps applied successfully.
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    pub fn is_stopped(&self) -> bool {
        self.failure.is_some()
    }

    pub fn field(&self) -> &GameField {
        self.field
    }

    pub fn obstacles(&self) -> &ObstacleSet {
        self.obstacles
    }

    /// Moves the agent by one displacement and checks where it lands.
    ///
    /// Only the landing cell is checked, so a jump passes over whatever lies
    /// between its origin and its target.
    pub fn step<D: Displacement>(&mut self, action: D) -> StepResult {
        if let Some(verdict) = self.failure {
            return StepResult::Failed(verdict);
        }

        let step = self.steps_taken;
        let (dx, dy) = action.displacement();

        let target = match self.position.offset(dx, dy) {
            Some(target) if self.field.contains(target) => target,
            target => {
                let position = target.unwrap_or(Position {
                    x: self.position.x.saturating_add(dx),
                    y: self.position.y.saturating_add(dy),
                });
                return self.stop(Verdict::OutOfBounds { step, position });
            }
        };

        if self.obstacles.contains(target) {
            return self.stop(Verdict::Collision {
                step,
                position: target,
            });
        }

        trace!(step, from = %self.position, to = %target, "step applied");
        self.position = target;
        self.steps_taken += 1;
        StepResult::Moved(target)
    }

    /// Ends the replay and returns the verdict.
    pub fn finish(&self) -> Verdict {
        if let Some(verdict) = self.failure {
            return verdict;
        }
        if self.position == self.field.end() {
            Verdict::Success
        } else {
            Verdict::WrongEnd {
                position: self.position,
            }
        }
    }

    fn stop(&mut self, verdict: Verdict) -> StepResult {
        debug!(%verdict, "replay stopped");
        self.failure = Some(verdict);
        StepResult::Failed(verdict)
    }
}

/// Replays `actions` from the field's start and decides pass/fail.
///
/// Leaving `[1, width] × [1, height]` or landing on an obstacle fails the
/// attempt immediately and the remaining actions are not looked at. Otherwise
/// the attempt succeeds iff it ends on the field's end position. An empty
/// sequence therefore succeeds only when start and end coincide.
pub fn check<I>(actions: I, field: &GameField, obstacles: &ObstacleSet) -> Verdict
where
    I: IntoIterator,
    I::Item: Displacement,
{
    let mut replay = Replay::new(field, obstacles);
    for action in actions {
        if let StepResult::Failed(verdict) = replay.step(action) {
            return verdict;
        }
    }
    let verdict = replay.finish();
    debug!(%verdict, steps = replay.steps_taken(), "attempt checked");
    verdict
}

/// Like [`check`], resolving each action id through `catalog` as it is reached.
///
/// Ids after the step that stops the replay are never resolved, so an unknown
/// id there does not turn a failed attempt into an error.
pub fn check_answer(
    answer: &[ActionId],
    catalog: &ActionCatalog,
    field: &GameField,
    obstacles: &ObstacleSet,
) -> Result<Verdict, CheckError> {
    let mut replay = Replay::new(field, obstacles);
    for (step, id) in answer.iter().enumerate() {
        let action = catalog
            .get(*id)
            .ok_or(CheckError::UnknownAction { step, id: *id })?;
        if let StepResult::Failed(verdict) = replay.step(action) {
            return Ok(verdict);
        }
    }
    let verdict = replay.finish();
    debug!(%verdict, steps = replay.steps_taken(), "answer checked");
    Ok(verdict)
}
