use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    ActionId,
    assignment::Assignment,
    checker::{CheckError, Verdict},
};

/// Represents errors in the review lifecycle of an attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolutionError {
    #[error("Solution {id} has already been reviewed")]
    AlreadyReviewed { id: Uuid },
    #[error("Solution belongs to assignment {expected}, not {found}")]
    AssignmentMismatch { expected: Uuid, found: Uuid },
    #[error(transparent)]
    Check(#[from] CheckError),
}

/// Review state of a submitted attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionStatus {
    Pending,
    Correct,
    Incorrect,
}

impl SolutionStatus {
    /// Id of the status in the store's status table.
    pub fn id(self) -> u8 {
        match self {
            SolutionStatus::Pending => 1,
            SolutionStatus::Correct => 2,
            SolutionStatus::Incorrect => 3,
        }
    }
}

/// A student's answer to an assignment and its review.
///
/// Created pending on submission and reviewed exactly once; afterwards it is
/// read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionAttempt {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub user_login: String,
    pub answer: Vec<ActionId>,
    pub submitted_at: DateTime<Utc>,
    status: SolutionStatus,
    feedback: Option<String>,
    checked_at: Option<DateTime<Utc>>,
}

impl SolutionAttempt {
    pub fn submit(
        assignment_id: Uuid,
        user_login: impl Into<String>,
        answer: Vec<ActionId>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let attempt = SolutionAttempt {
            id: Uuid::new_v4(),
            assignment_id,
            user_login: user_login.into(),
            answer,
            submitted_at,
            status: SolutionStatus::Pending,
            feedback: None,
            checked_at: None,
        };
        info!(id = %attempt.id, assignment = %assignment_id, "solution submitted");
        attempt
    }

    pub fn status(&self) -> SolutionStatus {
        self.status
    }

    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    pub fn checked_at(&self) -> Option<DateTime<Utc>> {
        self.checked_at
    }

    pub fn is_reviewed(&self) -> bool {
        self.status != SolutionStatus::Pending
    }

    /// `None` while pending.
    pub fn is_correct(&self) -> Option<bool> {
        match self.status {
            SolutionStatus::Pending => None,
            SolutionStatus::Correct => Some(true),
            SolutionStatus::Incorrect => Some(false),
        }
    }

    /// Records a reviewer's decision.
    pub fn review(
        &mut self,
        is_correct: bool,
        feedback: Option<String>,
        checked_at: DateTime<Utc>,
    ) -> Result<(), SolutionError> {
        if self.is_reviewed() {
            return Err(SolutionError::AlreadyReviewed { id: self.id });
        }
        self.status = if is_correct {
            SolutionStatus::Correct
        } else {
            SolutionStatus::Incorrect
        };
        self.feedback = feedback;
        self.checked_at = Some(checked_at);
        info!(id = %self.id, status = ?self.status, "solution reviewed");
        Ok(())
    }

    /// Reviews the attempt by running the checker against `assignment`.
    ///
    /// The verdict's message becomes the feedback. An answer with an unknown
    /// action id leaves the attempt pending and returns the check error.
    pub fn auto_review(
        &mut self,
        assignment: &Assignment,
        checked_at: DateTime<Utc>,
    ) -> Result<Verdict, SolutionError> {
        if self.is_reviewed() {
            return Err(SolutionError::AlreadyReviewed { id: self.id });
        }
        if assignment.id != self.assignment_id {
            return Err(SolutionError::AssignmentMismatch {
                expected: self.assignment_id,
                found: assignment.id,
            });
        }
        let verdict = assignment.check(&self.answer)?;
        self.review(verdict.is_success(), Some(verdict.to_string()), checked_at)?;
        Ok(verdict)
    }
}

/// Attempts still waiting for review.
pub fn pending<'a, I>(attempts: I) -> impl Iterator<Item = &'a SolutionAttempt>
where
    I: IntoIterator<Item = &'a SolutionAttempt>,
{
    attempts.into_iter().filter(|attempt| !attempt.is_reviewed())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{assignment::load_assignment_from_string, config::Settings};

    const MAP: &str = "
        ST BL BL BL BL
        BL BL BL BL BL
        BL BL EN BL BL
        BL BL BL BL BL
        BL BL BL BL BL
    ";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn submission_starts_pending() {
        let attempt = SolutionAttempt::submit(Uuid::new_v4(), "student", vec![1, 4], now());
        assert_eq!(attempt.status(), SolutionStatus::Pending);
        assert_eq!(attempt.is_correct(), None);
        assert_eq!(attempt.checked_at(), None);
        assert_eq!(attempt.status().id(), 1);
    }

    #[test]
    fn manual_review_is_final() {
        let mut attempt = SolutionAttempt::submit(Uuid::new_v4(), "student", vec![1], now());
        attempt.review(false, Some("Try again".to_string()), now()).unwrap();
        assert_eq!(attempt.status(), SolutionStatus::Incorrect);
        assert_eq!(attempt.feedback(), Some("Try again"));
        assert_eq!(attempt.checked_at(), Some(now()));

        let err = attempt.review(true, None, now()).unwrap_err();
        assert_eq!(err, SolutionError::AlreadyReviewed { id: attempt.id });
        assert_eq!(attempt.status(), SolutionStatus::Incorrect);
    }

    #[test]
    fn auto_review_uses_the_checker() {
        let assignment = load_assignment_from_string(MAP, "demo", &Settings::default()).unwrap();

        let mut good = SolutionAttempt::submit(assignment.id, "alice", vec![1, 1, 4, 4], now());
        assert_eq!(good.auto_review(&assignment, now()).unwrap(), Verdict::Success);
        assert_eq!(good.is_correct(), Some(true));

        let mut short = SolutionAttempt::submit(assignment.id, "bob", vec![1, 1, 4], now());
        let verdict = short.auto_review(&assignment, now()).unwrap();
        assert!(!verdict.is_success());
        assert_eq!(short.status(), SolutionStatus::Incorrect);
        assert_eq!(short.feedback(), Some(verdict.to_string().as_str()));
    }

    #[test]
    fn auto_review_rejects_foreign_assignment() {
        let assignment = load_assignment_from_string(MAP, "demo", &Settings::default()).unwrap();
        let mut attempt = SolutionAttempt::submit(Uuid::new_v4(), "alice", vec![1], now());
        let err = attempt.auto_review(&assignment, now()).unwrap_err();
        assert!(matches!(err, SolutionError::AssignmentMismatch { .. }));
        assert!(!attempt.is_reviewed());
    }

    #[test]
    fn unknown_action_keeps_attempt_pending() {
        let assignment = load_assignment_from_string(MAP, "demo", &Settings::default()).unwrap();
        let mut attempt = SolutionAttempt::submit(assignment.id, "alice", vec![1, 99], now());
        let err = attempt.auto_review(&assignment, now()).unwrap_err();
        assert_eq!(err, SolutionError::Check(CheckError::UnknownAction { step: 1, id: 99 }));
        assert_eq!(attempt.status(), SolutionStatus::Pending);
    }

    #[test]
    fn pending_filters_reviewed_attempts() {
        let assignment_id = Uuid::new_v4();
        let mut reviewed = SolutionAttempt::submit(assignment_id, "a", vec![1], now());
        reviewed.review(true, None, now()).unwrap();
        let waiting = SolutionAttempt::submit(assignment_id, "b", vec![1], now());
        let attempts = vec![reviewed, waiting];
        let ids: Vec<_> = pending(&attempts).map(|a| a.user_login.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }
}
