//! The in-progress attempt and the record it leaves behind.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::difficulty::Profile;
use crate::error::ValidationError;
use crate::model::{Mode, Question, OPTION_COUNT};
use crate::score::{score, Answers, ScoreResult};

/// What an attempt was assembled from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptMeta {
    pub banks: Vec<String>,
    pub difficulty: Profile,
}

/// One timed run through a fixed, ordered set of questions.
///
/// The question order is frozen at construction; only answers and flags change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    id: Uuid,
    questions: Vec<Question>,
    answers: Answers,
    flagged: BTreeSet<usize>,
    start_time: DateTime<Utc>,
    time_limit_secs: u64,
    mode: Mode,
    meta: AttemptMeta,
}

impl Attempt {
    pub fn new(
        questions: Vec<Question>,
        start_time: DateTime<Utc>,
        time_limit_secs: u64,
        mode: Mode,
        meta: AttemptMeta,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            questions,
            answers: Answers::new(),
            flagged: BTreeSet::new(),
            start_time,
            time_limit_secs,
            mode,
            meta,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn flagged(&self) -> &BTreeSet<usize> {
        &self.flagged
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn time_limit_secs(&self) -> u64 {
        self.time_limit_secs
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn meta(&self) -> &AttemptMeta {
        &self.meta
    }

    /// Choose `option` for question `index`, replacing any earlier choice.
    pub fn answer(&mut self, index: usize, option: usize) -> Result<Option<usize>, ValidationError> {
        self.check_index(index)?;
        if option >= OPTION_COUNT {
            return Err(ValidationError::OptionOutOfRange(option));
        }
        Ok(self.answers.set(index, option))
    }

    /// Flip the review flag on question `index`. Returns the new state.
    pub fn toggle_flag(&mut self, index: usize) -> Result<bool, ValidationError> {
        self.check_index(index)?;
        if self.flagged.remove(&index) {
            Ok(false)
        } else {
            self.flagged.insert(index);
            Ok(true)
        }
    }

    pub fn is_answered(&self, index: usize) -> bool {
        self.answers.contains(index)
    }

    pub fn is_flagged(&self, index: usize) -> bool {
        self.flagged.contains(&index)
    }

    pub fn unanswered_count(&self) -> usize {
        (0..self.questions.len()).filter(|&i| !self.answers.contains(i)).count()
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged.len()
    }

    /// Seconds since the attempt started, never negative.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> f64 {
        let millis = (now - self.start_time).num_milliseconds().max(0);
        millis as f64 / 1000.0
    }

    /// Seconds left on the clock, floored at zero.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> f64 {
        (self.time_limit_secs as f64 - self.elapsed_secs(now)).max(0.0)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.elapsed_secs(now) >= self.time_limit_secs as f64
    }

    pub fn score(&self) -> ScoreResult {
        score(&self.questions, &self.answers)
    }

    /// Identity keys of every question in the attempt.
    pub fn identity_keys(&self) -> impl Iterator<Item = String> + '_ {
        self.questions.iter().filter_map(Question::identity_key)
    }

    fn check_index(&self, index: usize) -> Result<(), ValidationError> {
        if index < self.questions.len() {
            Ok(())
        } else {
            Err(ValidationError::QuestionOutOfRange {
                index,
                len: self.questions.len(),
            })
        }
    }
}

/// A finished attempt as kept in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub date: DateTime<Utc>,
    pub mode: Mode,
    pub banks: Vec<String>,
    pub count: usize,
    pub correct: usize,
    pub pct: f64,
    pub elapsed_sec: u64,
    pub flagged: Vec<usize>,
    pub difficulty: Profile,
    pub auto_time_expired: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::question;
    use chrono::Duration;

    fn attempt(n: i64) -> Attempt {
        let start = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        Attempt::new(
            (1..=n).map(|i| question("a", i)).collect(),
            start,
            60,
            Mode::Exam,
            AttemptMeta {
                banks: vec!["a".into()],
                difficulty: Profile::Mixed,
            },
        )
    }

    #[test]
    fn answering_replaces_previous_choice() {
        let mut a = attempt(3);
        assert_eq!(a.answer(1, 2).unwrap(), None);
        assert_eq!(a.answer(1, 0).unwrap(), Some(2));
        assert!(a.is_answered(1));
        assert_eq!(a.unanswered_count(), 2);
    }

    #[test]
    fn out_of_range_input_is_rejected() {
        let mut a = attempt(2);
        assert_eq!(
            a.answer(2, 0).unwrap_err(),
            ValidationError::QuestionOutOfRange { index: 2, len: 2 }
        );
        assert_eq!(a.answer(0, 4).unwrap_err(), ValidationError::OptionOutOfRange(4));
        assert!(a.toggle_flag(5).is_err());
        assert!(a.answers().is_empty());
    }

    #[test]
    fn flags_toggle() {
        let mut a = attempt(3);
        assert!(a.toggle_flag(2).unwrap());
        assert!(a.is_flagged(2));
        assert_eq!(a.flagged_count(), 1);
        assert!(!a.toggle_flag(2).unwrap());
        assert_eq!(a.flagged_count(), 0);
    }

    #[test]
    fn clock_is_derived_from_start_time() {
        let a = attempt(1);
        let start = a.start_time();
        assert_eq!(a.remaining_secs(start), 60.0);
        assert_eq!(a.remaining_secs(start + Duration::milliseconds(1500)), 58.5);
        assert!(!a.is_expired(start + Duration::seconds(59)));
        assert!(a.is_expired(start + Duration::seconds(60)));
        assert_eq!(a.remaining_secs(start + Duration::seconds(90)), 0.0);
        assert_eq!(a.elapsed_secs(start - Duration::seconds(5)), 0.0);
    }

    #[test]
    fn loaded_attempt_with_stray_indices_does_not_panic() {
        let mut value = serde_json::to_value(attempt(2)).unwrap();
        value["answers"] = serde_json::json!({"0": 0, "7": 2, "9": 1});
        value["questions"][1]["answer_index"] = serde_json::json!(9);
        let a: Attempt = serde_json::from_value(value).unwrap();

        assert_eq!(a.unanswered_count(), 1);
        assert_eq!(a.question(1).unwrap().correct_option(), None);
        assert_eq!(a.question(0).unwrap().correct_option(), Some("right 1"));
        let result = a.score();
        assert_eq!(result.total, 2);
        assert_eq!(result.correct, 1);
    }

    #[test]
    fn score_reads_current_answers() {
        let mut a = attempt(4);
        a.answer(0, 0).unwrap();
        a.answer(1, 3).unwrap();
        let result = a.score();
        assert_eq!(result.correct, 1);
        assert_eq!(result.total, 4);
    }
}
