//! Attempt assembly and the start/submit lifecycle.
//!
//! Data flows pool → dedup → difficulty profile → no-repeat selection →
//! question shuffle → option shuffle, producing an [`Attempt`]. Finishing an
//! attempt scores it and derives the [`AttemptRecord`] kept in history.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attempt::{Attempt, AttemptMeta, AttemptRecord};
use crate::catalog::BankCatalog;
use crate::dedup::dedup_questions;
use crate::difficulty::{apply_profile, Profile};
use crate::error::{QuizError, ValidationError};
use crate::model::{Mode, Question, SeenSet};
use crate::score::ScoreResult;
use crate::select::select_no_repeat;
use crate::shuffle::{shuffle_in_place, shuffle_options, RandomSource};

/// Allowed question counts per attempt.
pub const COUNT_RANGE: RangeInclusive<usize> = 5..=200;
/// Allowed time limits in minutes.
pub const TIMER_MINUTES_RANGE: RangeInclusive<u64> = 5..=240;

/// Configuration for assembling one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptConfig {
    pub mode: Mode,
    /// Banks to draw from, in order.
    pub bank_ids: Vec<String>,
    /// Target number of questions.
    pub count: usize,
    pub time_limit_minutes: u64,
    /// Permute answer options per question.
    pub shuffle_options: bool,
    /// Prefer questions not served in earlier attempts and remember this one's.
    pub avoid_repeats: bool,
    pub profile: Profile,
}

impl Default for AttemptConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Exam,
            bank_ids: Vec::new(),
            count: 75,
            time_limit_minutes: 90,
            shuffle_options: true,
            avoid_repeats: true,
            profile: Profile::Mixed,
        }
    }
}

impl AttemptConfig {
    /// Bound count and time limit to their allowed ranges.
    pub fn clamped(mut self) -> Self {
        self.count = self
            .count
            .clamp(*COUNT_RANGE.start(), *COUNT_RANGE.end());
        self.time_limit_minutes = self
            .time_limit_minutes
            .clamp(*TIMER_MINUTES_RANGE.start(), *TIMER_MINUTES_RANGE.end());
        self
    }

    pub fn time_limit_secs(&self) -> u64 {
        self.time_limit_minutes * 60
    }
}

/// Assemble an attempt from the banks in `catalog`.
///
/// With `avoid_repeats` on, `seen` steers selection and receives the keys of
/// every selected question before this returns.
pub fn build_attempt<R>(
    catalog: &BankCatalog,
    config: &AttemptConfig,
    seen: &mut SeenSet,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<Attempt, QuizError>
where
    R: RandomSource + ?Sized,
{
    if config.bank_ids.is_empty() {
        return Err(ValidationError::NoBankSelected.into());
    }

    let pool = dedup_questions(catalog.pool(&config.bank_ids)?);
    let candidates = apply_profile(&pool, config.profile, config.count, rng);

    let no_history = SeenSet::new();
    let steer = if config.avoid_repeats { &*seen } else { &no_history };
    let mut picked = select_no_repeat(&candidates, config.count, steer, rng);

    shuffle_in_place(&mut picked, rng);
    if config.shuffle_options {
        picked = picked.iter().map(|q| shuffle_options(q, rng)).collect();
    }

    if config.avoid_repeats {
        seen.extend(picked.iter().filter_map(Question::identity_key));
    }

    tracing::info!(
        banks = ?config.bank_ids,
        pool = pool.len(),
        candidates = candidates.len(),
        picked = picked.len(),
        profile = %config.profile,
        "assembled attempt"
    );

    Ok(Attempt::new(
        picked,
        now,
        config.time_limit_secs(),
        config.mode,
        AttemptMeta {
            banks: config.bank_ids.clone(),
            difficulty: config.profile,
        },
    ))
}

/// An attempt after submission: its final state, score, and history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedAttempt {
    pub attempt: Attempt,
    pub score: ScoreResult,
    pub record: AttemptRecord,
    pub elapsed_secs: f64,
}

/// Score `attempt` and derive its history record.
pub fn finalize(attempt: Attempt, auto_time_expired: bool, now: DateTime<Utc>) -> FinishedAttempt {
    let score = attempt.score();
    let elapsed_secs = attempt.elapsed_secs(now);

    let record = AttemptRecord {
        date: now,
        mode: attempt.mode(),
        banks: attempt.meta().banks.clone(),
        count: attempt.len(),
        correct: score.correct,
        pct: score.rounded_percent(),
        elapsed_sec: elapsed_secs.round() as u64,
        flagged: attempt.flagged().iter().copied().collect(),
        difficulty: attempt.meta().difficulty,
        auto_time_expired,
    };

    FinishedAttempt {
        attempt,
        score,
        record,
        elapsed_secs,
    }
}

/// Holds at most one in-progress attempt and the last finished one.
#[derive(Debug, Default)]
pub struct QuizSession {
    current: Option<Attempt>,
    last: Option<FinishedAttempt>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and install a new attempt. On error the session is unchanged.
    pub fn start<R>(
        &mut self,
        catalog: &BankCatalog,
        config: &AttemptConfig,
        seen: &mut SeenSet,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<&mut Attempt, QuizError>
    where
        R: RandomSource + ?Sized,
    {
        let attempt = build_attempt(catalog, config, seen, rng, now)?;
        if self.current.is_some() {
            tracing::debug!("replacing an unfinished attempt");
        }
        self.last = None;
        Ok(self.current.insert(attempt))
    }

    pub fn current(&self) -> Option<&Attempt> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Attempt> {
        self.current.as_mut()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Finish the in-progress attempt.
    ///
    /// Returns `None` when nothing is in progress, so a late timer expiry after
    /// a manual submit (or an abandon) does nothing.
    pub fn submit(&mut self, auto_time_expired: bool, now: DateTime<Utc>) -> Option<&FinishedAttempt> {
        let attempt = self.current.take()?;
        let finished = finalize(attempt, auto_time_expired, now);
        Some(self.last.insert(finished))
    }

    pub fn last_finished(&self) -> Option<&FinishedAttempt> {
        self.last.as_ref()
    }

    /// Drop the in-progress attempt and any finished snapshot.
    pub fn abandon(&mut self) -> bool {
        self.last = None;
        self.current.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BankInfo, Manifest};
    use crate::normalize::BankPayload;
    use crate::shuffle::{ScriptedRandom, SeededRandom};
    use chrono::Duration;
    use serde_json::json;
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn catalog(sizes: &[(&str, i64)]) -> BankCatalog {
        let manifest = Manifest {
            banks: sizes
                .iter()
                .map(|(id, _)| BankInfo {
                    id: id.to_string(),
                    title: id.to_uppercase(),
                    file: format!("{id}.json"),
                    count: None,
                })
                .collect(),
        };
        let mut catalog = BankCatalog::new(manifest.clone());
        for (info, (_, size)) in manifest.banks.into_iter().zip(sizes) {
            let records: Vec<_> = (1..=*size)
                .map(|i| {
                    json!({
                        "id": i,
                        "question": format!("{} question {i}?", info.id),
                        "options": [format!("right {i}"), "w1", "w2", "w3"],
                        "answer_index": 0,
                    })
                })
                .collect();
            catalog.insert(info, BankPayload::Bare(records));
        }
        catalog
    }

    fn config(banks: &[&str], count: usize) -> AttemptConfig {
        AttemptConfig {
            bank_ids: banks.iter().map(|s| s.to_string()).collect(),
            count,
            ..Default::default()
        }
    }

    #[test]
    fn no_bank_selected_is_rejected() {
        let mut seen = SeenSet::new();
        let err = build_attempt(
            &catalog(&[("a", 3)]),
            &config(&[], 5),
            &mut seen,
            &mut SeededRandom::new(1),
            now(),
        )
        .unwrap_err();
        assert_eq!(err, QuizError::Validation(ValidationError::NoBankSelected));
    }

    #[test]
    fn unknown_bank_is_rejected() {
        let mut seen = SeenSet::new();
        let err = build_attempt(
            &catalog(&[("a", 3)]),
            &config(&["a", "zzz"], 5),
            &mut seen,
            &mut SeededRandom::new(1),
            now(),
        )
        .unwrap_err();
        assert!(err.is_validation());
        assert!(seen.is_empty());
    }

    #[test]
    fn builds_attempt_and_records_seen_keys() {
        let cat = catalog(&[("a", 10), ("b", 10)]);
        let mut seen = SeenSet::new();
        let attempt = build_attempt(
            &cat,
            &config(&["a", "b"], 8),
            &mut seen,
            &mut SeededRandom::new(3),
            now(),
        )
        .unwrap();

        assert_eq!(attempt.len(), 8);
        assert_eq!(attempt.time_limit_secs(), 90 * 60);
        assert_eq!(attempt.meta().banks, vec!["a", "b"]);
        assert_eq!(seen.len(), 8);
        for q in attempt.questions() {
            assert!(seen.contains(&q.identity_key().unwrap()));
            assert!(q.correct_option().is_some_and(|o| o.starts_with("right")));
        }
    }

    #[test]
    fn later_attempts_avoid_earlier_questions() {
        let cat = catalog(&[("a", 12)]);
        let mut seen = SeenSet::new();
        let mut rng = SeededRandom::new(8);

        let first = build_attempt(&cat, &config(&["a"], 6), &mut seen, &mut rng, now()).unwrap();
        let second = build_attempt(&cat, &config(&["a"], 6), &mut seen, &mut rng, now()).unwrap();

        let first_keys: HashSet<String> = first.identity_keys().collect();
        let second_keys: HashSet<String> = second.identity_keys().collect();
        assert!(first_keys.is_disjoint(&second_keys));

        let third = build_attempt(&cat, &config(&["a"], 6), &mut seen, &mut rng, now()).unwrap();
        assert_eq!(third.len(), 6);
    }

    #[test]
    fn repeats_allowed_leaves_seen_set_alone() {
        let cat = catalog(&[("a", 5)]);
        let mut seen = SeenSet::new();
        let cfg = AttemptConfig {
            avoid_repeats: false,
            ..config(&["a"], 5)
        };
        build_attempt(&cat, &cfg, &mut seen, &mut SeededRandom::new(1), now()).unwrap();
        assert!(seen.is_empty());
    }

    #[test]
    fn options_stay_put_without_option_shuffle() {
        let cat = catalog(&[("a", 4)]);
        let cfg = AttemptConfig {
            shuffle_options: false,
            ..config(&["a"], 4)
        };
        let attempt =
            build_attempt(&cat, &cfg, &mut SeenSet::new(), &mut ScriptedRandom::default(), now())
                .unwrap();
        assert!(attempt.questions().iter().all(|q| q.answer_index == 0));
    }

    #[test]
    fn clamped_config_bounds() {
        let cfg = AttemptConfig {
            count: 1,
            time_limit_minutes: 1000,
            ..Default::default()
        }
        .clamped();
        assert_eq!(cfg.count, 5);
        assert_eq!(cfg.time_limit_minutes, 240);
        assert_eq!(cfg.time_limit_secs(), 14_400);
    }

    #[test]
    fn finalize_builds_record() {
        let cat = catalog(&[("a", 5)]);
        let cfg = AttemptConfig {
            shuffle_options: false,
            profile: Profile::HardMix,
            ..config(&["a"], 5)
        };
        let mut attempt =
            build_attempt(&cat, &cfg, &mut SeenSet::new(), &mut SeededRandom::new(1), now()).unwrap();
        attempt.answer(0, 0).unwrap();
        attempt.answer(1, 2).unwrap();
        attempt.toggle_flag(4).unwrap();
        attempt.toggle_flag(1).unwrap();

        let done = finalize(attempt, false, now() + Duration::milliseconds(61_600));
        assert_eq!(done.score.correct, 1);
        assert_eq!(done.record.count, 5);
        assert_eq!(done.record.correct, 1);
        assert_eq!(done.record.pct, 20.0);
        assert_eq!(done.record.elapsed_sec, 62);
        assert_eq!(done.record.flagged, vec![1, 4]);
        assert_eq!(done.record.difficulty, Profile::HardMix);
        assert!(!done.record.auto_time_expired);
    }

    #[test]
    fn session_submit_is_idempotent() {
        let cat = catalog(&[("a", 5)]);
        let mut session = QuizSession::new();
        let mut seen = SeenSet::new();
        session
            .start(&cat, &config(&["a"], 5), &mut seen, &mut SeededRandom::new(1), now())
            .unwrap()
            .answer(0, 1)
            .unwrap();

        let later = now() + Duration::seconds(30);
        assert!(session.submit(true, later).is_some());
        assert!(session.submit(true, later).is_none());
        assert!(!session.is_active());
        assert!(session.last_finished().unwrap().record.auto_time_expired);
    }

    #[test]
    fn failed_start_keeps_existing_attempt() {
        let cat = catalog(&[("a", 5)]);
        let mut session = QuizSession::new();
        let mut seen = SeenSet::new();
        let mut rng = SeededRandom::new(1);
        session
            .start(&cat, &config(&["a"], 5), &mut seen, &mut rng, now())
            .unwrap();
        assert!(session
            .start(&cat, &config(&[], 5), &mut seen, &mut rng, now())
            .is_err());
        assert!(session.is_active());

        assert!(session.abandon());
        assert!(!session.is_active());
        assert!(session.submit(false, now()).is_none());
    }
}
