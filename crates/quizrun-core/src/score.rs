//! Attempt scoring.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Question;

/// Sparse map from question index to chosen option index.
///
/// Unanswered questions have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers(BTreeMap<usize, usize>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a choice, returning the previous one.
    pub fn set(&mut self, index: usize, option: usize) -> Option<usize> {
        self.0.insert(index, option)
    }

    pub fn get(&self, index: usize) -> Option<usize> {
        self.0.get(&index).copied()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(index, option)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().map(|(&i, &o)| (i, o))
    }
}

impl FromIterator<(usize, usize)> for Answers {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Outcome for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub index: usize,
    pub ok: bool,
    pub chosen: Option<usize>,
    pub answer: usize,
}

/// Aggregate and per-question results of scoring an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub correct: usize,
    pub total: usize,
    /// `100 * correct / total`, or 0 for an empty attempt.
    pub percent: f64,
    pub details: Vec<QuestionOutcome>,
}

impl ScoreResult {
    /// Percent rounded to one decimal place, as stored in history.
    pub fn rounded_percent(&self) -> f64 {
        (self.percent * 10.0).round() / 10.0
    }
}

/// Score `questions` against `answers`. Pure: neither input is modified.
pub fn score(questions: &[Question], answers: &Answers) -> ScoreResult {
    let details: Vec<QuestionOutcome> = questions
        .iter()
        .enumerate()
        .map(|(index, q)| {
            let chosen = answers.get(index);
            QuestionOutcome {
                index,
                ok: chosen == Some(q.answer_index),
                chosen,
                answer: q.answer_index,
            }
        })
        .collect();

    let correct = details.iter().filter(|d| d.ok).count();
    let total = questions.len();
    let percent = if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64 * 100.0
    };

    ScoreResult {
        correct,
        total,
        percent,
        details,
    }
}
