//! Core data model types for quizrun.
//!
//! Questions, their identity keys, the bank manifest, and the cross-session
//! seen set that biases selection toward novelty.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of answer options every question carries.
pub const OPTION_COUNT: usize = 4;

/// A validated multiple-choice question tagged with its source bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Bank this question was loaded from.
    pub bank_id: String,
    /// Stable id within the bank. Absent only for questions built outside the normalizer.
    #[serde(default)]
    pub id: Option<QuestionId>,
    /// Question text, never empty.
    pub question: String,
    /// The four answer options in display order.
    pub options: [String; OPTION_COUNT],
    /// Position of the correct option in `options`.
    pub answer_index: usize,
    /// Explanation shown after scoring.
    #[serde(default)]
    pub explain: String,
    /// Free-form difficulty label (e.g. "easy", "hard_advanced").
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Question {
    /// The canonical key that recognizes "the same question" across banks and sessions.
    ///
    /// Returns `None` when neither the bank id nor the id/text can tell it apart.
    pub fn identity_key(&self) -> Option<String> {
        identity_key(&self.bank_id, self.id.as_ref(), &self.question)
    }

    /// The text of the option marked correct, if `answer_index` is in range.
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.answer_index).map(String::as_str)
    }
}

/// A question id as it appears in bank files: either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Number(i64),
    Text(String),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Number(n) => write!(f, "{n}"),
            QuestionId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for QuestionId {
    fn from(n: i64) -> Self {
        QuestionId::Number(n)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        QuestionId::Text(s.to_string())
    }
}

/// Build an identity key: `bank_id::id` when an id exists, else `bank_id::normalized text`.
pub fn identity_key(bank_id: &str, id: Option<&QuestionId>, question: &str) -> Option<String> {
    let discriminator = match id {
        Some(id) => id.to_string(),
        None => normalize_text(question),
    };
    if bank_id.is_empty() && discriminator.is_empty() {
        return None;
    }
    Some(format!("{bank_id}::{discriminator}"))
}

/// Lowercase, collapse whitespace and Unicode separator runs to one space, trim.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;

    for c in lowered.chars() {
        if is_separator(c) {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    out
}

fn is_separator(c: char) -> bool {
    c.is_whitespace()
        || ('\u{2000}'..='\u{200F}').contains(&c)
        || c == '\u{2028}'
        || c == '\u{2029}'
        || c == '\u{FEFF}'
}

/// Whether an attempt behaves like a practice run or a timed exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Practice,
    #[default]
    Exam,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Practice => write!(f, "practice"),
            Mode::Exam => write!(f, "exam"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "practice" => Ok(Mode::Practice),
            "exam" => Ok(Mode::Exam),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// The manifest that enumerates available banks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub banks: Vec<BankInfo>,
}

impl Manifest {
    /// Look up a bank entry by id.
    pub fn find(&self, id: &str) -> Option<&BankInfo> {
        self.banks.iter().find(|b| b.id == id)
    }
}

/// One manifest entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankInfo {
    pub id: String,
    pub title: String,
    /// File name relative to the bank source root.
    pub file: String,
    /// Declared question count, informational only.
    #[serde(default)]
    pub count: Option<u64>,
}

/// Identity keys served in earlier attempts, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    order: Vec<String>,
    index: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains(key)
    }

    /// Insert a key. Returns `false` if it was already present; its position is kept.
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.index.contains(&key) {
            return false;
        }
        self.index.insert(key.clone());
        self.order.push(key);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// The newest `cap` keys, oldest first.
    pub fn most_recent(&self, cap: usize) -> &[String] {
        let start = self.order.len().saturating_sub(cap);
        &self.order[start..]
    }
}

impl FromIterator<String> for SeenSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = SeenSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<String> for SeenSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}
