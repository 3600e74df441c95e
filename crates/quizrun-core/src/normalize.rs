//! Bank payload normalization.
//!
//! Turns raw bank JSON into validated [`Question`]s. A record that fails
//! validation is dropped with a reason instead of failing the whole bank, and
//! a payload of the wrong overall shape yields no questions at all.

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;

use crate::model::{Question, QuestionId, OPTION_COUNT};

/// The two accepted payload shapes, resolved once at ingestion.
#[derive(Debug, Clone, PartialEq)]
pub enum BankPayload {
    /// A bare array of records.
    Bare(Vec<Value>),
    /// `{ meta, questions: [...] }`.
    Wrapped {
        meta: Option<Value>,
        questions: Vec<Value>,
    },
    /// Neither shape; normalizes to nothing.
    Malformed,
}

impl BankPayload {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(records) => BankPayload::Bare(records),
            Value::Object(mut map) => match map.remove("questions") {
                Some(Value::Array(questions)) => BankPayload::Wrapped {
                    meta: map.remove("meta"),
                    questions,
                },
                _ => BankPayload::Malformed,
            },
            _ => BankPayload::Malformed,
        }
    }

    /// Parse raw bytes; unparseable JSON is treated as a malformed payload.
    pub fn from_slice(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => Self::from_value(value),
            Err(e) => {
                tracing::debug!("bank payload is not valid JSON: {e}");
                BankPayload::Malformed
            }
        }
    }

    /// The records to normalize, in source order.
    pub fn into_records(self) -> Vec<Value> {
        match self {
            BankPayload::Bare(records) => records,
            BankPayload::Wrapped { questions, .. } => questions,
            BankPayload::Malformed => Vec::new(),
        }
    }
}

/// Why a record was left out of a bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    NotAnObject,
    MissingQuestion,
    OptionsNotAList,
    WrongOptionCount(usize),
    OptionNotText(usize),
    AnswerIndexNotInteger,
    AnswerIndexOutOfRange(i64),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::NotAnObject => write!(f, "record is not an object"),
            DropReason::MissingQuestion => write!(f, "question text is missing or empty"),
            DropReason::OptionsNotAList => write!(f, "options is not a list"),
            DropReason::WrongOptionCount(n) => write!(f, "expected 4 options, found {n}"),
            DropReason::OptionNotText(i) => write!(f, "option {i} is not text"),
            DropReason::AnswerIndexNotInteger => write!(f, "answer_index is not an integer"),
            DropReason::AnswerIndexOutOfRange(i) => {
                write!(f, "answer_index {i} is outside 0-3")
            }
        }
    }
}

/// A record that did not survive validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRecord {
    /// 1-based position in the source array.
    pub position: usize,
    pub reason: DropReason,
}

/// Result of normalizing one bank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeOutcome {
    pub questions: Vec<Question>,
    pub dropped: Vec<DroppedRecord>,
}

impl NormalizeOutcome {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// Normalize every record of a payload, tagging kept questions with `bank_id`.
pub fn normalize_bank(bank_id: &str, payload: BankPayload) -> NormalizeOutcome {
    if payload == BankPayload::Malformed {
        tracing::warn!("bank '{bank_id}' is neither a list nor a {{questions}} wrapper");
    }

    let mut outcome = NormalizeOutcome::default();
    for (idx, record) in payload.into_records().iter().enumerate() {
        let position = idx + 1;
        match normalize_record(bank_id, position, record) {
            Ok(q) => outcome.questions.push(q),
            Err(reason) => {
                tracing::debug!(bank = bank_id, position, %reason, "dropping record");
                outcome.dropped.push(DroppedRecord { position, reason });
            }
        }
    }

    tracing::info!(
        bank = bank_id,
        kept = outcome.questions.len(),
        dropped = outcome.dropped_count(),
        "normalized bank"
    );
    outcome
}

/// Validate one record. `position` is 1-based and becomes the id when none is given.
pub fn normalize_record(
    bank_id: &str,
    position: usize,
    record: &Value,
) -> Result<Question, DropReason> {
    let obj = record.as_object().ok_or(DropReason::NotAnObject)?;

    let question = match obj.get("question") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => return Err(DropReason::MissingQuestion),
    };

    let options = parse_options(obj.get("options"))?;
    let answer_index = parse_answer_index(obj.get("answer_index"))?;

    let id = match obj.get("id") {
        None | Some(Value::Null) => QuestionId::Number(position as i64),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => QuestionId::Number(i),
            None => QuestionId::Text(n.to_string()),
        },
        Some(Value::String(s)) => QuestionId::Text(s.clone()),
        Some(other) => QuestionId::Text(other.to_string()),
    };

    let tags: BTreeSet<String> = match obj.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(scalar_text)
            .filter(|t| !t.is_empty())
            .collect(),
        _ => BTreeSet::new(),
    };

    Ok(Question {
        bank_id: bank_id.to_string(),
        id: Some(id),
        question,
        options,
        answer_index,
        explain: text_field(obj.get("explain")),
        difficulty: text_field(obj.get("difficulty")),
        topic: text_field(obj.get("topic")),
        tags,
    })
}

fn parse_options(value: Option<&Value>) -> Result<[String; OPTION_COUNT], DropReason> {
    let items = match value {
        Some(Value::Array(items)) => items,
        _ => return Err(DropReason::OptionsNotAList),
    };
    if items.len() != OPTION_COUNT {
        return Err(DropReason::WrongOptionCount(items.len()));
    }
    let mut options: [String; OPTION_COUNT] = Default::default();
    for (i, item) in items.iter().enumerate() {
        options[i] = scalar_text(item).ok_or(DropReason::OptionNotText(i))?;
    }
    Ok(options)
}

fn parse_answer_index(value: Option<&Value>) -> Result<usize, DropReason> {
    let n = match value {
        Some(Value::Number(n)) => n,
        _ => return Err(DropReason::AnswerIndexNotInteger),
    };
    let index = match (n.as_i64(), n.as_f64()) {
        (Some(i), _) => i,
        // 2.0 is an integer as far as bank authors are concerned
        (None, Some(f)) if f.is_finite() && f.fract() == 0.0 => f as i64,
        _ => return Err(DropReason::AnswerIndexNotInteger),
    };
    if !(0..OPTION_COUNT as i64).contains(&index) {
        return Err(DropReason::AnswerIndexOutOfRange(index));
    }
    Ok(index as usize)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_field(value: Option<&Value>) -> String {
    value.and_then(scalar_text).unwrap_or_default()
}
