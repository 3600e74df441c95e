//! Cross-bank deduplication by identity key.

use std::collections::HashSet;

use crate::model::Question;

/// Keep the first occurrence of each identity key, preserving order.
///
/// Questions without a usable identity key are dropped.
pub fn dedup_questions<I>(questions: I) -> Vec<Question>
where
    I: IntoIterator<Item = Question>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut unkeyed = 0usize;

    for q in questions {
        let Some(key) = q.identity_key() else {
            unkeyed += 1;
            continue;
        };
        if seen.insert(key) {
            out.push(q);
        }
    }

    if unkeyed > 0 {
        tracing::debug!("dropped {unkeyed} question(s) without an identity key");
    }
    out
}
