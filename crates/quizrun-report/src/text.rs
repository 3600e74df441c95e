//! Plain-text score report and answer review.

use std::fmt::Write;

use quizrun_core::engine::FinishedAttempt;
use quizrun_core::model::Question;
use quizrun_core::score::QuestionOutcome;

/// Format seconds as `mm:ss`. Negative input shows as `00:00`; fractions are dropped.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Letter label for an option index.
pub fn option_letter(index: usize) -> char {
    char::from(b'A' + (index % 26) as u8)
}

/// The score line plus attempt metadata.
pub fn render_summary(done: &FinishedAttempt) -> String {
    let mut out = String::new();
    let score = &done.score;
    let meta = done.attempt.meta();

    let _ = write!(
        out,
        "Score: {}/{} ({}%) | Time: {} | Mode: {} | Difficulty: {}",
        score.correct,
        score.total,
        score.rounded_percent(),
        format_clock(done.elapsed_secs),
        done.attempt.mode(),
        meta.difficulty,
    );
    if done.record.auto_time_expired {
        out.push_str(" | Status: TIME EXPIRED");
    }
    out.push('\n');
    let _ = writeln!(out, "Banks: {} | Questions: {}", meta.banks.join(", "), score.total);
    out
}

/// Per-question review: verdict, options with markers, and explanation.
pub fn render_review(done: &FinishedAttempt) -> String {
    let mut out = String::new();
    for outcome in &done.score.details {
        if let Some(q) = done.attempt.question(outcome.index) {
            render_item(&mut out, q, outcome);
        }
    }
    out
}

/// Summary followed by the full review.
pub fn render_report(done: &FinishedAttempt) -> String {
    let mut out = render_summary(done);
    out.push('\n');
    out.push_str(&render_review(done));
    out
}

fn render_item(out: &mut String, q: &Question, outcome: &QuestionOutcome) {
    let verdict = if outcome.ok { "Correct" } else { "Wrong" };
    let _ = write!(out, "Q{} | {} | {}", outcome.index + 1, verdict, q.bank_id);
    if !q.difficulty.is_empty() {
        let _ = write!(out, " | {}", q.difficulty);
    }
    out.push('\n');
    let _ = writeln!(out, "{}", q.question);

    let tags = if q.tags.is_empty() {
        q.topic.clone()
    } else {
        q.tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    };
    if !tags.is_empty() {
        let _ = writeln!(out, "Tags/Topic: {tags}");
    }

    for (i, option) in q.options.iter().enumerate() {
        let marker = if i == q.answer_index {
            "  <- correct"
        } else if outcome.chosen == Some(i) {
            "  <- your answer"
        } else {
            ""
        };
        let _ = writeln!(out, "  {}) {option}{marker}", option_letter(i));
    }
    if outcome.chosen.is_none() {
        out.push_str("  (not answered)\n");
    }

    if !q.explain.is_empty() {
        let _ = writeln!(out, "Explanation: {}", q.explain);
    }
    out.push('\n');
}
