//! quizrun-report: Report generation for finished attempts.
//!
//! Renders the score line and answer review as plain text, and exports
//! finished attempts as JSON.

pub mod json;
pub mod text;

pub use json::{load_json, report_file_name, save_json};
pub use text::{format_clock, render_report, render_review, render_summary};

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{DateTime, Duration, Utc};
    use quizrun_core::attempt::{Attempt, AttemptMeta};
    use quizrun_core::difficulty::Profile;
    use quizrun_core::engine::{finalize, FinishedAttempt};
    use quizrun_core::model::{Mode, Question};

    fn question(id: i64, difficulty: &str, topic: &str) -> Question {
        Question {
            bank_id: "net".into(),
            id: Some(id.into()),
            question: format!("Question {id}?"),
            options: [
                format!("right {id}"),
                "wrong b".into(),
                "wrong c".into(),
                "wrong d".into(),
            ],
            answer_index: 0,
            explain: if id == 1 { "because 1".into() } else { String::new() },
            difficulty: difficulty.into(),
            topic: topic.into(),
            tags: Default::default(),
        }
    }

    /// Three questions: the first right, the second wrong, the third skipped; 65s elapsed.
    pub(crate) fn finished(auto_time_expired: bool) -> FinishedAttempt {
        let start = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let mut attempt = Attempt::new(
            vec![
                question(1, "easy", "basics"),
                question(2, "", ""),
                question(3, "", ""),
            ],
            start,
            90 * 60,
            Mode::Exam,
            AttemptMeta {
                banks: vec!["net".into()],
                difficulty: Profile::Mixed,
            },
        );
        attempt.answer(0, 0).unwrap();
        attempt.answer(1, 2).unwrap();
        finalize(attempt, auto_time_expired, start + Duration::seconds(65))
    }
}
