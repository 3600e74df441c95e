//! The `quizrun run` command: an interactive, timed attempt on stdin.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};

use quizrun_banks::load_config_from;
use quizrun_core::attempt::Attempt;
use quizrun_core::countdown::{spawn_countdown, CountdownEvent, DEFAULT_TICK};
use quizrun_core::difficulty::Profile;
use quizrun_core::engine::QuizSession;
use quizrun_core::model::Mode;
use quizrun_core::shuffle::{RandomSource, SeededRandom, ThreadRandom};
use quizrun_report::text::option_letter;
use quizrun_report::{format_clock, render_report, report_file_name, save_json};

/// Command-line options for `quizrun run`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub banks: String,
    pub count: Option<usize>,
    pub timer: Option<u64>,
    pub mode: Option<String>,
    pub difficulty: Option<String>,
    pub shuffle_options: bool,
    pub allow_repeats: bool,
    pub seed: Option<u64>,
    pub report: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// One line of user input during an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Answer(usize),
    Next,
    Prev,
    Goto(usize),
    Flag,
    Review,
    Submit,
    Quit,
    Help,
}

fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim().to_lowercase();
    let mut parts = line.split_whitespace();
    let head = parts.next()?;

    let input = match head {
        "1" | "2" | "3" | "4" => Input::Answer(head.parse::<usize>().ok()? - 1),
        "a" | "b" | "c" | "d" => Input::Answer((head.as_bytes()[0] - b'a') as usize),
        "n" | "next" => Input::Next,
        "p" | "prev" => Input::Prev,
        "g" | "go" => {
            let n: usize = parts.next()?.parse().ok()?;
            Input::Goto(n.checked_sub(1)?)
        }
        "f" | "flag" => Input::Flag,
        "r" | "review" => Input::Review,
        "s" | "submit" => Input::Submit,
        "q" | "quit" => Input::Quit,
        "h" | "help" | "?" => Input::Help,
        _ => return None,
    };
    Some(input)
}

/// What the input loop does after handling a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Submit,
    Quit,
}

/// Apply one input to the attempt, returning what to print and what to do next.
fn apply_input(attempt: &mut Attempt, cursor: &mut usize, input: Input) -> (Step, String) {
    let last = attempt.len().saturating_sub(1);
    let message = match input {
        Input::Answer(option) => match attempt.answer(*cursor, option) {
            Ok(_) if *cursor < last => {
                *cursor += 1;
                String::new()
            }
            Ok(_) => "Answer saved. This is the last question; `s` submits.".to_string(),
            Err(e) => e.to_string(),
        },
        Input::Next if *cursor < last => {
            *cursor += 1;
            String::new()
        }
        Input::Next => "Already at the last question.".to_string(),
        Input::Prev if *cursor > 0 => {
            *cursor -= 1;
            String::new()
        }
        Input::Prev => "Already at the first question.".to_string(),
        Input::Goto(index) if index < attempt.len() => {
            *cursor = index;
            String::new()
        }
        Input::Goto(index) => format!("No question {} (attempt has {}).", index + 1, attempt.len()),
        Input::Flag => match attempt.toggle_flag(*cursor) {
            Ok(true) => format!("Flagged Q{}.", *cursor + 1),
            Ok(false) => format!("Unflagged Q{}.", *cursor + 1),
            Err(e) => e.to_string(),
        },
        Input::Review => review_summary(attempt),
        Input::Submit => return (Step::Submit, String::new()),
        Input::Quit => return (Step::Quit, String::new()),
        Input::Help => HELP.to_string(),
    };
    (Step::Continue, message)
}

const HELP: &str = "Commands: 1-4 or a-d answer | n next | p previous | g N go to question N | \
f flag | r review | s submit | q quit";

fn review_summary(attempt: &Attempt) -> String {
    let flagged: Vec<String> = attempt
        .flagged()
        .iter()
        .map(|i| format!("Q{}", i + 1))
        .collect();
    let unanswered: Vec<String> = (0..attempt.len())
        .filter(|&i| !attempt.is_answered(i))
        .map(|i| format!("Q{}", i + 1))
        .collect();
    format!(
        "Answered {}/{} | Unanswered: {} | Flagged: {}",
        attempt.len() - attempt.unanswered_count(),
        attempt.len(),
        if unanswered.is_empty() { "none".to_string() } else { unanswered.join(", ") },
        if flagged.is_empty() { "none".to_string() } else { flagged.join(", ") },
    )
}

fn render_question(attempt: &Attempt, cursor: usize) -> String {
    let Some(q) = attempt.question(cursor) else {
        return "This attempt has no questions; `s` submits.".to_string();
    };
    let remaining = attempt.remaining_secs(Utc::now());

    let mut out = format!("\nQ{}/{}", cursor + 1, attempt.len());
    if attempt.is_flagged(cursor) {
        out.push_str(" [flagged]");
    }
    out.push_str(&format!(" | {}", q.bank_id));
    if !q.difficulty.is_empty() {
        out.push_str(&format!(" | {}", q.difficulty));
    }
    out.push_str(&format!(" | {} left\n{}\n", format_clock(remaining), q.question));

    let chosen = attempt.answers().get(cursor);
    for (i, option) in q.options.iter().enumerate() {
        let marker = if chosen == Some(i) { "  *" } else { "" };
        out.push_str(&format!("  {}) {option}{marker}\n", option_letter(i)));
    }
    out
}

pub async fn execute(opts: RunOptions) -> Result<()> {
    let config = load_config_from(opts.config.as_deref())?;

    let bank_ids: Vec<String> = opts
        .banks
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let mut attempt_config = config.defaults.attempt_config(bank_ids);
    if let Some(count) = opts.count {
        attempt_config.count = count;
    }
    if let Some(minutes) = opts.timer {
        attempt_config.time_limit_minutes = minutes;
    }
    if let Some(mode) = &opts.mode {
        attempt_config.mode = mode.parse::<Mode>().map_err(anyhow::Error::msg)?;
    }
    if let Some(label) = &opts.difficulty {
        attempt_config.profile = Profile::from_label(label);
    }
    attempt_config.shuffle_options &= opts.shuffle_options;
    attempt_config.avoid_repeats &= !opts.allow_repeats;
    let attempt_config = attempt_config.clamped();

    let (source, mut catalog) = super::open_catalog(&config).await?;
    catalog
        .ensure_loaded(source.as_ref(), &attempt_config.bank_ids)
        .await?;

    let mut store = super::history_store(&config);
    let mut seen = store.load_seen();
    let mut rng: Box<dyn RandomSource> = match opts.seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(ThreadRandom),
    };

    let mut session = QuizSession::new();
    let attempt = session.start(
        &catalog,
        &attempt_config,
        &mut seen,
        rng.as_mut(),
        Utc::now(),
    )?;
    println!(
        "{} attempt: {} question(s) from {} | {} minute(s) | difficulty {}",
        attempt.mode(),
        attempt.len(),
        attempt_config.bank_ids.join(", "),
        attempt_config.time_limit_minutes,
        attempt_config.profile,
    );
    println!("{HELP}");
    println!("{}", render_question(attempt, 0));
    let started_at = attempt.start_time();

    if attempt_config.avoid_repeats {
        store.save_seen(&seen).context("failed to save seen questions")?;
    }

    let limit = Duration::from_secs(attempt_config.time_limit_secs());
    let mut countdown = spawn_countdown(started_at, limit, DEFAULT_TICK);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut cursor = 0usize;

    let (step, auto_expired) = loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    break (Step::Submit, false);
                };
                let Some(attempt) = session.current_mut() else {
                    break (Step::Quit, false);
                };
                let Some(input) = parse_input(&line) else {
                    if !line.trim().is_empty() {
                        println!("Unknown command. {HELP}");
                    }
                    continue;
                };
                let before = cursor;
                let (step, message) = apply_input(attempt, &mut cursor, input);
                if step != Step::Continue {
                    break (step, false);
                }
                if !message.is_empty() {
                    println!("{message}");
                }
                if cursor != before || matches!(input, Input::Flag | Input::Answer(_)) {
                    println!("{}", render_question(attempt, cursor));
                }
            }
            Some(event) = countdown.next_event() => {
                if event == CountdownEvent::Expired {
                    println!("\nTime is up.");
                    break (Step::Submit, true);
                }
            }
        }
    };
    countdown.cancel();

    if step == Step::Quit {
        session.abandon();
        println!("Attempt abandoned.");
        return Ok(());
    }

    let done = session
        .submit(auto_expired, Utc::now())
        .context("no attempt in progress")?;
    println!("\n{}", render_report(done));

    store
        .save_attempt(done.record.clone())
        .context("failed to save attempt history")?;

    if let Some(path) = &opts.report {
        let path = if path.is_dir() {
            path.join(report_file_name(done))
        } else {
            path.clone()
        };
        save_json(done, &path)?;
        eprintln!("Attempt saved to: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizrun_core::attempt::AttemptMeta;
    use quizrun_core::model::Question;

    fn attempt(n: i64) -> Attempt {
        let questions = (1..=n)
            .map(|i| Question {
                bank_id: "net".into(),
                id: Some(i.into()),
                question: format!("Question {i}?"),
                options: ["w".into(), "x".into(), "y".into(), "z".into()],
                answer_index: 0,
                explain: String::new(),
                difficulty: String::new(),
                topic: String::new(),
                tags: Default::default(),
            })
            .collect();
        Attempt::new(
            questions,
            Utc::now(),
            600,
            Mode::Exam,
            AttemptMeta {
                banks: vec!["net".into()],
                difficulty: Profile::Mixed,
            },
        )
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_input("1"), Some(Input::Answer(0)));
        assert_eq!(parse_input(" D "), Some(Input::Answer(3)));
        assert_eq!(parse_input("g 12"), Some(Input::Goto(11)));
        assert_eq!(parse_input("g 0"), None);
        assert_eq!(parse_input("g"), None);
        assert_eq!(parse_input("5"), None);
        assert_eq!(parse_input("s"), Some(Input::Submit));
        assert_eq!(parse_input("?"), Some(Input::Help));
        assert_eq!(parse_input(""), None);
    }

    #[test]
    fn answering_advances_until_the_last_question() {
        let mut a = attempt(2);
        let mut cursor = 0;
        let (step, _) = apply_input(&mut a, &mut cursor, Input::Answer(1));
        assert_eq!(step, Step::Continue);
        assert_eq!(cursor, 1);

        let (_, message) = apply_input(&mut a, &mut cursor, Input::Answer(0));
        assert_eq!(cursor, 1);
        assert!(message.contains("last question"));
        assert_eq!(a.answers().get(0), Some(1));
        assert_eq!(a.answers().get(1), Some(0));
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut a = attempt(3);
        let mut cursor = 0;
        apply_input(&mut a, &mut cursor, Input::Prev);
        assert_eq!(cursor, 0);
        apply_input(&mut a, &mut cursor, Input::Goto(2));
        assert_eq!(cursor, 2);
        let (_, message) = apply_input(&mut a, &mut cursor, Input::Goto(7));
        assert_eq!(cursor, 2);
        assert!(message.contains("No question 8"));
        apply_input(&mut a, &mut cursor, Input::Next);
        assert_eq!(cursor, 2);
    }

    #[test]
    fn review_lists_unanswered_and_flagged() {
        let mut a = attempt(3);
        let mut cursor = 1;
        apply_input(&mut a, &mut cursor, Input::Flag);
        apply_input(&mut a, &mut cursor, Input::Answer(2));
        let (_, summary) = apply_input(&mut a, &mut cursor, Input::Review);
        assert_eq!(summary, "Answered 1/3 | Unanswered: Q1, Q3 | Flagged: Q2");
    }

    #[test]
    fn submit_and_quit_end_the_loop() {
        let mut a = attempt(1);
        let mut cursor = 0;
        assert_eq!(apply_input(&mut a, &mut cursor, Input::Submit).0, Step::Submit);
        assert_eq!(apply_input(&mut a, &mut cursor, Input::Quit).0, Step::Quit);
    }

    #[test]
    fn question_view_marks_choice() {
        let mut a = attempt(1);
        a.answer(0, 2).unwrap();
        a.toggle_flag(0).unwrap();
        let view = render_question(&a, 0);
        assert!(view.starts_with("\nQ1/1 [flagged] | net | "));
        assert!(view.contains(" left\nQuestion 1?\n"));
        assert!(view.contains("  C) y  *"));
    }
}
