//! quizrun-core: Attempt assembly, no-repeat selection, and scoring.
//!
//! This crate defines the question model and the pure engine that turns
//! loaded question banks into a timed, shuffled attempt and scores it.
//! It performs no I/O of its own: bank data arrives through [`traits::BankSource`].

pub mod attempt;
pub mod catalog;
pub mod countdown;
pub mod dedup;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod score;
pub mod select;
pub mod shuffle;
pub mod traits;
