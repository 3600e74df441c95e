//! quizrun-store: Persistence for seen questions and attempt history.
//!
//! Two bounded collections live in a key-value backend: the identity keys
//! already served (steering later selections toward new questions) and the
//! most recent attempt records.

pub mod backend;
pub mod error;
pub mod history;

pub use backend::{FileBackend, KvBackend, MemoryBackend};
pub use error::StoreError;
pub use history::HistoryStore;
