//! Shared types for Spade process executors.
//!
//! The Spade platform owns processes, their scheduling and the persistence of
//! run records. Executors and history providers plug into it through the
//! traits in [`host`] and exchange the values in [`run`].

pub mod host;
pub mod run;

pub use host::{Executor, HistoryProvider};
pub use run::{Process, RunOutcome, RunResult, RunStatus, Timestamp, UserIdentity};
