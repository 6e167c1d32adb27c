//! Caller-facing surface of the job dispatcher.
//!
//! Submission with single-flight dedup, state and result queries, the
//! blocking `wait`, and state-filtered job listing. The execution side
//! (claiming, retry, recording) lives in the worker crate; both talk to
//! the same Postgres-backed queue.

pub mod dispatcher;
pub mod error;

pub use dispatcher::{JobQueue, ResultLookup, StateFilter, SubmitRequest};
pub use error::QueueError;
