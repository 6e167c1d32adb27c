//! The execution side of the job engine: a worker process validates
//! every configuration at startup, then pulls due jobs from the shared
//! queue and runs them with bounded concurrency and a bounded retry hop.

pub mod config;
pub mod dispatcher;
pub mod execute;
pub mod heartbeat;
pub mod startup;
