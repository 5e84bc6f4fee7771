//! Timer engine adapter
//!
//! [`TokioTimerEngine`] keeps one sleeping task per armed job and delivers
//! fired jobs on an `mpsc` channel consumed by the
//! [`JobDispatcher`](debate_application::JobDispatcher).

mod tokio_engine;

pub use tokio_engine::TokioTimerEngine;

#[cfg(test)]
mod scenarios;
