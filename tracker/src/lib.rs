//! Harbor Master Tracker Library
//!
//! Core modules for the deployment-progress tracker: the log transcript,
//! the milestone state machine, the reconnecting stream session, and the
//! structured deploy diagnostics.

pub mod app;
pub mod console;
pub mod diagnostics;
pub mod errors;
pub mod http;
pub mod logs;
pub mod models;
pub mod storage;
pub mod stream;
pub mod tracker;
pub mod utils;
