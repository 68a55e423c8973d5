//! Deployment progress tracking core

pub mod attempt;
pub mod buffer;
pub mod classifier;
pub mod milestones;
