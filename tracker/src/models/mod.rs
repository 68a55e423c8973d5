//! Wire models shared with the control plane

pub mod report;
pub mod spec;
