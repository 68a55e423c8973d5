//! HTTP communication with the control plane

pub mod client;
