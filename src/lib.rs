//! Sunburst chart core.
//!
//! Records with a label path and a weight become a weighted [`domain::Tree`],
//! which is laid out as a radial [`domain::Partition`] and animated between
//! focus nodes by [`domain::ZoomState`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
