//! portviz: portfolio visualizations rendered to SVG.
//!
//! Layers follow a domain / application / infrastructure / cli split. The
//! domain is pure; renderers live in `application::services`; I/O sits behind
//! the traits in `infrastructure::traits`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
