//! Application layer: page model, SVG writer and renderers
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod page;
pub mod services;
pub mod svg;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use page::{Mount, Page};
