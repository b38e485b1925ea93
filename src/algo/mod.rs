//! Mesh processing algorithms.
//!
//! - **Welding**: merge coincident vertices and repair the edges that
//!   referenced them ([`weld`])
//!
//! Long-running passes accept a [`Progress`] callback through their options.

pub mod progress;
pub mod weld;

pub use progress::Progress;
pub use weld::{weld_vertices, WeldOptions, WeldReport};
