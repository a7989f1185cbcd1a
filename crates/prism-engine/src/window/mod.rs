//! Platform loop: window creation and event dispatch.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
