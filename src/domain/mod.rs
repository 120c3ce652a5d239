//! Domain layer: pure, synchronous bookmark rules.

pub mod encoding;
pub mod error;
pub mod model;
pub mod traits;
