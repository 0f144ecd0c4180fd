//! Reliquary Core Library
//!
//! This crate provides common types, math primitives, and error handling
//! shared across all reliquary components.

pub mod error;
pub mod math;

pub use error::{Error, Result};
pub use math::{Euler, Vec3};

/// Re-export commonly used items
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::math::{Euler, Vec3};
}
