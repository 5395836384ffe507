//! Command implementations.

pub mod check;
pub mod new;
pub mod render;
