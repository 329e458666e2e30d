//! Shared helpers.

pub mod hash;
pub mod minify;
pub mod template;
