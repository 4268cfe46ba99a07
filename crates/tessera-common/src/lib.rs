//! Common utilities for the Tessera display-list engine.
//!
//! This crate provides shared infrastructure used by all Tessera components:
//! - **Warning System** - deduplicated, colored terminal output for
//!   non-fatal misuse and unsupported backend features
//! - **Images** - decoded RGBA pixel data shared between recording and
//!   rendering

pub mod image;
pub mod warning;

pub use image::{Image, ImageError};
pub use warning::{clear_warnings, warn_once};
