//! Utility functions and helpers.
//!
//! This module contains helpers for timestamps and hex rendering of
//! opaque wire payloads.

pub mod hex_serde;
pub mod time;
