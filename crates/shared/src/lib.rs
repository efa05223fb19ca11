//! Shared utilities and common types for Edukit Manager.
//!
//! This crate provides common functionality used across all other crates:
//! - Opaque identifier and school code generation
//! - The comma-joined field format used by the spreadsheet backend
//! - Korean-aware name ordering
//! - Inline image (data URL) helpers
//! - Common validation logic

pub mod collation;
pub mod delimited;
pub mod id;
pub mod image;
pub mod validation;
