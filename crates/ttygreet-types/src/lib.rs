//! Foundation types for ttygreet.
//!
//! This crate contains the types shared by the terminal engine and its
//! hosts: the error enum, key and input-mode events, and the TOML/JSON
//! configuration.

pub mod config;
pub mod error;
pub mod input;
