//! Core types for the TCAP Information Element codec
//!
//! This crate provides the error handling shared by the codec crates.

pub mod error;

pub use error::{TcapError, TcapResult};
