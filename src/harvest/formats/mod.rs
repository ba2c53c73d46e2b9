//! Resolution result encodings.
//!
//! Each encoding implements [`ResolutionSource`](crate::traits::ResolutionSource).
//! - `json` - JSON written by the build tool's model exporter

pub mod json;

pub use json::{parse_curations, JsonResolutionSource};
