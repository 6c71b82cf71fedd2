//! Generation provider abstractions for Neon.
//!
//! - `GenerationProvider`: RPITIT trait for concrete provider implementations
//! - `BoxGenerationProvider`: Object-safe wrapper for dynamic dispatch

pub mod box_provider;
pub mod provider;
