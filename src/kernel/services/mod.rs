//! Services layer (ports + adapters).
//!
//! - `ports`: contracts the kernel talks to (toolkit, storage, location, ...).
//! - `adapters`: in-memory, headless and browser implementations.

pub mod adapters;
pub mod ports;
