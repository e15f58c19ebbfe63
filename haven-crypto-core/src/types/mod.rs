//! Core type definitions for the RingCT engine.

pub mod errors;
pub mod rct;

pub use errors::{RctError, RctResult};
pub use rct::*;
