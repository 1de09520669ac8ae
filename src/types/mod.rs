//! Core types for langrig.

pub mod generation;
pub mod message;
pub mod options;
pub mod stream;
pub mod usage;

pub use generation::*;
pub use message::*;
pub use options::*;
pub use stream::*;
pub use usage::*;
