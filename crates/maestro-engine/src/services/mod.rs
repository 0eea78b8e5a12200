//! Engine Services
//!
//! Decision services over the model catalog and usage aggregates.

mod budget;
mod cost;
mod router;

pub use budget::*;
pub use cost::*;
pub use router::*;
