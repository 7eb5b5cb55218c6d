pub mod composer;
pub mod engine;
pub mod generation;
pub mod intent;
pub mod normalizer;
pub mod resolver;
pub mod sanitizer;
pub mod session_cache;
pub mod tables;

#[cfg(test)]
pub(crate) mod fixtures;

pub use crate::domain::model::{DraftOutcome, DraftRequest, ResolutionResult};
pub use crate::domain::ports::{CatalogProvider, ReplyGenerator};
pub use crate::utils::error::Result;
