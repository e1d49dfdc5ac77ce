//! Validation of LLM-generated SQL.
//!
//! Shared by every pipeline that produces SQL (initial generation, correction
//! after a failure). A classification turns one raw reply into either a valid
//! result, an invalid result with a [`FailureKind`], or nothing at all when an
//! internal error prevented a verdict.

mod classifier;
mod normalize;
mod result;
mod strategy;

pub use classifier::ResultClassifier;
pub use normalize::{clean_generation_result, extract_candidate};
pub use result::{FailureKind, GenerationOutcome, InvalidGenerationResult, ValidGenerationResult};
pub use strategy::{ClassifyRequest, ValidationStrategy, ValidationTier};
