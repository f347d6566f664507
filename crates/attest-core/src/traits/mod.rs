//! Collaborator seams. The engine only talks to generators, checkers and
//! codebase sources through these traits.

pub mod checker;
pub mod generator;
pub mod source;

pub use checker::{CheckOutcome, ClaimChecker};
pub use generator::{ClaimGenerator, Generation, GenerationRequest};
pub use source::CodebaseSource;
