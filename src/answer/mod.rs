//! Answer composition: extractive baseline, pluggable generation backends,
//! and citation validation.

pub mod answerer;
pub mod generator;

pub use answerer::{AnswerMode, AnswerOutput, AnswerValidation, Answerer};
pub use generator::{GenerateError, TextGenerator};
