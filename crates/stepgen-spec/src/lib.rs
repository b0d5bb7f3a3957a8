//! Stepgen step definition compiler.
//!
//! This crate turns Gherkin feature files into Cucumber step definition
//! stubs: it extracts step lines, compiles their text into Cucumber
//! expressions, removes duplicates and renders one TypeScript file per
//! feature file.

pub mod dedup;
pub mod directory;
pub mod generator;
pub mod parsing;
pub mod pattern;
pub mod rendering;
pub mod step;

pub use dedup::{dedup, CompiledStepSet};
pub use directory::{FeatureDirectory, FeatureDirectoryError, FeatureFile};
pub use generator::{FileReport, GenerateError, Generator, RunSummary};
pub use parsing::{ExtractedStep, Extraction, StepExtractor};
pub use pattern::{compile, escape_reserved, CompiledPattern};
pub use rendering::{RenderError, StepRenderer};
pub use step::{KeywordToken, ParameterKind, StepKeyword, StepRecord};
