//! # macrolens-core
//!
//! Core types, tables, and pure logic for the macrolens food-photo service.
//!
//! This crate provides the data model, the static nutrition and synonym
//! tables, label normalization and macro resolution, the label
//! post-processing rules, and the collaborator traits that the inference
//! and API crates depend on. It performs no network I/O.

pub mod budget;
pub mod candidates;
pub mod defaults;
pub mod error;
pub mod labels;
pub mod logging;
pub mod models;
pub mod normalizer;
pub mod nutrition_table;
pub mod resolver;
pub mod summary;
pub mod synonyms;
pub mod traits;

// Re-export commonly used types at crate root
pub use budget::{AnalysisBudget, BudgetStage};
pub use candidates::{candidates_from, filter_candidates};
pub use error::{Error, Result};
pub use labels::food_phrases;
pub use models::*;
pub use normalizer::{parse_quantity, LabelNormalizer};
pub use resolver::{resolve, MacroResolver};
pub use summary::macro_summary;
pub use synonyms::{MatchStrategy, SynonymTable};
pub use traits::*;
