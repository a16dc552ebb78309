//! Screenshot annotation pipeline.
//!
//! Screenshots are fingerprinted, read by an OCR engine, cleaned of
//! recognition noise, spell-corrected against Russian and English
//! dictionaries, and analyzed into role-based entity buckets.

pub mod analysis;
pub mod clean;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod engines;
pub mod error;
pub mod fingerprint;
pub mod pipeline;
pub mod server;
pub mod spelling;
pub mod vocabulary;

pub use analysis::{Analysis, Analyzer, EntityBuckets, LinguisticModel};
pub use config::Config;
pub use engine::{Detection, OcrEngine};
pub use error::PipelineError;
pub use pipeline::{Outcome, Pipeline, PipelineResult};
pub use spelling::{SpellCorrector, SpellDictionary};
pub use vocabulary::Vocabulary;
