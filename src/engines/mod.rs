//! OCR engine implementations
//!
//! This module contains implementations of the OcrEngine trait for different
//! OCR backends. Engines are conditionally compiled based on feature flags.

#[cfg(any(feature = "engine-ocrs", feature = "engine-leptess"))]
mod models;

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

#[cfg(feature = "engine-leptess")]
pub mod leptess;

use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::PipelineError;
use std::sync::Arc;

/// Names of the engines compiled into this build, in `auto` preference order
pub fn available() -> Vec<&'static str> {
    let mut names = Vec::new();
    #[cfg(feature = "engine-leptess")]
    names.push("leptess");
    #[cfg(feature = "engine-ocrs")]
    names.push("ocrs");
    names
}

/// Build the engine named in the configuration
///
/// `auto` picks the first available engine, preferring one that reads Cyrillic.
pub fn create(config: &Config) -> Result<Arc<dyn OcrEngine>, PipelineError> {
    let available = available();
    let name = match config.engine.as_str() {
        "auto" => available.first().copied().ok_or_else(|| {
            PipelineError::InitializationError(
                "No OCR engines available. Build with --features engine-ocrs or --features engine-leptess".to_string(),
            )
        })?,
        other => available
            .iter()
            .copied()
            .find(|n| *n == other)
            .ok_or_else(|| {
                PipelineError::InitializationError(format!(
                    "OCR engine '{}' is not available (compiled: {})",
                    other,
                    available.join(", ")
                ))
            })?,
    };

    tracing::info!("Initializing {} engine...", name);
    let engine = build(name, config)?;

    if !engine.reads_primary_script() {
        tracing::warn!(
            "{} engine does not recognize Cyrillic; Russian text will be lost",
            engine.name()
        );
    }

    Ok(engine)
}

#[allow(unused_variables)]
fn build(name: &str, config: &Config) -> Result<Arc<dyn OcrEngine>, PipelineError> {
    match name {
        #[cfg(feature = "engine-ocrs")]
        "ocrs" => Ok(Arc::new(ocrs::OcrsEngine::new()?)),
        #[cfg(feature = "engine-leptess")]
        "leptess" => Ok(Arc::new(leptess::LeptessEngine::new(config)?)),
        other => Err(PipelineError::InitializationError(format!(
            "Unknown OCR engine '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_engine_is_rejected() {
        let config = Config {
            engine: "paddle".to_string(),
            ..Config::default()
        };
        match create(&config) {
            Err(PipelineError::InitializationError(msg)) => assert!(msg.contains("paddle")),
            _ => panic!("expected initialization error"),
        }
    }

    #[test]
    fn test_available_engines_follow_features() {
        let names = available();
        assert_eq!(names.contains(&"ocrs"), cfg!(feature = "engine-ocrs"));
        assert_eq!(names.contains(&"leptess"), cfg!(feature = "engine-leptess"));
    }
}
