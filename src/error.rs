//! Error types for the practice-session analysis engine

use std::fmt;

/// Errors that can occur during practice-session analysis
#[derive(Debug, Clone)]
pub enum AnalysisError {
    /// Invalid input parameters (empty waveform, zero sample rate, bad config)
    InvalidInput(String),

    /// Numerical error (filter design failure, transform failure)
    NumericalError(String),

    /// A value violated an invariant before it should have
    /// (e.g. non-positive frequency reaching MIDI conversion)
    DomainError(String),

    /// Not enough data to compute a result; callers may treat this
    /// as a degenerate outcome rather than a fatal failure
    InsufficientData(String),

    /// Processing error during analysis
    ProcessingError(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
            AnalysisError::DomainError(msg) => write!(f, "Domain error: {}", msg),
            AnalysisError::InsufficientData(msg) => write!(f, "Insufficient data: {}", msg),
            AnalysisError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}
