//! Error types for the fairdice service
//!
//! One enum per layer, joined under [`FairDiceError`]. Stage labels added by the
//! round orchestrator are diagnostic only: the wrapped error keeps its kind.

use std::fmt;
use thiserror::Error;

/// Root error type for all fairdice operations
#[derive(Debug, Error)]
pub enum FairDiceError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A generator failed outside of a round
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    /// A generator failed while drawing one side of a round
    #[error("{stage}: {source}")]
    Draw {
        stage: DrawStage,
        #[source]
        source: GeneratorError,
    },

    /// Generator selection errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Storage collaborator errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Verification precondition errors
    #[error("Verification error: {0}")]
    Verification(#[from] VerificationError),

    /// Metric registration failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Which side of a round a draw belonged to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStage {
    Player,
    House,
}

impl fmt::Display for DrawStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawStage::Player => write!(f, "player draw failed"),
            DrawStage::House => write!(f, "house draw failed"),
        }
    }
}

/// Value generator errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeneratorError {
    /// The range cannot be sampled even after normalization
    #[error("Unusable range [{min}, {max}]")]
    RangeError { min: i64, max: i64 },

    /// Commit-reveal draws never swap their bounds
    #[error("Invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: i64, max: i64 },

    /// The entropy source could not produce bytes
    #[error("Entropy source failure: {0}")]
    Entropy(String),
}

/// Generator registry errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No random generators available")]
    NoGeneratorsAvailable,

    #[error("Generator not found: {0}")]
    GeneratorNotFound(String),
}

/// Storage collaborator errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Round not found: {0}")]
    NotFound(String),

    #[error("Round already stored: {0}")]
    Duplicate(String),

    #[error("Database open failed: {0}")]
    DatabaseOpenFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Corrupted data: {0}")]
    CorruptedData(String),
}

/// Verification precondition errors
///
/// A digest or value mismatch is not an error; it is reported as `Ok(false)`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Round not found: {0}")]
    NotFound(String),

    #[error("Round was played with generator '{0}', which is not verifiable")]
    NotVerifiable(String),

    #[error("Verification data is missing for this round")]
    MissingDisclosure,

    #[error("Invalid verification data format: {0}")]
    MalformedDisclosure(String),

    #[error("Invalid draw count in verification data: {0}")]
    InvalidDrawCount(String),
}

/// Configuration and validation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Missing required field: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl StorageError {
    /// Database read failure
    pub fn read(e: impl std::fmt::Display) -> Self {
        StorageError::ReadFailed(e.to_string())
    }

    /// Database write failure
    pub fn write(e: impl std::fmt::Display) -> Self {
        StorageError::WriteFailed(e.to_string())
    }
}

// Convenience type alias for Results
pub type FairDiceResult<T> = Result<T, FairDiceError>;
