pub mod generators;
pub mod processor;
pub mod registry;
pub mod types;
pub mod verifier;

pub use generators::ValueGenerator;
pub use processor::RoundOrchestrator;
pub use registry::GeneratorRegistry;
pub use types::*;
pub use verifier::VerificationEngine;
