//! Core BRDF resolution modules

pub mod envelope;
pub mod epoch;
pub mod locator;
pub mod pipeline;
pub mod resolver;

// Re-export main types
pub use envelope::EnvelopeConvention;
pub use epoch::EpochSelector;
pub use locator::{find_artifact, AmbiguityPolicy};
pub use pipeline::{ArtifactPipeline, ArtifactRequest};
pub use resolver::{
    BrdfResolver, BrdfResults, DirectionalParameters, ProvenanceSummary, SceneDescription,
};
