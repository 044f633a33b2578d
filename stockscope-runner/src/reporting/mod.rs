//! Artifact export for finished analyses.

pub mod artifacts;

pub use artifacts::{ArtifactManager, ArtifactPaths};
