//! Harvest module - dependency graph extraction and package curation.
//!
//! This module provides the two cooperating stages of the crate:
//! - **Foreign model**: the build tool's resolution result via [`ForeignProject`]
//! - **Extraction**: normalized [`ProjectSnapshot`]s via [`GraphExtractor`]
//! - **Curation**: prioritized metadata overrides via [`CurationResolver`]
//! - **Pipeline**: both stages chained via [`pipeline::HarvestPipeline`]

pub mod curation;
pub mod extractor;
pub mod foreign;
pub mod formats;
pub mod pipeline;
pub mod snapshot;
pub mod traits;

// Re-export commonly used types
pub use traits::{ExtractionError, HarvestStage};

pub use curation::{
    AppliedCuration, CurationResolver, CurationSet, FieldValue, PackageCuration, PackageRecord,
    ResolvedConfiguration, ResolvedPackage,
};
pub use extractor::{ExtractorConfig, GraphExtractor};
pub use foreign::{ApiDialect, ForeignProject, ToolVersion};
pub use pipeline::{HarvestPipeline, HarvestResult, HarvestStats};
pub use snapshot::{DependencyNode, ProjectSnapshot, ScopeGraph, Severity};
