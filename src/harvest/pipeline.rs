//! Extraction → curation pipeline.
//!
//! [`HarvestPipeline`] runs the two stages back to back for one project:
//! 1. **Extraction**: convert the foreign resolution result into a snapshot
//! 2. **Curation**: resolve every identity of the snapshot against the
//!    curation set, starting from the caller's base records
//!
//! Per-package problems never fail the pipeline; they are counted in
//! [`HarvestStats`] so the caller can report them.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;
use tracing::info;

use crate::harvest::curation::{
    CurationResolver, CurationSet, PackageRecord, ResolvedConfiguration,
};
use crate::harvest::extractor::GraphExtractor;
use crate::harvest::foreign::ForeignProject;
use crate::harvest::snapshot::ProjectSnapshot;
use crate::harvest::traits::ExtractionError;
use crate::model::PackageIdentity;

/// Complete harvest result of one project.
#[derive(Debug, Clone)]
pub struct HarvestResult {
    pub snapshot: ProjectSnapshot,
    pub resolved: ResolvedConfiguration,
    pub stats: HarvestStats,
}

/// Statistics about the harvest operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HarvestStats {
    /// Time spent on the extraction stage (microseconds)
    pub extraction_duration_us: u64,

    /// Time spent on the curation stage (microseconds)
    pub curation_duration_us: u64,

    /// Distinct packages in the snapshot
    pub packages: usize,

    pub errors: usize,

    pub warnings: usize,

    /// Curations matching at least one package
    pub curations_matched: usize,

    /// Curations that set at least one field on some package
    pub curations_applied: usize,

    pub curations_unmatched: usize,
}

pub struct HarvestPipeline {
    extractor: GraphExtractor,
    resolver: CurationResolver,
}

impl HarvestPipeline {
    pub fn new(extractor: GraphExtractor, resolver: CurationResolver) -> Self {
        Self {
            extractor,
            resolver,
        }
    }

    /// Extracts `project` and curates its packages.
    ///
    /// Identities without an entry in `base_records` start from an empty
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError`] only if extraction fails structurally.
    pub fn execute(
        &self,
        project: &ForeignProject,
        base_records: &BTreeMap<PackageIdentity, PackageRecord>,
        curations: &CurationSet,
    ) -> Result<HarvestResult, ExtractionError> {
        let mut stats = HarvestStats::default();

        // ====================================================================
        // Stage 1: Extraction
        // ====================================================================

        let extraction_start = Instant::now();
        let snapshot = self.extractor.extract(project)?;
        stats.extraction_duration_us = extraction_start.elapsed().as_micros() as u64;
        stats.errors = snapshot.errors.len();
        stats.warnings = snapshot.warnings.len();

        // ====================================================================
        // Stage 2: Curation
        // ====================================================================

        let curation_start = Instant::now();
        let records: BTreeMap<PackageIdentity, PackageRecord> = snapshot
            .identities()
            .into_iter()
            .map(|identity| {
                let record = base_records.get(&identity).cloned().unwrap_or_default();
                (identity, record)
            })
            .collect();
        stats.packages = records.len();

        let resolved = self.resolver.resolve(&records, curations);
        stats.curation_duration_us = curation_start.elapsed().as_micros() as u64;
        stats.curations_matched = resolved.package_curations().len();
        stats.curations_applied = resolved
            .packages()
            .flat_map(|package| &package.applied_curations)
            .filter(|applied| !applied.is_no_op())
            .map(|applied| applied.priority)
            .collect::<BTreeSet<_>>()
            .len();
        stats.curations_unmatched = resolved.unmatched_curations().len();

        info!(
            packages = stats.packages,
            errors = stats.errors,
            warnings = stats.warnings,
            curations_matched = stats.curations_matched,
            curations_applied = stats.curations_applied,
            "Harvest completed"
        );

        Ok(HarvestResult {
            snapshot,
            resolved,
            stats,
        })
    }
}

impl Default for HarvestPipeline {
    fn default() -> Self {
        Self::new(GraphExtractor::new(), CurationResolver::new())
    }
}
