//! Priority-ordered curation of package records.
//!
//! A [`CurationSet`] is ordered highest priority first. For each package the
//! resolver walks the set left to right and keeps a claimed-field set: the
//! first matching curation to set a field wins it, every later attempt on the
//! same field is recorded as superseded. Curations that match but set nothing
//! are still recorded, so the audit trail is complete.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

use crate::model::{IdentityPattern, PackageIdentity};

/// Value of one package metadata field.
pub type FieldValue = serde_json::Value;

/// Package metadata keyed by field name.
pub type PackageRecord = BTreeMap<String, FieldValue>;

/// Number of packages from which resolution fans out across threads.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

// ============================================================================
// Curations
// ============================================================================

/// A correction to the metadata of the packages matching `applies_to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageCuration {
    pub applies_to: IdentityPattern,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_overrides: BTreeMap<String, FieldValue>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

impl PackageCuration {
    pub fn new(applies_to: impl Into<IdentityPattern>) -> Self {
        Self {
            applies_to: applies_to.into(),
            field_overrides: BTreeMap::new(),
            comment: String::new(),
        }
    }

    pub fn with_override(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.field_overrides.insert(field.into(), value.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// Curations ordered highest priority first. The index of a curation is its
/// priority; order as received is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurationSet {
    curations: Vec<PackageCuration>,
}

impl CurationSet {
    pub fn new(curations: Vec<PackageCuration>) -> Self {
        Self { curations }
    }

    /// Appends `curation` with the lowest priority so far.
    pub fn push(&mut self, curation: PackageCuration) {
        self.curations.push(curation);
    }

    pub fn get(&self, priority: usize) -> Option<&PackageCuration> {
        self.curations.get(priority)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PackageCuration> {
        self.curations.iter()
    }

    pub fn len(&self) -> usize {
        self.curations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curations.is_empty()
    }
}

impl FromIterator<PackageCuration> for CurationSet {
    fn from_iter<I: IntoIterator<Item = PackageCuration>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ============================================================================
// Resolution Results
// ============================================================================

/// What one matching curation did to one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCuration {
    /// Index of the curation in its [`CurationSet`]
    pub priority: usize,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,

    /// Fields this curation set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applied_fields: Vec<String>,

    /// Fields this curation tried to set after a higher-priority one had
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub superseded_fields: Vec<String>,
}

impl AppliedCuration {
    fn new(priority: usize, comment: &str) -> Self {
        Self {
            priority,
            comment: comment.to_string(),
            applied_fields: Vec::new(),
            superseded_fields: Vec::new(),
        }
    }

    /// Matched without changing any field.
    pub fn is_no_op(&self) -> bool {
        self.applied_fields.is_empty()
    }

    /// Every override lost to a higher-priority curation.
    pub fn is_superseded(&self) -> bool {
        self.applied_fields.is_empty() && !self.superseded_fields.is_empty()
    }
}

/// Final record of one package and how it came about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPackage {
    pub identity: PackageIdentity,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub record: PackageRecord,

    /// Matching curations in priority order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applied_curations: Vec<AppliedCuration>,

    /// Curated field → priority of the curation that set it. Fields absent
    /// here come from the base record.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub provenance: BTreeMap<String, usize>,
}

impl ResolvedPackage {
    pub fn superseded(&self) -> impl Iterator<Item = &AppliedCuration> {
        self.applied_curations.iter().filter(|c| c.is_superseded())
    }
}

/// Resolved records of all packages of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfiguration {
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        with = "packages_by_identity"
    )]
    packages: BTreeMap<PackageIdentity, ResolvedPackage>,

    /// Curations matching at least one package, highest priority first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    package_curations: Vec<PackageCuration>,

    /// Priorities of curations matching no package
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    unmatched_curations: Vec<usize>,
}

impl ResolvedConfiguration {
    pub fn get(&self, identity: &PackageIdentity) -> Option<&ResolvedPackage> {
        self.packages.get(identity)
    }

    /// Packages in identity order.
    pub fn packages(&self) -> impl Iterator<Item = &ResolvedPackage> {
        self.packages.values()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn package_curations(&self) -> &[PackageCuration] {
        &self.package_curations
    }

    pub fn unmatched_curations(&self) -> &[usize] {
        &self.unmatched_curations
    }
}

/// Serializes the package map as a sequence ordered by identity, since
/// identities are not valid map keys in most formats.
mod packages_by_identity {
    use super::ResolvedPackage;
    use crate::model::PackageIdentity;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        packages: &BTreeMap<PackageIdentity, ResolvedPackage>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(packages.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<PackageIdentity, ResolvedPackage>, D::Error> {
        let packages = Vec::<ResolvedPackage>::deserialize(deserializer)?;
        Ok(packages
            .into_iter()
            .map(|package| (package.identity.clone(), package))
            .collect())
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Applies a [`CurationSet`] to base package records.
///
/// Resolution is a pure function of its inputs. Packages are independent of
/// each other, so from [`CurationResolver::with_parallel_threshold`] packages
/// on the work is spread over the rayon pool; the result is identical either
/// way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CurationResolver {
    parallel_threshold: usize,
}

impl Default for CurationResolver {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl CurationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of packages from which resolution runs in parallel.
    ///
    /// `0` or `1` always parallelizes, `usize::MAX` never does.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Resolves a single package.
    pub fn resolve_package(
        &self,
        identity: &PackageIdentity,
        base: &PackageRecord,
        curations: &CurationSet,
    ) -> ResolvedPackage {
        let mut record = base.clone();
        let mut provenance = BTreeMap::new();
        let mut applied_curations = Vec::new();

        for (priority, curation) in curations.iter().enumerate() {
            if !curation.applies_to.matches(identity) {
                continue;
            }

            let mut applied = AppliedCuration::new(priority, &curation.comment);
            for (field, value) in &curation.field_overrides {
                match provenance.entry(field.clone()) {
                    Entry::Occupied(_) => applied.superseded_fields.push(field.clone()),
                    Entry::Vacant(slot) => {
                        slot.insert(priority);
                        record.insert(field.clone(), value.clone());
                        applied.applied_fields.push(field.clone());
                    }
                }
            }

            applied_curations.push(applied);
        }

        ResolvedPackage {
            identity: identity.clone(),
            record,
            applied_curations,
            provenance,
        }
    }

    /// Resolves every package of `base_records` against `curations`.
    #[instrument(skip_all, fields(packages = base_records.len(), curations = curations.len()))]
    pub fn resolve(
        &self,
        base_records: &BTreeMap<PackageIdentity, PackageRecord>,
        curations: &CurationSet,
    ) -> ResolvedConfiguration {
        let resolved: Vec<ResolvedPackage> = if base_records.len() >= self.parallel_threshold {
            debug!("Resolving curations in parallel");
            base_records
                .par_iter()
                .map(|(identity, base)| self.resolve_package(identity, base, curations))
                .collect()
        } else {
            base_records
                .iter()
                .map(|(identity, base)| self.resolve_package(identity, base, curations))
                .collect()
        };

        let matched: BTreeSet<usize> = resolved
            .iter()
            .flat_map(|package| package.applied_curations.iter().map(|c| c.priority))
            .collect();

        let package_curations = matched
            .iter()
            .filter_map(|&priority| curations.get(priority).cloned())
            .collect();
        let unmatched_curations: Vec<usize> = (0..curations.len())
            .filter(|priority| !matched.contains(priority))
            .collect();

        info!(
            matched = matched.len(),
            unmatched = unmatched_curations.len(),
            "Curation resolution completed"
        );

        ResolvedConfiguration {
            packages: resolved
                .into_iter()
                .map(|package| (package.identity.clone(), package))
                .collect(),
            package_curations,
            unmatched_curations,
        }
    }

    /// Resolves bare identities, each starting from an empty record.
    pub fn resolve_identities<I>(
        &self,
        identities: I,
        curations: &CurationSet,
    ) -> ResolvedConfiguration
    where
        I: IntoIterator<Item = PackageIdentity>,
    {
        let base_records = identities
            .into_iter()
            .map(|identity| (identity, PackageRecord::new()))
            .collect();
        self.resolve(&base_records, curations)
    }
}
