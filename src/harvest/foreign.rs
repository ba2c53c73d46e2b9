//! Serde model of a build tool's dependency-resolution result.
//!
//! The shape follows what the build tool reports, not what the snapshot
//! needs: configurations carry root dependency results, and every selected
//! component lives once in a flat arena keyed by its component id, so circular
//! declarations are representable. Kinds this crate does not know about
//! deserialize to explicit `Unknown` variants instead of failing the whole
//! document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::harvest::snapshot::Severity;

/// Version of the serialized foreign model understood by default.
pub const SUPPORTED_MODEL_VERSION: u32 = 1;

fn default_model_version() -> u32 {
    SUPPORTED_MODEL_VERSION
}

/// Resolution result for one project, as exported by the build tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignProject {
    #[serde(default = "default_model_version")]
    pub model_version: u32,

    /// Build tool version string, e.g. `"8.4"` or `"5.1-rc-2"`.
    pub tool_version: String,

    #[serde(default)]
    pub group: String,

    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub repositories: Vec<String>,

    /// `None` when the exporter did not report configurations at all.
    #[serde(default)]
    pub configurations: Option<Vec<ForeignConfiguration>>,

    #[serde(default)]
    pub components: BTreeMap<String, ForeignComponent>,
}

/// A declared dependency configuration (a scope, once extracted).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignConfiguration {
    pub name: String,

    /// Only reported by tool versions that know the flag.
    #[serde(default)]
    pub can_be_resolved: Option<bool>,

    /// Present when the configuration is deprecated for resolution in favor
    /// of the listed ones.
    #[serde(default)]
    pub resolution_alternatives: Option<Vec<String>>,

    /// Direct dependencies of the configuration's resolution root.
    #[serde(default)]
    pub dependencies: Vec<DependencyResult>,
}

/// One edge of the resolution result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DependencyResult {
    Resolved {
        /// Key into [`ForeignProject::components`].
        selected: String,
        #[serde(default)]
        constraint: bool,
    },
    Unresolved {
        requested: String,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        severity: Severity,
        #[serde(default)]
        constraint: bool,
    },
    #[serde(other)]
    Unknown,
}

impl DependencyResult {
    /// Whether the entry only expresses a version constraint.
    pub fn is_constraint(&self) -> bool {
        match self {
            DependencyResult::Resolved { constraint, .. }
            | DependencyResult::Unresolved { constraint, .. } => *constraint,
            DependencyResult::Unknown => false,
        }
    }
}

/// A component selected during resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignComponent {
    pub id: ComponentId,

    #[serde(default)]
    pub module_version: Option<ModuleVersion>,

    #[serde(default)]
    pub dependencies: Vec<DependencyResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleVersion {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ComponentId {
    /// Module fetched from a repository.
    Module {
        group: String,
        module: String,
        version: String,
    },
    /// Project of the same build.
    Project {
        #[serde(rename = "projectName")]
        project_name: String,
        #[serde(rename = "projectPath")]
        project_path: String,
    },
    #[serde(other)]
    Unknown,
}

// ============================================================================
// Tool Versions
// ============================================================================

/// Numeric `major.minor.patch` prefix of a build tool version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ToolVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ToolVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for ToolVersion {
    type Err = String;

    /// Accepts `8`, `8.4`, `8.4.1` and pre-release forms like `5.1-rc-2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let release = s.trim().split(['-', ' ']).next().unwrap_or_default();
        if release.is_empty() {
            return Err(s.to_string());
        }

        let mut parts = [0u32; 3];
        let mut count = 0;
        for segment in release.split('.') {
            if count == parts.len() {
                return Err(s.to_string());
            }
            parts[count] = segment.parse().map_err(|_| s.to_string())?;
            count += 1;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

// ============================================================================
// API Dialects
// ============================================================================

/// `canBeResolved` is reported from this version on.
pub const RESOLVABLE_FLAG_SINCE: ToolVersion = ToolVersion::new(3, 3, 0);

/// Constraint edges are flagged separately from real edges from this version on.
pub const CONSTRAINT_FLAG_SINCE: ToolVersion = ToolVersion::new(5, 1, 0);

/// Capability set of the build tool that produced a resolution result.
///
/// Selected once per extraction from the tool version; every version check
/// lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiDialect {
    /// Every configuration is resolvable, constraints are not reported.
    Legacy,
    /// Configurations report whether they can be resolved.
    Resolvable,
    /// Constraint-only entries are flagged and must be dropped.
    ConstraintAware,
}

impl ApiDialect {
    pub fn for_version(version: ToolVersion) -> Self {
        if version < RESOLVABLE_FLAG_SINCE {
            ApiDialect::Legacy
        } else if version < CONSTRAINT_FLAG_SINCE {
            ApiDialect::Resolvable
        } else {
            ApiDialect::ConstraintAware
        }
    }

    /// Returns why `configuration` must not be traversed, if it must not.
    pub fn skip_reason(&self, configuration: &ForeignConfiguration) -> Option<&'static str> {
        if configuration.resolution_alternatives.is_some() {
            return Some("deprecated for resolution");
        }

        match self {
            ApiDialect::Legacy => None,
            ApiDialect::Resolvable | ApiDialect::ConstraintAware => {
                if configuration.can_be_resolved.unwrap_or(true) {
                    None
                } else {
                    Some("not resolvable")
                }
            }
        }
    }

    /// The entries of `results` that are real dependency edges.
    pub fn effective<'a>(&self, results: &'a [DependencyResult]) -> Vec<&'a DependencyResult> {
        match self {
            ApiDialect::ConstraintAware => {
                results.iter().filter(|r| !r.is_constraint()).collect()
            }
            ApiDialect::Legacy | ApiDialect::Resolvable => results.iter().collect(),
        }
    }
}
