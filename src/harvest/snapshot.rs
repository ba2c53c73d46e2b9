//! Tool-agnostic dependency snapshot produced by the extractor.
//!
//! Collection-valued fields that are empty, and options that are `None`, are
//! omitted from serialized output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::PackageIdentity;

/// Severity of a resolution diagnostic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One resolved package and its direct dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyNode {
    #[serde(flatten)]
    pub identity: PackageIdentity,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,

    /// Back-reference to an ancestor; never carries dependencies.
    #[serde(default, skip_serializing_if = "is_false")]
    pub cycle: bool,
}

impl DependencyNode {
    pub fn new(identity: PackageIdentity) -> Self {
        Self {
            identity,
            dependencies: Vec::new(),
            error: None,
            warning: None,
            cycle: false,
        }
    }

    pub fn cycle_reference(identity: PackageIdentity) -> Self {
        Self {
            cycle: true,
            ..Self::new(identity)
        }
    }

    /// Attaches a diagnostic, joining with earlier ones of the same severity.
    pub fn add_diagnostic(&mut self, severity: Severity, message: &str) {
        let slot = match severity {
            Severity::Error => &mut self.error,
            Severity::Warning => &mut self.warning,
        };

        match slot {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(message);
            }
            None => *slot = Some(message.to_string()),
        }
    }

    /// Pre-order iterator over this node and everything below it.
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter { stack: vec![self] }
    }
}

pub struct NodeIter<'a> {
    stack: Vec<&'a DependencyNode>,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a DependencyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.dependencies.iter().rev());
        Some(node)
    }
}

/// Dependencies of one resolvable scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeGraph {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roots: Vec<DependencyNode>,
}

impl ScopeGraph {
    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.roots.iter().flat_map(DependencyNode::iter)
    }
}

/// Normalized dependency graph of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub group_id: String,
    pub name: String,
    pub version: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<ScopeGraph>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ProjectSnapshot {
    pub fn scope(&self, name: &str) -> Option<&ScopeGraph> {
        self.scopes.iter().find(|s| s.name == name)
    }

    /// Distinct identities across all scopes, in identity order.
    pub fn identities(&self) -> BTreeSet<PackageIdentity> {
        self.scopes
            .iter()
            .flat_map(ScopeGraph::nodes)
            .map(|node| node.identity.clone())
            .collect()
    }

    /// Number of nodes across all scopes, cycle references included.
    pub fn node_count(&self) -> usize {
        self.scopes.iter().map(|s| s.nodes().count()).sum()
    }

    pub fn issue_count(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }
}
