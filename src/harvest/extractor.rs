//! Conversion of a foreign resolution result into a [`ProjectSnapshot`].
//!
//! The traversal runs on an explicit frame stack instead of recursion. The
//! set of components currently on that stack is the cycle detector: meeting
//! one of them again yields a cycle reference instead of another descent.
//! Components that finished expanding without being cut by a cycle are kept
//! per scope and reused when they show up again in another branch.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

use crate::harvest::foreign::{
    ApiDialect, ComponentId, DependencyResult, ForeignComponent, ForeignProject, ToolVersion,
    SUPPORTED_MODEL_VERSION,
};
use crate::harvest::snapshot::{DependencyNode, ProjectSnapshot, ScopeGraph, Severity};
use crate::harvest::traits::{ExtractionError, HarvestStage};
use crate::model::PackageIdentity;

/// Extraction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractorConfig {
    /// Highest foreign model version accepted (default: [`SUPPORTED_MODEL_VERSION`])
    pub supported_model_version: u32,

    /// Reuse subgraphs already materialized within a scope (default: `true`)
    pub reuse_subgraphs: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            supported_model_version: SUPPORTED_MODEL_VERSION,
            reuse_subgraphs: true,
        }
    }
}

/// Builds [`ProjectSnapshot`]s from foreign resolution results.
///
/// The extractor only borrows the foreign result; it never triggers a new
/// resolution. One extraction runs on one thread, but a single extractor can
/// be shared across threads for independent projects.
#[derive(Debug, Clone, Default)]
pub struct GraphExtractor {
    config: ExtractorConfig,
}

impl GraphExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts the snapshot of `project`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError`] if the model version is unsupported, the
    /// tool version cannot be parsed or no configurations were reported.
    /// Everything else becomes a diagnostic inside the snapshot.
    #[instrument(skip(self, project), fields(project = %project.name))]
    pub fn extract(&self, project: &ForeignProject) -> Result<ProjectSnapshot, ExtractionError> {
        if project.model_version != self.config.supported_model_version {
            return Err(ExtractionError::UnsupportedModelVersion {
                found: project.model_version,
                supported: self.config.supported_model_version,
            });
        }

        let tool_version: ToolVersion = project
            .tool_version
            .parse()
            .map_err(ExtractionError::InvalidToolVersion)?;
        let dialect = ApiDialect::for_version(tool_version);
        debug!(%tool_version, ?dialect, "Selected resolution dialect");

        let configurations = project
            .configurations
            .as_deref()
            .ok_or(ExtractionError::MissingApiSurface("configurations"))?;

        let mut scopes = Vec::new();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for configuration in configurations {
            if let Some(reason) = dialect.skip_reason(configuration) {
                debug!(scope = %configuration.name, reason, "Skipping configuration");
                continue;
            }

            let mut walker =
                ScopeWalker::new(&project.components, dialect, self.config.reuse_subgraphs);
            let roots = walker.walk(&configuration.dependencies);

            for (severity, message) in walker.diagnostics {
                let message = format!("{}: {}", configuration.name, message);
                match severity {
                    Severity::Error => errors.push(message),
                    Severity::Warning => warnings.push(message),
                }
            }

            if roots.is_empty() {
                debug!(scope = %configuration.name, "Omitting scope without dependencies");
                continue;
            }

            scopes.push(ScopeGraph {
                name: configuration.name.clone(),
                roots,
            });
        }

        if !errors.is_empty() {
            warn!(count = errors.len(), "Dependency resolution reported errors");
        }

        info!(
            scopes = scopes.len(),
            errors = errors.len(),
            warnings = warnings.len(),
            "Extraction completed"
        );

        Ok(ProjectSnapshot {
            group_id: project.group.clone(),
            name: project.name.clone(),
            version: project.version.clone(),
            scopes,
            repositories: project.repositories.clone(),
            errors,
            warnings,
        })
    }
}

impl HarvestStage for GraphExtractor {
    type Input = ForeignProject;
    type Output = ProjectSnapshot;
    type Error = ExtractionError;

    fn execute(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
        self.extract(&input)
    }

    fn stage_name(&self) -> &'static str {
        "graph_extraction"
    }
}

/// Maps a selected component to the identity the snapshot uses for it.
fn identity_of(component: &ForeignComponent) -> Option<PackageIdentity> {
    match &component.id {
        ComponentId::Module {
            group,
            module,
            version,
        } => Some(PackageIdentity::new(group, module, version)),
        ComponentId::Project {
            project_name,
            project_path,
        } => {
            let coordinates = component.module_version.clone().unwrap_or_default();
            Some(
                PackageIdentity::new(coordinates.group, project_name, coordinates.version)
                    .with_local_path(project_path),
            )
        }
        ComponentId::Unknown => None,
    }
}

// ============================================================================
// Scope Traversal
// ============================================================================

struct Frame<'a> {
    /// Component being expanded; `None` for the scope root.
    entry: Option<(&'a str, DependencyNode)>,
    /// Entries still to visit, with their position in the owner's list.
    pending: std::iter::Enumerate<std::vec::IntoIter<&'a DependencyResult>>,
    children: Vec<DependencyNode>,
    /// Whether a cycle reference was emitted somewhere below this frame.
    cut: bool,
}

impl<'a> Frame<'a> {
    fn new(entry: Option<(&'a str, DependencyNode)>, pending: Vec<&'a DependencyResult>) -> Self {
        Self {
            entry,
            pending: pending.into_iter().enumerate(),
            children: Vec::new(),
            cut: false,
        }
    }

    fn owner(&self) -> Option<&'a str> {
        self.entry.as_ref().map(|(key, _)| *key)
    }
}

enum Step<'a> {
    Attach(DependencyNode),
    Cycle(DependencyNode),
    Descend(&'a str, DependencyNode, Vec<&'a DependencyResult>),
    Report(Severity, String),
}

struct ScopeWalker<'a> {
    components: &'a BTreeMap<String, ForeignComponent>,
    dialect: ApiDialect,
    reuse_subgraphs: bool,
    materialized: HashMap<&'a str, DependencyNode>,
    diagnostics: Vec<(Severity, String)>,
    /// Entries already reported, as owning component (`None` for the scope
    /// root) and position.
    reported: HashSet<(Option<&'a str>, usize)>,
}

impl<'a> ScopeWalker<'a> {
    fn new(
        components: &'a BTreeMap<String, ForeignComponent>,
        dialect: ApiDialect,
        reuse_subgraphs: bool,
    ) -> Self {
        Self {
            components,
            dialect,
            reuse_subgraphs,
            materialized: HashMap::new(),
            diagnostics: Vec::new(),
            reported: HashSet::new(),
        }
    }

    /// Converts the root results of one scope into dependency nodes.
    fn walk(&mut self, roots: &'a [DependencyResult]) -> Vec<DependencyNode> {
        let mut path: HashSet<PackageIdentity> = HashSet::new();
        let mut stack = vec![Frame::new(None, self.dialect.effective(roots))];

        loop {
            let next = match stack.last_mut() {
                Some(frame) => frame.pending.next(),
                None => return Vec::new(),
            };

            if let Some((position, result)) = next {
                self.visit(position, result, &mut stack, &mut path);
                continue;
            }

            let Some(done) = stack.pop() else {
                return Vec::new();
            };
            let Some((key, mut node)) = done.entry else {
                return done.children;
            };

            node.dependencies = done.children;
            path.remove(&node.identity);
            if self.reuse_subgraphs && !done.cut {
                self.materialized.insert(key, node.clone());
            }

            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
                parent.cut |= done.cut;
            }
        }
    }

    fn visit(
        &mut self,
        position: usize,
        result: &'a DependencyResult,
        stack: &mut Vec<Frame<'a>>,
        path: &mut HashSet<PackageIdentity>,
    ) {
        let step = self.step(result, path);
        let Some(parent) = stack.last_mut() else {
            return;
        };

        match step {
            Step::Attach(node) => parent.children.push(node),
            Step::Cycle(node) => {
                parent.children.push(node);
                parent.cut = true;
            }
            Step::Report(severity, message) => {
                self.report(parent, position, severity, &message)
            }
            Step::Descend(key, node, pending) => {
                path.insert(node.identity.clone());
                stack.push(Frame::new(Some((key, node)), pending));
            }
        }
    }

    fn step(&self, result: &'a DependencyResult, path: &HashSet<PackageIdentity>) -> Step<'a> {
        match result {
            DependencyResult::Resolved { selected, .. } => {
                let key = selected.as_str();
                let Some(component) = self.components.get(key) else {
                    return Step::Report(
                        Severity::Error,
                        format!("Selected component '{key}' is not part of the resolution result"),
                    );
                };
                let Some(identity) = identity_of(component) else {
                    return Step::Report(
                        Severity::Error,
                        format!("Component '{key}' has an unknown identifier kind"),
                    );
                };

                if path.contains(&identity) {
                    debug!(component = key, "Cycle detected");
                    return Step::Cycle(DependencyNode::cycle_reference(identity));
                }

                if let Some(node) = self.materialized.get(key) {
                    return Step::Attach(node.clone());
                }

                Step::Descend(
                    key,
                    DependencyNode::new(identity),
                    self.dialect.effective(&component.dependencies),
                )
            }
            DependencyResult::Unresolved {
                requested,
                reason,
                severity,
                ..
            } => {
                let message = match reason {
                    Some(reason) => format!("Could not resolve '{requested}': {reason}"),
                    None => format!("Could not resolve '{requested}'"),
                };
                Step::Report(*severity, message)
            }
            DependencyResult::Unknown => Step::Report(
                Severity::Error,
                "Dependency result of unknown kind".to_string(),
            ),
        }
    }

    /// Attaches a diagnostic to the node of `frame`, or to the scope when the
    /// frame is the scope root, and records it for aggregation. An entry
    /// reached again through a re-walked subgraph is aggregated once.
    fn report(
        &mut self,
        frame: &mut Frame<'a>,
        position: usize,
        severity: Severity,
        message: &str,
    ) {
        let location = (frame.owner(), position);
        let message = match &mut frame.entry {
            Some((_, node)) => {
                node.add_diagnostic(severity, message);
                format!("{}: {}", node.identity, message)
            }
            None => message.to_string(),
        };

        if self.reported.insert(location) {
            self.diagnostics.push((severity, message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn module(name: &str, dependencies: Value) -> Value {
        json!({
            "id": { "kind": "module", "group": "org.example", "module": name, "version": "1.0" },
            "dependencies": dependencies
        })
    }

    fn resolved(key: &str) -> Value {
        json!({ "type": "resolved", "selected": key })
    }

    fn unresolved(requested: &str) -> Value {
        json!({ "type": "unresolved", "requested": requested, "reason": "not found" })
    }

    fn project(tool_version: &str, configurations: Value, components: Value) -> ForeignProject {
        serde_json::from_value(json!({
            "toolVersion": tool_version,
            "group": "org.example",
            "name": "app",
            "version": "1.0",
            "configurations": configurations,
            "components": components
        }))
        .unwrap()
    }

    fn names(nodes: &[DependencyNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.identity.name.as_str()).collect()
    }

    #[test]
    fn test_empty_scope_is_omitted_and_unresolved_aggregated() {
        let foreign = project(
            "8.4",
            json!([
                {
                    "name": "compile",
                    "dependencies": [resolved("a"), resolved("b"), resolved("c"), unresolved("org.example:x:1.0")]
                },
                { "name": "test", "dependencies": [] }
            ]),
            json!({ "a": module("a", json!([])), "b": module("b", json!([])), "c": module("c", json!([])) }),
        );

        let snapshot = GraphExtractor::new().extract(&foreign).unwrap();

        assert_eq!(snapshot.group_id, "org.example");
        assert_eq!(snapshot.scopes.len(), 1);
        assert_eq!(snapshot.scopes[0].name, "compile");
        assert_eq!(names(&snapshot.scopes[0].roots), ["a", "b", "c"]);
        assert_eq!(snapshot.node_count(), 3);
        assert_eq!(
            snapshot.errors,
            ["compile: Could not resolve 'org.example:x:1.0': not found"]
        );
        assert!(snapshot.warnings.is_empty());
    }

    #[test]
    fn test_cycle_is_marked_not_expanded() {
        let foreign = project(
            "8.4",
            json!([{ "name": "compile", "dependencies": [resolved("a")] }]),
            json!({ "a": module("a", json!([resolved("b")])), "b": module("b", json!([resolved("a")])) }),
        );

        let snapshot = GraphExtractor::new().extract(&foreign).unwrap();
        let a = &snapshot.scopes[0].roots[0];
        let b = &a.dependencies[0];
        let back = &b.dependencies[0];

        assert!(!a.cycle);
        assert_eq!(back.identity, a.identity);
        assert!(back.cycle);
        assert!(back.dependencies.is_empty());
        assert_eq!(snapshot.node_count(), 3);
        assert!(snapshot.errors.is_empty());
    }

    #[test]
    fn test_self_dependency_terminates() {
        let foreign = project(
            "8.4",
            json!([{ "name": "compile", "dependencies": [resolved("a")] }]),
            json!({ "a": module("a", json!([resolved("a")])) }),
        );

        let snapshot = GraphExtractor::new().extract(&foreign).unwrap();
        let a = &snapshot.scopes[0].roots[0];

        assert_eq!(a.dependencies.len(), 1);
        assert!(a.dependencies[0].cycle);
    }

    #[test]
    fn test_shared_subgraph_expanded_in_every_branch() {
        let foreign = project(
            "8.4",
            json!([{ "name": "compile", "dependencies": [resolved("a"), resolved("b")] }]),
            json!({
                "a": module("a", json!([resolved("c")])),
                "b": module("b", json!([resolved("c")])),
                "c": module("c", json!([resolved("d")])),
                "d": module("d", json!([]))
            }),
        );

        let reused = GraphExtractor::new().extract(&foreign).unwrap();
        let walked = GraphExtractor::new()
            .with_config(ExtractorConfig {
                reuse_subgraphs: false,
                ..Default::default()
            })
            .extract(&foreign)
            .unwrap();

        let roots = &reused.scopes[0].roots;
        assert_eq!(names(&roots[0].dependencies[0].dependencies), ["d"]);
        assert_eq!(names(&roots[1].dependencies[0].dependencies), ["d"]);
        assert_eq!(reused, walked);
    }

    #[test]
    fn test_subgraph_cut_by_cycle_is_not_reused() {
        let foreign = project(
            "8.4",
            json!([{ "name": "compile", "dependencies": [resolved("a"), resolved("b")] }]),
            json!({ "a": module("a", json!([resolved("b")])), "b": module("b", json!([resolved("a")])) }),
        );

        let snapshot = GraphExtractor::new().extract(&foreign).unwrap();
        let b = &snapshot.scopes[0].roots[1];
        let a = &b.dependencies[0];

        assert_eq!(b.identity.name, "b");
        assert!(!a.cycle);
        assert_eq!(a.dependencies[0].identity.name, "b");
        assert!(a.dependencies[0].cycle);
    }

    #[test]
    fn test_nested_unresolved_attaches_to_parent() {
        let foreign = project(
            "8.4",
            json!([{ "name": "runtime", "dependencies": [resolved("a")] }]),
            json!({
                "a": module("a", json!([
                    unresolved("org.example:x:1.0"),
                    { "type": "unresolved", "requested": "org.example:y:2.0", "severity": "warning" }
                ]))
            }),
        );

        let snapshot = GraphExtractor::new().extract(&foreign).unwrap();
        let a = &snapshot.scopes[0].roots[0];

        assert!(a.dependencies.is_empty());
        assert_eq!(
            a.error.as_deref(),
            Some("Could not resolve 'org.example:x:1.0': not found")
        );
        assert_eq!(a.warning.as_deref(), Some("Could not resolve 'org.example:y:2.0'"));
        assert_eq!(
            snapshot.errors,
            ["runtime: org.example:a:1.0: Could not resolve 'org.example:x:1.0': not found"]
        );
        assert_eq!(snapshot.warnings.len(), 1);
    }

    #[test]
    fn test_every_unresolved_entry_surfaces() {
        let foreign = project(
            "8.4",
            json!([
                { "name": "compile", "dependencies": [resolved("a"), unresolved("r1")] },
                { "name": "only-failures", "dependencies": [unresolved("r2"), unresolved("r3")] }
            ]),
            json!({ "a": module("a", json!([unresolved("n1"), resolved("b")])), "b": module("b", json!([unresolved("n2")])) }),
        );

        let snapshot = GraphExtractor::new().extract(&foreign).unwrap();

        assert!(snapshot.issue_count() >= 5);
        assert!(snapshot.scope("only-failures").is_none());
        assert!(snapshot.errors.iter().any(|e| e.starts_with("only-failures: ")));
    }

    #[test]
    fn test_identical_unresolved_entries_are_counted_separately() {
        let foreign = project(
            "8.4",
            json!([{
                "name": "compile",
                "dependencies": [unresolved("org.example:x:1.0"), unresolved("org.example:x:1.0")]
            }]),
            json!({}),
        );

        let snapshot = GraphExtractor::new().extract(&foreign).unwrap();

        assert_eq!(snapshot.issue_count(), 2);
        assert_eq!(
            snapshot.errors,
            [
                "compile: Could not resolve 'org.example:x:1.0': not found",
                "compile: Could not resolve 'org.example:x:1.0': not found"
            ]
        );
    }

    #[test]
    fn test_rewalked_subgraph_reports_each_entry_once() {
        let foreign = project(
            "8.4",
            json!([{ "name": "compile", "dependencies": [resolved("a"), resolved("b")] }]),
            json!({
                "a": module("a", json!([resolved("shared")])),
                "b": module("b", json!([resolved("shared")])),
                "shared": module("shared", json!([unresolved("org.example:x:1.0")]))
            }),
        );

        let extractor = GraphExtractor::new().with_config(ExtractorConfig {
            reuse_subgraphs: false,
            ..ExtractorConfig::default()
        });
        let snapshot = extractor.extract(&foreign).unwrap();

        let roots = &snapshot.scopes[0].roots;
        assert!(roots[0].dependencies[0].error.is_some());
        assert!(roots[1].dependencies[0].error.is_some());
        assert_eq!(
            snapshot.errors,
            ["compile: org.example:shared:1.0: Could not resolve 'org.example:x:1.0': not found"]
        );
    }

    #[test]
    fn test_cycle_detected_by_identity_across_component_keys() {
        let foreign = project(
            "8.4",
            json!([{ "name": "compile", "dependencies": [resolved("a")] }]),
            json!({
                "a": module("a", json!([resolved("a-alias")])),
                "a-alias": module("a", json!([resolved("a")]))
            }),
        );

        let snapshot = GraphExtractor::new().extract(&foreign).unwrap();
        let a = &snapshot.scopes[0].roots[0];

        assert_eq!(a.dependencies.len(), 1);
        assert!(a.dependencies[0].cycle);
        assert_eq!(a.dependencies[0].identity, a.identity);
        assert_eq!(snapshot.node_count(), 2);
    }

    #[test]
    fn test_constraints_filtered_only_when_reported_separately() {
        let configurations = json!([{
            "name": "compile",
            "dependencies": [resolved("a"), { "type": "resolved", "selected": "b", "constraint": true }]
        }]);
        let components = json!({ "a": module("a", json!([])), "b": module("b", json!([])) });

        let modern = project("6.0", configurations.clone(), components.clone());
        let older = project("4.10.3", configurations, components);

        let snapshot = GraphExtractor::new().extract(&modern).unwrap();
        assert_eq!(names(&snapshot.scopes[0].roots), ["a"]);

        let snapshot = GraphExtractor::new().extract(&older).unwrap();
        assert_eq!(names(&snapshot.scopes[0].roots), ["a", "b"]);
    }

    #[test]
    fn test_unresolvable_configurations_are_skipped() {
        let configurations = json!([
            { "name": "compileClasspath", "dependencies": [resolved("a")] },
            { "name": "apiElements", "canBeResolved": false, "dependencies": [resolved("a")] },
            { "name": "compile", "resolutionAlternatives": ["implementation"], "dependencies": [resolved("a")] }
        ]);
        let components = json!({ "a": module("a", json!([])) });

        let snapshot = GraphExtractor::new()
            .extract(&project("7.6", configurations.clone(), components.clone()))
            .unwrap();
        let scopes: Vec<_> = snapshot.scopes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(scopes, ["compileClasspath"]);

        let snapshot = GraphExtractor::new()
            .extract(&project("2.14", configurations, components))
            .unwrap();
        let scopes: Vec<_> = snapshot.scopes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(scopes, ["compileClasspath", "apiElements"]);
    }

    #[test]
    fn test_project_component_identity() {
        let foreign = project(
            "8.4",
            json!([{ "name": "compile", "dependencies": [resolved("core"), resolved("bare")] }]),
            json!({
                "core": {
                    "id": { "kind": "project", "projectName": "core", "projectPath": ":core" },
                    "moduleVersion": { "group": "org.example", "name": "core", "version": "2.0" }
                },
                "bare": {
                    "id": { "kind": "project", "projectName": "bare", "projectPath": ":libs:bare" }
                }
            }),
        );

        let snapshot = GraphExtractor::new().extract(&foreign).unwrap();
        let roots = &snapshot.scopes[0].roots;

        assert_eq!(
            roots[0].identity,
            PackageIdentity::new("org.example", "core", "2.0").with_local_path(":core")
        );
        assert_eq!(
            roots[1].identity,
            PackageIdentity::new("", "bare", "").with_local_path(":libs:bare")
        );
    }

    #[test]
    fn test_unknown_kinds_become_errors() {
        let foreign = project(
            "8.4",
            json!([
                { "name": "compile", "dependencies": [resolved("opaque"), resolved("missing")] },
                { "name": "runtime", "dependencies": [resolved("a")] }
            ]),
            json!({
                "opaque": { "id": { "kind": "fileCollection" } },
                "a": module("a", json!([{ "type": "somethingNew" }]))
            }),
        );

        let snapshot = GraphExtractor::new().extract(&foreign).unwrap();

        assert!(snapshot.scope("compile").is_none());
        assert_eq!(
            snapshot.errors,
            [
                "compile: Component 'opaque' has an unknown identifier kind",
                "compile: Selected component 'missing' is not part of the resolution result",
                "runtime: org.example:a:1.0: Dependency result of unknown kind"
            ]
        );
        let a = &snapshot.scope("runtime").unwrap().roots[0];
        assert_eq!(a.error.as_deref(), Some("Dependency result of unknown kind"));
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let depth = 2_000;
        let mut components = serde_json::Map::new();
        for i in 0..depth {
            let dependencies = if i + 1 < depth {
                json!([resolved(&format!("n{}", i + 1))])
            } else {
                json!([resolved("n0")])
            };
            components.insert(format!("n{i}"), module(&format!("n{i}"), dependencies));
        }

        let foreign = project(
            "8.4",
            json!([{ "name": "compile", "dependencies": [resolved("n0")] }]),
            Value::Object(components),
        );

        let snapshot = GraphExtractor::new().extract(&foreign).unwrap();
        assert_eq!(snapshot.node_count(), depth + 1);
        assert!(snapshot.scopes[0].nodes().last().unwrap().cycle);
    }

    #[test]
    fn test_fatal_conditions() {
        let mut foreign = project("8.4", json!([]), json!({}));
        foreign.model_version = 2;
        assert!(matches!(
            GraphExtractor::new().extract(&foreign),
            Err(ExtractionError::UnsupportedModelVersion { found: 2, supported: 1 })
        ));

        foreign.model_version = 0;
        assert!(matches!(
            GraphExtractor::new().extract(&foreign),
            Err(ExtractionError::UnsupportedModelVersion { found: 0, supported: 1 })
        ));

        let foreign = project("banana", json!([]), json!({}));
        assert!(matches!(
            GraphExtractor::new().extract(&foreign),
            Err(ExtractionError::InvalidToolVersion(v)) if v == "banana"
        ));

        let mut foreign = project("8.4", json!([]), json!({}));
        foreign.configurations = None;
        assert!(matches!(
            GraphExtractor::new().extract(&foreign),
            Err(ExtractionError::MissingApiSurface("configurations"))
        ));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let foreign = project(
            "8.4",
            json!([{ "name": "compile", "dependencies": [resolved("a"), unresolved("x")] }]),
            json!({ "a": module("a", json!([resolved("b")])), "b": module("b", json!([resolved("a")])) }),
        );

        let extractor = GraphExtractor::new();
        let first = serde_json::to_string(&extractor.extract(&foreign).unwrap()).unwrap();
        let second = serde_json::to_string(&extractor.extract(&foreign).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_stage_name() {
        assert_eq!(GraphExtractor::new().stage_name(), "graph_extraction");
    }
}
