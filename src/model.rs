use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Immutable key naming one package.
///
/// Equality covers every field, including the artifact-level
/// `classifier`/`extension` pair and `local_path`. Ordering is field-wise in
/// declaration order, which gives every identity-keyed output a stable order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageIdentity {
    pub namespace: String,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// Set for in-workspace components; `None` for external packages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
}

impl PackageIdentity {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            version: version.into(),
            classifier: None,
            extension: None,
            local_path: None,
        }
    }

    pub fn with_artifact(
        mut self,
        classifier: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        self.classifier = Some(classifier.into());
        self.extension = Some(extension.into());
        self
    }

    pub fn with_local_path(mut self, path: impl Into<String>) -> Self {
        self.local_path = Some(path.into());
        self
    }

    /// Whether this identity names a component of the analyzed workspace.
    pub fn is_local(&self) -> bool {
        self.local_path.is_some()
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.name, self.version)?;
        if self.classifier.is_some() || self.extension.is_some() {
            write!(
                f,
                ":{}:{}",
                self.classifier.as_deref().unwrap_or_default(),
                self.extension.as_deref().unwrap_or_default()
            )?;
        }
        Ok(())
    }
}

/// Identity with optional fields; `None` acts as a wildcard.
///
/// The artifact and local-path fields have a third state: `Some(None)` only
/// matches identities that leave the field unset. In JSON an omitted field is
/// a wildcard and an explicit `null` requires the field to be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPattern {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub classifier: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub extension: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub local_path: Option<Option<String>>,
}

/// Keeps an explicit `null` apart from an omitted field.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl IdentityPattern {
    /// Pattern matching every identity.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn matches(&self, identity: &PackageIdentity) -> bool {
        fn field(pattern: &Option<String>, value: &str) -> bool {
            pattern.as_deref().map_or(true, |p| p == value)
        }

        fn optional(pattern: &Option<Option<String>>, value: &Option<String>) -> bool {
            pattern.as_ref().map_or(true, |p| p == value)
        }

        field(&self.namespace, &identity.namespace)
            && field(&self.name, &identity.name)
            && field(&self.version, &identity.version)
            && optional(&self.classifier, &identity.classifier)
            && optional(&self.extension, &identity.extension)
            && optional(&self.local_path, &identity.local_path)
    }
}

impl From<&PackageIdentity> for IdentityPattern {
    /// Pins every field, unset ones as absent, so only `identity` matches.
    fn from(identity: &PackageIdentity) -> Self {
        Self {
            namespace: Some(identity.namespace.clone()),
            name: Some(identity.name.clone()),
            version: Some(identity.version.clone()),
            classifier: Some(identity.classifier.clone()),
            extension: Some(identity.extension.clone()),
            local_path: Some(identity.local_path.clone()),
        }
    }
}

impl From<PackageIdentity> for IdentityPattern {
    fn from(identity: PackageIdentity) -> Self {
        Self::from(&identity)
    }
}

/// Errors raised when parsing an [`IdentityPattern`] from coordinates.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PatternParseError {
    #[error("Expected 3 or 5 colon-separated segments, got {0}")]
    SegmentCount(usize),
    #[error("Empty coordinate string")]
    Empty,
}

impl FromStr for IdentityPattern {
    type Err = PatternParseError;

    /// Parses `namespace:name:version[:classifier:extension]`, where an empty
    /// segment or `*` is a wildcard. Omitted artifact segments and the local
    /// path are wildcards too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PatternParseError::Empty);
        }

        let segments: Vec<Option<String>> = trimmed
            .split(':')
            .map(|segment| match segment.trim() {
                "" | "*" => None,
                value => Some(value.to_string()),
            })
            .collect();

        let mut segments = match segments.len() {
            3 | 5 => segments.into_iter(),
            n => return Err(PatternParseError::SegmentCount(n)),
        };

        Ok(Self {
            namespace: segments.next().flatten(),
            name: segments.next().flatten(),
            version: segments.next().flatten(),
            classifier: segments.next().flatten().map(Some),
            extension: segments.next().flatten().map(Some),
            local_path: None,
        })
    }
}
