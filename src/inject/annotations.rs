//! Annotation keys and two-level annotation precedence.
//!
//! Annotations are read from the pod template first and from the containing
//! namespace second. A non-empty pod value shadows the namespace value
//! completely; values are never merged.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Annotation controlling whether the proxy is injected
pub const PROXY_INJECT_ANNOTATION: &str = "linkerd.io/inject";

/// Annotation naming the control-plane namespace that owns the workload
pub const PROXY_MANAGED_BY_ANNOTATION: &str = "linkerd.io/managed-by";

/// Inject annotation value opting a workload in
pub const PROXY_INJECT_ENABLED: &str = "enabled";

/// Inject annotation value opting a workload out
pub const PROXY_INJECT_DISABLED: &str = "disabled";

/// Metadata scope an annotation value was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationScope {
    /// The pod template's own metadata
    Workload,
    /// The containing namespace's metadata
    Namespace,
}

impl fmt::Display for AnnotationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationScope::Workload => write!(f, "workload"),
            AnnotationScope::Namespace => write!(f, "namespace"),
        }
    }
}

/// An annotation value together with the scope that supplied it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAnnotation<'a> {
    pub value: &'a str,
    pub scope: AnnotationScope,
}

/// Look up `key` with pod-over-namespace precedence.
///
/// Empty values are treated as absent and fall through to the next scope.
/// Passing `None` for `namespace` restricts the lookup to the pod scope.
/// Returns `None` when no scope carries a non-empty value.
pub fn resolve_annotation<'a>(
    key: &str,
    pod: &'a BTreeMap<String, String>,
    namespace: Option<&'a BTreeMap<String, String>>,
) -> Option<ResolvedAnnotation<'a>> {
    let non_empty = |annotations: &'a BTreeMap<String, String>| {
        annotations
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    };

    if let Some(value) = non_empty(pod) {
        return Some(ResolvedAnnotation {
            value,
            scope: AnnotationScope::Workload,
        });
    }

    namespace
        .and_then(non_empty)
        .map(|value| ResolvedAnnotation {
            value,
            scope: AnnotationScope::Namespace,
        })
}

/// Normalized value of the inject annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectMode {
    Enabled,
    Disabled,
    /// Any other non-empty value. Never counts as an opt-in.
    Unrecognized(String),
}

impl InjectMode {
    pub fn is_enabled(&self) -> bool {
        matches!(self, InjectMode::Enabled)
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, InjectMode::Disabled)
    }
}

impl From<&str> for InjectMode {
    fn from(value: &str) -> Self {
        match value {
            PROXY_INJECT_ENABLED => InjectMode::Enabled,
            PROXY_INJECT_DISABLED => InjectMode::Disabled,
            other => InjectMode::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for InjectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectMode::Enabled => write!(f, "{}", PROXY_INJECT_ENABLED),
            InjectMode::Disabled => write!(f, "{}", PROXY_INJECT_DISABLED),
            InjectMode::Unrecognized(value) => write!(f, "{}", value),
        }
    }
}
