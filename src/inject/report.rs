//! Decision record produced by the resolver.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::annotations::{
    AnnotationScope, PROXY_INJECT_ANNOTATION, PROXY_INJECT_DISABLED, PROXY_INJECT_ENABLED,
};
use super::origin::Origin;

/// Why a workload was refused injection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefusalReason {
    /// The owning resource kind has no pod template the injector understands
    UnsupportedResource,
    /// The pod shares the node's network namespace
    HostNetworkEnabled,
    /// The proxy or proxy-init container is already present
    SidecarAlreadyExists,
    /// The inject annotation is set to `disabled`
    InjectDisableAnnotationPresent { scope: AnnotationScope },
    /// No scope opted the workload in (fail-closed origins only)
    InjectEnableAnnotationAbsent,
    /// The inject annotation carries a value that is neither `enabled` nor
    /// `disabled` and shadows any lower scope (fail-closed origins only)
    InjectAnnotationUnrecognized {
        value: String,
        scope: AnnotationScope,
    },
    /// The workload belongs to a different control-plane instance
    ManagedByOtherControlPlane { target: String, current: String },
}

impl RefusalReason {
    /// Stable machine-readable code for events and metrics labels
    pub fn code(&self) -> &'static str {
        match self {
            RefusalReason::UnsupportedResource => "unsupported_resource",
            RefusalReason::HostNetworkEnabled => "host_network_enabled",
            RefusalReason::SidecarAlreadyExists => "sidecar_already_exists",
            RefusalReason::InjectDisableAnnotationPresent { .. } => {
                "injection_disable_annotation_present"
            }
            RefusalReason::InjectEnableAnnotationAbsent => "injection_enable_annotation_absent",
            RefusalReason::InjectAnnotationUnrecognized { .. } => {
                "injection_annotation_unrecognized"
            }
            RefusalReason::ManagedByOtherControlPlane { .. } => "managed_by_other_control_plane",
        }
    }

    /// Whether the refusal comes from the pod spec rather than from policy
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            RefusalReason::UnsupportedResource
                | RefusalReason::HostNetworkEnabled
                | RefusalReason::SidecarAlreadyExists
        )
    }
}

impl fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefusalReason::UnsupportedResource => write!(f, "unsupported resource kind"),
            RefusalReason::HostNetworkEnabled => {
                write!(f, "host network pods cannot be proxied")
            }
            RefusalReason::SidecarAlreadyExists => write!(f, "already injected"),
            RefusalReason::InjectDisableAnnotationPresent { scope } => write!(
                f,
                "injection disabled by {}: {} at {} scope",
                PROXY_INJECT_ANNOTATION, PROXY_INJECT_DISABLED, scope
            ),
            RefusalReason::InjectEnableAnnotationAbsent => write!(
                f,
                "neither the workload nor its namespace sets {}: {}",
                PROXY_INJECT_ANNOTATION, PROXY_INJECT_ENABLED
            ),
            RefusalReason::InjectAnnotationUnrecognized { value, scope } => write!(
                f,
                "{}: {:?} at {} scope is not {:?}",
                PROXY_INJECT_ANNOTATION, value, scope, PROXY_INJECT_ENABLED
            ),
            RefusalReason::ManagedByOtherControlPlane { target, current } => write!(
                f,
                "workload is managed by the control plane in namespace {} (this control plane: {})",
                target, current
            ),
        }
    }
}

impl Serialize for RefusalReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RefusalReason", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// An inject annotation value that is neither `enabled` nor `disabled`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationWarning {
    pub key: String,
    pub value: String,
    pub scope: AnnotationScope,
}

impl fmt::Display for AnnotationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unrecognized value {:?} for {} at {} scope, expected {:?} or {:?}",
            self.value, self.key, self.scope, PROXY_INJECT_ENABLED, PROXY_INJECT_DISABLED
        )
    }
}

/// Which well-known proxy containers the pod spec already carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingSidecar {
    pub proxy: bool,
    pub proxy_init: bool,
}

impl ExistingSidecar {
    pub fn any(&self) -> bool {
        self.proxy || self.proxy_init
    }
}

/// Outcome of a single resolution.
///
/// Built fresh for every call to [`resolve`](super::resolve) and never reused
/// across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    /// Workload kind, when the caller supplied it
    pub kind: Option<String>,
    /// Workload name, when the caller supplied it
    pub name: Option<String>,
    pub origin: Origin,
    /// Final outcome
    pub injectable: bool,
    /// Policy resolution landed on "disabled" (annotation or ownership)
    pub disabled_explicitly: bool,
    pub owned_by_this_control_plane: bool,
    /// Resolved owner namespace, populated even when it is the default
    pub target_control_plane_namespace: String,
    /// Scope that supplied the inject annotation, if any did
    pub inject_annotation_at: Option<AnnotationScope>,
    pub existing_sidecar: ExistingSidecar,
    /// Refusal reasons, structural first. Empty when injectable.
    pub reasons: Vec<RefusalReason>,
    /// Configuration problems that did not on their own refuse injection
    pub warnings: Vec<AnnotationWarning>,
}

impl DecisionRecord {
    /// The most specific reason for a refusal
    pub fn first_reason(&self) -> Option<&RefusalReason> {
        self.reasons.first()
    }

    /// Human-readable reasons in evaluation order
    pub fn reason_messages(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }

    pub fn has_reason(&self, code: &str) -> bool {
        self.reasons.iter().any(|r| r.code() == code)
    }

    /// Whether any refusal comes from the pod spec itself
    pub fn structurally_vetoed(&self) -> bool {
        self.reasons.iter().any(RefusalReason::is_structural)
    }

    /// One-line summary for audit logs and events
    pub fn summary(&self) -> String {
        if self.injectable {
            format!(
                "injectable (control plane: {})",
                self.target_control_plane_namespace
            )
        } else {
            format!("not injectable: {}", self.reason_messages().join("; "))
        }
    }
}
