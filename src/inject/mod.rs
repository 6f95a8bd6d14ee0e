//! Injection eligibility and control-plane ownership resolution.
//!
//! Given a [`WorkloadDescriptor`], [`resolve`] decides whether the proxy sidecar
//! and its init container may be added to the workload, and which control-plane
//! instance owns that decision.
//!
//! Resolution runs in order:
//! - Structural veto: unsupported kind, host network, already injected
//! - Annotation precedence: pod scope shadows namespace scope
//! - Origin policy: webhook is fail-closed, CLI is fail-open
//! - Ownership: the managed-by annotation against the evaluating control plane

pub mod annotations;
pub mod descriptor;
pub mod origin;
pub mod report;
pub mod resolver;

pub use annotations::{
    AnnotationScope, InjectMode, PROXY_INJECT_ANNOTATION, PROXY_INJECT_DISABLED,
    PROXY_INJECT_ENABLED, PROXY_MANAGED_BY_ANNOTATION, ResolvedAnnotation, resolve_annotation,
};
pub use descriptor::{WorkloadDescriptor, WorkloadDescriptorBuilder};
pub use origin::{DefaultOnAbsence, Origin, OriginPolicy};
pub use report::{AnnotationWarning, DecisionRecord, ExistingSidecar, RefusalReason};
pub use resolver::resolve;

/// Well-known name of the proxy sidecar container
pub const PROXY_CONTAINER_NAME: &str = "linkerd-proxy";

/// Well-known name of the proxy init container
pub const PROXY_INIT_CONTAINER_NAME: &str = "linkerd-init";

/// Namespace of a default control-plane installation
pub const CONTROL_PLANE_DEFAULT_NAMESPACE: &str = "linkerd";
