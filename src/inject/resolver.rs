//! Eligibility and precedence resolution.
//!
//! [`resolve`] is a pure function of its descriptor: it performs no I/O, holds
//! no state between calls, and returns equal records for equal descriptors.

use tracing::{debug, warn};

use super::annotations::{
    InjectMode, PROXY_INJECT_ANNOTATION, PROXY_MANAGED_BY_ANNOTATION, ResolvedAnnotation,
    resolve_annotation,
};
use super::descriptor::WorkloadDescriptor;
use super::report::{AnnotationWarning, DecisionRecord, ExistingSidecar, RefusalReason};

/// Decide whether `descriptor` may be injected and which control plane owns it.
///
/// Every step runs regardless of earlier refusals so the record lists every
/// applicable reason, structural ones first.
pub fn resolve(descriptor: &WorkloadDescriptor) -> DecisionRecord {
    let policy = descriptor.origin.policy();
    let mut reasons = Vec::new();
    let mut warnings = Vec::new();

    // Structural veto
    let existing_sidecar = existing_sidecar(descriptor);
    if descriptor.unsupported_resource_kind {
        reasons.push(RefusalReason::UnsupportedResource);
    }
    if descriptor.pod_spec.host_network.unwrap_or(false) {
        reasons.push(RefusalReason::HostNetworkEnabled);
    }
    if existing_sidecar.any() {
        reasons.push(RefusalReason::SidecarAlreadyExists);
    }
    let structural_veto = !reasons.is_empty();

    // Ownership
    let target = target_control_plane(descriptor);
    let owned_by_this_control_plane = target == descriptor.cluster_default_namespace;

    // Inject annotation under the origin's policy
    let inject = inject_annotation(descriptor);
    let mode = inject.map(|annotation| InjectMode::from(annotation.value));
    if let (Some(annotation), Some(InjectMode::Unrecognized(value))) = (inject, mode.as_ref()) {
        let warning = AnnotationWarning {
            key: PROXY_INJECT_ANNOTATION.to_string(),
            value: value.clone(),
            scope: annotation.scope,
        };
        warn!(
            kind = ?descriptor.kind,
            name = ?descriptor.name,
            origin = %descriptor.origin,
            "{}",
            warning
        );
        warnings.push(warning);
    }

    let disabled_by_annotation = policy.disabled_by(mode.as_ref());
    if disabled_by_annotation {
        reasons.push(match (inject, mode.as_ref()) {
            (Some(annotation), Some(InjectMode::Disabled)) => {
                RefusalReason::InjectDisableAnnotationPresent {
                    scope: annotation.scope,
                }
            }
            (Some(annotation), Some(InjectMode::Unrecognized(value))) => {
                RefusalReason::InjectAnnotationUnrecognized {
                    value: value.clone(),
                    scope: annotation.scope,
                }
            }
            _ => RefusalReason::InjectEnableAnnotationAbsent,
        });
    }

    let foreign_owner = policy.multi_tenancy_guard && !owned_by_this_control_plane;
    if foreign_owner {
        reasons.push(RefusalReason::ManagedByOtherControlPlane {
            target: target.clone(),
            current: descriptor.cluster_default_namespace.clone(),
        });
    }

    let inject_disabled = disabled_by_annotation || foreign_owner;
    let injectable = !structural_veto && !inject_disabled;

    debug!(
        kind = ?descriptor.kind,
        name = ?descriptor.name,
        origin = %descriptor.origin,
        injectable,
        inject_disabled,
        target_control_plane = %target,
        owned = owned_by_this_control_plane,
        reasons = reasons.len(),
        "Resolved injection decision"
    );

    DecisionRecord {
        kind: descriptor.kind.clone(),
        name: descriptor.name.clone(),
        origin: descriptor.origin,
        injectable,
        disabled_explicitly: inject_disabled,
        owned_by_this_control_plane,
        target_control_plane_namespace: target,
        inject_annotation_at: inject.map(|annotation| annotation.scope),
        existing_sidecar,
        reasons,
        warnings,
    }
}

/// Which well-known proxy containers are already present
fn existing_sidecar(descriptor: &WorkloadDescriptor) -> ExistingSidecar {
    let spec = &descriptor.pod_spec;
    ExistingSidecar {
        proxy: spec
            .containers
            .iter()
            .any(|c| c.name == descriptor.proxy_container_name),
        proxy_init: spec
            .init_containers
            .iter()
            .flatten()
            .any(|c| c.name == descriptor.proxy_init_container_name),
    }
}

/// The inject annotation, restricted to the scopes the origin consults
fn inject_annotation(descriptor: &WorkloadDescriptor) -> Option<ResolvedAnnotation<'_>> {
    let namespace = descriptor
        .origin
        .policy()
        .consults_namespace_scope
        .then_some(&descriptor.namespace_annotations);
    resolve_annotation(
        PROXY_INJECT_ANNOTATION,
        &descriptor.pod_annotations,
        namespace,
    )
}

/// Owning control-plane namespace, defaulting to the evaluating control plane
fn target_control_plane(descriptor: &WorkloadDescriptor) -> String {
    resolve_annotation(
        PROXY_MANAGED_BY_ANNOTATION,
        &descriptor.pod_annotations,
        Some(&descriptor.namespace_annotations),
    )
    .map(|annotation| annotation.value.to_string())
    .unwrap_or_else(|| descriptor.cluster_default_namespace.clone())
}
