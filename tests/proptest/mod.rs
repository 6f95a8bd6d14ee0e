// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Property-based tests for proxy-inject.
//!
//! Uses proptest to generate annotation combinations and verify the precedence
//! and default-policy invariants of the resolver.

#[path = "../common/mod.rs"]
mod common;

use k8s_openapi::api::core::v1::PodSpec;
use proptest::prelude::*;

use common::fixtures::PodBuilder;
use proxy_inject::inject::{PROXY_INJECT_ANNOTATION, PROXY_MANAGED_BY_ANNOTATION};
use proxy_inject::{DecisionRecord, Origin, RefusalReason, ResolverConfig, WorkloadDescriptor};

/// Strategy for inject annotation values. `None` means the key is not set.
fn inject_value() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        Just(Some("enabled".to_string())),
        Just(Some("disabled".to_string())),
        "[a-z]{1,8}".prop_map(Some),
    ]
}

/// Strategy for inject annotation values that are actually present.
fn present_inject_value() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("enabled".to_string()),
        Just("disabled".to_string()),
        "[a-z]{1,8}",
    ]
}

/// Strategy for control-plane namespaces, biased towards collisions.
fn control_plane() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("linkerd".to_string()),
        Just("linkerd-dev".to_string()),
        "[a-z]{1,10}",
    ]
}

fn managed_by() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        control_plane().prop_map(Some),
    ]
}

fn any_origin() -> impl Strategy<Value = Origin> {
    prop_oneof![
        Just(Origin::Cli),
        Just(Origin::Webhook),
        Just(Origin::Unknown),
    ]
}

/// Inputs that vary between properties
#[derive(Debug, Clone, Default)]
struct Inputs {
    pod_inject: Option<String>,
    ns_inject: Option<String>,
    pod_managed_by: Option<String>,
    ns_managed_by: Option<String>,
}

fn build(inputs: &Inputs, control_plane: &str, origin: Origin) -> WorkloadDescriptor {
    let mut builder =
        WorkloadDescriptor::builder(PodSpec::default(), &ResolverConfig::new(control_plane))
            .origin(origin);
    if let Some(value) = &inputs.pod_inject {
        builder = builder.pod_annotation(PROXY_INJECT_ANNOTATION, value.clone());
    }
    if let Some(value) = &inputs.ns_inject {
        builder = builder.namespace_annotation(PROXY_INJECT_ANNOTATION, value.clone());
    }
    if let Some(value) = &inputs.pod_managed_by {
        builder = builder.pod_annotation(PROXY_MANAGED_BY_ANNOTATION, value.clone());
    }
    if let Some(value) = &inputs.ns_managed_by {
        builder = builder.namespace_annotation(PROXY_MANAGED_BY_ANNOTATION, value.clone());
    }
    builder.build()
}

/// The parts of a record that do not depend on which scope supplied a value
fn outcome(record: &DecisionRecord) -> (bool, bool, bool, String) {
    (
        record.injectable,
        record.disabled_explicitly,
        record.owned_by_this_control_plane,
        record.target_control_plane_namespace.clone(),
    )
}

proptest! {
    /// Property: an already-injected workload is never injectable, whatever it is annotated with.
    #[test]
    fn test_already_injected_is_idempotent(
        pod_inject in inject_value(),
        ns_inject in inject_value(),
        origin in any_origin(),
        proxy_init in any::<bool>(),
    ) {
        let mut pod = PodBuilder::new("web-0");
        pod = if proxy_init { pod.with_proxy_init() } else { pod.with_proxy() };
        if let Some(value) = &pod_inject {
            pod = pod.inject(value);
        }
        let pod = pod.build();

        let mut builder = WorkloadDescriptor::for_pod(&pod, &ResolverConfig::default())
            .unwrap()
            .origin(origin);
        if let Some(value) = ns_inject {
            builder = builder.namespace_annotation(PROXY_INJECT_ANNOTATION, value);
        }

        let record = proxy_inject::resolve(&builder.build());
        prop_assert!(!record.injectable);
        prop_assert!(record.reasons.contains(&RefusalReason::SidecarAlreadyExists));
    }

    /// Property: a present pod value decides alone; the namespace value is irrelevant.
    #[test]
    fn test_pod_overrides_namespace(
        pod_inject in present_inject_value(),
        ns_inject in inject_value(),
        pod_managed_by in control_plane(),
        ns_managed_by in managed_by(),
        control_plane in control_plane(),
        origin in any_origin(),
    ) {
        let layered = Inputs {
            pod_inject: Some(pod_inject.clone()),
            ns_inject,
            pod_managed_by: Some(pod_managed_by.clone()),
            ns_managed_by,
        };
        let pod_only = Inputs {
            pod_inject: Some(pod_inject),
            pod_managed_by: Some(pod_managed_by),
            ..Default::default()
        };

        let layered = proxy_inject::resolve(&build(&layered, &control_plane, origin));
        let pod_only = proxy_inject::resolve(&build(&pod_only, &control_plane, origin));
        prop_assert_eq!(outcome(&layered), outcome(&pod_only));
    }

    /// Property: with no pod value, the namespace value acts as if it were set on the pod.
    ///
    /// Only the webhook consults the namespace inject annotation; managed-by is
    /// consulted at namespace scope by every origin.
    #[test]
    fn test_namespace_fallback(
        ns_inject in present_inject_value(),
        ns_managed_by in control_plane(),
        control_plane in control_plane(),
    ) {
        let from_namespace = Inputs {
            ns_inject: Some(ns_inject.clone()),
            ns_managed_by: Some(ns_managed_by.clone()),
            ..Default::default()
        };
        let from_pod = Inputs {
            pod_inject: Some(ns_inject),
            pod_managed_by: Some(ns_managed_by),
            ..Default::default()
        };

        let a = proxy_inject::resolve(&build(&from_namespace, &control_plane, Origin::Webhook));
        let b = proxy_inject::resolve(&build(&from_pod, &control_plane, Origin::Webhook));
        prop_assert_eq!(outcome(&a), outcome(&b));
    }

    /// Property: the webhook refuses a workload nobody opted in.
    #[test]
    fn test_webhook_fail_closed(
        pod_inject in prop_oneof![Just(None), Just(Some(String::new()))],
        ns_inject in prop_oneof![Just(None), Just(Some(String::new()))],
        control_plane in control_plane(),
    ) {
        let inputs = Inputs { pod_inject, ns_inject, ..Default::default() };
        let record = proxy_inject::resolve(&build(&inputs, &control_plane, Origin::Webhook));
        prop_assert!(record.disabled_explicitly);
        prop_assert!(!record.injectable);
    }

    /// Property: the CLI injects a workload without a pod opt-out, whatever the namespace says.
    #[test]
    fn test_cli_fail_open(
        ns_inject in inject_value(),
        ns_managed_by in managed_by(),
        control_plane in control_plane(),
    ) {
        let inputs = Inputs { ns_inject, ns_managed_by, ..Default::default() };
        let record = proxy_inject::resolve(&build(&inputs, &control_plane, Origin::Cli));
        prop_assert!(!record.disabled_explicitly);
        prop_assert!(record.injectable);
    }

    /// Property: ownership holds exactly when the target is the evaluating control plane.
    #[test]
    fn test_ownership_symmetry(
        pod_managed_by in managed_by(),
        ns_managed_by in managed_by(),
        control_plane in control_plane(),
        origin in any_origin(),
    ) {
        let inputs = Inputs { pod_managed_by, ns_managed_by, ..Default::default() };
        let record = proxy_inject::resolve(&build(&inputs, &control_plane, origin));
        prop_assert_eq!(
            record.owned_by_this_control_plane,
            record.target_control_plane_namespace == control_plane
        );
        prop_assert!(!record.target_control_plane_namespace.is_empty());
    }

    /// Property: resolution is deterministic, down to the serialized record.
    #[test]
    fn test_resolution_deterministic(
        pod_inject in inject_value(),
        ns_inject in inject_value(),
        pod_managed_by in managed_by(),
        ns_managed_by in managed_by(),
        control_plane in control_plane(),
        origin in any_origin(),
    ) {
        let inputs = Inputs { pod_inject, ns_inject, pod_managed_by, ns_managed_by };
        let descriptor = build(&inputs, &control_plane, origin);
        let first = proxy_inject::resolve(&descriptor);
        let second = proxy_inject::resolve(&descriptor);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        prop_assert_eq!(first, second);
    }

    /// Property: a record is injectable exactly when it carries no reasons.
    #[test]
    fn test_injectable_iff_no_reasons(
        pod_inject in inject_value(),
        ns_inject in inject_value(),
        pod_managed_by in managed_by(),
        control_plane in control_plane(),
        origin in any_origin(),
        host_network in any::<bool>(),
    ) {
        let inputs = Inputs { pod_inject, ns_inject, pod_managed_by, ..Default::default() };
        let mut descriptor = build(&inputs, &control_plane, origin);
        descriptor.pod_spec.host_network = Some(host_network);

        let record = proxy_inject::resolve(&descriptor);
        prop_assert_eq!(record.injectable, record.reasons.is_empty());
        prop_assert_eq!(record.structurally_vetoed(), host_network);
    }
}
