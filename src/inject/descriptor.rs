//! Workload descriptor: the normalized input to [`resolve`](super::resolve).
//!
//! Callers start either from a bare `PodSpec` through [`WorkloadDescriptor::builder`],
//! or from a Kubernetes object through [`WorkloadDescriptor::for_pod`] and
//! [`WorkloadDescriptor::for_template`]. Namespace annotations are always supplied by
//! the caller, which owns any namespace lookup or cache.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Pod, PodSpec, PodTemplateSpec};
use kube::ResourceExt;

use super::origin::Origin;
use crate::config::ResolverConfig;
use crate::error::{Error, Result};

/// Everything the resolver needs to know about one workload.
///
/// The pod spec is required. A workload without one cannot be described, so
/// the Kubernetes constructors refuse to build a descriptor rather than
/// defaulting it.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadDescriptor {
    pub pod_spec: PodSpec,
    pub pod_annotations: BTreeMap<String, String>,
    pub namespace_annotations: BTreeMap<String, String>,
    /// Namespace of the control plane evaluating this request
    pub cluster_default_namespace: String,
    pub origin: Origin,
    /// Set when the owning resource kind has no pod template the injector understands
    pub unsupported_resource_kind: bool,
    pub proxy_container_name: String,
    pub proxy_init_container_name: String,
    /// Workload kind, for diagnostics only
    pub kind: Option<String>,
    /// Workload name, for diagnostics only
    pub name: Option<String>,
}

impl WorkloadDescriptor {
    /// Start a descriptor for `pod_spec` evaluated by the control plane in `config`
    pub fn builder(pod_spec: PodSpec, config: &ResolverConfig) -> WorkloadDescriptorBuilder {
        WorkloadDescriptorBuilder {
            descriptor: WorkloadDescriptor {
                pod_spec,
                pod_annotations: BTreeMap::new(),
                namespace_annotations: BTreeMap::new(),
                cluster_default_namespace: config.control_plane_namespace.clone(),
                origin: Origin::default(),
                unsupported_resource_kind: false,
                proxy_container_name: config.proxy_container_name.clone(),
                proxy_init_container_name: config.proxy_init_container_name.clone(),
                kind: None,
                name: None,
            },
        }
    }

    /// Start a descriptor from a bare pod
    pub fn for_pod(pod: &Pod, config: &ResolverConfig) -> Result<WorkloadDescriptorBuilder> {
        let spec = pod
            .spec
            .clone()
            .ok_or_else(|| Error::MissingField("spec".to_string()))?;

        let mut builder = Self::builder(spec, config)
            .kind("Pod")
            .pod_annotations(pod.annotations().clone());
        if let Some(name) = pod
            .metadata
            .name
            .as_ref()
            .or(pod.metadata.generate_name.as_ref())
        {
            builder = builder.name(name.clone());
        }
        Ok(builder)
    }

    /// Start a descriptor from the pod template of a workload resource
    pub fn for_template(
        kind: impl Into<String>,
        name: impl Into<String>,
        template: &PodTemplateSpec,
        config: &ResolverConfig,
    ) -> Result<WorkloadDescriptorBuilder> {
        let spec = template
            .spec
            .clone()
            .ok_or_else(|| Error::MissingField("template.spec".to_string()))?;
        let annotations = template
            .metadata
            .as_ref()
            .and_then(|meta| meta.annotations.clone())
            .unwrap_or_default();

        Ok(Self::builder(spec, config)
            .kind(kind)
            .name(name)
            .pod_annotations(annotations))
    }
}

/// Builder for [`WorkloadDescriptor`]
#[derive(Debug, Clone)]
pub struct WorkloadDescriptorBuilder {
    descriptor: WorkloadDescriptor,
}

impl WorkloadDescriptorBuilder {
    pub fn origin(mut self, origin: Origin) -> Self {
        self.descriptor.origin = origin;
        self
    }

    /// Replace the pod-level annotations.
    pub fn pod_annotations(mut self, annotations: BTreeMap<String, String>) -> Self {
        self.descriptor.pod_annotations = annotations;
        self
    }

    /// Add a single pod-level annotation.
    pub fn pod_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.descriptor
            .pod_annotations
            .insert(key.into(), value.into());
        self
    }

    /// Replace the namespace-level annotations.
    pub fn namespace_annotations(mut self, annotations: BTreeMap<String, String>) -> Self {
        self.descriptor.namespace_annotations = annotations;
        self
    }

    /// Add a single namespace-level annotation.
    pub fn namespace_annotation(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.descriptor
            .namespace_annotations
            .insert(key.into(), value.into());
        self
    }

    pub fn unsupported_resource_kind(mut self, unsupported: bool) -> Self {
        self.descriptor.unsupported_resource_kind = unsupported;
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.descriptor.kind = Some(kind.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.descriptor.name = Some(name.into());
        self
    }

    pub fn build(self) -> WorkloadDescriptor {
        self.descriptor
    }
}
