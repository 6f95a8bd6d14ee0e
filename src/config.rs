//! Resolver configuration.
//!
//! One value per control-plane deployment: the namespace the control plane runs
//! in, and the names its proxy containers are injected under. The values are
//! copied into every descriptor so resolution never reads process state.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::error::{Error, Result};
use crate::inject::{
    CONTROL_PLANE_DEFAULT_NAMESPACE, PROXY_CONTAINER_NAME, PROXY_INIT_CONTAINER_NAME,
};

/// Environment variable naming the control-plane namespace
pub const CONTROL_PLANE_NAMESPACE_ENV: &str = "CONTROL_PLANE_NAMESPACE";
/// Fallback for the control-plane namespace, set through the downward API
pub const POD_NAMESPACE_ENV: &str = "POD_NAMESPACE";
/// Environment variable overriding the proxy container name
pub const PROXY_CONTAINER_NAME_ENV: &str = "PROXY_CONTAINER_NAME";
/// Environment variable overriding the proxy init container name
pub const PROXY_INIT_CONTAINER_NAME_ENV: &str = "PROXY_INIT_CONTAINER_NAME";

/// RFC 1123 label, the format of namespace and container names
static DNS_LABEL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]{0,61}[a-z0-9])?$").ok());

/// Configuration shared by every resolution this process performs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Namespace of the control plane evaluating requests
    pub control_plane_namespace: String,
    pub proxy_container_name: String,
    pub proxy_init_container_name: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            control_plane_namespace: CONTROL_PLANE_DEFAULT_NAMESPACE.to_string(),
            proxy_container_name: PROXY_CONTAINER_NAME.to_string(),
            proxy_init_container_name: PROXY_INIT_CONTAINER_NAME.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Configuration for a control plane in `namespace` with default container names
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            control_plane_namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Load configuration from the environment and validate it
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let control_plane_namespace = lookup(CONTROL_PLANE_NAMESPACE_ENV)
            .or_else(|| {
                warn!(
                    "{} not set, falling back to {}",
                    CONTROL_PLANE_NAMESPACE_ENV, POD_NAMESPACE_ENV
                );
                lookup(POD_NAMESPACE_ENV)
            })
            .unwrap_or_else(|| {
                warn!(
                    namespace = %defaults.control_plane_namespace,
                    "{} not set, using default control-plane namespace",
                    POD_NAMESPACE_ENV
                );
                defaults.control_plane_namespace.clone()
            });

        let config = Self {
            control_plane_namespace,
            proxy_container_name: lookup(PROXY_CONTAINER_NAME_ENV)
                .unwrap_or(defaults.proxy_container_name),
            proxy_init_container_name: lookup(PROXY_INIT_CONTAINER_NAME_ENV)
                .unwrap_or(defaults.proxy_init_container_name),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every name is a valid RFC 1123 label
    pub fn validate(&self) -> Result<()> {
        validate_label("control plane namespace", &self.control_plane_namespace)?;
        validate_label("proxy container name", &self.proxy_container_name)?;
        validate_label("proxy init container name", &self.proxy_init_container_name)?;

        if self.proxy_container_name == self.proxy_init_container_name {
            return Err(Error::InvalidConfig(format!(
                "proxy and proxy init containers cannot share the name {}",
                self.proxy_container_name
            )));
        }

        Ok(())
    }
}

fn validate_label(what: &str, value: &str) -> Result<()> {
    let pattern = DNS_LABEL
        .as_ref()
        .ok_or_else(|| Error::InvalidConfig("failed to compile label pattern".to_string()))?;

    if !pattern.is_match(value) {
        return Err(Error::InvalidConfig(format!(
            "{} {:?} is not a valid RFC 1123 label",
            what, value
        )));
    }
    Ok(())
}
