//! Call origins and their default policies.
//!
//! The webhook and the CLI apply the same precedence rules but disagree on what
//! happens when no scope says anything. Both policies live in one table so they
//! can be read side by side.
//!
//! | Origin  | Default on absence | Namespace scope | Multi-tenancy guard |
//! |---------|--------------------|-----------------|---------------------|
//! | Webhook | Skip (fail-closed) | yes             | yes                 |
//! | Cli     | Inject (fail-open) | no              | no                  |
//! | Unknown | Inject (fail-open) | no              | no                  |

use std::fmt;

use serde::Serialize;

use super::annotations::InjectMode;

/// Calling context of a resolution request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Origin {
    /// Command-line tool operating on a single manifest
    Cli,
    /// Cluster-wide admission webhook
    Webhook,
    /// Internal and test paths that bypass both entry points
    #[default]
    Unknown,
}

impl Origin {
    /// Policy table entry for this origin
    pub const fn policy(self) -> OriginPolicy {
        match self {
            Origin::Webhook => OriginPolicy {
                default_on_absence: DefaultOnAbsence::Skip,
                consults_namespace_scope: true,
                multi_tenancy_guard: true,
            },
            Origin::Cli | Origin::Unknown => OriginPolicy {
                default_on_absence: DefaultOnAbsence::Inject,
                consults_namespace_scope: false,
                multi_tenancy_guard: false,
            },
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Cli => write!(f, "cli"),
            Origin::Webhook => write!(f, "webhook"),
            Origin::Unknown => write!(f, "unknown"),
        }
    }
}

/// Outcome assumed when the inject annotation carries no explicit opt-in or opt-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultOnAbsence {
    Inject,
    Skip,
}

/// Per-origin decision rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginPolicy {
    pub default_on_absence: DefaultOnAbsence,
    /// Whether the namespace's inject annotation is consulted at all
    pub consults_namespace_scope: bool,
    /// Whether workloads owned by another control plane are refused
    pub multi_tenancy_guard: bool,
}

impl OriginPolicy {
    /// Whether the resolved inject annotation disables injection under this policy.
    ///
    /// An unrecognized value is neither an opt-in nor an opt-out, so it gets the
    /// default-on-absence outcome.
    pub fn disabled_by(&self, mode: Option<&InjectMode>) -> bool {
        match mode {
            Some(InjectMode::Enabled) => false,
            Some(InjectMode::Disabled) => true,
            Some(InjectMode::Unrecognized(_)) | None => {
                self.default_on_absence == DefaultOnAbsence::Skip
            }
        }
    }
}
