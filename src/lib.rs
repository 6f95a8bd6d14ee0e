//! proxy-inject library crate
//!
//! Decides whether a workload may receive the proxy sidecar and which control
//! plane owns it. The admission webhook and the CLI both build a
//! [`WorkloadDescriptor`] and hand it to [`resolve`]; the returned
//! [`DecisionRecord`] says whether to inject and why not.

pub mod cli;
pub mod config;
pub mod error;
pub mod inject;

pub use config::ResolverConfig;
pub use error::{Error, Result};
pub use inject::{DecisionRecord, Origin, RefusalReason, WorkloadDescriptor, resolve};
