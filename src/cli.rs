//! Manifest evaluation behind the `proxy-inject` binary.

use std::io::{Read, Write};

use k8s_openapi::api::core::v1::Pod;
use tracing::{info, warn};

use crate::config::ResolverConfig;
use crate::error::Result;
use crate::inject::{DecisionRecord, Origin, WorkloadDescriptor, resolve};

/// Read one `Pod` manifest as JSON from `input`, resolve it as the CLI
/// injector would, and write the decision record as pretty JSON to `output`.
///
/// Refusal reasons are logged at `warn` and the summary at `info`. The record
/// is returned as well so callers can act on it without re-parsing the output.
pub fn evaluate<R, W>(
    mut input: R,
    mut output: W,
    config: &ResolverConfig,
) -> Result<DecisionRecord>
where
    R: Read,
    W: Write,
{
    let mut manifest = String::new();
    input.read_to_string(&mut manifest)?;
    let pod: Pod = serde_json::from_str(&manifest)?;

    let descriptor = WorkloadDescriptor::for_pod(&pod, config)?
        .origin(Origin::Cli)
        .build();
    let record = resolve(&descriptor);

    for reason in &record.reasons {
        warn!(code = reason.code(), "{}", reason);
    }
    info!(injectable = record.injectable, "{}", record.summary());

    serde_json::to_writer_pretty(&mut output, &record)?;
    writeln!(output)?;
    output.flush()?;
    Ok(record)
}
