//! Device command handlers

use anyhow::Result;

use resumeforge_core::DeviceIdentity;

use crate::output::Output;

/// Resolve and show this installation's device identifier
pub async fn show(identity: &DeviceIdentity, output: &Output) -> Result<()> {
    let id = identity.resolve().await;
    output.print_device(id.as_str(), identity.source());
    Ok(())
}
