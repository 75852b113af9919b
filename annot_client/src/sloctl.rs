use annot_core::{Objective, Slo};
use anyhow::{bail, Context as _, Result};
use serde::Deserialize;
use tokio::process::Command;
use tracing::{info, warn};

/// Manifest shape emitted by `sloctl get slos -o json`.
#[derive(Debug, Deserialize)]
struct SloManifest {
    #[serde(default)]
    metadata: ManifestMetadata,

    #[serde(default)]
    spec: ManifestSpec,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestMetadata {
    #[serde(default)]
    name: String,

    #[serde(default, rename = "displayName")]
    display_name: Option<String>,

    #[serde(default)]
    project: String,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestSpec {
    #[serde(default)]
    service: Option<String>,

    #[serde(default)]
    objectives: Vec<Objective>,
}

impl SloManifest {
    /// Identity fields are validated here, at ingestion; a manifest without
    /// them never becomes an inventory record.
    fn into_slo(self) -> Option<Slo> {
        if self.metadata.name.is_empty() || self.metadata.project.is_empty() {
            return None;
        }
        Some(Slo {
            name: self.metadata.name,
            display_name: self.metadata.display_name,
            project: self.metadata.project,
            service: self.spec.service,
            objectives: self.spec.objectives,
        })
    }
}

/// Fails fast when the companion CLI is not on PATH.
pub fn ensure_installed() -> Result<()> {
    let path = std::env::var_os("PATH").unwrap_or_default();
    let found = std::env::split_paths(&path).any(|dir| dir.join("sloctl").is_file());
    if !found {
        bail!("'sloctl' is not installed or not in PATH; install it from https://docs.nobl9.com/sloctl/");
    }
    Ok(())
}

/// Aligns the sloctl context with the selected one. A failure here is worth
/// a warning but does not block the session, which talks to the API with its
/// own token.
pub async fn use_context(name: &str) -> Result<()> {
    let output = Command::new("sloctl")
        .args(["config", "use-context", name])
        .output()
        .await
        .context("running sloctl config use-context")?;

    if !output.status.success() {
        warn!(
            context = %name,
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "could not switch sloctl context"
        );
    }
    Ok(())
}

/// Fetches the full SLO inventory across all projects.
pub async fn fetch_inventory() -> Result<Vec<Slo>> {
    info!("fetching SLO inventory via sloctl");
    let output = Command::new("sloctl")
        .args(["get", "slos", "-A", "-o", "json"])
        .output()
        .await
        .context("running sloctl get slos")?;

    if !output.status.success() {
        bail!(
            "sloctl get slos failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let inventory = parse_inventory(&stdout)?;
    info!(count = inventory.len(), "retrieved SLOs");
    Ok(inventory)
}

/// Parses sloctl manifest JSON, dropping records without full identity.
pub fn parse_inventory(raw: &str) -> Result<Vec<Slo>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }

    let manifests: Vec<SloManifest> =
        serde_json::from_str(trimmed).context("sloctl returned unexpected SLO JSON")?;

    Ok(manifests
        .into_iter()
        .filter_map(|manifest| match manifest.into_slo() {
            Some(slo) => Some(slo),
            None => {
                warn!("dropping SLO manifest without name and project");
                None
            }
        })
        .collect())
}
