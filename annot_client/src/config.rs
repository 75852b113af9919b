use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "https://app.nobl9.com";

/// On-disk shape of the sloctl configuration file. Field spellings vary
/// between camelCase and snake_case in the wild; both are accepted.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    contexts: BTreeMap<String, RawContext>,
}

#[derive(Debug, Deserialize)]
struct RawContext {
    #[serde(default, alias = "clientId")]
    client_id: Option<String>,

    #[serde(default, alias = "clientSecret")]
    client_secret: Option<String>,

    #[serde(default, alias = "accessToken")]
    access_token: Option<String>,

    #[serde(default, alias = "org")]
    organization: Option<String>,

    #[serde(default)]
    url: Option<String>,
}

/// One authentication context from the sloctl configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub organization: Option<String>,
    pub access_token: Option<String>,
    pub url: Option<String>,
}

impl Context {
    pub fn base_url(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// A context carrying its own `url` points at a self-hosted instance.
    pub fn is_custom_instance(&self) -> bool {
        self.url.is_some()
    }
}

/// Default location used by sloctl itself.
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/nobl9/config.toml"))
}

/// Loads contexts from `path`, skipping entries without full credentials.
pub fn load_contexts(path: &Path) -> Result<Vec<Context>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_contexts(&raw)
}

/// Parses config TOML into usable contexts, in name order.
pub fn parse_contexts(raw: &str) -> Result<Vec<Context>> {
    let config: ConfigFile = toml::from_str(raw).context("parsing sloctl config")?;

    let mut contexts = Vec::new();
    for (name, raw_context) in config.contexts {
        let (Some(client_id), Some(client_secret)) =
            (raw_context.client_id, raw_context.client_secret)
        else {
            warn!(context = %name, "skipping context without client credentials");
            continue;
        };
        contexts.push(Context {
            name,
            client_id,
            client_secret,
            organization: raw_context.organization,
            access_token: raw_context.access_token,
            url: raw_context.url,
        });
    }

    if contexts.is_empty() {
        bail!("no usable contexts found in sloctl config");
    }
    Ok(contexts)
}
