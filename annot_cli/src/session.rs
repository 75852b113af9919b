//! Context selection and authentication shared by the commands.

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use colored::Colorize;

use annot_client::config::{self, Context};
use annot_client::{auth, sloctl, AnnotationsClient};

use crate::{prompt, ui};

pub struct Session {
    pub context: Context,
    pub client: AnnotationsClient,
}

/// Uses the flag, then sloctl's default path, then asks.
pub fn resolve_config_path(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }

    let Some(path) = config::default_config_path() else {
        bail!("could not determine the home directory; pass --config");
    };
    if path.is_file() {
        return Ok(path);
    }

    ui::print_warning(&format!("Config not found at {}", path.display()));
    let entered = prompt::read_nonempty("Full path to your Nobl9 config.toml:", "path")?;
    Ok(PathBuf::from(entered))
}

/// Picks a context by flag, or without asking when there is only one, or via
/// a menu.
pub fn choose_context(mut contexts: Vec<Context>, flag: Option<String>) -> Result<Context> {
    if let Some(wanted) = flag {
        return contexts
            .into_iter()
            .find(|context| context.name == wanted)
            .with_context(|| format!("context '{wanted}' not found in config"));
    }

    if contexts.len() == 1 {
        return Ok(contexts.remove(0));
    }

    ui::print_header("Available contexts");
    for (i, context) in contexts.iter().enumerate() {
        let instance = if context.is_custom_instance() {
            format!(" (custom: {})", context.base_url())
        } else {
            String::new()
        };
        println!("  [{}] {}{}", i + 1, context.name.green(), instance);
    }

    let index = prompt::select_index(
        &format!("Select context [1-{}]:", contexts.len()),
        contexts.len(),
    )?;
    Ok(contexts.remove(index))
}

/// Full bootstrap: config, context, organization, access token.
pub async fn authenticate(
    config_flag: Option<PathBuf>,
    context_flag: Option<String>,
) -> Result<Session> {
    sloctl::ensure_installed()?;

    let path = resolve_config_path(config_flag)?;
    let contexts = config::load_contexts(&path)?;
    let context = choose_context(contexts, context_flag)?;
    ui::print_info(&format!("Using context '{}'", context.name));
    if context.is_custom_instance() {
        ui::print_info(&format!("API base url: {}", context.base_url()));
    }

    let organization = match auth::resolve_organization(&context) {
        Some(organization) => organization,
        None => prompt::read_nonempty(
            "Enter Nobl9 Organization ID (Nobl9 UI, Settings > Account):",
            "organization",
        )?,
    };

    let token = auth::fetch_access_token(&context, &organization).await?;
    ui::print_success("Access token acquired");

    let client = AnnotationsClient::new(context.base_url(), &organization, &token)?;
    Ok(Session { context, client })
}
