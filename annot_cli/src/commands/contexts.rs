use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use annot_client::config;

use crate::{session, ui};

pub async fn execute(config_flag: Option<PathBuf>) -> Result<()> {
    let path = session::resolve_config_path(config_flag)?;
    let contexts = config::load_contexts(&path)?;

    ui::print_header("Available contexts");
    for (i, context) in contexts.iter().enumerate() {
        let instance = if context.is_custom_instance() {
            format!(" (custom: {})", context.base_url())
        } else {
            String::new()
        };
        println!("  [{}] {}{}", i + 1, context.name.green(), instance);
    }

    Ok(())
}
