//! `sprig upload`: publish an existing checkpoint as a model version.

use crate::commands::open_store;
use crate::commands::types::UploadArgs;
use crate::config::CliConfig;
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use serde_json::Value;
use sprig_store::UploadOptions;
use std::collections::BTreeMap;

pub async fn execute(args: UploadArgs, config: &CliConfig) -> Result<()> {
    let metadata = parse_metadata(&args.meta)?;
    let store = open_store(config).await?;

    let opts = UploadOptions { version: args.version.clone(), metadata, side_files: args.files.clone() };
    let manifest = store
        .upload(&args.checkpoint, &args.model_name, opts)
        .await
        .with_context(|| format!("Failed to upload {}", args.checkpoint.display()))?;

    if args.json || config.output.always_json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(());
    }

    println!();
    println!("{}", "Upload complete".bold().green());
    println!("  Model:    {}", manifest.model_name.cyan());
    println!("  Version:  v{}", manifest.version);
    println!("  Checksum: {}", manifest.checksum.dimmed());
    println!("  URL:      {}", manifest.model_url.dimmed());
    if !manifest.additional_files.is_empty() {
        println!("  Files:    {}", manifest.additional_files.join(", ").dimmed());
    }
    println!();
    Ok(())
}

/// `key=value` pairs. Numbers and booleans keep their type, anything else is a string.
fn parse_metadata(pairs: &[String]) -> Result<BTreeMap<String, Value>> {
    pairs
        .iter()
        .map(|pair| {
            let (key, raw) = pair.split_once('=').ok_or_else(|| anyhow!("Invalid --meta '{pair}', expected KEY=VALUE"))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(anyhow!("Invalid --meta '{pair}', key is empty"));
            }
            let value = match serde_json::from_str::<Value>(raw) {
                Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
                _ => Value::from(raw),
            };
            Ok((key.to_string(), value))
        })
        .collect()
}
