//! `sprig list | latest | show | delete`: inspect and prune stored versions.

use crate::commands::open_store;
use crate::commands::types::{ModelArgs, VersionArgs};
use crate::config::CliConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;

fn wants_json(flag: bool, config: &CliConfig) -> bool {
    flag || config.output.always_json
}

pub async fn list(args: ModelArgs, config: &CliConfig) -> Result<()> {
    let store = open_store(config).await?;
    let versions = store.list_versions(&args.model).await.context("Failed to list versions")?;

    if wants_json(args.json, config) {
        let out: Vec<String> = versions.iter().map(ToString::to_string).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("{}", format!("Versions of {} ({})", args.model, versions.len()).bold().cyan());
    println!();
    if versions.is_empty() {
        println!("  {}", "No committed versions found.".dimmed());
    }
    for (i, v) in versions.iter().enumerate() {
        if i == 0 {
            println!("  {} {}", v.to_string().green(), "(latest)".dimmed());
        } else {
            println!("  {v}");
        }
    }
    println!();
    Ok(())
}

pub async fn latest(args: ModelArgs, config: &CliConfig) -> Result<()> {
    let store = open_store(config).await?;
    let latest = store.latest_version(&args.model).await.context("Failed to resolve latest version")?;

    if wants_json(args.json, config) {
        println!("{}", json!({ "model": args.model, "latest": latest.map(|v| v.to_string()) }));
        return Ok(());
    }

    match latest {
        Some(v) => println!("{v}"),
        None => anyhow::bail!("No versions found for model '{}'", args.model),
    }
    Ok(())
}

pub async fn show(args: VersionArgs, config: &CliConfig) -> Result<()> {
    let store = open_store(config).await?;
    let manifest = store.read_manifest(&args.model, &args.version).await?;

    if wants_json(args.json, config) {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(());
    }

    println!();
    println!("{}", format!("{} v{}", manifest.model_name, manifest.version).bold().cyan());
    println!("  File:     {}", manifest.model_file);
    println!("  URL:      {}", manifest.model_url.dimmed());
    println!("  Checksum: {}", manifest.checksum);
    println!("  Created:  {}", manifest.created_at.to_rfc3339());
    for file in &manifest.additional_files {
        println!("  Side:     {}", file.dimmed());
    }
    if !manifest.metadata.is_empty() {
        println!("  Metadata:");
        for (key, value) in &manifest.metadata {
            println!("    {:<18} {}", key, value);
        }
    }
    println!();
    Ok(())
}

pub async fn delete(args: VersionArgs, config: &CliConfig) -> Result<()> {
    let store = open_store(config).await?;
    let deleted = store
        .delete_version(&args.model, &args.version)
        .await
        .with_context(|| format!("Failed to delete {}/{}", args.model, args.version))?;

    if wants_json(args.json, config) {
        println!("{}", json!({ "model": args.model, "version": args.version, "deleted_objects": deleted }));
        return Ok(());
    }

    if deleted == 0 {
        println!("{}", format!("Nothing stored for {} {}", args.model, args.version).yellow());
    } else {
        println!("{} {} objects from {} {}", "Deleted".green(), deleted, args.model, args.version);
    }
    Ok(())
}
