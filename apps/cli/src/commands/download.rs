//! `sprig download`: fetch and verify a model version.

use crate::commands::open_store;
use crate::commands::types::DownloadArgs;
use crate::config::CliConfig;
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use sprig_store::VerifyMode;

pub async fn execute(args: DownloadArgs, config: &CliConfig) -> Result<()> {
    let mut store = open_store(config).await?;
    if args.strict {
        store = store.with_verify_mode(VerifyMode::Enforce);
    }

    let version = if args.version.eq_ignore_ascii_case("latest") {
        store
            .latest_version(&args.model)
            .await?
            .ok_or_else(|| anyhow!("No versions found for model '{}'", args.model))?
            .to_string()
    } else {
        args.version.clone()
    };

    let downloaded = store
        .download(&args.model, &version, &args.dest, !args.no_side_files)
        .await
        .with_context(|| format!("Failed to download {}/{}", args.model, version))?;

    if args.json || config.output.always_json {
        println!("{}", serde_json::to_string_pretty(&downloaded)?);
        return Ok(());
    }

    println!();
    println!("{}", "Download complete".bold().green());
    println!("  Model:      {} v{}", downloaded.manifest.model_name.cyan(), downloaded.manifest.version);
    println!("  Checkpoint: {}", downloaded.checkpoint_path.display());
    if downloaded.checksum_matches {
        println!("  Checksum:   {} {}", downloaded.checksum.dimmed(), "verified".green());
    } else {
        println!(
            "  Checksum:   {} {}",
            downloaded.checksum.dimmed(),
            format!("MISMATCH (expected {})", downloaded.manifest.checksum).red().bold()
        );
    }
    for file in &downloaded.side_files {
        println!("  Side file:  {}", file.display().to_string().dimmed());
    }
    println!();
    Ok(())
}
