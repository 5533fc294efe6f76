//! Argument types for sprig subcommands.

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Labeled dataset, one JSON object per line: {"features": [...], "label": "..."}
    #[arg(long)]
    pub data: PathBuf,

    /// Output directory for checkpoints and logs
    #[arg(long, default_value = "runs/latest")]
    pub output: PathBuf,

    #[arg(long)]
    pub epochs: Option<u32>,

    /// Consecutive epochs without improvement before stopping
    #[arg(long)]
    pub patience: Option<u32>,

    #[arg(long)]
    pub learning_rate: Option<f64>,

    #[arg(long)]
    pub weight_decay: Option<f64>,

    #[arg(long)]
    pub batch_size: Option<u32>,

    #[arg(long)]
    pub validation_split: Option<f64>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// linear, mlp or mlp:<hidden>
    #[arg(long)]
    pub backbone: Option<String>,

    /// adam, adamw or sgd
    #[arg(long)]
    pub optimizer: Option<String>,

    /// cosine, step or none
    #[arg(long)]
    pub scheduler: Option<String>,

    /// Upload the best checkpoint when training finishes
    #[arg(long)]
    pub upload: bool,

    /// Model name used for the upload
    #[arg(long, default_value = "plant-classifier")]
    pub model_name: String,

    /// Version for the upload (generated when omitted)
    #[arg(long)]
    pub version: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Checkpoint file to upload
    pub checkpoint: PathBuf,

    #[arg(long)]
    pub model_name: String,

    /// Version (generated from the current time when omitted)
    #[arg(long)]
    pub version: Option<String>,

    /// Extra metadata as key=value, repeatable
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub meta: Vec<String>,

    /// Side file uploaded into the same version, repeatable
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    pub model: String,

    /// Version with or without the `v` prefix, or `latest`
    pub version: String,

    #[arg(long, default_value = ".")]
    pub dest: PathBuf,

    /// Only fetch the checkpoint
    #[arg(long)]
    pub no_side_files: bool,

    /// Fail when the checksum does not match the manifest
    #[arg(long)]
    pub strict: bool,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ModelArgs {
    pub model: String,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    pub model: String,

    pub version: String,

    #[arg(long)]
    pub json: bool,
}
