//! `sprig train`: fit a classifier on a JSONL dataset and optionally publish it.

use crate::commands::open_store;
use crate::commands::types::TrainArgs;
use crate::config::CliConfig;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde_json::{json, Value};
use sprig_store::{Manifest, UploadOptions};
use sprig_training::{
    CrossEntropyLoss, LabeledDataset, Scheduler, TrainingHyperParams, TrainingLayout, TrainingRun,
};

pub async fn execute(args: TrainArgs, config: &CliConfig) -> Result<()> {
    let params = hyperparams(&args, config)?;
    params.validate().context("Invalid training parameters")?;

    let dataset = LabeledDataset::read_jsonl(&args.data)
        .with_context(|| format!("Failed to load dataset {}", args.data.display()))?;
    let class_labels = dataset.class_labels().to_vec();
    let (train_data, val_data) = dataset.split(params.validation_split, params.seed, params.batch_size as usize)?;
    tracing::info!(
        samples = dataset.len(),
        classes = dataset.num_classes(),
        features = dataset.feature_dim(),
        backbone = %params.backbone,
        "dataset loaded"
    );

    let mut model = params.backbone.build(dataset.feature_dim(), dataset.num_classes(), params.seed)?;
    let mut optimizer = params.optimizer.build(params.learning_rate, params.weight_decay);
    let mut scheduler = params.scheduler.build(params.learning_rate, params.epochs);
    let mut run = TrainingRun::from_hyperparams(TrainingLayout::new(args.output.clone()), class_labels, &params)?;

    // The loop is CPU bound; keep it off the async workers.
    let run = tokio::task::spawn_blocking(move || -> Result<TrainingRun> {
        run.train(
            &train_data,
            &val_data,
            model.as_mut(),
            &CrossEntropyLoss,
            optimizer.as_mut(),
            scheduler.as_mut().map(|s| &mut **s as &mut dyn Scheduler),
        )?;
        Ok(run)
    })
    .await
    .context("Training task panicked")?
    .context("Training failed")?;

    let manifest = if args.upload { Some(upload_best(&run, &args, &params, config).await?) } else { None };

    if args.json || config.output.always_json {
        let out = json!({
            "run_id": run.run_id().to_string(),
            "epochs_run": run.history().len(),
            "best_epoch": run.best_epoch(),
            "best_val_accuracy": run.best_val_accuracy(),
            "stopped_early": run.stopped_early(),
            "best_checkpoint": run.best_checkpoint_path(),
            "history": run.history(),
            "upload": manifest,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_summary(&run, manifest.as_ref());
    Ok(())
}

fn hyperparams(args: &TrainArgs, config: &CliConfig) -> Result<TrainingHyperParams> {
    let mut params = config.hyperparams();
    if let Some(v) = args.epochs {
        params.epochs = v;
    }
    if let Some(v) = args.patience {
        params.early_stopping_patience = v;
    }
    if let Some(v) = args.learning_rate {
        params.learning_rate = v;
    }
    if let Some(v) = args.weight_decay {
        params.weight_decay = v;
    }
    if let Some(v) = args.batch_size {
        params.batch_size = v;
    }
    if let Some(v) = args.validation_split {
        params.validation_split = v;
    }
    if let Some(v) = args.seed {
        params.seed = v;
    }
    if let Some(ref v) = args.backbone {
        params.backbone = v.parse()?;
    }
    if let Some(ref v) = args.optimizer {
        params.optimizer = v.parse()?;
    }
    if let Some(ref v) = args.scheduler {
        params.scheduler = v.parse()?;
    }
    Ok(params)
}

async fn upload_best(run: &TrainingRun, args: &TrainArgs, params: &TrainingHyperParams, config: &CliConfig) -> Result<Manifest> {
    let best = run.best_checkpoint_path();
    if run.best_epoch() == 0 || !best.is_file() {
        bail!("No best checkpoint to upload: validation accuracy never rose above 0");
    }

    let mut metadata = run.summary_metadata();
    metadata.insert("backbone".to_string(), Value::from(params.backbone.to_string()));
    metadata.insert("optimizer".to_string(), Value::from(params.optimizer.to_string()));
    metadata.insert("scheduler".to_string(), Value::from(params.scheduler.to_string()));
    metadata.insert("batch_size".to_string(), Value::from(params.batch_size));
    metadata.insert("run_id".to_string(), Value::from(run.run_id().to_string()));

    let opts = UploadOptions {
        version: args.version.clone(),
        metadata,
        side_files: vec![run.layout().history_path(), run.layout().latest_checkpoint_path()],
    };

    let store = open_store(config).await?;
    store
        .upload(&best, &args.model_name, opts)
        .await
        .with_context(|| format!("Failed to upload {}", best.display()))
}

fn print_summary(run: &TrainingRun, manifest: Option<&Manifest>) {
    println!();
    println!("{}", "Training complete".bold().green());
    println!("  Run:        {}", run.run_id().to_string().cyan());
    println!("  Epochs:     {}", run.history().len());
    println!(
        "  Best:       epoch {} ({:.2}% val acc)",
        run.best_epoch(),
        run.best_val_accuracy() * 100.0
    );
    if run.stopped_early() {
        println!("  {}", "Stopped early: validation accuracy stopped improving".yellow());
    }
    println!("  Checkpoint: {}", run.best_checkpoint_path().display().to_string().dimmed());

    if let Some(m) = manifest {
        println!();
        println!("{}", "Uploaded".bold().green());
        println!("  Model:    {} v{}", m.model_name.cyan(), m.version);
        println!("  Checksum: {}", m.checksum.dimmed());
        println!("  URL:      {}", m.model_url.dimmed());
    }
    println!();
}
