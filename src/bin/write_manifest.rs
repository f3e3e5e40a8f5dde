//! Manifest writer for exported model artifacts.
//!
//! Hashes `model.json` and, when present, `scaler.json` and `labels.json`
//! into `manifest.json`, then loads the directory back to confirm the bundle
//! is consistent with the declared layout.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin write_manifest -- <model_dir> --layout <compact-v1|wide-v1>
//! ```

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

use obesitrack::adapters::artifacts::{build_manifest, load_artifacts, MANIFEST_FILE};
use obesitrack::domain::FeatureLayout;

fn usage() -> anyhow::Error {
    let layouts: Vec<&str> = FeatureLayout::ALL.iter().map(|l| l.id()).collect();
    anyhow!(
        "Usage: write_manifest <model_dir> --layout <{}>",
        layouts.join("|")
    )
}

fn parse_args() -> Result<(PathBuf, FeatureLayout)> {
    let mut args = env::args().skip(1);
    let mut model_dir: Option<PathBuf> = None;
    let mut layout: Option<FeatureLayout> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--layout" => {
                let id = args.next().ok_or_else(usage)?;
                layout = Some(
                    FeatureLayout::from_id(id.trim())
                        .ok_or_else(|| anyhow!("Unknown layout {id:?}"))?,
                );
            }
            "-h" | "--help" => return Err(usage()),
            _ => {
                if model_dir.is_some() {
                    return Err(usage());
                }
                model_dir = Some(PathBuf::from(arg));
            }
        }
    }

    match (model_dir, layout) {
        (Some(dir), Some(layout)) => Ok((dir, layout)),
        _ => Err(usage()),
    }
}

fn main() -> Result<()> {
    let (model_dir, layout) = parse_args()?;

    if !model_dir.is_dir() {
        bail!("{model_dir:?} is not a directory");
    }

    let manifest = build_manifest(&model_dir, layout)?;
    let manifest_bytes =
        serde_json::to_vec_pretty(&manifest).context("Failed to serialize manifest.json")?;

    let manifest_path = model_dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, &manifest_bytes)
        .with_context(|| format!("Failed to write {manifest_path:?}"))?;

    println!("Wrote manifest: {manifest_path:?}");
    for (name, digest) in &manifest.files {
        println!("  {name}  {digest}");
    }

    let bundle = load_artifacts(&model_dir).context("Bundle does not load with the new manifest")?;
    println!(
        "Verified: layout={}, trees={}, classes={}, scaler={}, labels={}",
        bundle.layout,
        bundle.model.trees.len(),
        bundle.model.n_classes,
        bundle.scaler.is_some(),
        bundle.labels.is_some()
    );

    Ok(())
}
