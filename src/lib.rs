// src/lib.rs

pub mod cli;
pub mod config;
pub mod detect;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod manifest;
pub mod types;

use std::collections::{BTreeSet, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::resolve_config;
use crate::detect::{ChangeDetector, TracingSink};
use crate::fs::RealFileSystem;
use crate::manifest::Manifest;

pub use crate::detect::DetectorOptions;
pub use crate::types::{CacheStats, ChangeReason, FileMetadata, KnownMetadata, Verdict};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - a detector over the real filesystem, reporting through `tracing`
/// - the selected subcommand
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = resolve_config(args.config.as_deref())?;
    let options = cfg.detector_options();
    debug!(?options, "detector options");

    let detector = ChangeDetector::with_options(Arc::new(RealFileSystem), options)
        .with_sink(Arc::new(TracingSink));

    match args.command {
        Command::Hash { path } => {
            let digest = {
                let detector = detector.clone();
                tokio::task::spawn_blocking(move || detector.compute_hash(&path)).await??
            };
            println!("{digest}");
        }
        Command::Snapshot { paths, output } => {
            let manifest = {
                let detector = detector.clone();
                tokio::task::spawn_blocking(move || snapshot_manifest(&detector, &paths)).await??
            };
            let text = manifest.to_toml_string()?;
            match output {
                Some(file) => {
                    std::fs::write(&file, text)
                        .with_context(|| format!("writing manifest to {:?}", file))?;
                    info!(path = ?file, files = manifest.files.len(), "wrote manifest");
                }
                None => print!("{text}"),
            }
        }
        Command::Check { paths, manifest } => {
            let known = match manifest {
                Some(file) => Manifest::load(&file)?.into_known_map()?,
                None => HashMap::new(),
            };
            let report = detector.batch_check(paths, Some(&known)).await;

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            out.write_all(render_report(&report).as_bytes())?;
            out.flush()?;

            let changed = report.values().filter(|c| **c).count();
            let stats = detector.cache_stats();
            info!(
                files = report.len(),
                changed,
                cached = stats.count,
                cached_bytes = stats.total_bytes,
                "check complete"
            );
        }
    }

    Ok(())
}

/// Snapshot each distinct path, in path order.
pub fn snapshot_manifest(detector: &ChangeDetector, paths: &[PathBuf]) -> errors::Result<Manifest> {
    let distinct: BTreeSet<&Path> = paths.iter().map(PathBuf::as_path).collect();
    let snapshots = distinct
        .into_iter()
        .map(|p| detector.snapshot(p))
        .collect::<errors::Result<Vec<_>>>()?;
    Manifest::from_snapshots(&snapshots)
}

/// One `changed|unchanged<TAB>path` line per path, sorted by path.
pub fn render_report(report: &HashMap<PathBuf, bool>) -> String {
    let mut rows: Vec<(&PathBuf, bool)> = report.iter().map(|(p, c)| (p, *c)).collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::new();
    for (path, changed) in rows {
        out.push_str(if changed { "changed" } else { "unchanged" });
        out.push('\t');
        out.push_str(&path.display().to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_is_sorted_and_tab_separated() {
        let mut report = HashMap::new();
        report.insert(PathBuf::from("b.txt"), false);
        report.insert(PathBuf::from("a.txt"), true);

        assert_eq!(render_report(&report), "changed\ta.txt\nunchanged\tb.txt\n");
    }
}
