//! CLI entry point: wires the cache (C10), dependency analyzer (C9), and
//! incremental driver (C11) around the C6→C7→C8 pipeline.

mod cache;
mod config;
mod driver;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use clap::Parser;
use sha2::{Digest, Sha256};

use cache::Cache;
use config::{Cli, Config};
use driver::ProcessOutcome;
use solgen_core::InferenceConfig;
use solgen_emit::{Emitter, EmitterConfig};
use solgen_graph::DependencyGraph;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_cli(cli);
    run(config)
}

fn run(config: Config) -> Result<()> {
    if config.inputs.is_empty() {
        anyhow::bail!("no input files given");
    }
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("output directory '{}' is not writable", config.output_dir.display()))?;

    if config.cache_clear && config.cache_file.exists() {
        fs::remove_file(&config.cache_file).ok();
    }
    let cache = Arc::new(Mutex::new(Cache::load(&config.cache_file, config.cache_expiry_seconds)));

    let contents: Vec<(String, String)> = config
        .inputs
        .iter()
        .map(|p| {
            let text = fs::read_to_string(p)
                .with_context(|| format!("input file '{}' is unreadable", p.display()))?;
            Ok((p.display().to_string(), text))
        })
        .collect::<Result<Vec<_>>>()?;

    let graph = DependencyGraph::build(&contents);

    let mut initial_dirty: BTreeSet<String> = BTreeSet::new();
    for (path, text) in &contents {
        let hash = content_hash(text);
        let mtime = mtime_of(Path::new(path));
        let state = {
            let cache = cache.lock().expect("cache mutex poisoned");
            // The output path is a function of the *inferred module*, not the
            // input path, so it's only known once a file has been processed
            // at least once; use the cache's recorded output path rather than
            // guessing from the input file name (spec.md §6.3).
            let output_exists = cache
                .get(path)
                .map(|info| Path::new(&info.output_path).exists())
                .unwrap_or(false);
            driver::classify(&cache, path, mtime, &hash, output_exists, config.force_rebuild)
        };
        if !matches!(state, driver::FileState::Clean) {
            initial_dirty.insert(path.clone());
        }
    }

    let dirty = driver::propagate_dirty(&initial_dirty, &graph);
    let order = driver::topological_order(&dirty, &graph);

    tracing::info!(dirty_count = order.len(), total = contents.len(), "starting incremental build");

    let contents_by_path: std::collections::HashMap<String, String> = contents.into_iter().collect();
    let output_dir = config.output_dir.clone();
    let default_namespace = config.default_namespace.clone();
    let prefer_snake_case = config.prefer_snake_case;
    let clang_args = config.clang_args.clone();

    let report = driver::run(order, Arc::clone(&cache), config.worker_count, move |path| {
        let text = contents_by_path
            .get(path)
            .cloned()
            .ok_or_else(|| format!("'{path}' missing from scanned input set"))?;
        process_one_file(
            path,
            &text,
            &output_dir,
            &default_namespace,
            prefer_snake_case,
            &clang_args,
        )
    });

    for (path, reason) in &report.failed {
        tracing::warn!(path, reason, "file failed, skipping");
    }
    tracing::info!(regenerated = report.regenerated.len(), failed = report.failed.len(), "build complete");

    cache
        .lock()
        .expect("cache mutex poisoned")
        .persist(&config.cache_file)
        .context("failed to persist cache")?;

    Ok(())
}

fn process_one_file(
    path: &str,
    text: &str,
    output_dir: &Path,
    default_namespace: &str,
    prefer_snake_case: bool,
    clang_args: &[String],
) -> Result<ProcessOutcome, String> {
    let parsed = solgen_graph::parse_file_dependencies(text, Path::new(path).parent().unwrap_or_else(|| Path::new(".")));

    let inference_config = InferenceConfig {
        prefer_snake_case,
        default_namespace: default_namespace.to_string(),
        file_module: None,
    };

    let (inferred, extraction_errors, file_module) =
        solgen_core::process_file(Path::new(path), clang_args, &inference_config).map_err(|e| e.to_string())?;

    if !extraction_errors.is_empty() {
        tracing::warn!(path, count = extraction_errors.len(), "extraction errors, continuing");
    }
    for warning in &inferred.warnings {
        tracing::warn!(path, cpp_name = %warning.cpp_name, reason = %warning.reason, "record dropped");
    }

    if inferred.records.is_empty() {
        return Err(format!("'{path}' produced no valid export records"));
    }

    let module = inferred
        .records
        .iter()
        .find_map(|r| if !r.module.is_empty() { Some(r.module.clone()) } else { None })
        .or(file_module)
        .unwrap_or_else(|| module_name_from_path(path));

    let emitted = Emitter::emit(&inferred.records, &module, &EmitterConfig::default()).map_err(|e| e.to_string())?;

    let output_path = output_path_for(output_dir, &module);
    write_atomically(&output_path, &emitted).map_err(|e| e.to_string())?;

    Ok(ProcessOutcome {
        output_path: output_path.display().to_string(),
        module,
        exported_symbols: parsed.fingerprints,
        content_hash: content_hash(text),
        mtime: mtime_of(Path::new(path)),
        include_closure: parsed
            .includes
            .into_iter()
            .filter_map(|i| i.resolved)
            .collect(),
    })
}

fn module_name_from_path(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "module".to_string())
}

/// The generated file name derives from the module name, not the input
/// file's own name (spec.md §6.3).
fn output_path_for(output_dir: &Path, module: &str) -> PathBuf {
    output_dir.join(format!("{module}_bindings.cpp"))
}

fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

fn mtime_of(path: &Path) -> u64 {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn write_atomically(path: &Path, contents: &str) -> std::io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_name_derives_from_file_stem() {
        assert_eq!(module_name_from_path("src/physics/Body.hpp"), "Body");
    }

    #[test]
    fn output_path_is_deterministic_function_of_module_name() {
        let out = output_path_for(Path::new("gen"), "physics");
        assert_eq!(out, PathBuf::from("gen/physics_bindings.cpp"));
    }

    #[test]
    fn content_hash_is_stable_for_identical_text() {
        assert_eq!(content_hash("same"), content_hash("same"));
        assert_ne!(content_hash("same"), content_hash("different"));
    }
}
