//! Ambient configuration: CLI surface (spec.md §6.2) plus an optional
//! `solgen.toml` overlay for settings the command line doesn't cover.

use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

#[derive(Debug, Parser)]
#[command(name = "solgen", version, about = "Incremental C++ to Lua binding generator")]
pub struct Cli {
    /// Input C++ source files to scan for export annotations.
    pub inputs: Vec<PathBuf>,

    /// Directory the generated `.cpp` files are written to.
    #[arg(short = 'o', long, default_value = "generated")]
    pub output_dir: PathBuf,

    /// Default script namespace used when a record has no other way to
    /// derive one (spec.md §4.4 priority step 5).
    #[arg(long, default_value = "")]
    pub default_namespace: String,

    /// Regenerate every input regardless of cache state.
    #[arg(long)]
    pub force_rebuild: bool,

    /// Discards the on-disk cache before running, then proceeds as a
    /// normal (now-empty-cache) invocation.
    #[arg(long)]
    pub cache_clear: bool,

    /// Number of worker threads for the incremental driver; 1 means
    /// sequential.
    #[arg(long, default_value_t = 1)]
    pub worker_count: usize,

    /// Path to the incremental build cache (spec.md §6.4).
    #[arg(long, default_value = ".lua_binding_cache")]
    pub cache_file: PathBuf,

    /// Seconds after which a cache snapshot is treated as stale. Unset
    /// means never expire by age.
    #[arg(long)]
    pub cache_expiry_seconds: Option<u64>,

    /// Path to an optional `solgen.toml` overlay.
    #[arg(long)]
    pub config_file: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Settings not exposed on the command line, loaded from an optional TOML
/// file and layered under CLI flags (CLI always wins).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub clang_args: Option<Vec<String>>,
    pub prefer_snake_case: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &std::path::Path) -> Self {
        let Ok(text) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        toml::from_str(&text).unwrap_or_default()
    }
}

/// The fully resolved configuration the driver runs with.
#[derive(Debug, Clone)]
pub struct Config {
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub default_namespace: String,
    pub force_rebuild: bool,
    pub cache_clear: bool,
    pub worker_count: usize,
    pub cache_file: PathBuf,
    pub cache_expiry_seconds: Option<u64>,
    pub clang_args: Vec<String>,
    pub prefer_snake_case: bool,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Self {
        let file_config = cli
            .config_file
            .as_deref()
            .map(FileConfig::load)
            .unwrap_or_default();

        Self {
            inputs: cli.inputs,
            output_dir: cli.output_dir,
            default_namespace: cli.default_namespace,
            force_rebuild: cli.force_rebuild,
            cache_clear: cli.cache_clear,
            worker_count: cli.worker_count.max(1),
            cache_file: cli.cache_file,
            cache_expiry_seconds: cli.cache_expiry_seconds,
            clang_args: file_config.clang_args.unwrap_or_default(),
            prefer_snake_case: file_config.prefer_snake_case.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_count_is_floored_at_one() {
        let cli = Cli::parse_from(["solgen", "--worker-count", "0", "a.hpp"]);
        let config = Config::from_cli(cli);
        assert_eq!(config.worker_count, 1);
    }

    #[test]
    fn defaults_match_spec_cache_file_name() {
        let cli = Cli::parse_from(["solgen", "a.hpp"]);
        let config = Config::from_cli(cli);
        assert_eq!(config.cache_file, PathBuf::from(".lua_binding_cache"));
    }

    #[test]
    fn missing_config_file_yields_empty_overlay() {
        let file_config = FileConfig::load(std::path::Path::new("/nonexistent/solgen.toml"));
        assert!(file_config.clang_args.is_none());
    }
}
