//! C11: decides which files need regeneration, propagates invalidation
//! through the dependency graph, and schedules per-file work (spec.md
//! §4.11, §5).

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use solgen_graph::DependencyGraph;

use crate::cache::Cache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Unknown,
    Cached,
    Clean,
    Dirty,
}

/// Classifies one file against the cache (spec.md §4.11's state machine).
pub fn classify(cache: &Cache, path: &str, on_disk_mtime: u64, on_disk_hash: &str, output_exists: bool, force: bool) -> FileState {
    if force {
        return FileState::Dirty;
    }
    let Some(info) = cache.get(path) else {
        return FileState::Unknown;
    };
    if info.mtime == on_disk_mtime && info.content_hash == on_disk_hash && output_exists {
        FileState::Clean
    } else {
        FileState::Dirty
    }
}

/// Unions into the dirty set every file that transitively depends on a
/// file already dirty, following the reverse-edge (dependents) set
/// (spec.md §4.11).
pub fn propagate_dirty(initial_dirty: &BTreeSet<String>, graph: &DependencyGraph) -> BTreeSet<String> {
    let mut dirty = initial_dirty.clone();
    let mut queue: VecDeque<String> = initial_dirty.iter().cloned().collect();
    while let Some(path) = queue.pop_front() {
        for dependent in graph.direct_dependents(&path) {
            if dirty.insert(dependent.clone()) {
                queue.push_back(dependent);
            }
        }
    }
    dirty
}

/// Orders `dirty` so dependencies precede dependents, via post-order DFS
/// over the dependency edges restricted to the dirty set. Cycles (header
/// self-inclusion) are broken arbitrarily by the visited set.
pub fn topological_order(dirty: &BTreeSet<String>, graph: &DependencyGraph) -> Vec<String> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut order = Vec::new();

    fn visit(
        path: &str,
        dirty: &BTreeSet<String>,
        graph: &DependencyGraph,
        visited: &mut HashSet<String>,
        order: &mut Vec<String>,
    ) {
        if !visited.insert(path.to_string()) {
            return;
        }
        for dep in graph.direct_dependencies(path) {
            if dirty.contains(&dep) {
                visit(&dep, dirty, graph, visited, order);
            }
        }
        order.push(path.to_string());
    }

    for path in dirty {
        visit(path, dirty, graph, &mut visited, &mut order);
    }
    order
}

#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub output_path: String,
    pub module: String,
    pub exported_symbols: Vec<String>,
    pub content_hash: String,
    pub mtime: u64,
    pub include_closure: Vec<String>,
}

#[derive(Debug, Default)]
pub struct DriverReport {
    pub regenerated: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Runs `process` over `order` (already topologically sorted), updating
/// `cache` under its mutex after each success. Sequential when
/// `worker_count <= 1`; otherwise up to `worker_count` threads pull the
/// next path off a shared queue, preserving the topological order as
/// scheduling order while allowing concurrent execution (spec.md §5:
/// files are independent once the dirty set and order are established).
pub fn run<F>(order: Vec<String>, cache: Arc<Mutex<Cache>>, worker_count: usize, process: F) -> DriverReport
where
    F: Fn(&str) -> Result<ProcessOutcome, String> + Send + Sync + 'static,
{
    if worker_count <= 1 {
        return run_sequential(order, &cache, &process);
    }

    let queue = Arc::new(Mutex::new(VecDeque::from(order)));
    let report = Arc::new(Mutex::new(DriverReport::default()));
    let process = Arc::new(process);

    std::thread::scope(|scope| {
        for _ in 0..worker_count {
            let queue = Arc::clone(&queue);
            let cache = Arc::clone(&cache);
            let report = Arc::clone(&report);
            let process = Arc::clone(&process);
            scope.spawn(move || loop {
                let next = { queue.lock().expect("queue mutex poisoned").pop_front() };
                let Some(path) = next else { break };
                match process(&path) {
                    Ok(outcome) => {
                        let mut info = solgen_hir::FileInfo::new(path.clone());
                        info.mtime = outcome.mtime;
                        info.content_hash = outcome.content_hash;
                        info.output_path = outcome.output_path;
                        info.module = outcome.module;
                        info.exported_symbols = outcome.exported_symbols;
                        info.include_closure = outcome.include_closure;
                        info.dirty = false;
                        cache.lock().expect("cache mutex poisoned").upsert(info);
                        report.lock().expect("report mutex poisoned").regenerated.push(path);
                    }
                    Err(reason) => {
                        report.lock().expect("report mutex poisoned").failed.push((path, reason));
                    }
                }
            });
        }
    });

    Arc::try_unwrap(report)
        .expect("all worker threads joined by thread::scope")
        .into_inner()
        .expect("report mutex poisoned")
}

fn run_sequential<F>(order: Vec<String>, cache: &Arc<Mutex<Cache>>, process: &F) -> DriverReport
where
    F: Fn(&str) -> Result<ProcessOutcome, String>,
{
    let mut report = DriverReport::default();
    for path in order {
        match process(&path) {
            Ok(outcome) => {
                let mut info = solgen_hir::FileInfo::new(path.clone());
                info.mtime = outcome.mtime;
                info.content_hash = outcome.content_hash;
                info.output_path = outcome.output_path;
                info.module = outcome.module;
                info.exported_symbols = outcome.exported_symbols;
                info.include_closure = outcome.include_closure;
                info.dirty = false;
                cache.lock().expect("cache mutex poisoned").upsert(info);
                report.regenerated.push(path);
            }
            Err(reason) => report.failed.push((path, reason)),
        }
    }
    report
}
