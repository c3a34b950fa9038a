//! C9: dependency analysis. Parses `#include` directives and export
//! annotation fingerprints, and builds the file-level dependency graph
//! the incremental driver (C11) propagates dirtiness through.

pub mod deps;
pub mod graph;

pub use deps::{parse_file_dependencies, IncludeDirective, ParsedFile};
pub use graph::DependencyGraph;
