//! AST extraction and semantic inference for the solgen pipeline: C3
//! through C7 of the three-stage compilation pipeline, plus the thin
//! Clang adapter that feeds C6.

pub mod ast_visitor;
pub mod clang_adapter;
pub mod inference;
pub mod namespace;
pub mod properties;
pub mod raw_decl;
pub mod type_analyzer;

pub use ast_visitor::{AstVisitResult, AstVisitor, ExtractionError};
pub use clang_adapter::{extract_raw_decls, ClangAdapterError};
pub use inference::{InferenceConfig, InferenceEngine, InferenceResult, InferenceWarning};
pub use namespace::NamespaceInferrer;
pub use properties::PropertyRecognizer;
pub use raw_decl::{DeclKind, RawDecl};
pub use type_analyzer::{TypeAnalyzer, TypeClassification};

use thiserror::Error;

/// Crate-level error surfaced by the one-file pipeline entry point that
/// glues the Clang adapter, visitor, and inference engine together.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Clang(#[from] ClangAdapterError),
}

/// Runs C6 and C7 over one already-parsed translation unit's worth of raw
/// declarations. Separated from `extract_raw_decls` so callers that want
/// to unit-test the pipeline never need to link libclang.
///
/// A file-level `lua_export_module` label discovered by the visitor
/// overrides `config.file_module` for this call's inference pass, so
/// namespace-priority step 4 (spec.md §4.4) applies even when the caller
/// doesn't know the label ahead of time. The detected label is also
/// returned so callers can use it for output-path derivation.
pub fn process_declarations(
    decls: &[RawDecl],
    config: &InferenceConfig,
) -> (InferenceResult, Vec<ExtractionError>, Option<String>) {
    let visited = AstVisitor::visit(decls);
    let effective_config = InferenceConfig {
        file_module: visited.file_module.clone().or_else(|| config.file_module.clone()),
        ..config.clone()
    };
    let inferred = InferenceEngine::infer(visited.records, &effective_config);
    (inferred, visited.errors, visited.file_module)
}

/// Parses `source_path` with Clang and runs the full C6→C7 pipeline over
/// it in one call.
pub fn process_file(
    source_path: &std::path::Path,
    clang_args: &[String],
    config: &InferenceConfig,
) -> Result<(InferenceResult, Vec<ExtractionError>, Option<String>), CoreError> {
    let decls = extract_raw_decls(source_path, clang_args)?;
    Ok(process_declarations(&decls, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_declarations_runs_visitor_then_inference() {
        let mut decl = RawDecl::new(DeclKind::Class, "Calculator");
        decl.annotations.push("lua_export_class".to_string());
        decl.qualified_name = "Calculator".to_string();
        decl.source_file = "calc.hpp".to_string();

        let config = InferenceConfig::default();
        let (result, errors, file_module) = process_declarations(&[decl], &config);
        assert!(errors.is_empty());
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].script_name, "Calculator");
        assert!(file_module.is_none());
    }

    #[test]
    fn process_declarations_surfaces_file_level_module_for_inference_and_caller() {
        let mut module_decl = RawDecl::new(DeclKind::Namespace, "mod");
        module_decl.annotations.push("lua_export_module:physics".to_string());
        module_decl.source_file = "calc.hpp".to_string();
        module_decl.source_line = 1;

        let mut decl = RawDecl::new(DeclKind::Class, "Body");
        decl.annotations.push("lua_export_class".to_string());
        decl.qualified_name = "Body".to_string();
        decl.source_file = "calc.hpp".to_string();
        decl.source_line = 2;

        let config = InferenceConfig::default();
        let (result, _errors, file_module) = process_declarations(&[decl, module_decl], &config);
        assert_eq!(file_module.as_deref(), Some("physics"));
        let body = result.records.iter().find(|r| r.cpp_name == "Body").unwrap();
        assert_eq!(body.module, "physics");
        assert_eq!(body.script_namespace, "physics");
    }
}
