//! C6: walks the declarations of one translation unit (already flattened
//! into `RawDecl`s by the Clang adapter) and materializes raw
//! `ExportRecord`s for every selected declaration (spec.md §4.6).

use indexmap::IndexMap;
use solgen_annotations::{parse_annotation, AnnotationKind, AnnotationWarning};
use solgen_hir::{ExportRecord, PropertyAccess, RecordKind};

use crate::raw_decl::{DeclKind, RawDecl};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    MissingName { source_file: String, source_line: u32 },
    UnreadableLocation { reason: String },
}

#[derive(Debug, Default)]
pub struct AstVisitResult {
    pub records: Vec<ExportRecord>,
    pub errors: Vec<ExtractionError>,
    pub warnings: Vec<AnnotationWarning>,
    /// The last file-level `lua_export_module` label seen during the walk,
    /// if any (spec.md §4.4 namespace-priority step 4).
    pub file_module: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AstVisitor;

impl AstVisitor {
    /// Walks every declaration, selecting those that carry a recognized
    /// export annotation and are not in a system header, then builds a
    /// raw `ExportRecord` for each. Declarations are processed in source
    /// order so a file-level `module` annotation applies to everything
    /// that follows it in the same file (spec.md §6.1).
    pub fn visit(decls: &[RawDecl]) -> AstVisitResult {
        let mut ordered: Vec<&RawDecl> = decls.iter().collect();
        ordered.sort_by_key(|d| d.source_line);

        let mut result = AstVisitResult::default();
        let mut current_module = String::new();

        for decl in ordered {
            if decl.in_system_header {
                continue;
            }
            let export_payloads: Vec<&String> = decl
                .annotations
                .iter()
                .filter(|a| a.starts_with("lua_export_"))
                .collect();
            if export_payloads.is_empty() {
                continue;
            }
            if export_payloads
                .iter()
                .any(|a| matches!(parse_annotation(a), Ok(p) if p.kind == AnnotationKind::Ignore))
            {
                continue;
            }

            let payload = export_payloads[0];
            let parsed = match parse_annotation(payload) {
                Ok(p) => p,
                Err(_) => continue, // unrecognized kind suffix: treat as unannotated
            };
            result.warnings.extend(parsed.warnings.clone());

            if decl.name.is_empty() {
                result.errors.push(ExtractionError::MissingName {
                    source_file: decl.source_file.clone(),
                    source_line: decl.source_line,
                });
                continue;
            }

            if parsed.kind == AnnotationKind::Module {
                current_module = parsed.primary.clone();
                result.file_module = Some(current_module.clone());
                let mut record = ExportRecord::new(
                    RecordKind::Module,
                    parsed.primary.clone(),
                    decl.source_file.clone(),
                    decl.source_line,
                );
                record.module = current_module.clone();
                record.user_params = to_index_map(parsed.params);
                result.records.push(record);
                continue;
            }

            let Some(record_kind) = RecordKind::from_annotation(parsed.kind) else {
                continue;
            };

            let Some(mut record) = build_record(decl, record_kind, &parsed.primary) else {
                result.errors.push(ExtractionError::UnreadableLocation {
                    reason: format!("could not derive a record for '{}'", decl.name),
                });
                continue;
            };

            record.user_params = to_index_map(parsed.params.clone());
            record.module = parsed
                .params
                .get("module")
                .cloned()
                .unwrap_or_else(|| current_module.clone());
            record.cpp_namespace = decl.enclosing_namespaces.join("::");
            record.qualified_name = decl.qualified_name.clone();
            record.source_file = decl.source_file.clone();
            record.source_line = decl.source_line;

            result.records.push(record);
        }

        result
    }
}

fn to_index_map(params: std::collections::HashMap<String, String>) -> IndexMap<String, String> {
    let mut sorted: Vec<(String, String)> = params.into_iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    sorted.into_iter().collect()
}

fn build_record(decl: &RawDecl, kind: RecordKind, alias_primary: &str) -> Option<ExportRecord> {
    let mut record = ExportRecord::new(kind, decl.name.clone(), decl.source_file.clone(), decl.source_line);
    if !alias_primary.is_empty() {
        record.user_params.insert("alias".to_string(), alias_primary.to_string());
    }

    match decl.kind? {
        DeclKind::Class => {
            record.base_classes = decl.base_classes.clone();
        }
        DeclKind::Method => {
            record.parent_class = decl.enclosing_record.clone().unwrap_or_default();
            record.return_type = decl.return_type.clone();
            record.parameter_types = decl.params.iter().map(|(_, t)| t.clone()).collect();
            record.parameter_names = decl.params.iter().map(|(n, _)| n.clone()).collect();
            record.is_static = decl.is_static;
            record.is_const = decl.is_const;
            record.is_virtual = decl.is_virtual;
            record.is_pure_virtual = decl.is_pure_virtual;
            if kind == RecordKind::Property {
                record.property_access = PropertyAccess::None;
            }
        }
        DeclKind::Constructor => {
            record.parent_class = decl.enclosing_record.clone().unwrap_or_default();
            record.return_type = None;
            record.parameter_types = decl.params.iter().map(|(_, t)| t.clone()).collect();
            record.parameter_names = decl.params.iter().map(|(n, _)| n.clone()).collect();
        }
        DeclKind::Field => {
            record.parent_class = decl.enclosing_record.clone().unwrap_or_default();
            record.return_type = decl.field_type.clone();
            record.is_static = decl.is_static;
            record.is_const = decl.is_const;
        }
        DeclKind::Function => {
            record.return_type = decl.return_type.clone();
            record.parameter_types = decl.params.iter().map(|(_, t)| t.clone()).collect();
            record.parameter_names = decl.params.iter().map(|(n, _)| n.clone()).collect();
        }
        DeclKind::Enum => {
            record.enum_values = decl.enum_values.clone();
        }
        DeclKind::Variable => {
            record.return_type = decl.field_type.clone();
            record.is_const = decl.is_const_variable;
            if decl.is_const_variable {
                record.kind = RecordKind::Constant;
            } else {
                record.kind = RecordKind::Variable;
            }
        }
        DeclKind::Namespace => {}
    }

    Some(record)
}
