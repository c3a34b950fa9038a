//! The only module in this crate that touches libclang. It walks one
//! translation unit and flattens every declaration into a `RawDecl`,
//! deliberately copying out everything `ast_visitor` needs so nothing
//! downstream has to hold the AST open.

use std::path::Path;

use clang::{Clang, Entity, EntityKind, Index};
use thiserror::Error;

use crate::raw_decl::{DeclKind, RawDecl};

#[derive(Debug, Error)]
pub enum ClangAdapterError {
    #[error("failed to initialize libclang: {0}")]
    Init(String),
    #[error("failed to parse '{path}': {reason}")]
    Parse { path: String, reason: String },
}

/// Parses `source_path` with the given preprocessor/include arguments and
/// returns every declaration reachable from the translation unit's root,
/// flattened to `RawDecl`. Declarations carrying no annotations at all are
/// still included; `ast_visitor::visit` is responsible for selection.
pub fn extract_raw_decls(source_path: &Path, clang_args: &[String]) -> Result<Vec<RawDecl>, ClangAdapterError> {
    let clang = Clang::new().map_err(ClangAdapterError::Init)?;
    let index = Index::new(&clang, false, false);
    let tu = index
        .parser(source_path)
        .arguments(clang_args)
        .parse()
        .map_err(|e| ClangAdapterError::Parse {
            path: source_path.display().to_string(),
            reason: e.to_string(),
        })?;

    let mut decls = Vec::new();
    walk(&tu.get_entity(), &[], &mut decls);
    Ok(decls)
}

fn walk(entity: &Entity, enclosing_namespaces: &[String], out: &mut Vec<RawDecl>) {
    let mut child_namespaces = enclosing_namespaces.to_vec();

    if entity.get_kind() == EntityKind::Namespace {
        if let Some(name) = entity.get_name() {
            child_namespaces.push(name);
        }
    }

    if let Some(decl) = to_raw_decl(entity, enclosing_namespaces) {
        out.push(decl);
    }

    for child in entity.get_children() {
        walk(&child, &child_namespaces, out);
    }
}

fn to_raw_decl(entity: &Entity, enclosing_namespaces: &[String]) -> Option<RawDecl> {
    let kind = match entity.get_kind() {
        EntityKind::ClassDecl | EntityKind::StructDecl | EntityKind::ClassTemplate => DeclKind::Class,
        EntityKind::Method => DeclKind::Method,
        EntityKind::Constructor => DeclKind::Constructor,
        EntityKind::FieldDecl => DeclKind::Field,
        EntityKind::FunctionDecl => DeclKind::Function,
        EntityKind::EnumDecl => DeclKind::Enum,
        EntityKind::VarDecl => DeclKind::Variable,
        EntityKind::Namespace => DeclKind::Namespace,
        _ => return None,
    };

    let name = entity.get_name().unwrap_or_default();
    let annotations = annotation_payloads(entity);
    if annotations.is_empty() {
        return None;
    }

    let (source_file, source_line) = location_of(entity);
    let mut decl = RawDecl::new(kind, name);
    decl.annotations = annotations;
    decl.qualified_name = qualified_name(entity);
    decl.enclosing_namespaces = enclosing_namespaces.to_vec();
    decl.enclosing_record = enclosing_record_name(entity);
    decl.source_file = source_file;
    decl.source_line = source_line;
    decl.in_system_header = entity.is_in_system_header();

    match kind {
        DeclKind::Class => {
            decl.base_classes = entity
                .get_children()
                .into_iter()
                .filter(|c| c.get_kind() == EntityKind::BaseSpecifier)
                .filter_map(|c| c.get_type())
                .map(|t| t.get_display_name())
                .collect();
        }
        DeclKind::Method => {
            decl.return_type = entity.get_result_type().map(|t| t.get_display_name());
            decl.params = parameters_of(entity);
            decl.is_static = entity.is_static_method();
            decl.is_const = entity.is_const_method();
            decl.is_virtual = entity.is_virtual_method();
            decl.is_pure_virtual = entity.is_pure_virtual_method();
        }
        DeclKind::Constructor => {
            decl.params = parameters_of(entity);
        }
        DeclKind::Field => {
            decl.field_type = entity.get_type().map(|t| t.get_display_name());
            decl.is_const = entity
                .get_type()
                .is_some_and(|t| t.is_const_qualified());
        }
        DeclKind::Function => {
            decl.return_type = entity.get_result_type().map(|t| t.get_display_name());
            decl.params = parameters_of(entity);
        }
        DeclKind::Enum => {
            decl.enum_values = entity
                .get_children()
                .into_iter()
                .filter(|c| c.get_kind() == EntityKind::EnumConstantDecl)
                .filter_map(|c| {
                    let name = c.get_name()?;
                    let value = c.get_enum_constant_value()?.0;
                    Some((name, value))
                })
                .collect();
        }
        DeclKind::Variable => {
            decl.field_type = entity.get_type().map(|t| t.get_display_name());
            decl.is_const_variable = entity
                .get_type()
                .is_some_and(|t| t.is_const_qualified());
        }
        DeclKind::Namespace => {}
    }

    Some(decl)
}

fn annotation_payloads(entity: &Entity) -> Vec<String> {
    entity
        .get_children()
        .into_iter()
        .filter(|c| c.get_kind() == EntityKind::AnnotateAttr)
        .filter_map(|c| c.get_name())
        .collect()
}

fn parameters_of(entity: &Entity) -> Vec<(String, String)> {
    entity
        .get_arguments()
        .unwrap_or_default()
        .into_iter()
        .map(|arg| {
            let name = arg.get_name().unwrap_or_default();
            let ty = arg
                .get_type()
                .map(|t| t.get_display_name())
                .unwrap_or_default();
            (name, ty)
        })
        .collect()
}

fn enclosing_record_name(entity: &Entity) -> Option<String> {
    let parent = entity.get_semantic_parent()?;
    matches!(
        parent.get_kind(),
        EntityKind::ClassDecl | EntityKind::StructDecl | EntityKind::ClassTemplate
    )
    .then(|| parent.get_name())
    .flatten()
}

fn qualified_name(entity: &Entity) -> String {
    let mut segments = vec![entity.get_name().unwrap_or_default()];
    let mut current = entity.get_semantic_parent();
    while let Some(parent) = current {
        match parent.get_kind() {
            EntityKind::ClassDecl | EntityKind::StructDecl | EntityKind::ClassTemplate | EntityKind::Namespace => {
                if let Some(name) = parent.get_name() {
                    segments.push(name);
                }
            }
            _ => {}
        }
        current = parent.get_semantic_parent();
    }
    segments.reverse();
    segments.join("::")
}

fn location_of(entity: &Entity) -> (String, u32) {
    entity
        .get_location()
        .and_then(|loc| loc.get_file_location().file.map(|f| (f, loc.get_file_location().line)))
        .map(|(file, line)| (file.get_path().display().to_string(), line))
        .unwrap_or_default()
}
