//! C8: groups a module's validated `ExportRecord`s, orders and
//! deduplicates them, and prints the registration function's source text
//! (spec.md §4.8).

use std::collections::BTreeSet;
use std::hash::Hash;

use indexmap::IndexMap;
use solgen_hir::{ExportRecord, ModuleBundle, RecordKind};
use thiserror::Error;

use crate::sol2;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to assemble emitted source for module '{module}': {reason}")]
    Assembly { module: String, reason: String },
}

#[derive(Debug, Clone, Copy)]
pub struct EmitterConfig {
    pub script_state_type: &'static str,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            script_state_type: "sol::state",
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Emitter;

impl Emitter {
    /// Groups records by kind and by enclosing class (spec.md §4.8.1).
    pub fn group(records: &[ExportRecord], module_name: &str) -> ModuleBundle {
        let mut bundle = ModuleBundle::new(module_name);

        for record in records {
            if record.kind.is_class_like() {
                bundle
                    .classes
                    .entry(record.cpp_name.clone())
                    .or_default();
            }
        }
        for record in records {
            if !record.parent_class.is_empty() && bundle.classes.contains_key(&record.parent_class) {
                bundle
                    .classes
                    .get_mut(&record.parent_class)
                    .expect("checked with contains_key above")
                    .push(record.clone());
            } else if !record.kind.is_class_like() {
                bundle.free_records.push(record.clone());
            }
            if !record.source_file.is_empty() {
                bundle.headers.insert(record.source_file.clone());
            }
        }

        bundle
    }

    /// Assembles the full `.cpp` file text for one module (spec.md
    /// §4.8.2). Assembly itself cannot fail in this implementation (no
    /// fallible string work occurs after grouping), but the `Result`
    /// return is kept so a future richer emitter can surface `EmitError`
    /// without changing callers, matching spec.md §4.8.7's contract that
    /// emission failures are returned rather than thrown.
    pub fn emit(
        records: &[ExportRecord],
        module_name: &str,
        config: &EmitterConfig,
    ) -> Result<String, EmitError> {
        let class_records: Vec<&ExportRecord> = records.iter().filter(|r| r.kind.is_class_like()).collect();
        let bundle = Self::group(records, module_name);

        let mut namespaces: BTreeSet<String> = BTreeSet::new();
        for record in records {
            if !record.script_namespace.is_empty() {
                namespaces.insert(record.script_namespace.clone());
            }
        }

        let mut out = String::new();
        out.push_str("// Generated by solgen. Do not edit by hand.\n\n");
        out.push_str("#include <sol/sol.hpp>\n");
        for header in &bundle.headers {
            out.push_str(&format!("#include \"{header}\"\n"));
        }
        out.push('\n');
        out.push_str(&format!(
            "void register_{module_name}_bindings({}& lua) {{\n",
            config.script_state_type
        ));

        for line in sol2::namespace_bootstrap_lines(&namespaces.into_iter().collect::<Vec<_>>()) {
            out.push_str("    ");
            out.push_str(&line);
            out.push('\n');
        }

        for class_record in &class_records {
            let members = bundle.classes.get(&class_record.cpp_name).cloned().unwrap_or_default();
            out.push_str(&Self::render_class_block(class_record, &members));
        }

        for record in dedup_by(
            bundle
                .free_records
                .iter()
                .filter(|r| r.kind == RecordKind::Function)
                .cloned()
                .collect(),
            ExportRecord::dedup_key,
        ) {
            out.push_str(&format!("    {}\n", sol2::free_function_entry(&record)));
        }
        for record in dedup_by(
            bundle
                .free_records
                .iter()
                .filter(|r| r.kind == RecordKind::Constant)
                .cloned()
                .collect(),
            ExportRecord::dedup_key,
        ) {
            out.push_str(&format!("    {}\n", sol2::constant_entry(&record)));
        }
        for record in dedup_by(
            bundle
                .free_records
                .iter()
                .filter(|r| r.kind == RecordKind::Enum)
                .cloned()
                .collect(),
            ExportRecord::dedup_key,
        ) {
            out.push_str(&format!("    {}\n", sol2::enum_registration(&record)));
        }
        for record in dedup_by(
            bundle
                .free_records
                .iter()
                .filter(|r| r.kind == RecordKind::StlContainer)
                .cloned()
                .collect(),
            ExportRecord::dedup_key,
        ) {
            let kind = record.container_kind.as_deref().unwrap_or("vector");
            out.push_str(&format!(
                "    {}\n",
                sol2::render_stl_container(&record.script_name, &record.qualified_name, kind)
            ));
        }

        out.push_str("}\n");
        Ok(out)
    }

    fn render_class_block(class_record: &ExportRecord, members: &[ExportRecord]) -> String {
        let constructors = dedup_by(
            members
                .iter()
                .filter(|m| m.kind == RecordKind::Constructor)
                .cloned()
                .collect(),
            |r| (r.qualified_name.clone(), r.parameter_types.join(",")),
        );
        let methods = dedup_by(
            members
                .iter()
                .filter(|m| m.kind == RecordKind::Method)
                .cloned()
                .collect(),
            ExportRecord::dedup_key,
        );
        let static_methods = dedup_by(
            members
                .iter()
                .filter(|m| m.kind == RecordKind::StaticMethod)
                .cloned()
                .collect(),
            ExportRecord::dedup_key,
        );
        let properties = dedup_by(
            members
                .iter()
                .filter(|m| m.kind == RecordKind::Property)
                .cloned()
                .collect(),
            ExportRecord::dedup_key,
        );
        let operators = dedup_by(
            members
                .iter()
                .filter(|m| m.kind == RecordKind::Operator)
                .cloned()
                .collect(),
            ExportRecord::dedup_key,
        );

        let body = sol2::render_usertype_body(
            &class_record.qualified_name,
            &class_record.base_classes,
            &constructors,
            &methods,
            &static_methods,
            &properties,
            &operators,
        );

        format!(
            "    lua.new_usertype<{}>(\"{}\",\n    {}\n    );\n",
            class_record.qualified_name, class_record.script_name, body
        )
    }
}

/// Preserves first-seen order while discarding later entries whose key
/// collides with one already seen (spec.md §4.8.4).
fn dedup_by<T, K: Eq + Hash>(items: Vec<T>, key_fn: impl Fn(&T) -> K) -> Vec<T> {
    let mut seen: IndexMap<K, ()> = IndexMap::new();
    let mut out = Vec::new();
    for item in items {
        let key = key_fn(&item);
        if seen.contains_key(&key) {
            continue;
        }
        seen.insert(key, ());
        out.push(item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str, script_ns: &str) -> ExportRecord {
        let mut r = ExportRecord::new(RecordKind::Class, name, "calc.hpp", 1);
        r.script_name = name.to_string();
        r.qualified_name = name.to_string();
        r.script_namespace = script_ns.to_string();
        r
    }

    fn method(name: &str, parent: &str) -> ExportRecord {
        let mut m = ExportRecord::new(RecordKind::Method, name, "calc.hpp", 2);
        m.script_name = name.to_string();
        m.qualified_name = format!("{parent}::{name}");
        m.parent_class = parent.to_string();
        m
    }

    #[test]
    fn group_assigns_members_to_their_class() {
        let records = vec![class("Calculator", ""), method("add", "Calculator")];
        let bundle = Emitter::group(&records, "math");
        assert_eq!(bundle.classes.get("Calculator").unwrap().len(), 1);
    }

    #[test]
    fn free_records_not_assigned_to_any_class() {
        let mut func = ExportRecord::new(RecordKind::Function, "helper", "calc.hpp", 1);
        func.script_name = "helper".to_string();
        func.qualified_name = "helper".to_string();
        let records = vec![func];
        let bundle = Emitter::group(&records, "math");
        assert_eq!(bundle.free_records.len(), 1);
    }

    #[test]
    fn emit_produces_registration_function_with_module_name() {
        let records = vec![class("Calculator", ""), method("add", "Calculator")];
        let text = Emitter::emit(&records, "math", &EmitterConfig::default()).unwrap();
        assert!(text.contains("void register_math_bindings(sol::state& lua)"));
        assert!(text.contains("new_usertype<Calculator>"));
    }

    #[test]
    fn emit_includes_every_distinct_source_file() {
        let records = vec![class("Calculator", "")];
        let text = Emitter::emit(&records, "math", &EmitterConfig::default()).unwrap();
        assert!(text.contains("#include \"calc.hpp\""));
    }

    #[test]
    fn duplicate_methods_are_deduplicated_by_script_and_qualified_name() {
        let records = vec![class("Calculator", ""), method("add", "Calculator"), method("add", "Calculator")];
        let bundle = Emitter::group(&records, "math");
        let members = bundle.classes.get("Calculator").unwrap();
        assert_eq!(members.len(), 2); // raw members not deduped until render
        let text = Emitter::emit(&records, "math", &EmitterConfig::default()).unwrap();
        assert_eq!(text.matches("&Calculator::add").count(), 1);
    }
}
