//! sol2-specific rendering: `new_usertype<T>(...)` initializer bodies,
//! namespace-table bootstrap lines, and STL container stubs
//! (spec.md §4.8.3, §4.8.5, §4.8.6).

use solgen_hir::{ExportRecord, PropertyAccess, RecordKind};

/// One entry inside a `new_usertype<...>(...)` call, already rendered to
/// its final text with no trailing comma — the caller joins entries and
/// adds commas to all but the last.
pub fn namespace_var_name(script_namespace: &str) -> String {
    script_namespace.replace(['.', ':'], "_")
}

/// Deterministic local-variable lines that obtain or create each
/// namespace table, innermost table first so parents exist before
/// children are indexed off them.
pub fn namespace_bootstrap_lines(namespaces: &[String]) -> Vec<String> {
    let mut lines = Vec::new();
    for ns in namespaces {
        if ns.is_empty() {
            continue;
        }
        let var = namespace_var_name(ns);
        let segments: Vec<&str> = ns.split('.').collect();
        let mut accessor = "lua".to_string();
        for (i, segment) in segments.iter().enumerate() {
            accessor.push_str(&format!("[\"{segment}\"]"));
            if i == segments.len() - 1 {
                lines.push(format!(
                    "auto {var} = {accessor}.get_or_create<sol::table>();"
                ));
            }
        }
    }
    lines
}

fn base_class_entry(base_classes: &[String]) -> Option<String> {
    if base_classes.is_empty() {
        return None;
    }
    let bases = base_classes
        .iter()
        .map(|b| format!("sol::bases<{b}>()"))
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("sol::base_classes, {bases}"))
}

fn constructor_entry(qualified_name: &str, parameter_types: &[String]) -> String {
    let sig = parameter_types.join(", ");
    format!("sol::constructors<{qualified_name}({sig})>()")
}

fn method_entry(record: &ExportRecord) -> String {
    format!("\"{}\", &{}", record.script_name, record.qualified_name)
}

fn property_entry(record: &ExportRecord) -> String {
    let getter = record.getter_method.as_deref().unwrap_or_default();
    let parent = &record.parent_class;
    match record.property_access {
        PropertyAccess::ReadWrite => {
            let setter = record.setter_method.as_deref().unwrap_or_default();
            format!(
                "\"{}\", sol::property(&{parent}::{getter}, &{parent}::{setter})",
                record.script_name
            )
        }
        _ => format!(
            "\"{}\", sol::readonly_property(&{parent}::{getter})",
            record.script_name
        ),
    }
}

fn operator_entry(record: &ExportRecord) -> String {
    let metamethod = record.script_metamethod.as_deref().unwrap_or("__unknown");
    format!("sol::meta_function::{}, &{}", metamethod.trim_start_matches("__"), record.qualified_name)
}

/// Renders the body of one `new_usertype<...>(...)` call, honoring the
/// §4.8.3 entry order: base classes, constructors, methods, static
/// methods, properties, operators. All but the final entry get a
/// trailing comma.
pub fn render_usertype_body(
    qualified_name: &str,
    base_classes: &[String],
    constructors: &[ExportRecord],
    methods: &[ExportRecord],
    static_methods: &[ExportRecord],
    properties: &[ExportRecord],
    operators: &[ExportRecord],
) -> String {
    let mut entries: Vec<String> = Vec::new();

    if let Some(bases) = base_class_entry(base_classes) {
        entries.push(bases);
    }
    for ctor in constructors {
        entries.push(constructor_entry(qualified_name, &ctor.parameter_types));
    }
    for m in methods {
        entries.push(method_entry(m));
    }
    for m in static_methods {
        entries.push(method_entry(m));
    }
    for p in properties {
        entries.push(property_entry(p));
    }
    for op in operators {
        entries.push(operator_entry(op));
    }

    let last = entries.len().saturating_sub(1);
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| if i == last { e.clone() } else { format!("{e},") })
        .collect::<Vec<_>>()
        .join("\n    ")
}

/// A `vector<T>`/`map<K,V>`/`set<T>` registration stub (spec.md §4.8.5).
/// The contract is that script name and C++ type are deterministic
/// functions of the element types; the exact member set is left open by
/// the source beyond the minimums it names.
pub fn render_stl_container(script_name: &str, cpp_type: &str, container_kind: &str) -> String {
    let members = match container_kind {
        "vector" | "list" | "deque" => {
            "\"size\", &T::size,\n    \"empty\", &T::empty,\n    \"clear\", &T::clear,\n    \"push_back\", &T::push_back,\n    \"pop_back\", &T::pop_back"
        }
        "map" | "unordered_map" => {
            "\"size\", &T::size,\n    \"empty\", &T::empty,\n    \"clear\", &T::clear,\n    \"at\", static_cast<typename T::mapped_type&(T::*)(const typename T::key_type&)>(&T::at)"
        }
        "set" | "unordered_set" => "\"size\", &T::size,\n    \"empty\", &T::empty,\n    \"clear\", &T::clear,\n    \"insert\", static_cast<std::pair<typename T::iterator, bool>(T::*)(const typename T::value_type&)>(&T::insert)",
        _ => "\"size\", &T::size,\n    \"empty\", &T::empty",
    };
    let members = members.replace("T::", &format!("{cpp_type}::"));
    format!(
        "lua.new_usertype<{cpp_type}>(\"{script_name}\",\n    sol::constructors<{cpp_type}()>(),\n    {members}\n);"
    )
}

pub fn enum_registration(record: &ExportRecord) -> String {
    let enclosing = &record.qualified_name;
    let args = record
        .enum_values
        .iter()
        .map(|(name, _)| {
            if enclosing.is_empty() {
                format!("\"{name}\", {name}")
            } else {
                format!("\"{name}\", {enclosing}::{name}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("lua.new_enum(\"{}\", {args});", record.script_name)
}

pub fn free_function_entry(record: &ExportRecord) -> String {
    format!("lua[\"{}\"] = &{};", record.script_name, record.qualified_name)
}

pub fn constant_entry(record: &ExportRecord) -> String {
    format!("lua[\"{}\"] = {};", record.script_name, record.qualified_name)
}

pub fn kind_is_free_record(kind: RecordKind) -> bool {
    matches!(
        kind,
        RecordKind::Function | RecordKind::Enum | RecordKind::Constant | RecordKind::Variable | RecordKind::StlContainer
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use solgen_hir::ExportRecord;

    fn method_record(name: &str, qualified: &str) -> ExportRecord {
        let mut r = ExportRecord::new(RecordKind::Method, name, "f.hpp", 1);
        r.script_name = name.to_string();
        r.qualified_name = qualified.to_string();
        r
    }

    #[test]
    fn namespace_var_name_replaces_dots_and_colons() {
        assert_eq!(namespace_var_name("game.ai"), "game_ai");
    }

    #[test]
    fn usertype_body_orders_entries_and_terminates_commas() {
        let ctor = ExportRecord::new(RecordKind::Constructor, "Calculator", "f.hpp", 1);
        let methods = vec![method_record("add", "Calculator::add")];
        let body = render_usertype_body("Calculator", &[], &[ctor], &methods, &[], &[], &[]);
        assert!(body.starts_with("sol::constructors"));
        assert!(body.contains("add,"));
        assert!(!body.ends_with(','));
    }

    #[test]
    fn base_class_entry_renders_sol_bases() {
        let entry = base_class_entry(&["Vehicle".to_string()]).unwrap();
        assert_eq!(entry, "sol::base_classes, sol::bases<Vehicle>()");
    }

    #[test]
    fn enum_registration_qualifies_constants_with_enclosing_scope() {
        let mut r = ExportRecord::new(RecordKind::Enum, "Color", "f.hpp", 1);
        r.script_name = "Color".to_string();
        r.qualified_name = "game::Color".to_string();
        r.enum_values = vec![("Red".to_string(), 0), ("Green".to_string(), 1)];
        let rendered = enum_registration(&r);
        assert!(rendered.contains("game::Color::Red"));
        assert!(rendered.contains("new_enum(\"Color\""));
    }
}
