//! C7: promotes the raw records C6 extracted into the enriched model C8
//! emits from — script names, namespaces, singleton/static/abstract class
//! detection, operator-to-metamethod mapping, callback and STL container
//! auxiliary records, and property recognition (spec.md §4.7).

use std::collections::HashMap;

use solgen_annotations::NameConverter;
use solgen_hir::{ExportRecord, HirError, PropertyAccess, RecordKind};

use crate::namespace::NamespaceInferrer;
use crate::properties::PropertyRecognizer;
use crate::type_analyzer::TypeAnalyzer;

/// The closed set of static-method names recognized as a singleton
/// accessor (spec.md §4.7.3).
const SINGLETON_ACCESSOR_NAMES: &[&str] = &["instance", "getInstance", "get_instance", "GetInstance"];

/// Operator symbol -> script metamethod, in the order spec.md §4.7.4 lists
/// them. `operator-` is ambiguous between unary and binary and is resolved
/// by parameter count at lookup time, not in this table.
const BINARY_METAMETHODS: &[(&str, &str)] = &[
    ("+", "__add"),
    ("-", "__sub"),
    ("*", "__mul"),
    ("/", "__div"),
    ("%", "__mod"),
    ("==", "__eq"),
    ("<", "__lt"),
    ("<=", "__le"),
    ("()", "__call"),
    ("[]", "__index"),
    ("<<", "__shl"),
];

const UNARY_MINUS_METAMETHOD: &str = "__unm";

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub prefer_snake_case: bool,
    pub default_namespace: String,
    pub file_module: Option<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            prefer_snake_case: false,
            default_namespace: String::new(),
            file_module: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceWarning {
    pub cpp_name: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct InferenceResult {
    pub records: Vec<ExportRecord>,
    pub warnings: Vec<InferenceWarning>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct InferenceEngine;

impl InferenceEngine {
    pub fn infer(raw_records: Vec<ExportRecord>, config: &InferenceConfig) -> InferenceResult {
        let mut records = raw_records;

        for record in &mut records {
            Self::derive_names(record, config);
        }

        Self::classify_operators(&mut records);
        Self::classify_callbacks_and_containers(&mut records);
        Self::classify_classes(&mut records);

        let properties = Self::recognize_properties(&records);
        records.extend(properties);

        let mut warnings = Vec::new();
        let records: Vec<ExportRecord> = records
            .into_iter()
            .filter_map(|r| match r.validate() {
                Ok(()) => Some(r),
                Err(err) => {
                    warnings.push(InferenceWarning {
                        cpp_name: r.cpp_name.clone(),
                        reason: describe(&err),
                    });
                    None
                }
            })
            .collect();

        InferenceResult { records, warnings }
    }

    fn derive_names(record: &mut ExportRecord, config: &InferenceConfig) {
        record.script_name = record
            .user_params
            .get("alias")
            .cloned()
            .unwrap_or_else(|| NameConverter::to_script_name(&record.cpp_name, config.prefer_snake_case));

        record.script_namespace = NamespaceInferrer::script_namespace(
            &record.user_params,
            &record.cpp_namespace,
            config.file_module.as_deref(),
            &config.default_namespace,
        );
    }

    fn classify_operators(records: &mut [ExportRecord]) {
        for record in records.iter_mut() {
            if !matches!(record.kind, RecordKind::Method | RecordKind::StaticMethod) {
                continue;
            }
            let Some(symbol) = record.cpp_name.strip_prefix("operator") else {
                continue;
            };
            let symbol = symbol.trim();
            if symbol.is_empty() {
                continue;
            }

            let metamethod = if symbol == "-" && record.parameter_types.is_empty() {
                Some(UNARY_MINUS_METAMETHOD.to_string())
            } else {
                BINARY_METAMETHODS
                    .iter()
                    .find(|(sym, _)| *sym == symbol)
                    .map(|(_, name)| name.to_string())
            };

            record.kind = RecordKind::Operator;
            record.operator_symbol = Some(symbol.to_string());
            record.script_metamethod = metamethod;
        }
    }

    fn classify_callbacks_and_containers(records: &mut Vec<ExportRecord>) {
        let mut auxiliary = Vec::new();
        for record in records.iter_mut() {
            if !matches!(record.kind, RecordKind::Field | RecordKind::Variable) {
                continue;
            }
            let Some(type_spelling) = record.return_type.clone() else {
                continue;
            };
            let classification = TypeAnalyzer::classify(&type_spelling);

            if classification.is_callable {
                record.kind = RecordKind::Callback;
                record.template_args = classification.template_args.clone();
                continue;
            }

            if classification.is_stl_container {
                record.container_kind = classification.container_kind.clone();
                record.template_args = classification.template_args.clone();

                let mut aux = ExportRecord::new(
                    RecordKind::StlContainer,
                    classification.base_name.clone(),
                    record.source_file.clone(),
                    record.source_line,
                );
                aux.qualified_name = type_spelling.clone();
                aux.script_name = classification
                    .container_kind
                    .clone()
                    .unwrap_or_else(|| classification.base_name.clone());
                aux.script_namespace = record.script_namespace.clone();
                aux.module = record.module.clone();
                aux.container_kind = classification.container_kind;
                aux.template_args = classification.template_args;
                auxiliary.push(aux);
            }
        }
        records.extend(auxiliary);
    }

    fn classify_classes(records: &mut [ExportRecord]) {
        let members_by_class: HashMap<String, Vec<(RecordKind, String, bool, bool)>> = {
            let mut map: HashMap<String, Vec<(RecordKind, String, bool, bool)>> = HashMap::new();
            for r in records.iter() {
                if r.parent_class.is_empty() {
                    continue;
                }
                map.entry(r.parent_class.clone()).or_default().push((
                    r.kind,
                    r.cpp_name.clone(),
                    r.is_static,
                    r.is_pure_virtual,
                ));
            }
            map
        };

        for record in records.iter_mut() {
            if !record.kind.is_class_like() {
                continue;
            }
            let Some(members) = members_by_class.get(&record.cpp_name) else {
                // A class with no annotated members is vacuously static:
                // it declares no non-static members and no constructors.
                record.kind = RecordKind::StaticClass;
                continue;
            };

            let singleton_accessor = members.iter().find(|(kind, name, is_static, _)| {
                *kind == RecordKind::StaticMethod && *is_static && SINGLETON_ACCESSOR_NAMES.contains(&name.as_str())
            });
            if let Some((_, accessor_name, _, _)) = singleton_accessor {
                record.kind = RecordKind::Singleton;
                record
                    .user_params
                    .insert("singleton_accessor".to_string(), accessor_name.to_string());
                continue;
            }

            let has_constructor = members
                .iter()
                .any(|(kind, ..)| *kind == RecordKind::Constructor);
            let has_non_static_member = members.iter().any(|(kind, _, is_static, _)| {
                matches!(kind, RecordKind::Method | RecordKind::Field) && !is_static
            });
            if !has_constructor && !has_non_static_member {
                record.kind = RecordKind::StaticClass;
                continue;
            }

            let has_pure_virtual = members.iter().any(|(kind, _, _, is_pure)| {
                matches!(kind, RecordKind::Method) && *is_pure
            });
            if has_pure_virtual {
                record.kind = RecordKind::AbstractClass;
            }
        }
    }

    fn recognize_properties(records: &[ExportRecord]) -> Vec<ExportRecord> {
        let mut by_class: HashMap<&str, Vec<ExportRecord>> = HashMap::new();
        for r in records.iter().filter(|r| {
            matches!(r.kind, RecordKind::Method | RecordKind::StaticMethod) && !r.parent_class.is_empty()
        }) {
            by_class.entry(r.parent_class.as_str()).or_default().push(r.clone());
        }

        let mut properties = Vec::new();
        for methods in by_class.values() {
            properties.extend(PropertyRecognizer::recognize(methods));
        }
        properties
    }
}

fn describe(err: &HirError) -> String {
    err.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn class(name: &str) -> ExportRecord {
        let mut r = ExportRecord::new(RecordKind::Class, name, "f.hpp", 1);
        r.qualified_name = name.to_string();
        r
    }

    fn method(name: &str, parent: &str, return_type: Option<&str>, params: usize) -> ExportRecord {
        let mut m = ExportRecord::new(RecordKind::Method, name, "f.hpp", 2);
        m.parent_class = parent.to_string();
        m.qualified_name = format!("{parent}::{name}");
        m.return_type = return_type.map(|s| s.to_string());
        m.parameter_types = vec!["int".to_string(); params];
        m
    }

    fn config() -> InferenceConfig {
        InferenceConfig::default()
    }

    #[test]
    fn script_name_defaults_to_converted_cpp_name() {
        let raw = vec![{
            let mut f = ExportRecord::new(RecordKind::Function, "doThing", "f.hpp", 1);
            f.qualified_name = "doThing".to_string();
            f
        }];
        let result = InferenceEngine::infer(raw, &config());
        assert_eq!(result.records[0].script_name, "doThing");
    }

    #[test]
    fn alias_override_wins_over_converted_name() {
        let mut f = ExportRecord::new(RecordKind::Function, "doThing", "f.hpp", 1);
        f.qualified_name = "doThing".to_string();
        f.user_params.insert("alias".to_string(), "do_the_thing".to_string());
        let result = InferenceEngine::infer(vec![f], &config());
        assert_eq!(result.records[0].script_name, "do_the_thing");
    }

    #[test]
    fn class_with_no_members_becomes_static_class() {
        let result = InferenceEngine::infer(vec![class("Utils")], &config());
        assert_eq!(result.records[0].kind, RecordKind::StaticClass);
    }

    #[test]
    fn class_with_constructor_is_not_static() {
        let c = class("Widget");
        let mut ctor = ExportRecord::new(RecordKind::Constructor, "Widget", "f.hpp", 2);
        ctor.parent_class = "Widget".to_string();
        ctor.qualified_name = "Widget::Widget".to_string();
        let result = InferenceEngine::infer(vec![c, ctor], &config());
        let class_record = result.records.iter().find(|r| r.cpp_name == "Widget" && r.kind.is_class_like()).unwrap();
        assert_eq!(class_record.kind, RecordKind::Class);
    }

    #[test]
    fn singleton_accessor_is_detected() {
        let c = class("Logger");
        let mut accessor = method("instance", "Logger", Some("Logger&"), 0);
        accessor.kind = RecordKind::StaticMethod;
        accessor.is_static = true;
        let result = InferenceEngine::infer(vec![c, accessor], &config());
        let class_record = result.records.iter().find(|r| r.cpp_name == "Logger" && r.kind.is_class_like()).unwrap();
        assert_eq!(class_record.kind, RecordKind::Singleton);
    }

    #[test]
    fn pure_virtual_method_marks_abstract_class() {
        let c = class("Shape");
        let mut m = method("area", "Shape", Some("double"), 0);
        m.is_pure_virtual = true;
        let result = InferenceEngine::infer(vec![c, m], &config());
        let class_record = result.records.iter().find(|r| r.cpp_name == "Shape" && r.kind.is_class_like()).unwrap();
        assert_eq!(class_record.kind, RecordKind::AbstractClass);
    }

    #[test]
    fn binary_operator_plus_maps_to_add_metamethod() {
        let op = method("operator+", "Vec2", Some("Vec2"), 1);
        let result = InferenceEngine::infer(vec![op], &config());
        assert_eq!(result.records[0].kind, RecordKind::Operator);
        assert_eq!(result.records[0].operator_symbol.as_deref(), Some("+"));
        assert_eq!(result.records[0].script_metamethod.as_deref(), Some("__add"));
    }

    #[test]
    fn unary_minus_maps_to_unm_not_sub() {
        let op = method("operator-", "Vec2", Some("Vec2"), 0);
        let result = InferenceEngine::infer(vec![op], &config());
        assert_eq!(result.records[0].script_metamethod.as_deref(), Some("__unm"));
    }

    #[test]
    fn callable_field_becomes_callback() {
        let mut f = ExportRecord::new(RecordKind::Field, "onClick", "f.hpp", 1);
        f.parent_class = "Button".to_string();
        f.qualified_name = "Button::onClick".to_string();
        f.return_type = Some("std::function<void(int)>".to_string());
        let result = InferenceEngine::infer(vec![f], &config());
        assert_eq!(result.records[0].kind, RecordKind::Callback);
    }

    #[test]
    fn stl_container_field_emits_auxiliary_record() {
        let mut f = ExportRecord::new(RecordKind::Field, "items", "f.hpp", 1);
        f.parent_class = "Inventory".to_string();
        f.qualified_name = "Inventory::items".to_string();
        f.return_type = Some("std::vector<int>".to_string());
        let result = InferenceEngine::infer(vec![f], &config());
        assert!(result.records.iter().any(|r| r.kind == RecordKind::StlContainer));
    }

    #[test]
    fn getter_setter_pair_becomes_readwrite_property() {
        let mut getter = method("getValue", "Calc", Some("int"), 0);
        getter.kind = RecordKind::Method;
        let mut setter = method("setValue", "Calc", Some("void"), 1);
        setter.kind = RecordKind::Method;
        let result = InferenceEngine::infer(vec![getter, setter], &config());
        let prop = result.records.iter().find(|r| r.kind == RecordKind::Property).unwrap();
        assert_eq!(prop.property_access, PropertyAccess::ReadWrite);
    }

    #[test]
    fn invalid_records_are_dropped_with_a_warning() {
        let orphan_method = {
            let mut m = ExportRecord::new(RecordKind::Method, "add", "f.hpp", 1);
            m.qualified_name = "add".to_string();
            m.user_params = IndexMap::new();
            m
        };
        let result = InferenceEngine::infer(vec![orphan_method], &config());
        assert!(result.records.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }
}
