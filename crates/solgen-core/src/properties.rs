//! C5: pairs `get<X>`/`is<X>` methods with `set<X>` methods into property
//! records (spec.md §4.5).

use solgen_hir::{ExportRecord, PropertyAccess, RecordKind};

#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyRecognizer;

impl PropertyRecognizer {
    pub fn is_getter(method: &ExportRecord) -> bool {
        let name = method.cpp_name.as_str();
        let has_getter_prefix =
            (name.starts_with("get") && name.len() > 3) || (name.starts_with("is") && name.len() > 2);
        let returns_non_void = method.return_type.as_deref().is_some_and(|t| t.trim() != "void");
        has_getter_prefix && returns_non_void
    }

    pub fn is_setter(method: &ExportRecord) -> bool {
        let name = method.cpp_name.as_str();
        name.starts_with("set") && name.len() > 3 && method.parameter_types.len() == 1
    }

    /// The property name implied by a getter/setter method name: the
    /// remainder after the `get`/`is`/`set` prefix, first character
    /// lowercased.
    pub fn property_name(method_name: &str) -> String {
        let stripped = if let Some(rest) = method_name.strip_prefix("get") {
            rest
        } else if let Some(rest) = method_name.strip_prefix("is") {
            rest
        } else if let Some(rest) = method_name.strip_prefix("set") {
            rest
        } else {
            method_name
        };
        let mut chars = stripped.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }

    /// Given every method record of one class, produces one property
    /// record per getter. The underlying getter/setter methods are left
    /// in the caller's method list untouched (spec.md §4.5: "methods used
    /// as property implementations remain exported as methods").
    pub fn recognize(methods: &[ExportRecord]) -> Vec<ExportRecord> {
        let getters: Vec<&ExportRecord> = methods
            .iter()
            .filter(|m| matches!(m.kind, RecordKind::Method | RecordKind::StaticMethod))
            .filter(|m| Self::is_getter(m))
            .collect();
        let setters: Vec<&ExportRecord> = methods
            .iter()
            .filter(|m| matches!(m.kind, RecordKind::Method | RecordKind::StaticMethod))
            .filter(|m| Self::is_setter(m))
            .collect();

        getters
            .into_iter()
            .map(|getter| {
                let prop_name = Self::property_name(&getter.cpp_name);
                let setter = setters
                    .iter()
                    .find(|s| Self::property_name(&s.cpp_name) == prop_name);

                let mut record = ExportRecord::new(
                    RecordKind::Property,
                    prop_name.clone(),
                    getter.source_file.clone(),
                    getter.source_line,
                );
                record.script_name = prop_name;
                record.parent_class = getter.parent_class.clone();
                record.qualified_name = getter.qualified_name.clone();
                record.cpp_namespace = getter.cpp_namespace.clone();
                record.script_namespace = getter.script_namespace.clone();
                record.module = getter.module.clone();
                record.return_type = getter.return_type.clone();
                record.getter_method = Some(getter.cpp_name.clone());
                record.setter_method = setter.map(|s| s.cpp_name.clone());
                record.property_access = if setter.is_some() {
                    PropertyAccess::ReadWrite
                } else {
                    PropertyAccess::ReadOnly
                };
                record
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &str, return_type: &str, param_count: usize, parent: &str) -> ExportRecord {
        let mut m = ExportRecord::new(RecordKind::Method, name, "f.hpp", 1);
        m.parent_class = parent.to_string();
        m.qualified_name = format!("{parent}::{name}");
        m.return_type = if return_type.is_empty() {
            None
        } else {
            Some(return_type.to_string())
        };
        m.parameter_types = vec!["int".to_string(); param_count];
        m
    }

    #[test]
    fn getter_detection_requires_non_void_return_and_prefix() {
        let getter = method("getValue", "int", 0, "Calc");
        assert!(PropertyRecognizer::is_getter(&getter));

        let void_getter = method("getValue", "void", 0, "Calc");
        assert!(!PropertyRecognizer::is_getter(&void_getter));
    }

    #[test]
    fn is_prefix_getter_requires_length_over_two() {
        assert!(!PropertyRecognizer::is_getter(&method("is", "bool", 0, "Calc")));
        assert!(PropertyRecognizer::is_getter(&method("isReady", "bool", 0, "Calc")));
    }

    #[test]
    fn setter_requires_exactly_one_parameter() {
        assert!(PropertyRecognizer::is_setter(&method("setValue", "void", 1, "Calc")));
        assert!(!PropertyRecognizer::is_setter(&method("setValue", "void", 0, "Calc")));
        assert!(!PropertyRecognizer::is_setter(&method("setValue", "void", 2, "Calc")));
    }

    #[test]
    fn property_name_strips_prefix_and_lowercases_first_char() {
        assert_eq!(PropertyRecognizer::property_name("getValue"), "value");
        assert_eq!(PropertyRecognizer::property_name("isReady"), "ready");
        assert_eq!(PropertyRecognizer::property_name("setValue"), "value");
    }

    #[test]
    fn readwrite_when_matching_setter_exists() {
        let methods = vec![
            method("getValue", "int", 0, "Calc"),
            method("setValue", "void", 1, "Calc"),
        ];
        let props = PropertyRecognizer::recognize(&methods);
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].property_access, PropertyAccess::ReadWrite);
        assert_eq!(props[0].setter_method.as_deref(), Some("setValue"));
    }

    #[test]
    fn readonly_when_no_matching_setter() {
        let methods = vec![method("getValue", "int", 0, "Calc")];
        let props = PropertyRecognizer::recognize(&methods);
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].property_access, PropertyAccess::ReadOnly);
        assert!(props[0].setter_method.is_none());
    }

    #[test]
    fn setter_only_method_produces_no_property() {
        let methods = vec![method("setValue", "void", 1, "Calc")];
        let props = PropertyRecognizer::recognize(&methods);
        assert!(props.is_empty());
    }

    #[test]
    fn void_returning_getter_is_excluded_from_recognition() {
        let methods = vec![method("getValue", "void", 0, "Calc")];
        let props = PropertyRecognizer::recognize(&methods);
        assert!(props.is_empty());
    }
}
