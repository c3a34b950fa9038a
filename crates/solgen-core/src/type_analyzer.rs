//! C3: classifies a C++ type spelling as primitive / STL container /
//! smart pointer / callable / user class, and extracts template arguments.
//!
//! Classification works directly on the type's textual spelling rather
//! than on a live Clang `Type` handle, so every `ExportRecord` field it
//! feeds stays a plain string per the §3.3 "no AST back-references"
//! invariant, and the classifier is trivially unit-testable.

/// The closed set of STL container name prefixes the analyzer recognizes
/// (spec.md §4.3). Order matters only for `unordered_*` winning over a
/// naive `map`/`set` prefix match, which is why those come first.
const STL_CONTAINERS: &[(&str, &str)] = &[
    ("std::unordered_map", "unordered_map"),
    ("std::unordered_set", "unordered_set"),
    ("unordered_map", "unordered_map"),
    ("unordered_set", "unordered_set"),
    ("std::vector", "vector"),
    ("std::map", "map"),
    ("std::set", "set"),
    ("std::list", "list"),
    ("std::deque", "deque"),
    ("std::array", "array"),
    ("std::pair", "pair"),
    ("std::tuple", "tuple"),
    ("std::optional", "optional"),
    ("vector", "vector"),
    ("map", "map"),
    ("set", "set"),
    ("list", "list"),
    ("deque", "deque"),
    ("array", "array"),
    ("pair", "pair"),
    ("tuple", "tuple"),
    ("optional", "optional"),
];

const SMART_POINTERS: &[(&str, &str)] = &[
    ("std::shared_ptr", "shared_ptr"),
    ("std::unique_ptr", "unique_ptr"),
    ("std::weak_ptr", "weak_ptr"),
    ("shared_ptr", "shared_ptr"),
    ("unique_ptr", "unique_ptr"),
    ("weak_ptr", "weak_ptr"),
];

const CALLABLE_PREFIXES: &[&str] = &["std::function", "function"];

/// The classification of a single C++ type spelling (spec.md §4.3).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeClassification {
    pub full_spelling: String,
    pub base_name: String,
    pub is_stl_container: bool,
    pub container_kind: Option<String>,
    pub is_smart_pointer: bool,
    pub smart_pointer_kind: Option<String>,
    pub is_callable: bool,
    pub template_args: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TypeAnalyzer;

impl TypeAnalyzer {
    pub fn classify(type_spelling: &str) -> TypeClassification {
        let full_spelling = type_spelling.trim().to_string();
        let stripped = strip_cv_and_ref(&full_spelling);
        let base_name = strip_template_args(stripped).trim().to_string();
        let template_args = extract_template_args(stripped);

        let container_kind = STL_CONTAINERS
            .iter()
            .find(|(prefix, _)| base_name == *prefix || base_name.ends_with(&format!("::{prefix}")))
            .map(|(_, kind)| kind.to_string());

        let smart_pointer_kind = SMART_POINTERS
            .iter()
            .find(|(prefix, _)| base_name == *prefix || base_name.ends_with(&format!("::{prefix}")))
            .map(|(_, kind)| kind.to_string());

        let is_callable = CALLABLE_PREFIXES
            .iter()
            .any(|prefix| base_name == *prefix || base_name.ends_with(&format!("::{prefix}")));

        TypeClassification {
            full_spelling,
            base_name,
            is_stl_container: container_kind.is_some(),
            container_kind,
            is_smart_pointer: smart_pointer_kind.is_some(),
            smart_pointer_kind,
            is_callable,
            template_args,
        }
    }
}

fn strip_cv_and_ref(spelling: &str) -> &str {
    let mut s = spelling.trim();
    for token in ["const ", "volatile "] {
        if let Some(rest) = s.strip_prefix(token) {
            s = rest.trim();
        }
    }
    s.trim_end_matches(['&', '*', ' '])
}

fn strip_template_args(spelling: &str) -> &str {
    match spelling.find('<') {
        Some(idx) => &spelling[..idx],
        None => spelling,
    }
}

/// Splits the contents between the outermost `<...>` on top-level commas,
/// so `map<K, pair<A,B>>` yields `["K", "pair<A,B>"]` rather than
/// splitting inside the nested template.
fn extract_template_args(spelling: &str) -> Vec<String> {
    let Some(start) = spelling.find('<') else {
        return Vec::new();
    };
    let Some(end) = spelling.rfind('>') else {
        return Vec::new();
    };
    if end <= start {
        return Vec::new();
    }
    let inner = &spelling[start + 1..end];

    let mut args = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in inner.chars() {
        match c {
            '<' => {
                depth += 1;
                current.push(c);
            }
            '>' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        args.push(current.trim().to_string());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_plain_primitive() {
        let c = TypeAnalyzer::classify("int");
        assert!(!c.is_stl_container);
        assert!(!c.is_smart_pointer);
        assert!(!c.is_callable);
        assert_eq!(c.base_name, "int");
    }

    #[test]
    fn classifies_vector_container() {
        let c = TypeAnalyzer::classify("std::vector<int>");
        assert!(c.is_stl_container);
        assert_eq!(c.container_kind.as_deref(), Some("vector"));
        assert_eq!(c.template_args, vec!["int".to_string()]);
    }

    #[test]
    fn classifies_nested_map_container() {
        let c = TypeAnalyzer::classify("std::map<std::string, std::vector<int>>");
        assert!(c.is_stl_container);
        assert_eq!(c.container_kind.as_deref(), Some("map"));
        assert_eq!(
            c.template_args,
            vec!["std::string".to_string(), "std::vector<int>".to_string()]
        );
    }

    #[test]
    fn prefers_unordered_over_bare_map() {
        let c = TypeAnalyzer::classify("std::unordered_map<int, int>");
        assert_eq!(c.container_kind.as_deref(), Some("unordered_map"));
    }

    #[test]
    fn classifies_smart_pointers() {
        let c = TypeAnalyzer::classify("std::shared_ptr<Widget>");
        assert!(c.is_smart_pointer);
        assert_eq!(c.smart_pointer_kind.as_deref(), Some("shared_ptr"));
    }

    #[test]
    fn classifies_callable_std_function() {
        let c = TypeAnalyzer::classify("const std::function<void(int)>&");
        assert!(c.is_callable);
        assert_eq!(c.template_args, vec!["void(int)".to_string()]);
    }

    #[test]
    fn strips_cv_and_reference_qualifiers() {
        let c = TypeAnalyzer::classify("const std::vector<int>&");
        assert_eq!(c.base_name, "std::vector");
        assert!(c.is_stl_container);
    }
}
