//! Annotation payload parsing (C1) and script-identifier conversion (C2)
//! for the solgen C++-to-Lua binding generator.
//!
//! This crate is pure and deterministic: given the same payload string or
//! the same C++ identifier it always produces the same result, and it never
//! touches the filesystem or an AST.

mod names;

pub use names::NameConverter;

use std::collections::HashMap;
use thiserror::Error;

/// The closed set of `lua_export_<kind>` suffixes recognized on input
/// declarations (spec.md §6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AnnotationKind {
    Class,
    AbstractClass,
    StaticClass,
    Singleton,
    Method,
    StaticMethod,
    Constructor,
    Property,
    Field,
    Function,
    Enum,
    Constant,
    Variable,
    Operator,
    TemplateClass,
    Namespace,
    Module,
    Ignore,
}

impl AnnotationKind {
    /// Parses the `<kind>` suffix of a `lua_export_<kind>` payload.
    ///
    /// Returns `None` for any suffix outside the closed set; callers treat
    /// that declaration as unannotated (spec.md §4.1, §7).
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        use AnnotationKind::*;
        Some(match suffix {
            "class" => Class,
            "abstract_class" => AbstractClass,
            "static_class" => StaticClass,
            "singleton" => Singleton,
            "method" => Method,
            "static_method" => StaticMethod,
            "constructor" => Constructor,
            "property" => Property,
            "field" => Field,
            "function" => Function,
            "enum" => Enum,
            "constant" => Constant,
            "variable" => Variable,
            "operator" => Operator,
            "template_class" => TemplateClass,
            "namespace" => Namespace,
            "module" => Module,
            "ignore" => Ignore,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        use AnnotationKind::*;
        match self {
            Class => "class",
            AbstractClass => "abstract_class",
            StaticClass => "static_class",
            Singleton => "singleton",
            Method => "method",
            StaticMethod => "static_method",
            Constructor => "constructor",
            Property => "property",
            Field => "field",
            Function => "function",
            Enum => "enum",
            Constant => "constant",
            Variable => "variable",
            Operator => "operator",
            TemplateClass => "template_class",
            Namespace => "namespace",
            Module => "module",
            Ignore => "ignore",
        }
    }
}

/// A single malformed `key=value` pair dropped while parsing the attribute
/// list (spec.md §4.1, §7 "Annotation malformed").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationWarning {
    pub payload: String,
    pub reason: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnnotationError {
    #[error("annotation payload does not begin with 'lua_export_': {0}")]
    NotAnExportAnnotation(String),
    #[error("unrecognized export kind suffix: {0}")]
    UnknownKind(String),
}

/// The decoded form of one `lua_export_<kind>:<primary>:<attrs>` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAnnotation {
    pub kind: AnnotationKind,
    /// The `<primary>` segment, empty when omitted.
    pub primary: String,
    pub params: HashMap<String, String>,
    pub warnings: Vec<AnnotationWarning>,
}

impl ParsedAnnotation {
    pub fn is_flag_set(&self, key: &str) -> bool {
        matches!(self.params.get(key).map(String::as_str), Some("true"))
    }
}

/// Parses one annotation payload string into (kind, primary, attribute map).
///
/// Grammar (spec.md §4.1): `lua_export_<kind>:<primary>:<attrs>` where
/// `<primary>` is either empty or an identifier and `<attrs>` is a
/// comma-separated list of `key=value` pairs; a bare `key` token means
/// `key=true`. Whitespace around keys and values is trimmed. Unknown keys
/// are preserved (forward compatibility, spec.md §7); pairs that are
/// neither `key=value` nor a bare flag are reported as warnings and
/// dropped.
pub fn parse_annotation(payload: &str) -> Result<ParsedAnnotation, AnnotationError> {
    const PREFIX: &str = "lua_export_";
    if !payload.starts_with(PREFIX) {
        return Err(AnnotationError::NotAnExportAnnotation(payload.to_string()));
    }
    let rest = &payload[PREFIX.len()..];

    let mut parts = rest.splitn(3, ':');
    let kind_str = parts.next().unwrap_or("");
    let primary = parts.next().unwrap_or("").trim().to_string();
    let attrs_str = parts.next().unwrap_or("");

    let kind = AnnotationKind::from_suffix(kind_str)
        .ok_or_else(|| AnnotationError::UnknownKind(kind_str.to_string()))?;

    let mut params = HashMap::new();
    let mut warnings = Vec::new();
    for raw_pair in attrs_str.split(',') {
        let pair = raw_pair.trim();
        if pair.is_empty() {
            continue;
        }
        if let Some((key, value)) = pair.split_once('=') {
            let key = key.trim().to_string();
            let value = value.trim().to_string();
            if key.is_empty() {
                warnings.push(AnnotationWarning {
                    payload: pair.to_string(),
                    reason: "missing key before '='".to_string(),
                });
                continue;
            }
            params.insert(key, value);
        } else if is_identifier(pair) {
            // Flag-style `key` means `key=true`.
            params.insert(pair.to_string(), "true".to_string());
        } else {
            warnings.push(AnnotationWarning {
                payload: pair.to_string(),
                reason: "expected 'key=value' or a bare flag identifier".to_string(),
            });
        }
    }

    Ok(ParsedAnnotation {
        kind,
        primary,
        params,
        warnings,
    })
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_export_payloads() {
        assert!(matches!(
            parse_annotation("something_else"),
            Err(AnnotationError::NotAnExportAnnotation(_))
        ));
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(matches!(
            parse_annotation("lua_export_bogus"),
            Err(AnnotationError::UnknownKind(_))
        ));
    }

    #[test]
    fn parses_bare_class_annotation() {
        let parsed = parse_annotation("lua_export_class").unwrap();
        assert_eq!(parsed.kind, AnnotationKind::Class);
        assert_eq!(parsed.primary, "");
        assert!(parsed.params.is_empty());
    }

    #[test]
    fn parses_primary_and_attrs() {
        let parsed =
            parse_annotation("lua_export_method:add: alias = Add , readonly").unwrap();
        assert_eq!(parsed.kind, AnnotationKind::Method);
        assert_eq!(parsed.primary, "add");
        assert_eq!(parsed.params.get("alias").map(String::as_str), Some("Add"));
        assert!(parsed.is_flag_set("readonly"));
    }

    #[test]
    fn empty_attribute_string_yields_no_params_and_no_warnings() {
        let parsed = parse_annotation("lua_export_function::").unwrap();
        assert!(parsed.params.is_empty());
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn malformed_pairs_are_warned_and_dropped() {
        let parsed = parse_annotation("lua_export_function::foo==bar,=stray,good=1").unwrap();
        assert_eq!(parsed.params.get("good").map(String::as_str), Some("1"));
        assert!(!parsed.warnings.is_empty());
        assert!(!parsed.params.contains_key(""));
    }

    #[test]
    fn unknown_keys_are_preserved() {
        let parsed = parse_annotation("lua_export_class:Foo:future_flag=42").unwrap();
        assert_eq!(
            parsed.params.get("future_flag").map(String::as_str),
            Some("42")
        );
    }
}
