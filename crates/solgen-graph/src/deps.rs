//! C9: scans one file's text for `#include` directives and
//! `lua_export_*`-style annotation fingerprints (spec.md §4.9).

use std::path::{Path, PathBuf};

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    pub spelling: String,
    pub is_quoted: bool,
    /// The resolved path, only set for quoted includes resolved against
    /// the including file's directory (spec.md §4.9).
    pub resolved: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFile {
    pub includes: Vec<IncludeDirective>,
    pub fingerprints: Vec<String>,
}

fn quoted_include_re() -> Regex {
    Regex::new(r#"#include\s*"([^"]+)""#).expect("static regex is valid")
}

fn angle_include_re() -> Regex {
    Regex::new(r"#include\s*<([^>]+)>").expect("static regex is valid")
}

fn fingerprint_re() -> Regex {
    Regex::new(r"EXPORT_LUA_\w+\s*\([^)]*\)").expect("static regex is valid")
}

/// Parses `content` (the text of `including_file_dir`'s file) for include
/// directives and export fingerprints. Quoted includes are resolved
/// against `including_file_dir`; angle-bracket includes are recorded but
/// never resolved, matching spec.md §4.9.
pub fn parse_file_dependencies(content: &str, including_file_dir: &Path) -> ParsedFile {
    let mut includes = Vec::new();

    for cap in quoted_include_re().captures_iter(content) {
        let spelling = cap[1].to_string();
        let resolved = resolve_quoted(including_file_dir, &spelling);
        includes.push(IncludeDirective {
            spelling,
            is_quoted: true,
            resolved,
        });
    }
    for cap in angle_include_re().captures_iter(content) {
        includes.push(IncludeDirective {
            spelling: cap[1].to_string(),
            is_quoted: false,
            resolved: None,
        });
    }

    let fingerprints = fingerprint_re()
        .find_iter(content)
        .map(|m| m.as_str().to_string())
        .collect();

    ParsedFile {
        includes,
        fingerprints,
    }
}

fn resolve_quoted(including_file_dir: &Path, spelling: &str) -> Option<String> {
    let joined: PathBuf = including_file_dir.join(spelling);
    Some(joined.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_include_and_resolves_it() {
        let content = r#"#include "widget.hpp""#;
        let parsed = parse_file_dependencies(content, Path::new("src"));
        assert_eq!(parsed.includes.len(), 1);
        assert!(parsed.includes[0].is_quoted);
        assert_eq!(parsed.includes[0].resolved.as_deref(), Some("src/widget.hpp"));
    }

    #[test]
    fn parses_angle_include_without_resolving() {
        let content = "#include <vector>";
        let parsed = parse_file_dependencies(content, Path::new("src"));
        assert_eq!(parsed.includes.len(), 1);
        assert!(!parsed.includes[0].is_quoted);
        assert!(parsed.includes[0].resolved.is_none());
    }

    #[test]
    fn extracts_export_fingerprints() {
        let content = "EXPORT_LUA_CLASS(Calculator)\nvoid f();\nEXPORT_LUA_METHOD(add, int)";
        let parsed = parse_file_dependencies(content, Path::new("."));
        assert_eq!(parsed.fingerprints.len(), 2);
        assert!(parsed.fingerprints[0].starts_with("EXPORT_LUA_CLASS"));
    }

    #[test]
    fn handles_multiple_includes_in_one_file() {
        let content = "#include \"a.hpp\"\n#include <map>\n#include \"b.hpp\"";
        let parsed = parse_file_dependencies(content, Path::new("inc"));
        assert_eq!(parsed.includes.len(), 3);
    }
}
