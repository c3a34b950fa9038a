//! C4: derives the C++ namespace path and script namespace path for a
//! declaration (spec.md §4.4).

use indexmap::IndexMap;

#[derive(Debug, Default, Clone, Copy)]
pub struct NamespaceInferrer;

impl NamespaceInferrer {
    /// Joins the ordered sequence of non-anonymous enclosing namespace
    /// names with `::`. Anonymous namespaces (empty string entries) are
    /// skipped, matching C6's extraction of only named namespaces.
    pub fn cpp_namespace_path(enclosing: &[String]) -> String {
        enclosing
            .iter()
            .filter(|n| !n.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("::")
    }

    /// Applies the §4.4 priority list to compute the script-side dotted
    /// namespace path.
    pub fn script_namespace(
        user_params: &IndexMap<String, String>,
        cpp_namespace: &str,
        file_module: Option<&str>,
        default_namespace: &str,
    ) -> String {
        if let Some(value) = user_params.get("namespace") {
            if value == "global" {
                return String::new();
            }
            return value.clone();
        }
        if !cpp_namespace.is_empty() {
            return collapse_dot_runs(&cpp_namespace.replace("::", "."));
        }
        if let Some(module) = file_module {
            if !module.is_empty() {
                return module.to_string();
            }
        }
        default_namespace.to_string()
    }
}

fn collapse_dot_runs(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_dot = false;
    for c in s.chars() {
        if c == '.' {
            if last_was_dot {
                continue;
            }
            last_was_dot = true;
        } else {
            last_was_dot = false;
        }
        out.push(c);
    }
    out.trim_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn cpp_namespace_joins_enclosing_names() {
        let path = NamespaceInferrer::cpp_namespace_path(&["game".into(), "ai".into()]);
        assert_eq!(path, "game::ai");
    }

    #[test]
    fn cpp_namespace_skips_anonymous_segments() {
        let path = NamespaceInferrer::cpp_namespace_path(&["game".into(), "".into(), "ai".into()]);
        assert_eq!(path, "game::ai");
    }

    #[test]
    fn explicit_global_override_wins() {
        let p = params(&[("namespace", "global")]);
        let ns = NamespaceInferrer::script_namespace(&p, "game::ai", Some("mod"), "");
        assert_eq!(ns, "");
    }

    #[test]
    fn explicit_namespace_override_wins_over_cpp_namespace() {
        let p = params(&[("namespace", "custom.path")]);
        let ns = NamespaceInferrer::script_namespace(&p, "game::ai", None, "");
        assert_eq!(ns, "custom.path");
    }

    #[test]
    fn falls_back_to_transliterated_cpp_namespace() {
        let p = IndexMap::new();
        let ns = NamespaceInferrer::script_namespace(&p, "game::ai", None, "");
        assert_eq!(ns, "game.ai");
    }

    #[test]
    fn falls_back_to_module_label_when_no_cpp_namespace() {
        let p = IndexMap::new();
        let ns = NamespaceInferrer::script_namespace(&p, "", Some("physics"), "");
        assert_eq!(ns, "physics");
    }

    #[test]
    fn falls_back_to_default_namespace() {
        let p = IndexMap::new();
        let ns = NamespaceInferrer::script_namespace(&p, "", None, "globalns");
        assert_eq!(ns, "globalns");
    }
}
