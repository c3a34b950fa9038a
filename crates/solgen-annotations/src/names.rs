//! C2: script-identifier conversion and sanitization.

/// Lua's reserved words; a script name matching one of these is sanitized
/// by appending a trailing underscore (spec.md §4.2).
const LUA_RESERVED_WORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function",
    "goto", "if", "in", "local", "nil", "not", "or", "repeat", "return",
    "then", "true", "until", "while",
];

/// Stateless converter bundling the C2 operations. Kept as a unit struct
/// (rather than free functions) so call sites read `NameConverter::...`
/// uniformly alongside the other components.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameConverter;

impl NameConverter {
    /// `to_script_name(cpp, prefer_snake)`: converts a C++ identifier into
    /// the form exposed to the script, applying snake_case or camelCase
    /// per `prefer_snake`, then sanitizing reserved words.
    pub fn to_script_name(cpp: &str, prefer_snake: bool) -> String {
        let converted = if prefer_snake {
            Self::to_snake_case(cpp)
        } else {
            Self::to_camel_case(cpp)
        };
        Self::sanitize(&converted)
    }

    /// Converts `CamelCase` or `mixedCase` into `snake_case`. Leaves
    /// already-snake_case input untouched and collapses repeated
    /// underscores produced by consecutive uppercase runs (e.g. `HTTPCode`
    /// -> `http_code`).
    pub fn to_snake_case(input: &str) -> String {
        let mut out = String::with_capacity(input.len() + 4);
        let chars: Vec<char> = input.chars().collect();
        for (i, &c) in chars.iter().enumerate() {
            if c == '_' {
                if !out.ends_with('_') && !out.is_empty() {
                    out.push('_');
                }
                continue;
            }
            if c.is_uppercase() {
                let prev_is_lower_or_digit = i > 0
                    && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                let starts_new_word = i > 0 && (prev_is_lower_or_digit || (chars[i - 1].is_uppercase() && next_is_lower));
                if starts_new_word && !out.ends_with('_') {
                    out.push('_');
                }
                out.extend(c.to_lowercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Converts `snake_case` (or already-camelCase) into `camelCase`.
    pub fn to_camel_case(input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut capitalize_next = false;
        for (i, c) in input.chars().enumerate() {
            if c == '_' {
                capitalize_next = true;
                continue;
            }
            if capitalize_next {
                out.extend(c.to_uppercase());
                capitalize_next = false;
            } else if i == 0 {
                out.extend(c.to_lowercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Appends an underscore to `name` if it collides with a script
    /// reserved word; otherwise returns it unchanged.
    pub fn sanitize(name: &str) -> String {
        if LUA_RESERVED_WORDS.contains(&name) {
            format!("{name}_")
        } else {
            name.to_string()
        }
    }
}
