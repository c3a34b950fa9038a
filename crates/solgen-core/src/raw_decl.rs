//! The plain-data shape a declaration is copied into the moment C6 visits
//! it. No field here holds a reference into Clang's AST: per spec.md §3.3
//! every AST-derived fact is flattened into an owned string or number
//! before the visitor returns, so `RawDecl` (and everything downstream of
//! it) can outlive the translation unit and be driven entirely from
//! in-memory fixtures in tests, without linking libclang.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Class,
    Method,
    Constructor,
    Field,
    Function,
    Enum,
    Variable,
    Namespace,
}

#[derive(Debug, Clone, Default)]
pub struct RawDecl {
    pub kind: Option<DeclKind>,
    /// Raw annotation payload strings attached to this declaration
    /// (`AnnotateAttr` spellings in Clang terms), in source order.
    pub annotations: Vec<String>,
    pub name: String,
    pub qualified_name: String,
    /// Ordered, outermost-first namespace names enclosing this
    /// declaration.
    pub enclosing_namespaces: Vec<String>,
    pub enclosing_record: Option<String>,
    pub base_classes: Vec<String>,
    pub return_type: Option<String>,
    /// Ordered `(name, type)` pairs.
    pub params: Vec<(String, String)>,
    pub is_static: bool,
    pub is_const: bool,
    pub is_virtual: bool,
    pub is_pure_virtual: bool,
    pub field_type: Option<String>,
    pub enum_values: Vec<(String, i64)>,
    pub is_const_variable: bool,
    pub source_file: String,
    pub source_line: u32,
    pub in_system_header: bool,
}

impl RawDecl {
    pub fn new(kind: DeclKind, name: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            name: name.into(),
            ..Default::default()
        }
    }
}
