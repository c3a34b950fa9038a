//! The data model that flows through the solgen pipeline (spec.md §3):
//! `ExportRecord`, `FileInfo`, `DependencyNode`, and `ModuleBundle`.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use solgen_annotations::AnnotationKind;
use thiserror::Error;

/// The full closed set of `ExportRecord::kind` values (spec.md §3.1). A
/// superset of `AnnotationKind`: some variants (`TemplateInstance`,
/// `StlContainer`, `Callback`, `Inherit`) are produced only by the
/// inference engine (C7), never read directly off an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
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
    TemplateInstance,
    Namespace,
    Module,
    StlContainer,
    Callback,
    Inherit,
}

impl RecordKind {
    /// True for kinds that must carry a non-empty `parent_class`
    /// (spec.md §3.2).
    pub fn requires_parent_class(self) -> bool {
        matches!(
            self,
            RecordKind::Method
                | RecordKind::StaticMethod
                | RecordKind::Constructor
                | RecordKind::Property
                | RecordKind::Field
                | RecordKind::Operator
        )
    }

    pub fn is_class_like(self) -> bool {
        matches!(
            self,
            RecordKind::Class
                | RecordKind::AbstractClass
                | RecordKind::StaticClass
                | RecordKind::Singleton
                | RecordKind::TemplateClass
        )
    }
}

impl RecordKind {
    /// Maps an `AnnotationKind` to the `RecordKind` it produces, or
    /// `None` when the annotation never becomes a record.
    pub fn from_annotation(kind: AnnotationKind) -> Option<RecordKind> {
        use AnnotationKind as A;
        Some(match kind {
            A::Class => RecordKind::Class,
            A::AbstractClass => RecordKind::AbstractClass,
            A::StaticClass => RecordKind::StaticClass,
            A::Singleton => RecordKind::Singleton,
            A::Method => RecordKind::Method,
            A::StaticMethod => RecordKind::StaticMethod,
            A::Constructor => RecordKind::Constructor,
            A::Property => RecordKind::Property,
            A::Field => RecordKind::Field,
            A::Function => RecordKind::Function,
            A::Enum => RecordKind::Enum,
            A::Constant => RecordKind::Constant,
            A::Variable => RecordKind::Variable,
            A::Operator => RecordKind::Operator,
            A::TemplateClass => RecordKind::TemplateClass,
            A::Namespace => RecordKind::Namespace,
            A::Module => RecordKind::Module,
            // `ignore` never becomes a record.
            A::Ignore => return None,
        })
    }
}

/// Script-side access mode for a property record (spec.md §3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyAccess {
    ReadOnly,
    ReadWrite,
    WriteOnly,
    None,
}

impl Default for PropertyAccess {
    fn default() -> Self {
        PropertyAccess::None
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HirError {
    #[error("export record has an empty cpp_name")]
    EmptyCppName,
    #[error("export record of kind {kind:?} requires a non-empty parent_class")]
    MissingParentClass { kind: RecordKind },
    #[error("qualified_name '{qualified_name}' is not prefixed by cpp_namespace '{cpp_namespace}'")]
    NamespaceMismatch {
        qualified_name: String,
        cpp_namespace: String,
    },
    #[error("qualified_name '{qualified_name}' does not contain parent_class '{parent_class}' as a segment")]
    ParentClassMismatch {
        qualified_name: String,
        parent_class: String,
    },
    #[error("property record '{cpp_name}' has neither a getter nor a setter")]
    PropertyMissingAccessor { cpp_name: String },
}

/// The unit of information flowing through the pipeline (spec.md §3.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub kind: RecordKind,
    pub cpp_name: String,
    pub script_name: String,
    pub qualified_name: String,
    pub cpp_namespace: String,
    pub script_namespace: String,
    pub module: String,
    pub parent_class: String,
    pub base_classes: Vec<String>,
    pub return_type: Option<String>,
    pub parameter_types: Vec<String>,
    pub parameter_names: Vec<String>,
    pub is_static: bool,
    pub is_const: bool,
    pub is_virtual: bool,
    pub is_pure_virtual: bool,
    pub property_access: PropertyAccess,
    pub getter_method: Option<String>,
    pub setter_method: Option<String>,
    pub container_kind: Option<String>,
    pub template_args: Vec<String>,
    pub operator_symbol: Option<String>,
    pub script_metamethod: Option<String>,
    pub enum_values: Vec<(String, i64)>,
    pub user_params: IndexMap<String, String>,
    pub source_file: String,
    pub source_line: u32,
}

impl ExportRecord {
    /// Creates a bare record with the required identity fields; every
    /// other field starts at its empty/default value. Callers (C6, C7)
    /// fill in the rest field-by-field, matching the teacher's pattern of
    /// building HIR nodes incrementally rather than through a single
    /// mega-constructor.
    pub fn new(kind: RecordKind, cpp_name: impl Into<String>, source_file: impl Into<String>, source_line: u32) -> Self {
        Self {
            kind,
            cpp_name: cpp_name.into(),
            script_name: String::new(),
            qualified_name: String::new(),
            cpp_namespace: String::new(),
            script_namespace: String::new(),
            module: String::new(),
            parent_class: String::new(),
            base_classes: Vec::new(),
            return_type: None,
            parameter_types: Vec::new(),
            parameter_names: Vec::new(),
            is_static: false,
            is_const: false,
            is_virtual: false,
            is_pure_virtual: false,
            property_access: PropertyAccess::None,
            getter_method: None,
            setter_method: None,
            container_kind: None,
            template_args: Vec::new(),
            operator_symbol: None,
            script_metamethod: None,
            enum_values: Vec::new(),
            user_params: IndexMap::new(),
            source_file: source_file.into(),
            source_line,
        }
    }

    /// Validates the §3.2 invariants. Used by C7 step 8 to drop invalid
    /// records before they reach C8.
    pub fn validate(&self) -> Result<(), HirError> {
        if self.cpp_name.is_empty() {
            return Err(HirError::EmptyCppName);
        }
        if self.kind.requires_parent_class() && self.parent_class.is_empty() {
            return Err(HirError::MissingParentClass { kind: self.kind });
        }
        if !self.cpp_namespace.is_empty()
            && !self.qualified_name.is_empty()
            && !self.qualified_name.starts_with(&self.cpp_namespace)
        {
            return Err(HirError::NamespaceMismatch {
                qualified_name: self.qualified_name.clone(),
                cpp_namespace: self.cpp_namespace.clone(),
            });
        }
        if !self.parent_class.is_empty()
            && !self.qualified_name.is_empty()
            && !self
                .qualified_name
                .split("::")
                .any(|segment| segment == self.parent_class)
        {
            return Err(HirError::ParentClassMismatch {
                qualified_name: self.qualified_name.clone(),
                parent_class: self.parent_class.clone(),
            });
        }
        if matches!(self.kind, RecordKind::Property)
            && self.getter_method.is_none()
            && self.setter_method.is_none()
        {
            return Err(HirError::PropertyMissingAccessor {
                cpp_name: self.cpp_name.clone(),
            });
        }
        Ok(())
    }

    /// The `(script_name, qualified_name)` pair used by C8's
    /// deduplication and uniqueness checks (spec.md §3.2, §4.8.4).
    pub fn dedup_key(&self) -> (String, String) {
        (self.script_name.clone(), self.qualified_name.clone())
    }
}

/// One row of the incremental-build cache (spec.md §3.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: String,
    pub mtime: u64,
    pub content_hash: String,
    pub include_closure: Vec<String>,
    pub exported_symbols: Vec<String>,
    pub output_path: String,
    pub module: String,
    #[serde(default)]
    pub dirty: bool,
}

impl FileInfo {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mtime: 0,
            content_hash: String::new(),
            include_closure: Vec::new(),
            exported_symbols: Vec::new(),
            output_path: String::new(),
            module: String::new(),
            dirty: true,
        }
    }
}

/// One node of the file-level dependency graph (spec.md §3.1). An edge
/// A -> B means B is a dependency of A (A includes B); invalidating B
/// propagates to A through `dependents`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyNode {
    pub path: String,
    pub dependencies: BTreeSet<String>,
    pub dependents: BTreeSet<String>,
}

impl DependencyNode {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

/// Transient per-module grouping produced by C8 (spec.md §3.1). Never
/// persisted; lives only for the duration of one emission pass.
#[derive(Debug, Clone, Default)]
pub struct ModuleBundle {
    pub module_name: String,
    pub classes: IndexMap<String, Vec<ExportRecord>>,
    pub free_records: Vec<ExportRecord>,
    pub headers: BTreeSet<String>,
}

impl ModuleBundle {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: RecordKind) -> ExportRecord {
        ExportRecord::new(kind, "Foo", "foo.hpp", 1)
    }

    #[test]
    fn empty_cpp_name_is_invalid() {
        let mut r = record(RecordKind::Function);
        r.cpp_name.clear();
        assert_eq!(r.validate(), Err(HirError::EmptyCppName));
    }

    #[test]
    fn member_kind_requires_parent_class() {
        let r = record(RecordKind::Method);
        assert!(matches!(
            r.validate(),
            Err(HirError::MissingParentClass { .. })
        ));
    }

    #[test]
    fn qualified_name_must_be_prefixed_by_namespace() {
        let mut r = record(RecordKind::Function);
        r.cpp_namespace = "game".to_string();
        r.qualified_name = "other::Foo".to_string();
        assert!(matches!(
            r.validate(),
            Err(HirError::NamespaceMismatch { .. })
        ));
    }

    #[test]
    fn qualified_name_must_contain_parent_class_segment() {
        let mut r = record(RecordKind::Method);
        r.parent_class = "Calculator".to_string();
        r.qualified_name = "Other::add".to_string();
        assert!(matches!(
            r.validate(),
            Err(HirError::ParentClassMismatch { .. })
        ));
    }

    #[test]
    fn property_without_accessor_is_invalid() {
        let r = record(RecordKind::Property);
        assert!(matches!(
            r.validate(),
            Err(HirError::PropertyMissingAccessor { .. })
        ));
    }

    #[test]
    fn property_with_getter_is_valid() {
        let mut r = record(RecordKind::Property);
        r.getter_method = Some("getValue".to_string());
        r.qualified_name = "Foo".to_string();
        assert_eq!(r.validate(), Ok(()));
    }

    #[test]
    fn dedup_key_pairs_script_and_qualified_name() {
        let mut r = record(RecordKind::Function);
        r.script_name = "foo".to_string();
        r.qualified_name = "ns::Foo".to_string();
        assert_eq!(r.dedup_key(), ("foo".to_string(), "ns::Foo".to_string()));
    }

    #[test]
    fn annotation_kind_maps_to_record_kind_except_ignore() {
        assert_eq!(
            RecordKind::from_annotation(AnnotationKind::Class),
            Some(RecordKind::Class)
        );
        assert_eq!(RecordKind::from_annotation(AnnotationKind::Ignore), None);
    }
}
