//! Boundary to the bytecode importer.
//!
//! The importer itself is out of scope: it parses class files and hands over
//! raw, disconnected records that refer to other classes by name only. The
//! completion engine links those records into a [`JavaClasses`] snapshot.
//!
//! [`JavaClasses`]: crate::model::JavaClasses

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{FieldAccessType, JavaModifier, CONSTRUCTOR_NAME, OBJECT_CLASS_NAME, STATIC_INITIALIZER_NAME};

pub mod batch;
pub mod completion;

/// Supplies raw records for the classes of one import batch.
///
/// Every `create_*` method is keyed by the binary name of the owning class
/// and is invoked exactly once per class, during the completion phase that
/// needs it. The access methods are keyed by code unit and invoked during the
/// access phase.
pub trait ImportContext {
    fn imported_classes(&self) -> Vec<RawClassHeader>;

    fn create_super_class(&self, owner: &str) -> Option<RawType>;
    fn create_interfaces(&self, owner: &str) -> Vec<RawType>;
    fn create_type_parameters(&self, owner: &str) -> Vec<RawTypeParameter>;
    fn create_enclosing_class(&self, owner: &str) -> Option<String>;

    fn create_fields(&self, owner: &str) -> Vec<RawField>;
    fn create_methods(&self, owner: &str) -> Vec<RawCodeUnit>;
    fn create_constructors(&self, owner: &str) -> Vec<RawCodeUnit>;
    fn create_static_initializer(&self, owner: &str) -> Option<RawCodeUnit>;
    fn create_annotations(&self, owner: &str) -> Vec<RawAnnotation>;

    fn field_accesses_for(&self, code_unit: &CodeUnitKey) -> Vec<RawFieldAccess>;
    fn method_calls_for(&self, code_unit: &CodeUnitKey) -> Vec<RawCall>;
    fn constructor_calls_for(&self, code_unit: &CodeUnitKey) -> Vec<RawCall>;
    fn method_references_for(&self, code_unit: &CodeUnitKey) -> Vec<RawCall>;
    fn constructor_references_for(&self, code_unit: &CodeUnitKey) -> Vec<RawCall>;
}

/// Identifies a code unit towards the import context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CodeUnitKey {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
}

/// What the importer knows about a class before anything is linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawClassHeader {
    pub name: String,
    pub kind: ClassKind,
    pub modifiers: BTreeSet<JavaModifier>,
    pub source: Option<RawSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSource {
    pub uri: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Guards erasure against self-referential bounds such as `T extends T`.
const MAX_ERASURE_DEPTH: usize = 16;

/// A type as written in a generic signature, referring to classes by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawType {
    Class {
        name: String,
    },
    Parameterized {
        raw: String,
        #[serde(default)]
        arguments: Vec<RawType>,
    },
    Variable {
        name: String,
    },
    Wildcard {
        #[serde(default)]
        upper_bounds: Vec<RawType>,
        #[serde(default)]
        lower_bounds: Vec<RawType>,
    },
    GenericArray {
        component: Box<RawType>,
    },
}

impl RawType {
    pub fn class(name: impl Into<String>) -> Self {
        RawType::Class { name: name.into() }
    }

    pub fn parameterized(raw: impl Into<String>, arguments: Vec<RawType>) -> Self {
        RawType::Parameterized {
            raw: raw.into(),
            arguments,
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        RawType::Variable { name: name.into() }
    }

    /// `?`
    pub fn wildcard() -> Self {
        RawType::Wildcard {
            upper_bounds: Vec::new(),
            lower_bounds: Vec::new(),
        }
    }

    /// `? extends bound`
    pub fn wildcard_extends(bound: RawType) -> Self {
        RawType::Wildcard {
            upper_bounds: vec![bound],
            lower_bounds: Vec::new(),
        }
    }

    /// `? super bound`
    pub fn wildcard_super(bound: RawType) -> Self {
        RawType::Wildcard {
            upper_bounds: Vec::new(),
            lower_bounds: vec![bound],
        }
    }

    /// `component[]` where the component is generic, e.g. `T[]`.
    pub fn array(component: RawType) -> Self {
        RawType::GenericArray {
            component: Box::new(component),
        }
    }

    /// Name of the erased class.
    ///
    /// Type variables erase to the first bound of the innermost declaration
    /// found in `scopes`, and to `java.lang.Object` when unbounded or unknown.
    pub fn erased_name(&self, scopes: &[&[RawTypeParameter]]) -> String {
        self.erased_name_at_depth(scopes, 0)
    }

    fn erased_name_at_depth(&self, scopes: &[&[RawTypeParameter]], depth: usize) -> String {
        if depth > MAX_ERASURE_DEPTH {
            return OBJECT_CLASS_NAME.to_string();
        }
        let first_bound = |bounds: &[RawType]| {
            bounds
                .first()
                .map(|bound| bound.erased_name_at_depth(scopes, depth + 1))
                .unwrap_or_else(|| OBJECT_CLASS_NAME.to_string())
        };
        match self {
            RawType::Class { name } => name.clone(),
            RawType::Parameterized { raw, .. } => raw.clone(),
            RawType::GenericArray { component } => {
                format!("{}[]", component.erased_name_at_depth(scopes, depth + 1))
            }
            RawType::Variable { name } => {
                // Bounds are resolved from the declaring scope outward.
                let declared = scopes.iter().enumerate().find_map(|(index, scope)| {
                    scope
                        .iter()
                        .find(|parameter| parameter.name == *name)
                        .map(|parameter| (index, parameter))
                });
                match declared {
                    Some((index, parameter)) => parameter
                        .bounds
                        .first()
                        .map(|bound| bound.erased_name_at_depth(&scopes[index..], depth + 1))
                        .unwrap_or_else(|| OBJECT_CLASS_NAME.to_string()),
                    None => OBJECT_CLASS_NAME.to_string(),
                }
            }
            RawType::Wildcard { upper_bounds, .. } => first_bound(upper_bounds),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTypeParameter {
    pub name: String,
    #[serde(default)]
    pub bounds: Vec<RawType>,
}

impl RawTypeParameter {
    pub fn new(name: impl Into<String>, bounds: Vec<RawType>) -> Self {
        RawTypeParameter {
            name: name.into(),
            bounds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAnnotation {
    pub annotation_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, RawAnnotationValue>,
}

impl RawAnnotation {
    pub fn new(annotation_type: impl Into<String>) -> Self {
        RawAnnotation {
            annotation_type: annotation_type.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn property(mut self, name: impl Into<String>, value: RawAnnotationValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawAnnotationValue {
    Boolean(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// Class literal, by type name.
    Class(String),
    EnumConstant { enum_type: String, name: String },
    Annotation(RawAnnotation),
    Array(Vec<RawAnnotationValue>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawField {
    pub name: String,
    pub field_type: RawType,
    #[serde(default)]
    pub modifiers: BTreeSet<JavaModifier>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawParameter {
    pub parameter_type: RawType,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
}

/// A field access as recorded in bytecode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFieldAccess {
    pub owner: String,
    pub name: String,
    pub field_type: String,
    #[serde(default = "unknown_access_type")]
    pub access_type: FieldAccessType,
    #[serde(default)]
    pub line: u32,
}

fn unknown_access_type() -> FieldAccessType {
    FieldAccessType::Unknown
}

/// A call or member reference as recorded in bytecode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCall {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub parameter_types: Vec<String>,
    #[serde(default = "void_name")]
    pub return_type: String,
    #[serde(default)]
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTryCatchBlock {
    pub caught_types: Vec<String>,
    #[serde(default)]
    pub line: u32,
}

/// A type used inside a code unit body (`instanceof`, `Foo.class`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTypeUsage {
    pub type_name: String,
    #[serde(default)]
    pub line: u32,
}

fn void_name() -> String {
    "void".to_string()
}

fn void_type() -> RawType {
    RawType::class("void")
}

/// A method, constructor or static initializer with everything recorded
/// from its body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCodeUnit {
    pub name: String,
    /// Descriptor from the class file; derived from the signature if absent.
    #[serde(default)]
    pub descriptor: Option<String>,
    #[serde(default)]
    pub modifiers: BTreeSet<JavaModifier>,
    #[serde(default)]
    pub type_parameters: Vec<RawTypeParameter>,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    #[serde(default = "void_type")]
    pub return_type: RawType,
    #[serde(default)]
    pub throws: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
    #[serde(default)]
    pub first_line: u32,
    #[serde(default)]
    pub field_accesses: Vec<RawFieldAccess>,
    #[serde(default)]
    pub method_calls: Vec<RawCall>,
    #[serde(default)]
    pub constructor_calls: Vec<RawCall>,
    #[serde(default)]
    pub method_references: Vec<RawCall>,
    #[serde(default)]
    pub constructor_references: Vec<RawCall>,
    #[serde(default)]
    pub try_catch_blocks: Vec<RawTryCatchBlock>,
    #[serde(default)]
    pub instanceof_checks: Vec<RawTypeUsage>,
    #[serde(default)]
    pub class_object_references: Vec<RawTypeUsage>,
}

impl RawCodeUnit {
    fn named(name: &str, parameter_types: &[&str], return_type: RawType) -> Self {
        RawCodeUnit {
            name: name.to_string(),
            descriptor: None,
            modifiers: BTreeSet::new(),
            type_parameters: Vec::new(),
            parameters: parameter_types
                .iter()
                .map(|p| RawParameter {
                    parameter_type: RawType::class(*p),
                    annotations: Vec::new(),
                })
                .collect(),
            return_type,
            throws: Vec::new(),
            annotations: Vec::new(),
            first_line: 0,
            field_accesses: Vec::new(),
            method_calls: Vec::new(),
            constructor_calls: Vec::new(),
            method_references: Vec::new(),
            constructor_references: Vec::new(),
            try_catch_blocks: Vec::new(),
            instanceof_checks: Vec::new(),
            class_object_references: Vec::new(),
        }
    }

    pub fn method(name: &str, parameter_types: &[&str], return_type: &str) -> Self {
        Self::named(name, parameter_types, RawType::class(return_type))
    }

    pub fn constructor(parameter_types: &[&str]) -> Self {
        Self::named(CONSTRUCTOR_NAME, parameter_types, void_type())
    }

    pub fn static_initializer() -> Self {
        let mut code_unit = Self::named(STATIC_INITIALIZER_NAME, &[], void_type());
        code_unit.modifiers.insert(JavaModifier::Static);
        code_unit
    }

    pub fn modifiers(mut self, modifiers: &[JavaModifier]) -> Self {
        self.modifiers.extend(modifiers.iter().copied());
        self
    }

    pub fn line(mut self, first_line: u32) -> Self {
        self.first_line = first_line;
        self
    }

    pub fn type_parameter(mut self, parameter: RawTypeParameter) -> Self {
        self.type_parameters.push(parameter);
        self
    }

    pub fn parameter(mut self, parameter_type: RawType) -> Self {
        self.parameters.push(RawParameter {
            parameter_type,
            annotations: Vec::new(),
        });
        self
    }

    /// Annotate the parameter at `index`; ignored if there is no such parameter.
    pub fn parameter_annotation(mut self, index: usize, annotation: RawAnnotation) -> Self {
        if let Some(parameter) = self.parameters.get_mut(index) {
            parameter.annotations.push(annotation);
        }
        self
    }

    pub fn returns(mut self, return_type: RawType) -> Self {
        self.return_type = return_type;
        self
    }

    pub fn throws(mut self, exception: &str) -> Self {
        self.throws.push(exception.to_string());
        self
    }

    pub fn annotation(mut self, annotation: RawAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn gets_field(self, owner: &str, name: &str, field_type: &str, line: u32) -> Self {
        self.accesses_field(owner, name, field_type, FieldAccessType::Get, line)
    }

    pub fn sets_field(self, owner: &str, name: &str, field_type: &str, line: u32) -> Self {
        self.accesses_field(owner, name, field_type, FieldAccessType::Set, line)
    }

    pub fn accesses_field(
        mut self,
        owner: &str,
        name: &str,
        field_type: &str,
        access_type: FieldAccessType,
        line: u32,
    ) -> Self {
        self.field_accesses.push(RawFieldAccess {
            owner: owner.to_string(),
            name: name.to_string(),
            field_type: field_type.to_string(),
            access_type,
            line,
        });
        self
    }

    pub fn calls(
        mut self,
        owner: &str,
        name: &str,
        parameter_types: &[&str],
        return_type: &str,
        line: u32,
    ) -> Self {
        self.method_calls
            .push(raw_call(owner, name, parameter_types, return_type, line));
        self
    }

    pub fn calls_constructor(mut self, owner: &str, parameter_types: &[&str], line: u32) -> Self {
        self.constructor_calls
            .push(raw_call(owner, CONSTRUCTOR_NAME, parameter_types, "void", line));
        self
    }

    pub fn references_method(
        mut self,
        owner: &str,
        name: &str,
        parameter_types: &[&str],
        return_type: &str,
        line: u32,
    ) -> Self {
        self.method_references
            .push(raw_call(owner, name, parameter_types, return_type, line));
        self
    }

    pub fn references_constructor(
        mut self,
        owner: &str,
        parameter_types: &[&str],
        line: u32,
    ) -> Self {
        self.constructor_references
            .push(raw_call(owner, CONSTRUCTOR_NAME, parameter_types, "void", line));
        self
    }

    pub fn catches(mut self, caught_types: &[&str], line: u32) -> Self {
        self.try_catch_blocks.push(RawTryCatchBlock {
            caught_types: caught_types.iter().map(|t| t.to_string()).collect(),
            line,
        });
        self
    }

    pub fn checks_instanceof(mut self, type_name: &str, line: u32) -> Self {
        self.instanceof_checks.push(RawTypeUsage {
            type_name: type_name.to_string(),
            line,
        });
        self
    }

    pub fn references_class_object(mut self, type_name: &str, line: u32) -> Self {
        self.class_object_references.push(RawTypeUsage {
            type_name: type_name.to_string(),
            line,
        });
        self
    }

    /// Type-variable scopes of this code unit, innermost first, followed by
    /// `class_scopes` (declaring class, then enclosing classes).
    fn scopes<'s>(&'s self, class_scopes: &[&'s [RawTypeParameter]]) -> Vec<&'s [RawTypeParameter]> {
        std::iter::once(self.type_parameters.as_slice())
            .chain(class_scopes.iter().copied())
            .collect()
    }

    /// Erased parameter type names, as used for signatures and full names.
    pub fn erased_parameter_names(&self, class_scopes: &[&[RawTypeParameter]]) -> Vec<String> {
        let scopes = self.scopes(class_scopes);
        self.parameters
            .iter()
            .map(|p| p.parameter_type.erased_name(&scopes))
            .collect()
    }

    /// JVM method descriptor over the erased signature, unless the importer
    /// recorded one.
    pub fn descriptor_in(&self, class_scopes: &[&[RawTypeParameter]]) -> String {
        if let Some(descriptor) = &self.descriptor {
            return descriptor.clone();
        }
        let return_type = self.return_type.erased_name(&self.scopes(class_scopes));
        method_descriptor(&self.erased_parameter_names(class_scopes), &return_type)
    }

    /// Descriptor with only the code unit's own type parameters in scope.
    pub fn descriptor(&self) -> String {
        self.descriptor_in(&[])
    }

    pub fn key(&self, owner: &str, class_scopes: &[&[RawTypeParameter]]) -> CodeUnitKey {
        CodeUnitKey {
            owner: owner.to_string(),
            name: self.name.clone(),
            descriptor: self.descriptor_in(class_scopes),
        }
    }
}

fn raw_call(owner: &str, name: &str, parameter_types: &[&str], return_type: &str, line: u32) -> RawCall {
    RawCall {
        owner: owner.to_string(),
        name: name.to_string(),
        parameter_types: parameter_types.iter().map(|p| p.to_string()).collect(),
        return_type: return_type.to_string(),
        line,
    }
}

/// `(Ljava/lang/String;I)V` for `(java.lang.String, int) -> void`.
pub fn method_descriptor<S: AsRef<str>>(parameter_types: &[S], return_type: &str) -> String {
    let parameters: String = parameter_types
        .iter()
        .map(|p| type_descriptor(p.as_ref()))
        .collect();
    format!("({}){}", parameters, type_descriptor(return_type))
}

/// JVM field descriptor of a type name.
pub fn type_descriptor(name: &str) -> String {
    if let Some(component) = name.strip_suffix("[]") {
        return format!("[{}", type_descriptor(component));
    }
    if name.starts_with('[') {
        return name.replace('.', "/");
    }
    let primitive = match name {
        "boolean" => "Z",
        "byte" => "B",
        "char" => "C",
        "short" => "S",
        "int" => "I",
        "long" => "J",
        "float" => "F",
        "double" => "D",
        "void" => "V",
        _ => return format!("L{};", name.replace('.', "/")),
    };
    primitive.to_string()
}

/// Raw record of one class, as produced by the importer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawClass {
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default)]
    pub modifiers: BTreeSet<JavaModifier>,
    /// Defaults to `java.lang.Object` for classes; interfaces have none.
    #[serde(default)]
    pub superclass: Option<RawType>,
    #[serde(default)]
    pub interfaces: Vec<RawType>,
    #[serde(default)]
    pub type_parameters: Vec<RawTypeParameter>,
    #[serde(default)]
    pub enclosing_class: Option<String>,
    #[serde(default)]
    pub source: Option<RawSource>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
    #[serde(default)]
    pub fields: Vec<RawField>,
    #[serde(default)]
    pub methods: Vec<RawCodeUnit>,
    #[serde(default)]
    pub constructors: Vec<RawCodeUnit>,
    #[serde(default)]
    pub static_initializer: Option<RawCodeUnit>,
}

impl RawClass {
    fn of_kind(name: &str, kind: ClassKind) -> Self {
        RawClass {
            name: name.to_string(),
            kind,
            modifiers: BTreeSet::from([JavaModifier::Public]),
            superclass: None,
            interfaces: Vec::new(),
            type_parameters: Vec::new(),
            enclosing_class: None,
            source: None,
            annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            static_initializer: None,
        }
    }

    pub fn new(name: &str) -> Self {
        Self::of_kind(name, ClassKind::Class)
    }

    pub fn interface(name: &str) -> Self {
        let mut class = Self::of_kind(name, ClassKind::Interface);
        class.modifiers.insert(JavaModifier::Abstract);
        class
    }

    pub fn enumeration(name: &str) -> Self {
        let mut class = Self::of_kind(name, ClassKind::Enum);
        class.modifiers.extend([JavaModifier::Final, JavaModifier::Enum]);
        class.superclass = Some(RawType::parameterized("java.lang.Enum", vec![RawType::class(name)]));
        class
    }

    pub fn annotation_type(name: &str) -> Self {
        let mut class = Self::of_kind(name, ClassKind::Annotation);
        class.modifiers.insert(JavaModifier::Abstract);
        class
            .interfaces
            .push(RawType::class("java.lang.annotation.Annotation"));
        class
    }

    pub fn record(name: &str) -> Self {
        let mut class = Self::of_kind(name, ClassKind::Record);
        class.modifiers.insert(JavaModifier::Final);
        class.superclass = Some(RawType::class("java.lang.Record"));
        class
    }

    pub fn modifiers(mut self, modifiers: &[JavaModifier]) -> Self {
        self.modifiers = modifiers.iter().copied().collect();
        self
    }

    pub fn extends(self, superclass: &str) -> Self {
        self.extends_type(RawType::class(superclass))
    }

    pub fn extends_type(mut self, superclass: RawType) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn implements(self, interface: &str) -> Self {
        self.implements_type(RawType::class(interface))
    }

    pub fn implements_type(mut self, interface: RawType) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn type_parameter(mut self, parameter: RawTypeParameter) -> Self {
        self.type_parameters.push(parameter);
        self
    }

    pub fn enclosed_in(mut self, enclosing_class: &str) -> Self {
        self.enclosing_class = Some(enclosing_class.to_string());
        self
    }

    pub fn source(mut self, uri: &str, file_name: Option<&str>) -> Self {
        self.source = Some(RawSource {
            uri: uri.to_string(),
            file_name: file_name.map(str::to_string),
        });
        self
    }

    pub fn annotation(mut self, annotation: RawAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn field(self, name: &str, field_type: RawType) -> Self {
        self.field_with_modifiers(name, field_type, &[JavaModifier::Private])
    }

    pub fn field_with_modifiers(
        mut self,
        name: &str,
        field_type: RawType,
        modifiers: &[JavaModifier],
    ) -> Self {
        self.fields.push(RawField {
            name: name.to_string(),
            field_type,
            modifiers: modifiers.iter().copied().collect(),
            annotations: Vec::new(),
        });
        self
    }

    pub fn annotated_field(mut self, field: RawField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: RawCodeUnit) -> Self {
        self.methods.push(method);
        self
    }

    pub fn constructor(mut self, constructor: RawCodeUnit) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn static_initializer(mut self, static_initializer: RawCodeUnit) -> Self {
        self.static_initializer = Some(static_initializer);
        self
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, ClassKind::Interface | ClassKind::Annotation)
    }

    /// The declared superclass, or `java.lang.Object` for classes that do
    /// not name one. Interfaces and `java.lang.Object` itself have none.
    pub fn effective_superclass(&self) -> Option<RawType> {
        if self.superclass.is_some() {
            return self.superclass.clone();
        }
        if self.is_interface() || self.name == OBJECT_CLASS_NAME {
            return None;
        }
        Some(RawType::class(OBJECT_CLASS_NAME))
    }

    pub fn header(&self) -> RawClassHeader {
        RawClassHeader {
            name: self.name.clone(),
            kind: self.kind,
            modifiers: self.modifiers.clone(),
            source: self.source.clone(),
        }
    }

    /// All code units: constructors, methods and the static initializer.
    pub fn code_units(&self) -> impl Iterator<Item = &RawCodeUnit> {
        self.constructors
            .iter()
            .chain(&self.methods)
            .chain(self.static_initializer.iter())
    }
}
