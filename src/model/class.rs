use std::collections::BTreeSet;

use super::annotation::JavaAnnotation;
use super::types::JavaType;
use super::{ClassId, JavaModifier, MemberId, Source, TypeVariableId};

/// A class, interface, enum, annotation, record, array or primitive type.
///
/// Classes referenced by the imported bytecode but not part of the import
/// batch exist as stubs: they carry name information only and
/// `fully_imported` is `false`.
#[derive(Debug, Clone)]
pub struct JavaClass {
    pub id: ClassId,
    /// Binary name; arrays use the class-file form (`[Ljava.lang.String;`).
    pub name: String,
    /// Canonical name (`java.lang.String[]` for arrays).
    pub full_name: String,
    pub simple_name: String,
    pub package_name: String,
    pub modifiers: BTreeSet<JavaModifier>,
    pub is_interface: bool,
    pub is_enum: bool,
    pub is_annotation: bool,
    pub is_record: bool,
    pub is_array: bool,
    pub is_primitive: bool,
    pub fully_imported: bool,
    pub component_type: Option<ClassId>,
    pub superclass: Option<JavaType>,
    pub interfaces: Vec<JavaType>,
    pub type_parameters: Vec<TypeVariableId>,
    /// Direct subclasses and implementations, populated during completion.
    pub subclasses: Vec<ClassId>,
    pub enclosing_class: Option<ClassId>,
    pub members: Vec<MemberId>,
    pub annotations: Vec<JavaAnnotation>,
    pub source: Option<Source>,
}

impl JavaClass {
    pub(crate) fn stub(
        id: ClassId,
        descriptor: &super::descriptor::TypeDescriptor,
        component_type: Option<ClassId>,
    ) -> Self {
        JavaClass {
            id,
            name: descriptor.name().to_string(),
            full_name: descriptor.full_name().to_string(),
            simple_name: descriptor.simple_name().to_string(),
            package_name: descriptor.package_name().to_string(),
            modifiers: BTreeSet::new(),
            is_interface: false,
            is_enum: false,
            is_annotation: false,
            is_record: false,
            is_array: descriptor.is_array(),
            is_primitive: descriptor.is_primitive(),
            fully_imported: false,
            component_type,
            superclass: None,
            interfaces: Vec::new(),
            type_parameters: Vec::new(),
            subclasses: Vec::new(),
            enclosing_class: None,
            members: Vec::new(),
            annotations: Vec::new(),
            source: None,
        }
    }

    pub fn has_modifier(&self, modifier: JavaModifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_top_level(&self) -> bool {
        self.enclosing_class.is_none()
    }

    pub fn is_nested(&self) -> bool {
        self.enclosing_class.is_some()
    }

    /// Nested and not static.
    pub fn is_inner(&self) -> bool {
        self.is_nested() && !self.has_modifier(JavaModifier::Static)
    }

    pub fn is_anonymous(&self) -> bool {
        self.is_nested() && self.simple_name.is_empty()
    }

    /// Declared inside a code block, e.g. `Outer$1Local`.
    pub fn is_local(&self) -> bool {
        if !self.is_nested() || self.simple_name.is_empty() {
            return false;
        }
        let after_dollar = match self.name.rfind('$') {
            Some(pos) => &self.name[pos + 1..],
            None => return false,
        };
        after_dollar
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    }

    /// The raw superclass, i.e. the erasure of a possibly generic superclass.
    pub fn raw_superclass(&self) -> Option<ClassId> {
        self.superclass.as_ref().and_then(raw_class_of)
    }

    /// Raw interfaces, in declaration order.
    pub fn raw_interfaces(&self) -> Vec<ClassId> {
        self.interfaces.iter().filter_map(raw_class_of).collect()
    }

    /// Simple name of the outermost enclosing class, derived from the name.
    pub(crate) fn outermost_simple_name(&self) -> &str {
        let after_package = match self.name.rfind('.') {
            Some(pos) => &self.name[pos + 1..],
            None => self.name.as_str(),
        };
        match after_package.find('$') {
            Some(pos) if pos > 0 => &after_package[..pos],
            _ => after_package,
        }
    }

    /// File name used for source code locations.
    pub fn source_file_name(&self) -> String {
        self.source
            .as_ref()
            .and_then(|source| source.file_name.clone())
            .unwrap_or_else(|| format!("{}.java", self.outermost_simple_name()))
    }

    pub fn description(&self) -> String {
        format!("Class <{}>", self.name)
    }
}

/// Supertypes are always classes or parameterized classes.
fn raw_class_of(ty: &JavaType) -> Option<ClassId> {
    match ty {
        JavaType::Class(id) => Some(*id),
        JavaType::Parameterized(p) => Some(p.raw),
        JavaType::GenericArray(_) | JavaType::TypeVariable(_) | JavaType::Wildcard(_) => None,
    }
}

impl PartialEq for JavaClass {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for JavaClass {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::descriptor::TypeDescriptorRegistry;

    fn stub(name: &str) -> JavaClass {
        let mut registry = TypeDescriptorRegistry::new();
        let descriptor = registry.descriptor_for(name).unwrap();
        JavaClass::stub(ClassId(0), &descriptor, None)
    }

    #[test]
    fn test_stub_is_not_fully_imported() {
        let class = stub("com.example.Foo");
        assert!(!class.fully_imported);
        assert!(class.is_top_level());
        assert_eq!(class.simple_name, "Foo");
        assert_eq!(class.package_name, "com.example");
    }

    #[test]
    fn test_nested_classification() {
        let mut anonymous = stub("com.example.Outer$1");
        anonymous.enclosing_class = Some(ClassId(1));
        assert!(anonymous.is_anonymous());
        assert!(!anonymous.is_local());
        assert!(anonymous.is_inner());

        let mut local = stub("com.example.Outer$1Helper");
        local.enclosing_class = Some(ClassId(1));
        assert!(local.is_local());
        assert!(!local.is_anonymous());

        let mut nested = stub("com.example.Outer$Inner");
        nested.enclosing_class = Some(ClassId(1));
        nested.modifiers.insert(JavaModifier::Static);
        assert!(nested.is_nested());
        assert!(!nested.is_inner());
        assert!(!nested.is_local());
    }

    #[test]
    fn test_source_file_name_fallback() {
        let class = stub("com.example.Outer$Inner");
        assert_eq!(class.source_file_name(), "Outer.java");

        let mut with_source = stub("com.example.Outer$Inner");
        with_source.source = Some(Source::new("jar:foo.jar!/Outer.class", Some("Outer.kt".to_string()), false));
        assert_eq!(with_source.source_file_name(), "Outer.kt");
    }
}
