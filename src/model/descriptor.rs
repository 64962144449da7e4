use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ModelError, ReflectionError, Result};
use crate::reflect::{RuntimeClass, RuntimeClasspath};

/// Java primitive names paired with their JVM descriptor characters.
const PRIMITIVES: &[(&str, char)] = &[
    ("boolean", 'Z'),
    ("byte", 'B'),
    ("char", 'C'),
    ("short", 'S'),
    ("int", 'I'),
    ("long", 'J'),
    ("float", 'F'),
    ("double", 'D'),
    ("void", 'V'),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    Primitive,
    Array,
    Object,
}

/// Parsed form of a type name as it appears in bytecode or source.
///
/// Array names are always kept in the JVM class-file form
/// (`[Ljava.lang.Object;`), regardless of which form was looked up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    name: String,
    full_name: String,
    simple_name: String,
    package_name: String,
    kind: DescriptorKind,
    component: Option<Arc<TypeDescriptor>>,
}

impl TypeDescriptor {
    /// Binary name; class-file form for arrays.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical name, e.g. `java.lang.Object[]` for arrays.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn kind(&self) -> DescriptorKind {
        self.kind
    }

    pub fn is_primitive(&self) -> bool {
        self.kind == DescriptorKind::Primitive
    }

    pub fn is_array(&self) -> bool {
        self.kind == DescriptorKind::Array
    }

    pub fn component_type(&self) -> Option<&Arc<TypeDescriptor>> {
        self.component.as_ref()
    }

    /// Innermost element type of a (possibly nested) array, or `self`.
    pub fn base_component_type(&self) -> &TypeDescriptor {
        let mut current = self;
        while let Some(component) = &current.component {
            current = component;
        }
        current
    }

    /// Load this type from a runtime classpath.
    ///
    /// This is the only side-effecting operation on a descriptor and is never
    /// invoked while the domain model is being built.
    pub fn resolve_class(
        &self,
        classpath: &dyn RuntimeClasspath,
    ) -> std::result::Result<RuntimeClass, ReflectionError> {
        classpath
            .load_class(&self.name)
            .ok_or_else(|| ReflectionError::ClassNotFound(self.name.clone()))
    }

    fn primitive(name: &str) -> Self {
        TypeDescriptor {
            name: name.to_string(),
            full_name: name.to_string(),
            simple_name: name.to_string(),
            package_name: "java.lang".to_string(),
            kind: DescriptorKind::Primitive,
            component: None,
        }
    }

    fn object(name: &str) -> Self {
        let package_name = match name.rfind('.') {
            Some(pos) => name[..pos].to_string(),
            None => String::new(),
        };
        TypeDescriptor {
            name: name.to_string(),
            full_name: name.to_string(),
            simple_name: simple_name_of(name),
            package_name,
            kind: DescriptorKind::Object,
            component: None,
        }
    }

    fn array(component: Arc<TypeDescriptor>) -> Self {
        let name = match component.kind {
            DescriptorKind::Array => format!("[{}", component.name),
            DescriptorKind::Primitive => format!("[{}", primitive_descriptor(&component.name)),
            DescriptorKind::Object => format!("[L{};", component.name),
        };
        TypeDescriptor {
            name,
            full_name: format!("{}[]", component.full_name),
            simple_name: format!("{}[]", component.simple_name),
            package_name: component.package_name.clone(),
            kind: DescriptorKind::Array,
            component: Some(component),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Interning registry for type descriptors.
#[derive(Debug, Default)]
pub struct TypeDescriptorRegistry {
    cache: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeDescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up (or create) the descriptor for a type name.
    ///
    /// Accepts Java names (`int`, `java.lang.String`, `java.lang.String[]`),
    /// JVM array names (`[[I`, `[Ljava.lang.String;`) and internal names with
    /// `/` separators. A bare `B` is the default-package class `B`; use
    /// [`Self::descriptor_for_primitive_code`] for primitive codes.
    pub fn descriptor_for(&mut self, name: &str) -> Result<Arc<TypeDescriptor>> {
        if let Some(cached) = self.cache.get(name) {
            return Ok(cached.clone());
        }

        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidTypeName(name.to_string()));
        }

        let descriptor = if let Some(primitive) = primitive_name(trimmed) {
            Arc::new(TypeDescriptor::primitive(primitive))
        } else if let Some(component) = trimmed.strip_suffix("[]") {
            let component = self.descriptor_for(component)?;
            self.array_of(&component)
        } else if let Some(rest) = trimmed.strip_prefix('[') {
            let component = self.jvm_component(name, rest)?;
            self.array_of(&component)
        } else {
            let normalized = trimmed.replace('/', ".");
            if normalized.starts_with('.') || normalized.ends_with('.') {
                return Err(ModelError::InvalidTypeName(name.to_string()));
            }
            match self.cache.get(&normalized) {
                Some(existing) => existing.clone(),
                None => Arc::new(TypeDescriptor::object(&normalized)),
            }
        };

        self.cache
            .entry(descriptor.name.clone())
            .or_insert_with(|| descriptor.clone());
        self.cache.insert(name.to_string(), descriptor.clone());
        Ok(descriptor)
    }

    /// Descriptor of the one-dimensional array whose element type is `component`.
    pub fn array_of(&mut self, component: &Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
        let array = TypeDescriptor::array(component.clone());
        self.cache
            .entry(array.name.clone())
            .or_insert_with(|| Arc::new(array))
            .clone()
    }

    /// Previously interned descriptor, without creating one.
    pub fn get(&self, name: &str) -> Option<&Arc<TypeDescriptor>> {
        self.cache.get(name)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn jvm_component(&mut self, original: &str, rest: &str) -> Result<Arc<TypeDescriptor>> {
        if rest.starts_with('[') {
            return self.descriptor_for(rest);
        }
        if let Some(object) = rest.strip_prefix('L').and_then(|r| r.strip_suffix(';')) {
            return self.descriptor_for(object);
        }
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c != 'V' => self
                .descriptor_for_primitive_code(c)
                .map_err(|_| ModelError::InvalidTypeName(original.to_string())),
            _ => Err(ModelError::InvalidTypeName(original.to_string())),
        }
    }

    /// Descriptor of the primitive with the JVM code `c` (`I` is `int`).
    pub fn descriptor_for_primitive_code(&mut self, c: char) -> Result<Arc<TypeDescriptor>> {
        match primitive_for_descriptor(c) {
            Some(java) => self.descriptor_for(java),
            None => Err(ModelError::InvalidTypeName(c.to_string())),
        }
    }
}

fn primitive_name(name: &str) -> Option<&'static str> {
    PRIMITIVES
        .iter()
        .find(|(java, _)| *java == name)
        .map(|(java, _)| *java)
}

fn primitive_for_descriptor(c: char) -> Option<&'static str> {
    PRIMITIVES
        .iter()
        .find(|(_, descriptor)| *descriptor == c)
        .map(|(java, _)| *java)
}

fn primitive_descriptor(java_name: &str) -> char {
    PRIMITIVES
        .iter()
        .find(|(java, _)| *java == java_name)
        .map(|(_, descriptor)| *descriptor)
        .unwrap_or('V')
}

/// Simple name of a binary class name.
///
/// Takes the segment after the last `.` and the last `$`, then drops leading
/// characters until a valid identifier start. Anonymous classes (`Outer$1`)
/// therefore get an empty simple name, local classes (`Outer$1Local`) keep
/// their declared name.
pub fn simple_name_of(name: &str) -> String {
    let after_dot = match name.rfind('.') {
        Some(pos) => &name[pos + 1..],
        None => name,
    };
    let candidate = match after_dot.rfind('$') {
        Some(pos) => &after_dot[pos + 1..],
        None => after_dot,
    };
    match candidate.char_indices().find(|(_, c)| is_identifier_start(*c)) {
        Some((idx, _)) => candidate[idx..].to_string(),
        None => String::new(),
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_by_name_and_descriptor() {
        let mut registry = TypeDescriptorRegistry::new();
        let by_name = registry.descriptor_for("int").unwrap();
        let by_descriptor = registry.descriptor_for_primitive_code('I').unwrap();
        assert!(by_name.is_primitive());
        assert_eq!(by_name, by_descriptor);
        assert_eq!(by_name.package_name(), "java.lang");
        assert!(by_name.component_type().is_none());

        let void = registry.descriptor_for_primitive_code('V').unwrap();
        assert_eq!(void.name(), "void");
        assert!(registry.descriptor_for_primitive_code('Q').is_err());
    }

    #[test]
    fn test_single_letter_default_package_classes_are_objects() {
        let mut registry = TypeDescriptorRegistry::new();
        for name in ["B", "C", "D", "F", "I", "J", "S", "Z", "V"] {
            let descriptor = registry.descriptor_for(name).unwrap();
            assert!(!descriptor.is_primitive(), "{}", name);
            assert_eq!(descriptor.name(), name);
            assert_eq!(descriptor.package_name(), "");
        }
        let ints = registry.descriptor_for("[I").unwrap();
        assert_eq!(ints.component_type().unwrap().name(), "int");
        assert!(ints.component_type().unwrap().is_primitive());
    }

    #[test]
    fn test_canonical_array_normalized_to_jvm_form() {
        let mut registry = TypeDescriptorRegistry::new();
        let canonical = registry.descriptor_for("java.lang.Object[]").unwrap();
        let jvm = registry.descriptor_for("[Ljava.lang.Object;").unwrap();
        assert_eq!(canonical.name(), "[Ljava.lang.Object;");
        assert_eq!(canonical.full_name(), "java.lang.Object[]");
        assert!(Arc::ptr_eq(&canonical, &jvm));
    }

    #[test]
    fn test_nested_primitive_array_components() {
        let mut registry = TypeDescriptorRegistry::new();
        let matrix = registry.descriptor_for("int[][]").unwrap();
        assert_eq!(matrix.name(), "[[I");
        let row = matrix.component_type().unwrap();
        assert_eq!(row.name(), "[I");
        assert_eq!(row.component_type().unwrap().name(), "int");
        assert_eq!(matrix.base_component_type().name(), "int");
        assert_eq!(matrix.simple_name(), "int[][]");
    }

    #[test]
    fn test_array_of_round_trips_through_cache() {
        let mut registry = TypeDescriptorRegistry::new();
        let string = registry.descriptor_for("java.lang.String").unwrap();
        let array = registry.array_of(&string);
        assert_eq!(array.name(), "[Ljava.lang.String;");
        assert_eq!(array.package_name(), "java.lang");
        let looked_up = registry.descriptor_for("java.lang.String[]").unwrap();
        assert!(Arc::ptr_eq(&array, &looked_up));
    }

    #[test]
    fn test_object_names() {
        let mut registry = TypeDescriptorRegistry::new();
        let inner = registry.descriptor_for("com/example/Outer$Inner").unwrap();
        assert_eq!(inner.name(), "com.example.Outer$Inner");
        assert_eq!(inner.simple_name(), "Inner");
        assert_eq!(inner.package_name(), "com.example");

        let default_package = registry.descriptor_for("Foo").unwrap();
        assert_eq!(default_package.package_name(), "");
    }

    #[test]
    fn test_simple_names_of_anonymous_and_local_classes() {
        assert_eq!(simple_name_of("com.example.Outer$1"), "");
        assert_eq!(simple_name_of("com.example.Outer$1Local"), "Local");
        assert_eq!(simple_name_of("com.example.Outer"), "Outer");
        assert_eq!(simple_name_of("Outer$Inner$Deeper"), "Deeper");
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut registry = TypeDescriptorRegistry::new();
        assert!(matches!(
            registry.descriptor_for(""),
            Err(ModelError::InvalidTypeName(_))
        ));
        assert!(registry.descriptor_for("[Q").is_err());
        assert!(registry.descriptor_for("[V").is_err());
        assert!(registry.descriptor_for("com.example.").is_err());
    }
}
