use std::collections::BTreeMap;

use crate::config::{AnnotationFormat, ArrayStyle};

use super::classes::JavaClasses;
use super::{ClassId, MemberId};

/// The element an annotation is declared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotatedElement {
    Class(ClassId),
    Member(MemberId),
    Parameter { member: MemberId, index: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct JavaAnnotation {
    pub annotation_type: ClassId,
    pub owner: AnnotatedElement,
    pub properties: BTreeMap<String, AnnotationValue>,
}

/// Value of an annotation property.
///
/// Replaces dynamically generated annotation proxies: consumers read the
/// union directly or convert it with the `TryFrom` impls below.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Boolean(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Class(ClassId),
    EnumConstant { enum_type: ClassId, name: String },
    Annotation(Box<JavaAnnotation>),
    Array(Vec<AnnotationValue>),
}

impl JavaAnnotation {
    pub fn get(&self, property: &str) -> Option<&AnnotationValue> {
        self.properties.get(property)
    }

    /// The conventional `value` property.
    pub fn value(&self) -> Option<&AnnotationValue> {
        self.get("value")
    }

    /// Calls `visit` for every type referenced from property values:
    /// class literals, enum types and nested annotation types, recursively.
    pub fn visit_member_types(&self, visit: &mut impl FnMut(ClassId)) {
        for value in self.properties.values() {
            value.visit_types(visit);
        }
    }
}

impl AnnotationValue {
    fn visit_types(&self, visit: &mut impl FnMut(ClassId)) {
        match self {
            AnnotationValue::Class(id) => visit(*id),
            AnnotationValue::EnumConstant { enum_type, .. } => visit(*enum_type),
            AnnotationValue::Annotation(nested) => {
                visit(nested.annotation_type);
                nested.visit_member_types(visit);
            }
            AnnotationValue::Array(values) => {
                for value in values {
                    value.visit_types(visit);
                }
            }
            _ => {}
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<ClassId> {
        match self {
            AnnotationValue::Class(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[AnnotationValue]> {
        match self {
            AnnotationValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&JavaAnnotation> {
        match self {
            AnnotationValue::Annotation(nested) => Some(nested),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            AnnotationValue::Boolean(_) => "boolean",
            AnnotationValue::Byte(_) => "byte",
            AnnotationValue::Char(_) => "char",
            AnnotationValue::Short(_) => "short",
            AnnotationValue::Int(_) => "int",
            AnnotationValue::Long(_) => "long",
            AnnotationValue::Float(_) => "float",
            AnnotationValue::Double(_) => "double",
            AnnotationValue::String(_) => "string",
            AnnotationValue::Class(_) => "class",
            AnnotationValue::EnumConstant { .. } => "enum constant",
            AnnotationValue::Annotation(_) => "annotation",
            AnnotationValue::Array(_) => "array",
        }
    }
}

macro_rules! value_conversion {
    ($target:ty, $variant:ident, $expected:literal) => {
        impl TryFrom<&AnnotationValue> for $target {
            type Error = String;

            fn try_from(value: &AnnotationValue) -> Result<Self, Self::Error> {
                match value {
                    AnnotationValue::$variant(inner) => Ok(inner.clone()),
                    other => Err(format!(
                        "expected {} annotation value, got {}",
                        $expected,
                        other.type_name()
                    )),
                }
            }
        }
    };
}

value_conversion!(bool, Boolean, "boolean");
value_conversion!(i8, Byte, "byte");
value_conversion!(char, Char, "char");
value_conversion!(i16, Short, "short");
value_conversion!(i32, Int, "int");
value_conversion!(i64, Long, "long");
value_conversion!(f32, Float, "float");
value_conversion!(f64, Double, "double");
value_conversion!(String, String, "string");
value_conversion!(ClassId, Class, "class");

/// Renders annotations as Java-like source text.
///
/// The rendering style comes from the configuration handed in at
/// construction; there is no process-wide formatter setting.
#[derive(Debug, Clone, Default)]
pub struct AnnotationFormatter {
    format: AnnotationFormat,
}

impl AnnotationFormatter {
    pub fn new(format: AnnotationFormat) -> Self {
        Self { format }
    }

    /// E.g. `@com.example.Marker(type=com.example.Foo.class)`.
    pub fn format(&self, annotation: &JavaAnnotation, classes: &JavaClasses) -> String {
        let type_name = &classes.class(annotation.annotation_type).name;
        if annotation.properties.is_empty() {
            return format!("@{}", type_name);
        }

        let only_value = annotation.properties.len() == 1 && annotation.value().is_some();
        let properties: Vec<String> = if only_value && self.format.omit_single_value_name {
            annotation
                .properties
                .values()
                .map(|value| self.format_value(value, classes))
                .collect()
        } else {
            annotation
                .properties
                .iter()
                .map(|(name, value)| format!("{}={}", name, self.format_value(value, classes)))
                .collect()
        };
        format!("@{}({})", type_name, properties.join(", "))
    }

    pub fn format_value(&self, value: &AnnotationValue, classes: &JavaClasses) -> String {
        match value {
            AnnotationValue::Boolean(b) => b.to_string(),
            AnnotationValue::Byte(b) => b.to_string(),
            AnnotationValue::Char(c) => format!("'{}'", c),
            AnnotationValue::Short(s) => s.to_string(),
            AnnotationValue::Int(i) => i.to_string(),
            AnnotationValue::Long(l) => l.to_string(),
            AnnotationValue::Float(f) => f.to_string(),
            AnnotationValue::Double(d) => d.to_string(),
            AnnotationValue::String(s) if self.format.quote_strings => format!("\"{}\"", s),
            AnnotationValue::String(s) => s.clone(),
            AnnotationValue::Class(id) => {
                format!("{}{}", classes.class(*id).full_name, self.format.class_suffix)
            }
            AnnotationValue::EnumConstant { enum_type, name } => {
                format!("{}.{}", classes.class(*enum_type).name, name)
            }
            AnnotationValue::Annotation(nested) => self.format(nested, classes),
            AnnotationValue::Array(values) => {
                let items: Vec<String> = values
                    .iter()
                    .map(|value| self.format_value(value, classes))
                    .collect();
                match self.format.array_style {
                    ArrayStyle::Curly => format!("{{{}}}", items.join(", ")),
                    ArrayStyle::Square => format!("[{}]", items.join(", ")),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::batch::ImportBatch;
    use crate::import::completion::CompletionEngine;
    use crate::import::{RawAnnotation, RawAnnotationValue, RawClass};

    fn annotated_batch() -> ImportBatch {
        ImportBatch::new().with_class(
            RawClass::new("com.example.Service").annotation(
                RawAnnotation::new("com.example.Marker")
                    .property("type", RawAnnotationValue::Class("com.example.Foo".into()))
                    .property(
                        "names",
                        RawAnnotationValue::Array(vec![
                            RawAnnotationValue::String("a".into()),
                            RawAnnotationValue::String("b".into()),
                        ]),
                    )
                    .property(
                        "nested",
                        RawAnnotationValue::Annotation(
                            RawAnnotation::new("com.example.Inner")
                                .property("value", RawAnnotationValue::Int(3)),
                        ),
                    ),
            ),
        )
    }

    #[test]
    fn test_format_with_defaults() {
        let classes = CompletionEngine::complete(&annotated_batch(), Default::default()).unwrap();
        let service = classes.get("com.example.Service").unwrap();
        let formatter = AnnotationFormatter::default();
        assert_eq!(
            formatter.format(&service.annotations[0], &classes),
            "@com.example.Marker(names={\"a\", \"b\"}, nested=@com.example.Inner(3), type=com.example.Foo.class)"
        );
    }

    #[test]
    fn test_format_with_explicit_config() {
        let classes = CompletionEngine::complete(&annotated_batch(), Default::default()).unwrap();
        let service = classes.get("com.example.Service").unwrap();
        let formatter = AnnotationFormatter::new(AnnotationFormat {
            quote_strings: false,
            class_suffix: String::new(),
            array_style: ArrayStyle::Square,
            omit_single_value_name: false,
        });
        assert_eq!(
            formatter.format(&service.annotations[0], &classes),
            "@com.example.Marker(names=[a, b], nested=@com.example.Inner(value=3), type=com.example.Foo)"
        );
    }

    #[test]
    fn test_member_types_recurse_into_nested_annotations() {
        let classes = CompletionEngine::complete(&annotated_batch(), Default::default()).unwrap();
        let service = classes.get("com.example.Service").unwrap();
        let mut names = Vec::new();
        service.annotations[0].visit_member_types(&mut |id| names.push(classes.class(id).name.clone()));
        names.sort();
        assert_eq!(names, vec!["com.example.Foo", "com.example.Inner"]);
    }

    #[test]
    fn test_typed_conversions() {
        let value = AnnotationValue::Int(7);
        assert_eq!(i32::try_from(&value), Ok(7));
        let err = String::try_from(&value).unwrap_err();
        assert_eq!(err, "expected string annotation value, got int");
        assert_eq!(AnnotationValue::String("x".into()).as_str(), Some("x"));
    }
}
