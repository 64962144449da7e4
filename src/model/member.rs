use std::collections::BTreeSet;

use super::annotation::JavaAnnotation;
use super::types::JavaType;
use super::{AccessId, ClassId, JavaModifier, MemberId, TypeVariableId};

/// A field, method, constructor or static initializer, owned by exactly one class.
#[derive(Debug, Clone)]
pub struct JavaMember {
    pub id: MemberId,
    pub owner: ClassId,
    pub name: String,
    /// JVM descriptor, e.g. `(Ljava/lang/String;)V`.
    pub descriptor: String,
    /// `Owner.name` for fields, `Owner.name(p1, p2)` for code units.
    pub full_name: String,
    pub modifiers: BTreeSet<JavaModifier>,
    pub annotations: Vec<JavaAnnotation>,
    pub kind: MemberKind,
}

#[derive(Debug, Clone)]
pub enum MemberKind {
    Field(Field),
    Method(CodeUnit),
    Constructor(CodeUnit),
    StaticInitializer(CodeUnit),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub field_type: JavaType,
    pub raw_type: ClassId,
}

/// Body-carrying member: method, constructor or static initializer.
#[derive(Debug, Clone, Default)]
pub struct CodeUnit {
    pub return_type: Option<JavaType>,
    pub raw_return_type: Option<ClassId>,
    pub parameters: Vec<Parameter>,
    pub throws: Vec<ClassId>,
    pub type_parameters: Vec<TypeVariableId>,
    /// First line of the body, 0 if unknown.
    pub first_line: u32,
    /// Accesses from the body, populated in the access phase.
    pub accesses: Vec<AccessId>,
    pub try_catch_blocks: Vec<TryCatchBlock>,
    pub instanceof_checks: Vec<TypeUsage>,
    pub class_object_references: Vec<TypeUsage>,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub index: usize,
    pub parameter_type: JavaType,
    pub raw_type: ClassId,
    pub annotations: Vec<JavaAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryCatchBlock {
    pub caught_types: Vec<ClassId>,
    pub line: u32,
}

/// A reference to a type from inside a code unit body, such as an
/// `instanceof` check or a `Foo.class` literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeUsage {
    pub target: ClassId,
    pub line: u32,
}

impl JavaMember {
    pub fn has_modifier(&self, modifier: JavaModifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Compiler generated, including bridge methods.
    pub fn is_synthetic(&self) -> bool {
        self.has_modifier(JavaModifier::Synthetic) || self.has_modifier(JavaModifier::Bridge)
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, MemberKind::Field(_))
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method(_))
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, MemberKind::Constructor(_))
    }

    pub fn is_static_initializer(&self) -> bool {
        matches!(self.kind, MemberKind::StaticInitializer(_))
    }

    pub fn code_unit(&self) -> Option<&CodeUnit> {
        match &self.kind {
            MemberKind::Method(code_unit)
            | MemberKind::Constructor(code_unit)
            | MemberKind::StaticInitializer(code_unit) => Some(code_unit),
            MemberKind::Field(_) => None,
        }
    }

    pub(crate) fn code_unit_mut(&mut self) -> Option<&mut CodeUnit> {
        match &mut self.kind {
            MemberKind::Method(code_unit)
            | MemberKind::Constructor(code_unit)
            | MemberKind::StaticInitializer(code_unit) => Some(code_unit),
            MemberKind::Field(_) => None,
        }
    }

    pub fn field_type(&self) -> Option<&JavaType> {
        match &self.kind {
            MemberKind::Field(field) => Some(&field.field_type),
            _ => None,
        }
    }

    pub fn raw_field_type(&self) -> Option<ClassId> {
        match &self.kind {
            MemberKind::Field(field) => Some(field.raw_type),
            _ => None,
        }
    }

    pub fn raw_parameter_types(&self) -> Vec<ClassId> {
        self.code_unit()
            .map(|code_unit| code_unit.parameters.iter().map(|p| p.raw_type).collect())
            .unwrap_or_default()
    }

    /// First line of a code unit, 0 for fields.
    pub fn line(&self) -> u32 {
        self.code_unit().map(|c| c.first_line).unwrap_or(0)
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            MemberKind::Field(_) => "Field",
            MemberKind::Method(_) => "Method",
            MemberKind::Constructor(_) => "Constructor",
            MemberKind::StaticInitializer(_) => "Static Initializer",
        }
    }

    /// E.g. `Method <com.example.Foo.bar(int)>`.
    pub fn description(&self) -> String {
        format!("{} <{}>", self.kind_name(), self.full_name)
    }
}

impl PartialEq for JavaMember {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for JavaMember {}

/// `owner.name(p1, p2)`.
pub fn format_code_unit_name<S: AsRef<str>>(owner: &str, name: &str, parameters: &[S]) -> String {
    let parameters: Vec<&str> = parameters.iter().map(|p| p.as_ref()).collect();
    format!("{}.{}({})", owner, name, parameters.join(", "))
}

pub fn format_field_name(owner: &str, name: &str) -> String {
    format!("{}.{}", owner, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(modifiers: &[JavaModifier]) -> JavaMember {
        JavaMember {
            id: MemberId(0),
            owner: ClassId(0),
            name: "run".to_string(),
            descriptor: "()V".to_string(),
            full_name: format_code_unit_name::<&str>("com.example.Task", "run", &[]),
            modifiers: modifiers.iter().copied().collect(),
            annotations: Vec::new(),
            kind: MemberKind::Method(CodeUnit::default()),
        }
    }

    #[test]
    fn test_full_name_formatting() {
        assert_eq!(
            format_code_unit_name("a.B", "call", &["int", "java.lang.String"]),
            "a.B.call(int, java.lang.String)"
        );
        assert_eq!(format_field_name("a.B", "count"), "a.B.count");
    }

    #[test]
    fn test_bridge_counts_as_synthetic() {
        assert!(!method(&[JavaModifier::Public]).is_synthetic());
        assert!(method(&[JavaModifier::Synthetic]).is_synthetic());
        assert!(method(&[JavaModifier::Bridge]).is_synthetic());
    }

    #[test]
    fn test_description() {
        let member = method(&[]);
        assert!(member.is_method());
        assert!(member.field_type().is_none());
        assert_eq!(member.description(), "Method <com.example.Task.run()>");
        assert_eq!(member.line(), 0);
    }
}
