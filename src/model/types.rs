use std::collections::HashSet;

use super::classes::JavaClasses;
use super::{ClassId, MemberId, TypeVariableId};

/// A possibly generic Java type as used in a signature.
///
/// Type variables are stored by id in the snapshot's type-variable arena, so
/// self-referential bounds (`T extends Comparable<T>`) never create ownership
/// cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JavaType {
    Class(ClassId),
    Parameterized(ParameterizedType),
    TypeVariable(TypeVariableId),
    Wildcard(WildcardType),
    GenericArray(GenericArrayType),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterizedType {
    pub raw: ClassId,
    pub arguments: Vec<JavaType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct WildcardType {
    pub upper_bounds: Vec<JavaType>,
    pub lower_bounds: Vec<JavaType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenericArrayType {
    pub component: Box<JavaType>,
    /// Array class of the component's erasure, resolved at import time.
    pub erasure: ClassId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeVariableOwner {
    Class(ClassId),
    CodeUnit(MemberId),
}

/// A declared type parameter (`T extends Bound`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeVariable {
    pub id: TypeVariableId,
    pub name: String,
    pub owner: TypeVariableOwner,
    pub bounds: Vec<JavaType>,
}

const MAX_BOUND_DEPTH: usize = 32;

impl JavaType {
    /// The raw class this type erases to. Always a class, never another variant.
    pub fn erasure(&self, classes: &JavaClasses) -> ClassId {
        self.erasure_at_depth(classes, 0)
    }

    fn erasure_at_depth(&self, classes: &JavaClasses, depth: usize) -> ClassId {
        if depth > MAX_BOUND_DEPTH {
            return classes.object_class();
        }
        match self {
            JavaType::Class(id) => *id,
            JavaType::Parameterized(parameterized) => parameterized.raw,
            JavaType::TypeVariable(id) => classes
                .type_variable(*id)
                .bounds
                .first()
                .map(|bound| bound.erasure_at_depth(classes, depth + 1))
                .unwrap_or_else(|| classes.object_class()),
            JavaType::Wildcard(wildcard) => wildcard
                .upper_bounds
                .first()
                .map(|bound| bound.erasure_at_depth(classes, depth + 1))
                .unwrap_or_else(|| classes.object_class()),
            JavaType::GenericArray(array) => array.erasure,
        }
    }

    /// Display name, e.g. `java.util.Map<K, ? extends java.lang.Number>`.
    pub fn name(&self, classes: &JavaClasses) -> String {
        match self {
            JavaType::Class(id) => classes.class(*id).name.clone(),
            JavaType::Parameterized(parameterized) => {
                let arguments: Vec<String> = parameterized
                    .arguments
                    .iter()
                    .map(|argument| argument.name(classes))
                    .collect();
                format!(
                    "{}<{}>",
                    classes.class(parameterized.raw).name,
                    arguments.join(", ")
                )
            }
            JavaType::TypeVariable(id) => classes.type_variable(*id).name.clone(),
            JavaType::Wildcard(wildcard) => {
                if !wildcard.upper_bounds.is_empty() {
                    format!("? extends {}", join_names(&wildcard.upper_bounds, classes))
                } else if !wildcard.lower_bounds.is_empty() {
                    format!("? super {}", join_names(&wildcard.lower_bounds, classes))
                } else {
                    "?".to_string()
                }
            }
            JavaType::GenericArray(array) => format!("{}[]", array.component.name(classes)),
        }
    }

    pub fn is_generic(&self) -> bool {
        !matches!(self, JavaType::Class(_))
    }

    /// Raw classes referenced by the type arguments of this type.
    ///
    /// Walks parameterized arguments, wildcard bounds and type-variable
    /// bounds recursively. The top-level raw type itself is not included.
    /// Every class appears once, in first-seen order.
    pub fn type_argument_classes(&self, classes: &JavaClasses) -> Vec<ClassId> {
        let mut collector = ClassCollector::default();
        match self {
            JavaType::Parameterized(parameterized) => {
                for argument in &parameterized.arguments {
                    collector.visit(argument, classes);
                }
            }
            JavaType::GenericArray(array) => {
                return array.component.type_argument_classes(classes);
            }
            JavaType::Class(_) | JavaType::TypeVariable(_) | JavaType::Wildcard(_) => {}
        }
        collector.found
    }

    /// Every raw class referenced anywhere in this type, including bounds.
    pub fn all_involved_classes(&self, classes: &JavaClasses) -> Vec<ClassId> {
        let mut collector = ClassCollector::default();
        collector.visit(self, classes);
        collector.found
    }
}

fn join_names(types: &[JavaType], classes: &JavaClasses) -> String {
    types
        .iter()
        .map(|ty| ty.name(classes))
        .collect::<Vec<_>>()
        .join(" & ")
}

#[derive(Default)]
struct ClassCollector {
    found: Vec<ClassId>,
    seen_classes: HashSet<ClassId>,
    seen_variables: HashSet<TypeVariableId>,
}

impl ClassCollector {
    fn visit(&mut self, ty: &JavaType, classes: &JavaClasses) {
        match ty {
            JavaType::Class(id) => self.add(*id),
            JavaType::Parameterized(parameterized) => {
                self.add(parameterized.raw);
                for argument in &parameterized.arguments {
                    self.visit(argument, classes);
                }
            }
            JavaType::TypeVariable(id) => {
                if self.seen_variables.insert(*id) {
                    for bound in &classes.type_variable(*id).bounds {
                        self.visit(bound, classes);
                    }
                }
            }
            JavaType::Wildcard(wildcard) => {
                for bound in wildcard.upper_bounds.iter().chain(&wildcard.lower_bounds) {
                    self.visit(bound, classes);
                }
            }
            JavaType::GenericArray(array) => self.visit(&array.component, classes),
        }
    }

    fn add(&mut self, id: ClassId) {
        if self.seen_classes.insert(id) {
            self.found.push(id);
        }
    }
}
