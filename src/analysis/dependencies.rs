use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::model::annotation::{AnnotatedElement, JavaAnnotation};
use crate::model::member::{JavaMember, MemberKind};
use crate::model::{
    AccessId, ClassId, JavaClasses, JavaType, MemberId, SourceCodeLocation, TypeVariableId,
};

/// What gave rise to a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    Access,
    Inheritance,
    FieldType,
    ReturnType,
    ParameterType,
    Throws,
    CatchClause,
    Annotation,
    AnnotationMember,
    InstanceofCheck,
    ClassObjectReference,
    TypeArgument,
    TypeParameterBound,
}

/// A directed edge between two classes.
///
/// Dependencies are derived from the model, never stored by the importer.
/// Two dependencies are equal if origin, target, line and description are;
/// they sort by line number, then description.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub origin_class: ClassId,
    pub target_class: ClassId,
    pub kind: DependencyKind,
    /// Human readable, ending in the source location, e.g.
    /// `Method <a.A.foo()> calls method <b.B.bar()> in (A.java:5)`.
    pub description: String,
    pub source_location: SourceCodeLocation,
    /// The access this dependency was derived from, for access dependencies.
    pub access: Option<AccessId>,
}

impl Dependency {
    pub fn line(&self) -> u32 {
        self.source_location.line
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.origin_class == other.origin_class
            && self.target_class == other.target_class
            && self.source_location.line == other.source_location.line
            && self.description == other.description
    }
}

impl Eq for Dependency {}

impl Hash for Dependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.origin_class.hash(state);
        self.target_class.hash(state);
        self.source_location.line.hash(state);
        self.description.hash(state);
    }
}

impl Ord for Dependency {
    fn cmp(&self, other: &Self) -> Ordering {
        self.source_location
            .line
            .cmp(&other.source_location.line)
            .then_with(|| self.description.cmp(&other.description))
            .then_with(|| self.origin_class.cmp(&other.origin_class))
            .then_with(|| self.target_class.cmp(&other.target_class))
    }
}

impl PartialOrd for Dependency {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl JavaClasses {
    /// Every dependency from this class to other classes, computed once.
    pub fn direct_dependencies_from(&self, id: ClassId) -> &[Dependency] {
        self.views(id)
            .direct_dependencies
            .get_or_init(|| DependencyCollector::new(self, id).collect())
    }
}

/// Gathers the dependencies of one origin class.
struct DependencyCollector<'c> {
    classes: &'c JavaClasses,
    origin: ClassId,
    found: BTreeSet<Dependency>,
}

impl<'c> DependencyCollector<'c> {
    fn new(classes: &'c JavaClasses, origin: ClassId) -> Self {
        DependencyCollector {
            classes,
            origin,
            found: BTreeSet::new(),
        }
    }

    fn collect(mut self) -> Vec<Dependency> {
        let classes = self.classes;
        let class = classes.class(self.origin);

        self.inheritance();
        self.type_parameters(&class.description(), &class.type_parameters, 0);
        self.annotations(&class.description(), &class.annotations, 0);

        for member in &class.members {
            let member = classes.member(*member);
            match &member.kind {
                MemberKind::Field(field) => {
                    let description = member.description();
                    self.add(
                        field.raw_type,
                        DependencyKind::FieldType,
                        0,
                        format!("{} has type <{}>", description, self.name(field.raw_type)),
                    );
                    self.type_arguments(&description, "generic type", &field.field_type, 0);
                    self.annotations(&description, &member.annotations, 0);
                }
                _ => self.code_unit(member),
            }
        }

        tracing::trace!(
            class = %class.name,
            dependencies = self.found.len(),
            "derived direct dependencies"
        );
        self.found.into_iter().collect()
    }

    fn name(&self, id: ClassId) -> &str {
        &self.classes.class(id).name
    }

    fn add(&mut self, target: ClassId, kind: DependencyKind, line: u32, description: String) {
        self.add_with_access(target, kind, line, description, None);
    }

    fn add_with_access(
        &mut self,
        target: ClassId,
        kind: DependencyKind,
        line: u32,
        description: String,
        access: Option<AccessId>,
    ) {
        if target == self.origin || self.classes.class(target).is_primitive {
            return;
        }
        let source_location = self.classes.source_code_location(self.origin, line);
        self.found.insert(Dependency {
            origin_class: self.origin,
            target_class: target,
            kind,
            description: format!("{} in {}", description, source_location),
            source_location,
            access,
        });
    }

    fn inheritance(&mut self) {
        let classes = self.classes;
        let class = classes.class(self.origin);
        let description = class.description();

        if let Some(superclass) = &class.superclass {
            let raw = superclass.erasure(classes);
            self.add(
                raw,
                DependencyKind::Inheritance,
                0,
                format!("{} extends class <{}>", description, self.name(raw)),
            );
            self.type_arguments(&description, "generic superclass", superclass, 0);
        }

        let (origin_kind, verb) = if class.is_interface {
            ("Interface", "extends")
        } else {
            ("Class", "implements")
        };
        for interface in &class.interfaces {
            let raw = interface.erasure(classes);
            self.add(
                raw,
                DependencyKind::Inheritance,
                0,
                format!(
                    "{} <{}> {} interface <{}>",
                    origin_kind,
                    class.name,
                    verb,
                    self.name(raw)
                ),
            );
            self.type_arguments(&description, "generic interface", interface, 0);
        }
    }

    /// One dependency per class referenced from the type arguments of `ty`.
    fn type_arguments(&mut self, origin: &str, role: &str, ty: &JavaType, line: u32) {
        if !ty.is_generic() {
            return;
        }
        let type_name = ty.name(self.classes);
        for argument in ty.type_argument_classes(self.classes) {
            self.add(
                argument,
                DependencyKind::TypeArgument,
                line,
                format!(
                    "{} has {} <{}> with type argument depending on <{}>",
                    origin,
                    role,
                    type_name,
                    self.name(argument)
                ),
            );
        }
    }

    fn type_parameters(&mut self, origin: &str, parameters: &[TypeVariableId], line: u32) {
        for parameter in parameters {
            let classes = self.classes;
            let variable = classes.type_variable(*parameter);
            for bound in &variable.bounds {
                for involved in bound.all_involved_classes(classes) {
                    self.add(
                        involved,
                        DependencyKind::TypeParameterBound,
                        line,
                        format!(
                            "{} has type parameter '{}' depending on <{}>",
                            origin,
                            variable.name,
                            self.name(involved)
                        ),
                    );
                }
            }
        }
    }

    fn annotations(&mut self, origin: &str, annotations: &[JavaAnnotation], line: u32) {
        for annotation in annotations {
            self.add(
                annotation.annotation_type,
                DependencyKind::Annotation,
                line,
                format!(
                    "{} is annotated with <{}>",
                    origin,
                    self.name(annotation.annotation_type)
                ),
            );
            let mut member_types = Vec::new();
            annotation.visit_member_types(&mut |id| member_types.push(id));
            for member_type in member_types {
                self.add(
                    member_type,
                    DependencyKind::AnnotationMember,
                    line,
                    format!(
                        "{} has annotation member of type <{}>",
                        origin,
                        self.name(member_type)
                    ),
                );
            }
        }
    }

    fn code_unit(&mut self, member: &'c JavaMember) {
        let classes = self.classes;
        let Some(code_unit) = member.code_unit() else {
            return;
        };
        let description = member.description();
        let line = code_unit.first_line;

        for access_id in &code_unit.accesses {
            let access = classes.access(*access_id);
            self.add_with_access(
                access.target.owner,
                DependencyKind::Access,
                access.line,
                format!(
                    "{} {} {}",
                    description,
                    access.kind.verb(),
                    access.target.description()
                ),
                Some(*access_id),
            );
        }

        if member.is_method() {
            if let (Some(return_type), Some(raw)) = (&code_unit.return_type, code_unit.raw_return_type) {
                self.add(
                    raw,
                    DependencyKind::ReturnType,
                    line,
                    format!("{} has return type <{}>", description, self.name(raw)),
                );
                self.type_arguments(&description, "generic return type", return_type, line);
            }
        }

        for parameter in &code_unit.parameters {
            self.add(
                parameter.raw_type,
                DependencyKind::ParameterType,
                line,
                format!(
                    "{} has parameter of type <{}>",
                    description,
                    self.name(parameter.raw_type)
                ),
            );
            self.type_arguments(
                &description,
                "generic parameter type",
                &parameter.parameter_type,
                line,
            );
            let parameter_description = format!(
                "Parameter <{}> of {}",
                parameter.parameter_type.name(self.classes),
                lowercase_first(&description)
            );
            self.annotations(&parameter_description, &parameter.annotations, line);
        }

        for thrown in &code_unit.throws {
            self.add(
                *thrown,
                DependencyKind::Throws,
                line,
                format!("{} throws type <{}>", description, self.name(*thrown)),
            );
        }
        for block in &code_unit.try_catch_blocks {
            for caught in &block.caught_types {
                self.add(
                    *caught,
                    DependencyKind::CatchClause,
                    block.line,
                    format!("{} catches type <{}>", description, self.name(*caught)),
                );
            }
        }
        for check in &code_unit.instanceof_checks {
            self.add(
                check.target,
                DependencyKind::InstanceofCheck,
                check.line,
                format!("{} checks instanceof <{}>", description, self.name(check.target)),
            );
        }
        for reference in &code_unit.class_object_references {
            self.add(
                reference.target,
                DependencyKind::ClassObjectReference,
                reference.line,
                format!(
                    "{} references class object <{}>",
                    description,
                    self.name(reference.target)
                ),
            );
        }

        self.type_parameters(&description, &code_unit.type_parameters, line);
        self.annotations(&description, &member.annotations, line);
    }
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Where an annotation sits, as a short human readable text.
pub fn describe_annotated_element(classes: &JavaClasses, element: AnnotatedElement) -> String {
    match element {
        AnnotatedElement::Class(id) => classes.class(id).description(),
        AnnotatedElement::Member(id) => classes.member(id).description(),
        AnnotatedElement::Parameter { member, index } => {
            format!("Parameter {} of {}", index, classes.member(member).description())
        }
    }
}

/// Member that declared the dependency, if it came from a member.
pub fn origin_member(classes: &JavaClasses, dependency: &Dependency) -> Option<MemberId> {
    dependency
        .access
        .map(|access| classes.access(access).origin)
}
