//! Index from a class or member to everything that points at it.
//!
//! Built once per snapshot from the forward data of every imported class and
//! read-only afterwards. Per-member access lists are resolved lazily, since
//! they require member resolution for every candidate access.

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use crate::model::annotation::{AnnotatedElement, JavaAnnotation};
use crate::model::member::{MemberKind, TypeUsage};
use crate::model::{AccessId, AccessKind, ClassId, JavaAccess, JavaClasses, MemberId};

use super::dependencies::Dependency;

/// An annotation found through the index, addressed by where it is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnnotationRef {
    pub element: AnnotatedElement,
    /// Position in the element's annotation list.
    pub index: usize,
}

/// A type usage together with the code unit it occurs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeUsageRef {
    pub code_unit: MemberId,
    pub usage: TypeUsage,
}

type MultiMap<K, V> = HashMap<K, Vec<V>>;

fn insert<K: std::hash::Hash + Eq, V>(map: &mut MultiMap<K, V>, key: K, value: V) {
    map.entry(key).or_default().push(value);
}

fn lookup<'m, K: std::hash::Hash + Eq, V>(map: &'m MultiMap<K, V>, key: &K) -> &'m [V] {
    map.get(key).map(Vec::as_slice).unwrap_or(&[])
}

#[derive(Debug, Default)]
pub struct ReverseDependencies {
    accesses_by_target_owner: MultiMap<ClassId, AccessId>,
    /// Constructor calls and references, keyed by target full name.
    constructor_accesses_by_target: MultiMap<String, AccessId>,
    member_accesses: Vec<OnceLock<Vec<AccessId>>>,
    fields_with_type: MultiMap<ClassId, MemberId>,
    methods_with_parameter_type: MultiMap<ClassId, MemberId>,
    methods_with_return_type: MultiMap<ClassId, MemberId>,
    method_throws: MultiMap<ClassId, MemberId>,
    constructors_with_parameter_type: MultiMap<ClassId, MemberId>,
    constructor_throws: MultiMap<ClassId, MemberId>,
    annotations_with_type: MultiMap<ClassId, AnnotationRef>,
    instanceof_checks: MultiMap<ClassId, TypeUsageRef>,
    class_object_references: MultiMap<ClassId, TypeUsageRef>,
    dependencies_to: MultiMap<ClassId, Dependency>,
}

impl ReverseDependencies {
    pub(crate) fn build(classes: &JavaClasses) -> Self {
        let mut index = ReverseDependencies {
            member_accesses: (0..classes.all_members().len())
                .map(|_| OnceLock::new())
                .collect(),
            ..Default::default()
        };

        for access in classes.all_accesses() {
            insert(
                &mut index.accesses_by_target_owner,
                access.target.owner,
                access.id,
            );
            if access.target.kind.is_constructor() {
                insert(
                    &mut index.constructor_accesses_by_target,
                    access.target.full_name.clone(),
                    access.id,
                );
            }
        }

        for class_id in classes.imported_ids() {
            let class = classes.class(*class_id);
            index.add_annotations(AnnotatedElement::Class(class.id), &class.annotations);

            for member_id in &class.members {
                let member = classes.member(*member_id);
                index.add_annotations(AnnotatedElement::Member(member.id), &member.annotations);
                match &member.kind {
                    MemberKind::Field(field) => {
                        insert(&mut index.fields_with_type, field.raw_type, member.id);
                    }
                    MemberKind::Method(code_unit) => {
                        for parameter in &code_unit.parameters {
                            insert(
                                &mut index.methods_with_parameter_type,
                                parameter.raw_type,
                                member.id,
                            );
                        }
                        if let Some(return_type) = code_unit.raw_return_type {
                            insert(&mut index.methods_with_return_type, return_type, member.id);
                        }
                        for thrown in &code_unit.throws {
                            insert(&mut index.method_throws, *thrown, member.id);
                        }
                    }
                    MemberKind::Constructor(code_unit) => {
                        for parameter in &code_unit.parameters {
                            insert(
                                &mut index.constructors_with_parameter_type,
                                parameter.raw_type,
                                member.id,
                            );
                        }
                        for thrown in &code_unit.throws {
                            insert(&mut index.constructor_throws, *thrown, member.id);
                        }
                    }
                    MemberKind::StaticInitializer(_) => {}
                }

                if let Some(code_unit) = member.code_unit() {
                    for parameter in &code_unit.parameters {
                        index.add_annotations(
                            AnnotatedElement::Parameter {
                                member: member.id,
                                index: parameter.index,
                            },
                            &parameter.annotations,
                        );
                    }
                    for usage in &code_unit.instanceof_checks {
                        insert(
                            &mut index.instanceof_checks,
                            usage.target,
                            TypeUsageRef {
                                code_unit: member.id,
                                usage: *usage,
                            },
                        );
                    }
                    for usage in &code_unit.class_object_references {
                        insert(
                            &mut index.class_object_references,
                            usage.target,
                            TypeUsageRef {
                                code_unit: member.id,
                                usage: *usage,
                            },
                        );
                    }
                }
            }

            for dependency in classes.direct_dependencies_from(*class_id) {
                index.add_dependency(classes, dependency);
            }
        }

        for dependencies in index.dependencies_to.values_mut() {
            let unique: BTreeSet<Dependency> = dependencies.drain(..).collect();
            dependencies.extend(unique);
        }

        tracing::debug!(
            target_owners = index.accesses_by_target_owner.len(),
            dependency_targets = index.dependencies_to.len(),
            annotation_types = index.annotations_with_type.len(),
            "built reverse dependency index"
        );
        index
    }

    fn add_annotations(&mut self, element: AnnotatedElement, annotations: &[JavaAnnotation]) {
        for (index, annotation) in annotations.iter().enumerate() {
            insert(
                &mut self.annotations_with_type,
                annotation.annotation_type,
                AnnotationRef { element, index },
            );
        }
    }

    /// A dependency on `Foo[]` is also a dependency on `Foo`.
    fn add_dependency(&mut self, classes: &JavaClasses, dependency: &Dependency) {
        let target = dependency.target_class;
        insert(&mut self.dependencies_to, target, dependency.clone());
        let component = classes.base_component_type(target);
        if component != target
            && component != dependency.origin_class
            && !classes.class(component).is_primitive
        {
            insert(&mut self.dependencies_to, component, dependency.clone());
        }
    }

    /// Accesses resolving to `member`, from any class.
    fn accesses_to(&self, classes: &JavaClasses, member: MemberId) -> &[AccessId] {
        self.member_accesses[member.index()].get_or_init(|| self.load_accesses(classes, member))
    }

    fn load_accesses(&self, classes: &JavaClasses, member: MemberId) -> Vec<AccessId> {
        let declared = classes.member(member);
        let mut candidates: BTreeSet<AccessId> = BTreeSet::new();

        // A call on a subclass may still resolve to a member declared here.
        let owners = std::iter::once(declared.owner)
            .chain(classes.all_subclasses(declared.owner).iter().copied());
        for owner in owners {
            candidates.extend(
                lookup(&self.accesses_by_target_owner, &owner)
                    .iter()
                    .filter(|id| classes.access(**id).target.name == declared.name),
            );
        }
        if declared.is_constructor() {
            candidates.extend(lookup(
                &self.constructor_accesses_by_target,
                &declared.full_name,
            ));
        }

        candidates
            .into_iter()
            .filter(|id| {
                let access = classes.access(*id);
                targets_same_kind(&access.kind, &declared.kind)
                    && classes.resolve(&access.target) == Some(member)
            })
            .collect()
    }
}

fn targets_same_kind(access: &AccessKind, member: &MemberKind) -> bool {
    match member {
        MemberKind::Field(_) => matches!(access, AccessKind::FieldAccess(_)),
        MemberKind::Method(_) => access.target_kind().is_method(),
        MemberKind::Constructor(_) => access.target_kind().is_constructor(),
        MemberKind::StaticInitializer(_) => false,
    }
}

impl JavaClasses {
    /// Every dependency from imported classes to this class.
    ///
    /// Dependencies on an array type are also reported for its base component.
    pub fn direct_dependencies_to(&self, id: ClassId) -> &[Dependency] {
        lookup(&self.reverse().dependencies_to, &id)
    }

    /// All accesses, calls and references that resolve to `member`.
    pub fn accesses_to(&self, member: MemberId) -> Vec<&JavaAccess> {
        self.reverse()
            .accesses_to(self, member)
            .iter()
            .map(|id| self.access(*id))
            .collect()
    }

    pub fn field_accesses_to(&self, member: MemberId) -> Vec<&JavaAccess> {
        self.accesses_to(member)
            .into_iter()
            .filter(|access| matches!(access.kind, AccessKind::FieldAccess(_)))
            .collect()
    }

    /// Method or constructor calls, without references.
    pub fn calls_of(&self, member: MemberId) -> Vec<&JavaAccess> {
        self.accesses_to(member)
            .into_iter()
            .filter(|access| access.kind.is_call())
            .collect()
    }

    /// Method or constructor references (`Foo::bar`, `Foo::new`).
    pub fn references_to(&self, member: MemberId) -> Vec<&JavaAccess> {
        self.accesses_to(member)
            .into_iter()
            .filter(|access| {
                matches!(
                    access.kind,
                    AccessKind::MethodReference | AccessKind::ConstructorReference
                )
            })
            .collect()
    }

    /// Accesses whose static target owner is this class, resolved or not.
    pub fn accesses_to_class(&self, id: ClassId) -> Vec<&JavaAccess> {
        lookup(&self.reverse().accesses_by_target_owner, &id)
            .iter()
            .map(|access| self.access(*access))
            .collect()
    }

    pub fn fields_with_type(&self, id: ClassId) -> &[MemberId] {
        lookup(&self.reverse().fields_with_type, &id)
    }

    pub fn methods_with_parameter_type(&self, id: ClassId) -> &[MemberId] {
        lookup(&self.reverse().methods_with_parameter_type, &id)
    }

    pub fn methods_with_return_type(&self, id: ClassId) -> &[MemberId] {
        lookup(&self.reverse().methods_with_return_type, &id)
    }

    pub fn method_throws_declarations_with_type(&self, id: ClassId) -> &[MemberId] {
        lookup(&self.reverse().method_throws, &id)
    }

    pub fn constructors_with_parameter_type(&self, id: ClassId) -> &[MemberId] {
        lookup(&self.reverse().constructors_with_parameter_type, &id)
    }

    pub fn constructor_throws_declarations_with_type(&self, id: ClassId) -> &[MemberId] {
        lookup(&self.reverse().constructor_throws, &id)
    }

    /// Annotations of this type on classes, members and parameters.
    pub fn annotations_with_type(&self, id: ClassId) -> Vec<(AnnotationRef, &JavaAnnotation)> {
        lookup(&self.reverse().annotations_with_type, &id)
            .iter()
            .filter_map(|reference| {
                self.annotations_of(reference.element)
                    .get(reference.index)
                    .map(|annotation| (*reference, annotation))
            })
            .collect()
    }

    pub fn instanceof_checks_with_type(&self, id: ClassId) -> &[TypeUsageRef] {
        lookup(&self.reverse().instanceof_checks, &id)
    }

    pub fn class_object_references_with_type(&self, id: ClassId) -> &[TypeUsageRef] {
        lookup(&self.reverse().class_object_references, &id)
    }

    /// Annotations declared directly on an element.
    pub fn annotations_of(&self, element: AnnotatedElement) -> &[JavaAnnotation] {
        match element {
            AnnotatedElement::Class(id) => &self.class(id).annotations,
            AnnotatedElement::Member(id) => &self.member(id).annotations,
            AnnotatedElement::Parameter { member, index } => self
                .member(member)
                .code_unit()
                .and_then(|code_unit| code_unit.parameters.get(index))
                .map(|parameter| parameter.annotations.as_slice())
                .unwrap_or(&[]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::batch::ImportBatch;
    use crate::import::completion::CompletionEngine;
    use crate::import::{RawAnnotation, RawClass, RawCodeUnit, RawType};
    use pretty_assertions::assert_eq;

    fn complete(batch: ImportBatch) -> JavaClasses {
        CompletionEngine::complete(&batch, Default::default()).unwrap()
    }

    fn id(classes: &JavaClasses, name: &str) -> ClassId {
        classes.get(name).unwrap().id
    }

    fn origins(accesses: Vec<&JavaAccess>) -> Vec<String> {
        let mut names: Vec<String> = accesses
            .into_iter()
            .map(|access| access.origin_full_name.clone())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_call_through_subclass_is_found() {
        let classes = complete(
            ImportBatch::new()
                .with_class(RawClass::new("com.example.Base").method(RawCodeUnit::method("run", &[], "void")))
                .with_class(RawClass::new("com.example.Child").extends("com.example.Base"))
                .with_class(
                    RawClass::new("com.example.Caller")
                        .method(
                            RawCodeUnit::method("direct", &[], "void")
                                .calls("com.example.Base", "run", &[], "void", 3),
                        )
                        .method(
                            RawCodeUnit::method("viaChild", &[], "void")
                                .calls("com.example.Child", "run", &[], "void", 7),
                        )
                        .method(
                            RawCodeUnit::method("reference", &[], "void")
                                .references_method("com.example.Child", "run", &[], "void", 9),
                        ),
                ),
        );
        let run = classes.method(id(&classes, "com.example.Base"), "run", &[]).unwrap();

        assert_eq!(
            origins(classes.accesses_to(run)),
            vec![
                "com.example.Caller.direct()",
                "com.example.Caller.reference()",
                "com.example.Caller.viaChild()",
            ]
        );
        assert_eq!(classes.calls_of(run).len(), 2);
        assert_eq!(classes.references_to(run).len(), 1);
        assert_eq!(classes.accesses_to_class(id(&classes, "com.example.Child")).len(), 2);
    }

    #[test]
    fn test_overriding_method_takes_calls() {
        let classes = complete(
            ImportBatch::new()
                .with_class(RawClass::new("com.example.Base").method(RawCodeUnit::method("run", &[], "void")))
                .with_class(
                    RawClass::new("com.example.Child")
                        .extends("com.example.Base")
                        .method(RawCodeUnit::method("run", &[], "void")),
                )
                .with_class(RawClass::new("com.example.Caller").method(
                    RawCodeUnit::method("call", &[], "void").calls("com.example.Child", "run", &[], "void", 3),
                )),
        );
        let base_run = classes.method(id(&classes, "com.example.Base"), "run", &[]).unwrap();
        let child_run = classes.method(id(&classes, "com.example.Child"), "run", &[]).unwrap();
        assert!(classes.accesses_to(base_run).is_empty());
        assert_eq!(classes.accesses_to(child_run).len(), 1);
    }

    #[test]
    fn test_field_and_constructor_accesses() {
        let classes = complete(
            ImportBatch::new()
                .with_class(
                    RawClass::new("com.example.Point")
                        .field("x", RawType::class("int"))
                        .constructor(RawCodeUnit::constructor(&["int"])),
                )
                .with_class(
                    RawClass::new("com.example.User").method(
                        RawCodeUnit::method("use", &[], "void")
                            .calls_constructor("com.example.Point", &["int"], 4)
                            .sets_field("com.example.Point", "x", "int", 5)
                            .references_constructor("com.example.Point", &["int"], 6),
                    ),
                ),
        );
        let point = id(&classes, "com.example.Point");
        let x = classes.field(point, "x").unwrap();
        let constructor = classes.constructor(point, &["int"]).unwrap();

        assert_eq!(classes.field_accesses_to(x).len(), 1);
        assert_eq!(classes.calls_of(constructor).len(), 1);
        assert_eq!(classes.references_to(constructor).len(), 1);
        assert!(classes.field_accesses_to(constructor).is_empty());
    }

    #[test]
    fn test_type_multimaps() {
        let classes = complete(
            ImportBatch::new().with_class(
                RawClass::new("com.example.Service")
                    .annotation(RawAnnotation::new("com.example.Component"))
                    .field("repo", RawType::class("com.example.Repo"))
                    .constructor(
                        RawCodeUnit::constructor(&["com.example.Repo"]).throws("com.example.Failure"),
                    )
                    .method(
                        RawCodeUnit::method("find", &["com.example.Key"], "com.example.Repo")
                            .throws("com.example.Failure")
                            .parameter_annotation(0, RawAnnotation::new("com.example.Component"))
                            .checks_instanceof("com.example.Repo", 11)
                            .references_class_object("com.example.Key", 12),
                    ),
            ),
        );
        let repo = id(&classes, "com.example.Repo");
        let key = id(&classes, "com.example.Key");
        let failure = id(&classes, "com.example.Failure");
        let component = id(&classes, "com.example.Component");

        assert_eq!(classes.fields_with_type(repo).len(), 1);
        assert_eq!(classes.methods_with_return_type(repo).len(), 1);
        assert_eq!(classes.constructors_with_parameter_type(repo).len(), 1);
        assert_eq!(classes.methods_with_parameter_type(key).len(), 1);
        assert_eq!(classes.method_throws_declarations_with_type(failure).len(), 1);
        assert_eq!(classes.constructor_throws_declarations_with_type(failure).len(), 1);
        assert_eq!(classes.instanceof_checks_with_type(repo)[0].usage.line, 11);
        assert_eq!(classes.class_object_references_with_type(key).len(), 1);

        let annotations = classes.annotations_with_type(component);
        assert_eq!(annotations.len(), 2);
        assert!(annotations
            .iter()
            .any(|(reference, _)| matches!(reference.element, AnnotatedElement::Parameter { index: 0, .. })));
    }

    #[test]
    fn test_dependencies_to_include_array_components() {
        let classes = complete(
            ImportBatch::new()
                .with_class(RawClass::new("com.example.Item"))
                .with_class(
                    RawClass::new("com.example.Holder")
                        .field("items", RawType::class("com.example.Item[]")),
                ),
        );
        let item = id(&classes, "com.example.Item");
        let holder = id(&classes, "com.example.Holder");
        let incoming = classes.direct_dependencies_to(item);
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].origin_class, holder);
        assert_eq!(
            incoming[0].description,
            "Field <com.example.Holder.items> has type <[Lcom.example.Item;> in (Holder.java:0)"
        );
        assert!(classes.direct_dependencies_to(holder).is_empty());
    }
}
