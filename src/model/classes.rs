use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::OnceLock;

use crate::analysis::dependencies::Dependency;
use crate::analysis::reverse::ReverseDependencies;
use crate::error::Result;
use crate::resolution::compare_candidates;

use super::access::{AccessKind, AccessTarget, JavaAccess};
use super::class::JavaClass;
use super::descriptor::TypeDescriptorRegistry;
use super::member::JavaMember;
use super::types::{JavaType, TypeVariable};
use super::{
    AccessId, ClassId, JavaModifier, MemberId, SourceCodeLocation, TypeVariableId,
    CONSTRUCTOR_NAME, OBJECT_CLASS_NAME,
};

/// Derived per-class views, each computed at most once on first access.
#[derive(Debug, Default)]
pub(crate) struct ClassViews {
    all_superclasses: OnceLock<Vec<ClassId>>,
    all_interfaces: OnceLock<Vec<ClassId>>,
    all_subclasses: OnceLock<Vec<ClassId>>,
    all_fields: OnceLock<Vec<MemberId>>,
    all_methods: OnceLock<Vec<MemberId>>,
    all_constructors: OnceLock<Vec<MemberId>>,
    pub(crate) direct_dependencies: OnceLock<Vec<Dependency>>,
}

/// The completed, read-only snapshot of one import batch.
///
/// All classes (imported ones and stubs for referenced-only classes) live in
/// one arena indexed by [`ClassId`]; members, accesses and type variables
/// have arenas of their own. Relationships between entities are ids, never
/// owning pointers, so the bidirectional class hierarchy carries no
/// ownership cycles.
#[derive(Debug)]
pub struct JavaClasses {
    pub(crate) classes: Vec<JavaClass>,
    pub(crate) by_name: HashMap<String, ClassId>,
    pub(crate) members: Vec<JavaMember>,
    pub(crate) accesses: Vec<JavaAccess>,
    pub(crate) type_variables: Vec<TypeVariable>,
    pub(crate) imported: Vec<ClassId>,
    pub(crate) object_class: ClassId,
    pub(crate) descriptors: TypeDescriptorRegistry,
    pub(crate) views: Vec<ClassViews>,
    pub(crate) reverse: OnceLock<ReverseDependencies>,
}

impl JavaClasses {
    /// An arena containing only the `java.lang.Object` stub.
    pub(crate) fn empty() -> Self {
        let mut classes = JavaClasses {
            classes: Vec::new(),
            by_name: HashMap::new(),
            members: Vec::new(),
            accesses: Vec::new(),
            type_variables: Vec::new(),
            imported: Vec::new(),
            object_class: ClassId(0),
            descriptors: TypeDescriptorRegistry::new(),
            views: Vec::new(),
            reverse: OnceLock::new(),
        };
        if let Ok(object) = classes.class_with_type(OBJECT_CLASS_NAME) {
            classes.object_class = object;
        }
        classes
    }

    /// Return the class with the given name, creating a stub if it is unknown.
    ///
    /// Any type name is representable; only completeness depends on whether
    /// the class was part of the import batch.
    pub(crate) fn class_with_type(&mut self, name: &str) -> Result<ClassId> {
        if let Some(id) = self.by_name.get(name) {
            return Ok(*id);
        }
        let descriptor = self.descriptors.descriptor_for(name)?;
        if let Some(id) = self.by_name.get(descriptor.name()) {
            let id = *id;
            self.by_name.insert(name.to_string(), id);
            return Ok(id);
        }

        let component_type = match descriptor.component_type() {
            Some(component) => Some(self.class_with_type(component.name())?),
            None => None,
        };
        let id = ClassId::from_index(self.classes.len());
        tracing::trace!(name = descriptor.name(), "creating class stub");
        self.classes
            .push(JavaClass::stub(id, &descriptor, component_type));
        self.by_name.insert(descriptor.name().to_string(), id);
        if name != descriptor.name() {
            self.by_name.insert(name.to_string(), id);
        }
        Ok(id)
    }

    pub(crate) fn class_mut(&mut self, id: ClassId) -> &mut JavaClass {
        &mut self.classes[id.index()]
    }

    pub(crate) fn member_mut(&mut self, id: MemberId) -> &mut JavaMember {
        &mut self.members[id.index()]
    }

    pub(crate) fn type_variable_mut(&mut self, id: TypeVariableId) -> &mut TypeVariable {
        &mut self.type_variables[id.index()]
    }

    pub(crate) fn push_member(&mut self, mut member: JavaMember) -> MemberId {
        let id = MemberId::from_index(self.members.len());
        member.id = id;
        self.classes[member.owner.index()].members.push(id);
        self.members.push(member);
        id
    }

    pub(crate) fn push_access(&mut self, mut access: JavaAccess) -> AccessId {
        let id = AccessId::from_index(self.accesses.len());
        access.id = id;
        self.accesses.push(access);
        id
    }

    pub(crate) fn push_type_variable(&mut self, mut variable: TypeVariable) -> TypeVariableId {
        let id = TypeVariableId::from_index(self.type_variables.len());
        variable.id = id;
        self.type_variables.push(variable);
        id
    }

    /// Allocate the memoized views once the arena no longer grows.
    pub(crate) fn seal(&mut self) {
        self.views = (0..self.classes.len())
            .map(|_| ClassViews::default())
            .collect();
    }

    pub(crate) fn views(&self, id: ClassId) -> &ClassViews {
        &self.views[id.index()]
    }

    pub(crate) fn reverse(&self) -> &ReverseDependencies {
        self.reverse.get_or_init(|| ReverseDependencies::build(self))
    }

    // ---- lookup ---------------------------------------------------------

    /// Look up any known class (imported or stub) by binary or canonical name.
    pub fn get(&self, name: &str) -> Option<&JavaClass> {
        self.by_name
            .get(name)
            .or_else(|| self.by_name.get(&name.replace('/', ".")))
            .map(|id| &self.classes[id.index()])
    }

    /// Whether a class with this name was part of the import batch.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some_and(|class| class.fully_imported)
    }

    pub fn class(&self, id: ClassId) -> &JavaClass {
        &self.classes[id.index()]
    }

    pub fn member(&self, id: MemberId) -> &JavaMember {
        &self.members[id.index()]
    }

    pub fn access(&self, id: AccessId) -> &JavaAccess {
        &self.accesses[id.index()]
    }

    pub fn type_variable(&self, id: TypeVariableId) -> &TypeVariable {
        &self.type_variables[id.index()]
    }

    pub fn object_class(&self) -> ClassId {
        self.object_class
    }

    /// Imported classes, in import order.
    pub fn iter(&self) -> impl Iterator<Item = &JavaClass> {
        self.imported.iter().map(|id| &self.classes[id.index()])
    }

    pub fn imported_ids(&self) -> &[ClassId] {
        &self.imported
    }

    /// Imported classes and stubs.
    pub fn all_classes(&self) -> &[JavaClass] {
        &self.classes
    }

    pub fn all_members(&self) -> &[JavaMember] {
        &self.members
    }

    pub fn all_accesses(&self) -> &[JavaAccess] {
        &self.accesses
    }

    pub fn len(&self) -> usize {
        self.imported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imported.is_empty()
    }

    pub fn type_name(&self, ty: &JavaType) -> String {
        ty.name(self)
    }

    pub fn source_code_location(&self, class: ClassId, line: u32) -> SourceCodeLocation {
        SourceCodeLocation {
            source_file_name: self.class(class).source_file_name(),
            line,
        }
    }

    /// Innermost element class of an array class, or the class itself.
    pub fn base_component_type(&self, id: ClassId) -> ClassId {
        let mut current = id;
        while let Some(component) = self.class(current).component_type {
            current = component;
        }
        current
    }

    // ---- hierarchy ------------------------------------------------------

    /// Raw superclasses from the direct superclass up to the root.
    ///
    /// Never contains the class itself, even for malformed input.
    pub fn all_superclasses(&self, id: ClassId) -> &[ClassId] {
        self.views(id).all_superclasses.get_or_init(|| {
            let mut result = Vec::new();
            let mut visited = HashSet::from([id]);
            let mut current = self.class(id).raw_superclass();
            while let Some(superclass) = current {
                if !visited.insert(superclass) {
                    break;
                }
                result.push(superclass);
                current = self.class(superclass).raw_superclass();
            }
            result
        })
    }

    /// The class followed by all of its superclasses.
    pub fn class_hierarchy(&self, id: ClassId) -> Vec<ClassId> {
        std::iter::once(id)
            .chain(self.all_superclasses(id).iter().copied())
            .collect()
    }

    /// Every interface implemented directly or indirectly, breadth first.
    pub fn all_interfaces(&self, id: ClassId) -> &[ClassId] {
        self.views(id).all_interfaces.get_or_init(|| {
            let mut result = Vec::new();
            let mut seen = HashSet::new();
            let mut queue: VecDeque<ClassId> = VecDeque::new();
            for class in self.class_hierarchy(id) {
                queue.extend(self.class(class).raw_interfaces());
            }
            while let Some(interface) = queue.pop_front() {
                if interface == id || !seen.insert(interface) {
                    continue;
                }
                result.push(interface);
                queue.extend(self.class(interface).raw_interfaces());
            }
            result
        })
    }

    /// Transitive subclasses and implementations among the known classes.
    pub fn all_subclasses(&self, id: ClassId) -> &[ClassId] {
        self.views(id).all_subclasses.get_or_init(|| {
            let mut result = Vec::new();
            let mut seen = HashSet::from([id]);
            let mut stack: Vec<ClassId> = self.class(id).subclasses.iter().rev().copied().collect();
            while let Some(subclass) = stack.pop() {
                if !seen.insert(subclass) {
                    continue;
                }
                result.push(subclass);
                stack.extend(self.class(subclass).subclasses.iter().rev().copied());
            }
            result
        })
    }

    /// The class, its superclasses and all of its interfaces.
    pub fn all_classes_self_is_assignable_to(&self, id: ClassId) -> Vec<ClassId> {
        let mut result = self.class_hierarchy(id);
        result.extend(self.all_interfaces(id).iter().copied());
        result
    }

    pub fn is_assignable_to(&self, id: ClassId, name: &str) -> bool {
        self.all_classes_self_is_assignable_to(id)
            .into_iter()
            .any(|candidate| self.class(candidate).name == name)
    }

    pub fn is_assignable_from(&self, id: ClassId, name: &str) -> bool {
        match self.get(name) {
            Some(other) => self.all_classes_self_is_assignable_to(other.id).contains(&id),
            None => false,
        }
    }

    // ---- members --------------------------------------------------------

    pub fn members_of(&self, id: ClassId) -> &[MemberId] {
        &self.class(id).members
    }

    fn declared(&self, id: ClassId, filter: impl Fn(&JavaMember) -> bool) -> Vec<MemberId> {
        self.class(id)
            .members
            .iter()
            .copied()
            .filter(|member| filter(self.member(*member)))
            .collect()
    }

    pub fn fields(&self, id: ClassId) -> Vec<MemberId> {
        self.declared(id, JavaMember::is_field)
    }

    pub fn methods(&self, id: ClassId) -> Vec<MemberId> {
        self.declared(id, JavaMember::is_method)
    }

    pub fn constructors(&self, id: ClassId) -> Vec<MemberId> {
        self.declared(id, JavaMember::is_constructor)
    }

    pub fn code_units(&self, id: ClassId) -> Vec<MemberId> {
        self.declared(id, |member| member.code_unit().is_some())
    }

    pub fn static_initializer(&self, id: ClassId) -> Option<MemberId> {
        self.declared(id, JavaMember::is_static_initializer)
            .into_iter()
            .next()
    }

    pub fn field(&self, id: ClassId, name: &str) -> Option<MemberId> {
        self.declared(id, |member| member.is_field() && member.name == name)
            .into_iter()
            .next()
    }

    /// Declared method with exactly these parameter type names.
    ///
    /// Several matches (bridge methods share the erased signature) are ranked
    /// like member resolution ranks them: synthetic last, then full name,
    /// then descriptor.
    pub fn method(&self, id: ClassId, name: &str, parameter_types: &[&str]) -> Option<MemberId> {
        self.declared(id, |member| {
            member.is_method()
                && member.name == name
                && self.parameter_names_match(member, parameter_types)
        })
        .into_iter()
        .min_by(|a, b| compare_candidates(self, *a, *b))
    }

    pub fn constructor(&self, id: ClassId, parameter_types: &[&str]) -> Option<MemberId> {
        self.declared(id, |member| {
            member.is_constructor() && self.parameter_names_match(member, parameter_types)
        })
        .into_iter()
        .min_by(|a, b| compare_candidates(self, *a, *b))
    }

    /// Method or constructor (`<init>`) with the given signature.
    pub fn code_unit_with_parameter_types(
        &self,
        id: ClassId,
        name: &str,
        parameter_types: &[&str],
    ) -> Option<MemberId> {
        if name == CONSTRUCTOR_NAME {
            self.constructor(id, parameter_types)
        } else {
            self.method(id, name, parameter_types)
        }
    }

    pub(crate) fn parameter_names_match<S: AsRef<str>>(
        &self,
        member: &JavaMember,
        parameter_types: &[S],
    ) -> bool {
        let raw = member.raw_parameter_types();
        raw.len() == parameter_types.len()
            && raw
                .iter()
                .zip(parameter_types)
                .all(|(id, name)| self.class(*id).name == name.as_ref() || self.class(*id).full_name == name.as_ref())
    }

    /// Fields visible on this class, in JVM field lookup order: the class
    /// itself, its superinterfaces, then its superclass, recursively.
    pub fn all_fields(&self, id: ClassId) -> &[MemberId] {
        self.views(id).all_fields.get_or_init(|| {
            self.field_lookup_order(id)
                .into_iter()
                .flat_map(|class| self.fields(class))
                .collect()
        })
    }

    /// Methods of the class hierarchy followed by methods of all interfaces.
    pub fn all_methods(&self, id: ClassId) -> &[MemberId] {
        self.views(id).all_methods.get_or_init(|| {
            self.class_hierarchy(id)
                .into_iter()
                .chain(self.all_interfaces(id).iter().copied())
                .flat_map(|class| self.methods(class))
                .collect()
        })
    }

    /// Constructors along the superclass chain; interfaces declare none.
    pub fn all_constructors(&self, id: ClassId) -> &[MemberId] {
        self.views(id).all_constructors.get_or_init(|| {
            self.class_hierarchy(id)
                .into_iter()
                .flat_map(|class| self.constructors(class))
                .collect()
        })
    }

    pub fn all_members_of(&self, id: ClassId) -> Vec<MemberId> {
        let mut members: Vec<MemberId> = self.all_fields(id).to_vec();
        members.extend_from_slice(self.all_methods(id));
        members.extend_from_slice(self.all_constructors(id));
        members
    }

    pub(crate) fn field_lookup_order(&self, id: ClassId) -> Vec<ClassId> {
        fn visit(classes: &JavaClasses, id: ClassId, seen: &mut HashSet<ClassId>, out: &mut Vec<ClassId>) {
            if !seen.insert(id) {
                return;
            }
            out.push(id);
            for interface in classes.class(id).raw_interfaces() {
                visit(classes, interface, seen, out);
            }
            if let Some(superclass) = classes.class(id).raw_superclass() {
                visit(classes, superclass, seen, out);
            }
        }
        let mut out = Vec::new();
        visit(self, id, &mut HashSet::new(), &mut out);
        out
    }

    /// Enum constants declared by an enum class.
    pub fn enum_constants(&self, id: ClassId) -> Vec<MemberId> {
        self.declared(id, |member| {
            member.is_field()
                && member.has_modifier(JavaModifier::Enum)
                && member.raw_field_type() == Some(id)
        })
    }

    // ---- accesses -------------------------------------------------------

    pub fn accesses_from_code_unit(&self, member: MemberId) -> impl Iterator<Item = &JavaAccess> {
        self.member(member)
            .code_unit()
            .map(|code_unit| code_unit.accesses.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|id| self.access(*id))
    }

    fn accesses_of_kind(
        &self,
        member: MemberId,
        filter: impl Fn(&AccessKind) -> bool,
    ) -> Vec<&JavaAccess> {
        self.accesses_from_code_unit(member)
            .filter(|access| filter(&access.kind))
            .collect()
    }

    pub fn field_accesses_from(&self, member: MemberId) -> Vec<&JavaAccess> {
        self.accesses_of_kind(member, |kind| matches!(kind, AccessKind::FieldAccess(_)))
    }

    pub fn method_calls_from(&self, member: MemberId) -> Vec<&JavaAccess> {
        self.accesses_of_kind(member, |kind| *kind == AccessKind::MethodCall)
    }

    pub fn constructor_calls_from(&self, member: MemberId) -> Vec<&JavaAccess> {
        self.accesses_of_kind(member, |kind| *kind == AccessKind::ConstructorCall)
    }

    pub fn method_references_from(&self, member: MemberId) -> Vec<&JavaAccess> {
        self.accesses_of_kind(member, |kind| *kind == AccessKind::MethodReference)
    }

    pub fn constructor_references_from(&self, member: MemberId) -> Vec<&JavaAccess> {
        self.accesses_of_kind(member, |kind| *kind == AccessKind::ConstructorReference)
    }

    /// Accesses from all code units of the class.
    pub fn accesses_from_class(&self, id: ClassId) -> Vec<&JavaAccess> {
        self.code_units(id)
            .into_iter()
            .flat_map(|member| self.accesses_from_code_unit(member))
            .collect()
    }

    /// The declared member an access target points at, if it was imported.
    ///
    /// Computed once per target and then cached.
    pub fn resolve(&self, target: &AccessTarget) -> Option<MemberId> {
        *target
            .resolution
            .get_or_init(|| crate::resolution::resolve_member(self, target))
    }
}
