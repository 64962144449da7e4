use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::error::{ModelError, Result};
use crate::model::access::{AccessKind, AccessTarget, JavaAccess};
use crate::model::annotation::{AnnotatedElement, AnnotationValue, JavaAnnotation};
use crate::model::member::{
    format_code_unit_name, format_field_name, CodeUnit, Field, JavaMember, MemberKind, Parameter,
    TryCatchBlock, TypeUsage,
};
use crate::model::types::{
    GenericArrayType, JavaType, ParameterizedType, TypeVariable, TypeVariableOwner, WildcardType,
};
use crate::model::{AccessId, ClassId, JavaClasses, MemberId, Source, TypeVariableId};

use super::{
    method_descriptor, ClassKind, CodeUnitKey, ImportContext, RawAnnotation, RawAnnotationValue,
    RawCodeUnit, RawType, RawTypeParameter,
};

pub use crate::config::ImportOptions;

/// Completion phases, in the order they have to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Created,
    Hierarchy,
    Members,
    Accesses,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Created => "created",
            Phase::Hierarchy => "hierarchy",
            Phase::Members => "members",
            Phase::Accesses => "accesses",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum CodeUnitKind {
    Method,
    Constructor,
    StaticInitializer,
}

/// Where type-variable names are looked up.
#[derive(Debug, Clone, Copy)]
struct Scope {
    class: ClassId,
    code_unit: Option<MemberId>,
}

impl Scope {
    fn class(class: ClassId) -> Self {
        Scope {
            class,
            code_unit: None,
        }
    }

    fn owner(&self) -> TypeVariableOwner {
        match self.code_unit {
            Some(member) => TypeVariableOwner::CodeUnit(member),
            None => TypeVariableOwner::Class(self.class),
        }
    }
}

/// Links the raw records of an import batch into a [`JavaClasses`] snapshot.
///
/// Each phase runs for every class of the batch before the next phase starts
/// for any class, since later phases look at hierarchy data of other classes.
/// Running a phase out of order fails with [`ModelError::PhaseOrder`].
pub struct CompletionEngine<'a, C: ImportContext + ?Sized> {
    context: &'a C,
    options: ImportOptions,
    classes: JavaClasses,
    phase: Phase,
    code_units: Vec<(MemberId, CodeUnitKey)>,
    undeclared_variables: HashMap<(TypeVariableOwner, String), TypeVariableId>,
}

impl<'a, C: ImportContext + ?Sized> CompletionEngine<'a, C> {
    /// Register every class of the batch. Nothing is linked yet.
    pub fn new(context: &'a C, options: ImportOptions) -> Result<Self> {
        let mut classes = JavaClasses::empty();
        for header in context.imported_classes() {
            let id = classes.class_with_type(&header.name)?;
            if classes.class(id).fully_imported {
                tracing::warn!(class = %header.name, "duplicate class record in import batch, keeping the first");
                continue;
            }

            let source = header.source.as_ref().map(|source| {
                Source::new(
                    source.uri.clone(),
                    source.file_name.clone(),
                    options.enable_md5_in_class_sources,
                )
            });
            let class = classes.class_mut(id);
            class.fully_imported = true;
            class.modifiers = header.modifiers;
            class.is_interface = matches!(header.kind, ClassKind::Interface | ClassKind::Annotation);
            class.is_enum = header.kind == ClassKind::Enum;
            class.is_annotation = header.kind == ClassKind::Annotation;
            class.is_record = header.kind == ClassKind::Record;
            class.source = source;
            classes.imported.push(id);
        }
        tracing::debug!(classes = classes.imported.len(), "registered imported classes");

        Ok(CompletionEngine {
            context,
            options,
            classes,
            phase: Phase::Created,
            code_units: Vec::new(),
            undeclared_variables: HashMap::new(),
        })
    }

    /// Run all phases and publish the snapshot.
    pub fn complete(context: &'a C, options: ImportOptions) -> Result<JavaClasses> {
        let mut engine = Self::new(context, options)?;
        engine.complete_hierarchy()?;
        engine.complete_members()?;
        engine.complete_accesses()?;
        engine.finish()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// The class with this name; a stub is created for unknown names.
    pub fn java_class_with_type(&mut self, name: &str) -> Result<ClassId> {
        self.classes.class_with_type(name)
    }

    fn advance(&mut self, from: Phase, to: Phase) -> Result<()> {
        if self.phase != from {
            return Err(ModelError::PhaseOrder {
                expected: from.as_str(),
                actual: self.phase.as_str(),
            });
        }
        self.phase = to;
        Ok(())
    }

    /// Enclosing classes, type parameters, superclasses, interfaces and the
    /// subclass back-references.
    pub fn complete_hierarchy(&mut self) -> Result<()> {
        self.advance(Phase::Created, Phase::Hierarchy)?;
        let imported = self.classes.imported.clone();

        // Declarations first: bounds may refer to variables of enclosing classes.
        let mut pending_bounds = Vec::new();
        for &id in &imported {
            let name = self.classes.class(id).name.clone();
            if let Some(enclosing) = self.context.create_enclosing_class(&name) {
                let enclosing = self.classes.class_with_type(&enclosing)?;
                self.classes.class_mut(id).enclosing_class = Some(enclosing);
            }
            let parameters = self.context.create_type_parameters(&name);
            let declared = self.declare_type_parameters(&parameters, TypeVariableOwner::Class(id));
            self.classes.class_mut(id).type_parameters = declared.clone();
            pending_bounds.push((Scope::class(id), declared, parameters));
        }
        for (scope, declared, parameters) in pending_bounds {
            self.resolve_bounds(scope, &declared, &parameters)?;
        }

        for &id in &imported {
            let name = self.classes.class(id).name.clone();
            let scope = Scope::class(id);
            let superclass = match self.context.create_super_class(&name) {
                Some(raw) => Some(self.java_type(&raw, scope)?),
                None => None,
            };
            let interfaces = self
                .context
                .create_interfaces(&name)
                .iter()
                .map(|raw| self.java_type(raw, scope))
                .collect::<Result<Vec<_>>>()?;

            let class = self.classes.class_mut(id);
            class.superclass = superclass;
            class.interfaces = interfaces;
            let supertypes: Vec<ClassId> = class
                .raw_superclass()
                .into_iter()
                .chain(class.raw_interfaces())
                .collect();
            for supertype in supertypes {
                if supertype != id {
                    self.classes.class_mut(supertype).subclasses.push(id);
                }
            }
        }

        tracing::debug!(classes = imported.len(), "completed class hierarchy");
        Ok(())
    }

    /// Fields, code units, class annotations and parameter annotations.
    pub fn complete_members(&mut self) -> Result<()> {
        self.advance(Phase::Hierarchy, Phase::Members)?;
        let imported = self.classes.imported.clone();

        for &id in &imported {
            let name = self.classes.class(id).name.clone();
            for raw in self.context.create_fields(&name) {
                let field_type = self.java_type(&raw.field_type, Scope::class(id))?;
                let raw_type = field_type.erasure(&self.classes);
                let descriptor = super::type_descriptor(&self.classes.class(raw_type).name);
                let member = self.classes.push_member(JavaMember {
                    id: MemberId(0),
                    owner: id,
                    name: raw.name.clone(),
                    descriptor,
                    full_name: format_field_name(&name, &raw.name),
                    modifiers: raw.modifiers.clone(),
                    annotations: Vec::new(),
                    kind: MemberKind::Field(Field {
                        field_type,
                        raw_type,
                    }),
                });
                let annotations = self.annotations(&raw.annotations, AnnotatedElement::Member(member))?;
                self.classes.member_mut(member).annotations = annotations;
            }

            for raw in self.context.create_constructors(&name) {
                self.create_code_unit(id, &name, &raw, CodeUnitKind::Constructor)?;
            }
            for raw in self.context.create_methods(&name) {
                self.create_code_unit(id, &name, &raw, CodeUnitKind::Method)?;
            }
            if let Some(raw) = self.context.create_static_initializer(&name) {
                self.create_code_unit(id, &name, &raw, CodeUnitKind::StaticInitializer)?;
            }

            let raw_annotations = self.context.create_annotations(&name);
            let annotations = self.annotations(&raw_annotations, AnnotatedElement::Class(id))?;
            self.classes.class_mut(id).annotations = annotations;
        }

        tracing::debug!(
            classes = imported.len(),
            members = self.classes.members.len(),
            "completed members"
        );
        Ok(())
    }

    /// Field accesses, calls and member references of every code unit.
    pub fn complete_accesses(&mut self) -> Result<()> {
        self.advance(Phase::Members, Phase::Accesses)?;

        for (member, key) in std::mem::take(&mut self.code_units) {
            let mut seen = HashSet::new();
            let mut accesses = Vec::new();

            for raw in self.context.field_accesses_for(&key) {
                let owner = self.classes.class_with_type(&raw.owner)?;
                let field_type = self.classes.class_with_type(&raw.field_type)?;
                let full_name = format_field_name(&self.classes.class(owner).name, &raw.name);
                let target = AccessTarget::new(
                    AccessKind::FieldAccess(raw.access_type).target_kind(),
                    owner,
                    raw.name,
                    Vec::new(),
                    field_type,
                    full_name,
                );
                accesses.push((AccessKind::FieldAccess(raw.access_type), target, raw.line));
            }

            let calls = [
                (AccessKind::MethodCall, self.context.method_calls_for(&key)),
                (AccessKind::ConstructorCall, self.context.constructor_calls_for(&key)),
                (AccessKind::MethodReference, self.context.method_references_for(&key)),
                (
                    AccessKind::ConstructorReference,
                    self.context.constructor_references_for(&key),
                ),
            ];
            for (kind, raw_calls) in calls {
                for raw in raw_calls {
                    let owner = self.classes.class_with_type(&raw.owner)?;
                    let parameter_types = raw
                        .parameter_types
                        .iter()
                        .map(|p| self.classes.class_with_type(p))
                        .collect::<Result<Vec<_>>>()?;
                    let return_type = self.classes.class_with_type(&raw.return_type)?;
                    let parameter_names: Vec<&str> = parameter_types
                        .iter()
                        .map(|p| self.classes.class(*p).full_name.as_str())
                        .collect();
                    let full_name = format_code_unit_name(
                        &self.classes.class(owner).name,
                        &raw.name,
                        &parameter_names,
                    );
                    let target = AccessTarget::new(
                        kind.target_kind(),
                        owner,
                        raw.name,
                        parameter_types,
                        return_type,
                        full_name,
                    );
                    accesses.push((kind, target, raw.line));
                }
            }

            let origin_full_name = self.classes.member(member).full_name.clone();
            let mut ids: Vec<AccessId> = Vec::new();
            for (kind, target, line) in accesses {
                if !seen.insert((kind, target.full_name.clone(), line)) {
                    continue;
                }
                ids.push(self.classes.push_access(JavaAccess {
                    id: AccessId(0),
                    kind,
                    origin: member,
                    origin_full_name: origin_full_name.clone(),
                    target,
                    line,
                }));
            }
            match self.classes.member_mut(member).code_unit_mut() {
                Some(code_unit) => code_unit.accesses = ids,
                None => {
                    return Err(ModelError::UnknownCodeUnit {
                        owner: key.owner,
                        name: key.name,
                        descriptor: key.descriptor,
                    })
                }
            }
        }

        tracing::debug!(accesses = self.classes.accesses.len(), "completed accesses");
        Ok(())
    }

    /// Build the derived views and the reverse dependency index, then publish.
    pub fn finish(mut self) -> Result<JavaClasses> {
        if self.phase != Phase::Accesses {
            return Err(ModelError::PhaseOrder {
                expected: Phase::Accesses.as_str(),
                actual: self.phase.as_str(),
            });
        }
        self.classes.seal();

        let classes = self.classes;
        classes.imported.par_iter().for_each(|id| {
            classes.direct_dependencies_from(*id);
        });
        classes.reverse();
        Ok(classes)
    }

    fn create_code_unit(
        &mut self,
        owner: ClassId,
        owner_name: &str,
        raw: &RawCodeUnit,
        kind: CodeUnitKind,
    ) -> Result<MemberId> {
        let member = self.classes.push_member(JavaMember {
            id: MemberId(0),
            owner,
            name: raw.name.clone(),
            descriptor: String::new(),
            full_name: String::new(),
            modifiers: raw.modifiers.clone(),
            annotations: Vec::new(),
            kind: MemberKind::Method(CodeUnit::default()),
        });
        let scope = Scope {
            class: owner,
            code_unit: Some(member),
        };

        let type_parameters =
            self.declare_type_parameters(&raw.type_parameters, TypeVariableOwner::CodeUnit(member));
        if let Some(code_unit) = self.classes.member_mut(member).code_unit_mut() {
            code_unit.type_parameters = type_parameters.clone();
        }
        self.resolve_bounds(scope, &type_parameters, &raw.type_parameters)?;

        let mut parameters = Vec::with_capacity(raw.parameters.len());
        for (index, raw_parameter) in raw.parameters.iter().enumerate() {
            let parameter_type = self.java_type(&raw_parameter.parameter_type, scope)?;
            let raw_type = parameter_type.erasure(&self.classes);
            let annotations = self.annotations(
                &raw_parameter.annotations,
                AnnotatedElement::Parameter { member, index },
            )?;
            parameters.push(Parameter {
                index,
                parameter_type,
                raw_type,
                annotations,
            });
        }
        let return_type = self.java_type(&raw.return_type, scope)?;
        let raw_return_type = return_type.erasure(&self.classes);

        let throws = self.class_ids(raw.throws.iter().map(String::as_str))?;
        let mut try_catch_blocks = Vec::new();
        for block in &raw.try_catch_blocks {
            try_catch_blocks.push(TryCatchBlock {
                caught_types: self.class_ids(block.caught_types.iter().map(String::as_str))?,
                line: block.line,
            });
        }
        let instanceof_checks = self.type_usages(&raw.instanceof_checks)?;
        let class_object_references = self.type_usages(&raw.class_object_references)?;
        let annotations = self.annotations(&raw.annotations, AnnotatedElement::Member(member))?;

        let parameter_names: Vec<String> = parameters
            .iter()
            .map(|p| self.classes.class(p.raw_type).full_name.clone())
            .collect();
        let descriptor = match &raw.descriptor {
            Some(descriptor) => descriptor.clone(),
            None => {
                let binary_names: Vec<&str> = parameters
                    .iter()
                    .map(|p| self.classes.class(p.raw_type).name.as_str())
                    .collect();
                method_descriptor(&binary_names, &self.classes.class(raw_return_type).name)
            }
        };
        let code_unit = CodeUnit {
            return_type: Some(return_type),
            raw_return_type: Some(raw_return_type),
            parameters,
            throws,
            type_parameters,
            first_line: raw.first_line,
            accesses: Vec::new(),
            try_catch_blocks,
            instanceof_checks,
            class_object_references,
        };

        let java_member = self.classes.member_mut(member);
        java_member.full_name = format_code_unit_name(owner_name, &raw.name, &parameter_names);
        java_member.descriptor = descriptor.clone();
        java_member.annotations = annotations;
        java_member.kind = match kind {
            CodeUnitKind::Method => MemberKind::Method(code_unit),
            CodeUnitKind::Constructor => MemberKind::Constructor(code_unit),
            CodeUnitKind::StaticInitializer => MemberKind::StaticInitializer(code_unit),
        };
        self.code_units.push((
            member,
            CodeUnitKey {
                owner: owner_name.to_string(),
                name: raw.name.clone(),
                descriptor,
            },
        ));
        Ok(member)
    }

    fn class_ids<'n>(&mut self, names: impl Iterator<Item = &'n str>) -> Result<Vec<ClassId>> {
        names.map(|name| self.classes.class_with_type(name)).collect()
    }

    fn type_usages(&mut self, raw: &[super::RawTypeUsage]) -> Result<Vec<TypeUsage>> {
        raw.iter()
            .map(|usage| {
                Ok(TypeUsage {
                    target: self.classes.class_with_type(&usage.type_name)?,
                    line: usage.line,
                })
            })
            .collect()
    }

    fn declare_type_parameters(
        &mut self,
        parameters: &[RawTypeParameter],
        owner: TypeVariableOwner,
    ) -> Vec<TypeVariableId> {
        parameters
            .iter()
            .map(|parameter| {
                self.classes.push_type_variable(TypeVariable {
                    id: TypeVariableId(0),
                    name: parameter.name.clone(),
                    owner,
                    bounds: Vec::new(),
                })
            })
            .collect()
    }

    fn resolve_bounds(
        &mut self,
        scope: Scope,
        declared: &[TypeVariableId],
        parameters: &[RawTypeParameter],
    ) -> Result<()> {
        for (id, parameter) in declared.iter().zip(parameters) {
            let bounds = parameter
                .bounds
                .iter()
                .map(|bound| self.java_type(bound, scope))
                .collect::<Result<Vec<_>>>()?;
            self.classes.type_variable_mut(*id).bounds = bounds;
        }
        Ok(())
    }

    fn java_type(&mut self, raw: &RawType, scope: Scope) -> Result<JavaType> {
        Ok(match raw {
            RawType::Class { name } => JavaType::Class(self.classes.class_with_type(name)?),
            RawType::Parameterized { raw, arguments } => {
                let raw = self.classes.class_with_type(raw)?;
                let arguments = arguments
                    .iter()
                    .map(|argument| self.java_type(argument, scope))
                    .collect::<Result<Vec<_>>>()?;
                JavaType::Parameterized(ParameterizedType { raw, arguments })
            }
            RawType::Variable { name } => JavaType::TypeVariable(self.type_variable(name, scope)),
            RawType::Wildcard {
                upper_bounds,
                lower_bounds,
            } => {
                let upper_bounds = upper_bounds
                    .iter()
                    .map(|bound| self.java_type(bound, scope))
                    .collect::<Result<Vec<_>>>()?;
                let lower_bounds = lower_bounds
                    .iter()
                    .map(|bound| self.java_type(bound, scope))
                    .collect::<Result<Vec<_>>>()?;
                JavaType::Wildcard(WildcardType {
                    upper_bounds,
                    lower_bounds,
                })
            }
            RawType::GenericArray { component } => {
                let component = self.java_type(component, scope)?;
                let component_erasure = component.erasure(&self.classes);
                let array_name = format!("{}[]", self.classes.class(component_erasure).name);
                let erasure = self.classes.class_with_type(&array_name)?;
                JavaType::GenericArray(GenericArrayType {
                    component: Box::new(component),
                    erasure,
                })
            }
        })
    }

    /// Look a variable up in the code unit, the declaring class and then the
    /// enclosing classes. Unknown names become unbounded variables.
    fn type_variable(&mut self, name: &str, scope: Scope) -> TypeVariableId {
        if let Some(found) = self.declared_variable(name, scope) {
            return found;
        }
        let owner = scope.owner();
        if let Some(existing) = self.undeclared_variables.get(&(owner, name.to_string())) {
            return *existing;
        }
        tracing::warn!(
            variable = name,
            class = %self.classes.class(scope.class).name,
            "type variable is not declared in scope, treating it as unbounded"
        );
        let id = self.classes.push_type_variable(TypeVariable {
            id: TypeVariableId(0),
            name: name.to_string(),
            owner,
            bounds: Vec::new(),
        });
        self.undeclared_variables.insert((owner, name.to_string()), id);
        id
    }

    fn declared_variable(&self, name: &str, scope: Scope) -> Option<TypeVariableId> {
        let named = |ids: &[TypeVariableId]| {
            ids.iter()
                .copied()
                .find(|id| self.classes.type_variable(*id).name == name)
        };
        if let Some(member) = scope.code_unit {
            let code_unit_variables = self
                .classes
                .member(member)
                .code_unit()
                .map(|c| c.type_parameters.clone())
                .unwrap_or_default();
            if let Some(found) = named(&code_unit_variables) {
                return Some(found);
            }
        }

        let mut visited = HashSet::new();
        let mut current = Some(scope.class);
        while let Some(class) = current {
            if !visited.insert(class) {
                break;
            }
            if let Some(found) = named(&self.classes.class(class).type_parameters) {
                return Some(found);
            }
            current = self.classes.class(class).enclosing_class;
        }
        None
    }

    fn annotations(
        &mut self,
        raw: &[RawAnnotation],
        owner: AnnotatedElement,
    ) -> Result<Vec<JavaAnnotation>> {
        raw.iter()
            .map(|annotation| self.annotation(annotation, owner))
            .collect()
    }

    fn annotation(&mut self, raw: &RawAnnotation, owner: AnnotatedElement) -> Result<JavaAnnotation> {
        let annotation_type = self.classes.class_with_type(&raw.annotation_type)?;
        let mut properties = std::collections::BTreeMap::new();
        for (name, value) in &raw.properties {
            properties.insert(name.clone(), self.annotation_value(value, owner)?);
        }
        Ok(JavaAnnotation {
            annotation_type,
            owner,
            properties,
        })
    }

    fn annotation_value(
        &mut self,
        raw: &RawAnnotationValue,
        owner: AnnotatedElement,
    ) -> Result<AnnotationValue> {
        Ok(match raw {
            RawAnnotationValue::Boolean(v) => AnnotationValue::Boolean(*v),
            RawAnnotationValue::Byte(v) => AnnotationValue::Byte(*v),
            RawAnnotationValue::Char(v) => AnnotationValue::Char(*v),
            RawAnnotationValue::Short(v) => AnnotationValue::Short(*v),
            RawAnnotationValue::Int(v) => AnnotationValue::Int(*v),
            RawAnnotationValue::Long(v) => AnnotationValue::Long(*v),
            RawAnnotationValue::Float(v) => AnnotationValue::Float(*v),
            RawAnnotationValue::Double(v) => AnnotationValue::Double(*v),
            RawAnnotationValue::String(v) => AnnotationValue::String(v.clone()),
            RawAnnotationValue::Class(name) => {
                AnnotationValue::Class(self.classes.class_with_type(name)?)
            }
            RawAnnotationValue::EnumConstant { enum_type, name } => AnnotationValue::EnumConstant {
                enum_type: self.classes.class_with_type(enum_type)?,
                name: name.clone(),
            },
            RawAnnotationValue::Annotation(nested) => {
                AnnotationValue::Annotation(Box::new(self.annotation(nested, owner)?))
            }
            RawAnnotationValue::Array(values) => AnnotationValue::Array(
                values
                    .iter()
                    .map(|value| self.annotation_value(value, owner))
                    .collect::<Result<Vec<_>>>()?,
            ),
        })
    }
}
