use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analysis::cycles::detect_cycles;
use crate::analysis::dependencies::describe_annotated_element;
use crate::analysis::{Dependency, DependencyKind, Direction};
use crate::config::{AnnotationFormat, ArchConfig};
use crate::import::batch::ImportBatch;
use crate::import::completion::CompletionEngine;
use crate::model::{
    AccessKind, AnnotatedElement, AnnotationFormatter, ClassId, JavaAccess, JavaClasses, MemberId,
    MemberKind,
};

use super::output::{
    format_accessors_text, format_annotations_text, format_cycles_text, format_deps_text,
    format_output, format_packages_text, format_summary_text,
};
use super::OutputFormat;

/// Load an import batch and complete it into a snapshot.
pub fn load_snapshot(batch_path: &Path, config: &ArchConfig) -> Result<JavaClasses> {
    let batch = ImportBatch::load(batch_path)?;
    tracing::debug!(
        path = %batch_path.display(),
        classes = batch.len(),
        "loaded import batch"
    );
    CompletionEngine::complete(&batch, config.import.clone())
        .with_context(|| format!("Failed to complete import batch {}", batch_path.display()))
}

fn find_class(classes: &JavaClasses, name: &str) -> Result<ClassId> {
    classes
        .get(name)
        .map(|class| class.id)
        .with_context(|| format!("Class not found in batch: {}", name))
}

/// Look up an imported member by its full name.
pub fn find_member(classes: &JavaClasses, full_name: &str) -> Option<MemberId> {
    classes
        .all_members()
        .iter()
        .find(|member| member.full_name == full_name)
        .map(|member| member.id)
}

fn parse_direction(direction: &str) -> Result<Direction> {
    match direction {
        "in" => Ok(Direction::In),
        "out" => Ok(Direction::Out),
        "both" => Ok(Direction::Both),
        other => anyhow::bail!("Unknown direction: {} (expected in, out or both)", other),
    }
}

#[derive(Debug, Serialize)]
pub struct DependencyEntry {
    pub origin: String,
    pub target: String,
    pub kind: DependencyKind,
    pub line: u32,
    pub description: String,
}

impl DependencyEntry {
    fn new(classes: &JavaClasses, dependency: &Dependency) -> Self {
        DependencyEntry {
            origin: classes.class(dependency.origin_class).name.clone(),
            target: classes.class(dependency.target_class).name.clone(),
            kind: dependency.kind,
            line: dependency.line(),
            description: dependency.description.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DepsResult {
    pub command: String,
    pub class: String,
    pub direction: Direction,
    pub transitive: bool,
    pub outgoing: Vec<DependencyEntry>,
    pub incoming: Vec<DependencyEntry>,
    pub summary: DepsSummary,
}

#[derive(Debug, Serialize)]
pub struct DepsSummary {
    pub outgoing: usize,
    pub incoming: usize,
    pub classes_depended_on: usize,
    pub dependent_classes: usize,
}

/// Run the `deps` command.
pub fn run_deps(
    classes: &JavaClasses,
    class_name: &str,
    transitive: bool,
    direction_str: &str,
    format: &OutputFormat,
) -> Result<String> {
    let id = find_class(classes, class_name)?;
    let direction = parse_direction(direction_str)?;

    let outgoing: BTreeSet<Dependency> = match (direction, transitive) {
        (Direction::In, _) => BTreeSet::new(),
        (_, true) => classes.transitive_dependencies_from(id),
        (_, false) => classes.direct_dependencies_from(id).iter().cloned().collect(),
    };
    let incoming: BTreeSet<Dependency> = match (direction, transitive) {
        (Direction::Out, _) => BTreeSet::new(),
        (_, true) => classes.transitive_dependencies_to(id),
        (_, false) => classes.direct_dependencies_to(id).iter().cloned().collect(),
    };

    let depended_on: BTreeSet<&str> = outgoing
        .iter()
        .map(|d| classes.class(d.target_class).name.as_str())
        .collect();
    let dependents: BTreeSet<&str> = incoming
        .iter()
        .map(|d| classes.class(d.origin_class).name.as_str())
        .collect();

    let result = DepsResult {
        command: "deps".to_string(),
        class: classes.class(id).name.clone(),
        direction,
        transitive,
        summary: DepsSummary {
            outgoing: outgoing.len(),
            incoming: incoming.len(),
            classes_depended_on: depended_on.len(),
            dependent_classes: dependents.len(),
        },
        outgoing: outgoing
            .iter()
            .map(|d| DependencyEntry::new(classes, d))
            .collect(),
        incoming: incoming
            .iter()
            .map(|d| DependencyEntry::new(classes, d))
            .collect(),
    };

    Ok(format_output(&result, format, format_deps_text))
}

#[derive(Debug, Serialize)]
pub struct AccessEntry {
    pub origin: String,
    pub origin_class: String,
    pub verb: String,
    pub line: u32,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct AccessorsResult {
    pub command: String,
    pub member: String,
    pub kind: String,
    pub accesses: Vec<AccessEntry>,
    pub summary: AccessorsSummary,
}

#[derive(Debug, Serialize)]
pub struct AccessorsSummary {
    pub total: usize,
    pub calls: usize,
    pub references: usize,
    pub field_accesses: usize,
}

/// Run the `accessors` command.
pub fn run_accessors(classes: &JavaClasses, full_name: &str, format: &OutputFormat) -> Result<String> {
    let member = find_member(classes, full_name)
        .with_context(|| format!("Member not found in batch: {}", full_name))?;

    let mut accesses: Vec<&JavaAccess> = classes.accesses_to(member);
    accesses.sort_by(|a, b| {
        a.origin_full_name
            .cmp(&b.origin_full_name)
            .then_with(|| a.line.cmp(&b.line))
    });

    let count = |filter: fn(&AccessKind) -> bool| accesses.iter().filter(|a| filter(&a.kind)).count();
    let summary = AccessorsSummary {
        total: accesses.len(),
        calls: count(|kind| kind.is_call()),
        references: count(|kind| {
            matches!(
                kind,
                AccessKind::MethodReference | AccessKind::ConstructorReference
            )
        }),
        field_accesses: count(|kind| matches!(kind, AccessKind::FieldAccess(_))),
    };

    let java_member = classes.member(member);
    let result = AccessorsResult {
        command: "accessors".to_string(),
        member: java_member.full_name.clone(),
        kind: java_member.kind_name().to_string(),
        accesses: accesses
            .iter()
            .map(|access| AccessEntry {
                origin: access.origin_full_name.clone(),
                origin_class: classes
                    .class(access.origin_owner(classes))
                    .name
                    .clone(),
                verb: access.kind.verb().to_string(),
                line: access.line,
                description: access.description(classes),
            })
            .collect(),
        summary,
    };

    Ok(format_output(&result, format, format_accessors_text))
}

/// Run the `cycles` command.
pub fn run_cycles(classes: &JavaClasses, format: &OutputFormat) -> Result<String> {
    let result = detect_cycles(classes);
    Ok(format_output(&result, format, format_cycles_text))
}

#[derive(Debug, Serialize)]
pub struct PackagesResult {
    pub command: String,
    pub pattern: String,
    pub classes: Vec<String>,
}

/// Run the `packages` command.
pub fn run_packages(classes: &JavaClasses, pattern: &str, format: &OutputFormat) -> Result<String> {
    let matching = classes
        .classes_in_packages(&[pattern])
        .with_context(|| format!("Invalid package pattern: {}", pattern))?;
    let mut names: Vec<String> = matching
        .into_iter()
        .map(|id| classes.class(id).name.clone())
        .collect();
    names.sort();

    let result = PackagesResult {
        command: "packages".to_string(),
        pattern: pattern.to_string(),
        classes: names,
    };
    Ok(format_output(&result, format, format_packages_text))
}

#[derive(Debug, Serialize)]
pub struct AnnotationEntry {
    pub element: String,
    pub annotation: String,
}

#[derive(Debug, Serialize)]
pub struct AnnotationsResult {
    pub command: String,
    pub class: String,
    pub declared: Vec<AnnotationEntry>,
    /// Usages of the class as an annotation type, if it is one.
    pub usages: Vec<AnnotationEntry>,
}

/// Run the `annotations` command.
pub fn run_annotations(
    classes: &JavaClasses,
    class_name: &str,
    annotation_format: &AnnotationFormat,
    format: &OutputFormat,
) -> Result<String> {
    let id = find_class(classes, class_name)?;
    let formatter = AnnotationFormatter::new(annotation_format.clone());
    let class = classes.class(id);

    let mut elements = vec![AnnotatedElement::Class(id)];
    for member in &class.members {
        elements.push(AnnotatedElement::Member(*member));
        if let Some(code_unit) = classes.member(*member).code_unit() {
            elements.extend(code_unit.parameters.iter().map(|parameter| {
                AnnotatedElement::Parameter {
                    member: *member,
                    index: parameter.index,
                }
            }));
        }
    }

    let declared = elements
        .into_iter()
        .flat_map(move |element| {
            classes
                .annotations_of(element)
                .iter()
                .map(move |annotation| (element, annotation))
        })
        .map(|(element, annotation)| AnnotationEntry {
            element: describe_annotated_element(classes, element),
            annotation: formatter.format(annotation, classes),
        })
        .collect();

    let usages = classes
        .annotations_with_type(id)
        .into_iter()
        .map(|(reference, annotation)| AnnotationEntry {
            element: describe_annotated_element(classes, reference.element),
            annotation: formatter.format(annotation, classes),
        })
        .collect();

    let result = AnnotationsResult {
        command: "annotations".to_string(),
        class: class.name.clone(),
        declared,
        usages,
    };
    Ok(format_output(&result, format, format_annotations_text))
}

#[derive(Debug, Serialize)]
pub struct SummaryResult {
    pub command: String,
    pub classes: ClassSummary,
    pub members: MemberSummary,
    pub accesses: AccessSummary,
    pub dependencies: usize,
    pub cycles: CycleSummaryCompact,
}

#[derive(Debug, Serialize)]
pub struct ClassSummary {
    pub imported: usize,
    pub stubs: usize,
    pub interfaces: usize,
    pub enums: usize,
    pub annotations: usize,
    pub records: usize,
}

#[derive(Debug, Serialize)]
pub struct MemberSummary {
    pub fields: usize,
    pub methods: usize,
    pub constructors: usize,
    pub static_initializers: usize,
}

#[derive(Debug, Serialize)]
pub struct AccessSummary {
    pub total: usize,
    pub resolved: usize,
    pub unresolved: usize,
}

#[derive(Debug, Serialize)]
pub struct CycleSummaryCompact {
    pub cycle_count: usize,
    pub classes_in_cycles: usize,
}

/// Run the `summary` command.
pub fn run_summary(classes: &JavaClasses, format: &OutputFormat) -> Result<String> {
    let imported: Vec<_> = classes.iter().collect();
    let count_classes = |filter: fn(&&crate::model::JavaClass) -> bool| {
        imported.iter().filter(|class| filter(class)).count()
    };

    let mut members = MemberSummary {
        fields: 0,
        methods: 0,
        constructors: 0,
        static_initializers: 0,
    };
    for member in classes.all_members() {
        match member.kind {
            MemberKind::Field(_) => members.fields += 1,
            MemberKind::Method(_) => members.methods += 1,
            MemberKind::Constructor(_) => members.constructors += 1,
            MemberKind::StaticInitializer(_) => members.static_initializers += 1,
        }
    }

    let resolved = classes
        .all_accesses()
        .iter()
        .filter(|access| classes.resolve(&access.target).is_some())
        .count();
    let dependencies: usize = classes
        .imported_ids()
        .iter()
        .map(|id| classes.direct_dependencies_from(*id).len())
        .sum();
    let cycles = detect_cycles(classes);

    let result = SummaryResult {
        command: "summary".to_string(),
        classes: ClassSummary {
            imported: imported.len(),
            stubs: classes
                .all_classes()
                .iter()
                .filter(|class| !class.fully_imported && !class.is_primitive)
                .count(),
            interfaces: count_classes(|class| class.is_interface && !class.is_annotation),
            enums: count_classes(|class| class.is_enum),
            annotations: count_classes(|class| class.is_annotation),
            records: count_classes(|class| class.is_record),
        },
        members,
        accesses: AccessSummary {
            total: classes.all_accesses().len(),
            resolved,
            unresolved: classes.all_accesses().len() - resolved,
        },
        dependencies,
        cycles: CycleSummaryCompact {
            cycle_count: cycles.cycles.len(),
            classes_in_cycles: cycles.summary.classes_in_cycles,
        },
    };

    Ok(format_output(&result, format, format_summary_text))
}
