//! Resolution of access targets to declared members.
//!
//! Bytecode only records the static owner of a call (`B.bar()`), not the
//! class that actually declares `bar()`. The lookup below follows the order
//! `Class.getMethod` / `Class.getField` use at runtime.

use std::cmp::Ordering;

use crate::model::{AccessTarget, ClassId, JavaClasses, MemberId, TargetKind};

/// Find the declared member an access target points at.
///
/// Returns `None` when neither the owner nor any of its supertypes declares a
/// matching member, which is the normal outcome for targets in classes that
/// were not imported.
pub fn resolve_member(classes: &JavaClasses, target: &AccessTarget) -> Option<MemberId> {
    match target.kind {
        TargetKind::Field => resolve_field(classes, target),
        TargetKind::Constructor | TargetKind::ConstructorReference => {
            resolve_constructor(classes, target)
        }
        TargetKind::Method | TargetKind::MethodReference => resolve_method(classes, target),
    }
}

/// Declaring class, then superinterfaces, then superclass, recursively.
fn resolve_field(classes: &JavaClasses, target: &AccessTarget) -> Option<MemberId> {
    classes
        .field_lookup_order(target.owner)
        .into_iter()
        .find_map(|class| classes.field(class, &target.name))
}

/// Constructors are looked up along the superclass chain, nearest first.
fn resolve_constructor(classes: &JavaClasses, target: &AccessTarget) -> Option<MemberId> {
    classes
        .class_hierarchy(target.owner)
        .into_iter()
        .find_map(|class| {
            classes
                .constructors(class)
                .into_iter()
                .filter(|member| matches_signature(classes, *member, target))
                .min_by(|a, b| compare_candidates(classes, *a, *b))
        })
}

fn resolve_method(classes: &JavaClasses, target: &AccessTarget) -> Option<MemberId> {
    let from_class_hierarchy = classes
        .class_hierarchy(target.owner)
        .into_iter()
        .find_map(|class| best_method_in(classes, &[class], target));
    if from_class_hierarchy.is_some() {
        return from_class_hierarchy;
    }

    let mut candidates: Vec<MemberId> = classes
        .all_interfaces(target.owner)
        .iter()
        .flat_map(|interface| matching_methods(classes, *interface, target))
        .collect();

    // A method from a superinterface is hidden by one from a more specific
    // interface that extends it.
    let owners: Vec<ClassId> = candidates.iter().map(|m| classes.member(*m).owner).collect();
    candidates.retain(|candidate| {
        let owner = classes.member(*candidate).owner;
        !owners.iter().any(|other| {
            *other != owner && classes.all_interfaces(*other).contains(&owner)
        })
    });
    candidates
        .into_iter()
        .min_by(|a, b| compare_candidates(classes, *a, *b))
}

fn best_method_in(classes: &JavaClasses, owners: &[ClassId], target: &AccessTarget) -> Option<MemberId> {
    owners
        .iter()
        .flat_map(|owner| matching_methods(classes, *owner, target))
        .min_by(|a, b| compare_candidates(classes, *a, *b))
}

fn matching_methods(classes: &JavaClasses, owner: ClassId, target: &AccessTarget) -> Vec<MemberId> {
    classes
        .methods(owner)
        .into_iter()
        .filter(|member| {
            classes.member(*member).name == target.name
                && matches_signature(classes, *member, target)
        })
        .collect()
}

fn matches_signature(classes: &JavaClasses, member: MemberId, target: &AccessTarget) -> bool {
    classes.member(member).raw_parameter_types() == target.parameter_types
}

/// Non-synthetic before synthetic, then by full name, then by descriptor.
///
/// Bridge methods share the erased signature of the method they bridge to,
/// so raw signature matching alone cannot tell them apart.
pub(crate) fn compare_candidates(classes: &JavaClasses, a: MemberId, b: MemberId) -> Ordering {
    let a = classes.member(a);
    let b = classes.member(b);
    a.is_synthetic()
        .cmp(&b.is_synthetic())
        .then_with(|| a.full_name.cmp(&b.full_name))
        .then_with(|| a.descriptor.cmp(&b.descriptor))
}
