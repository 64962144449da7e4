use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::classes::JavaClasses;
use super::member::MemberKind;
use super::{AccessId, ClassId, MemberId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Field,
    Method,
    Constructor,
    MethodReference,
    ConstructorReference,
}

impl TargetKind {
    pub fn is_constructor(&self) -> bool {
        matches!(
            self,
            TargetKind::Constructor | TargetKind::ConstructorReference
        )
    }

    pub fn is_method(&self) -> bool {
        matches!(self, TargetKind::Method | TargetKind::MethodReference)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldAccessType {
    Get,
    Set,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    FieldAccess(FieldAccessType),
    MethodCall,
    ConstructorCall,
    MethodReference,
    ConstructorReference,
}

impl AccessKind {
    pub fn target_kind(&self) -> TargetKind {
        match self {
            AccessKind::FieldAccess(_) => TargetKind::Field,
            AccessKind::MethodCall => TargetKind::Method,
            AccessKind::ConstructorCall => TargetKind::Constructor,
            AccessKind::MethodReference => TargetKind::MethodReference,
            AccessKind::ConstructorReference => TargetKind::ConstructorReference,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            AccessKind::FieldAccess(FieldAccessType::Get) => "gets field",
            AccessKind::FieldAccess(FieldAccessType::Set) => "sets field",
            AccessKind::FieldAccess(FieldAccessType::Unknown) => "accesses field",
            AccessKind::MethodCall => "calls method",
            AccessKind::ConstructorCall => "calls constructor",
            AccessKind::MethodReference => "references method",
            AccessKind::ConstructorReference => "references constructor",
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, AccessKind::MethodCall | AccessKind::ConstructorCall)
    }
}

/// What an access points at: owner, name and signature as recorded in the
/// bytecode, not the declared member.
///
/// Two targets are equal iff their full names are equal. The matching
/// member is looked up lazily via [`JavaClasses::resolve`] and may be absent
/// when the owner (or the declaring supertype) was not imported.
#[derive(Debug, Clone)]
pub struct AccessTarget {
    pub kind: TargetKind,
    pub owner: ClassId,
    pub name: String,
    pub parameter_types: Vec<ClassId>,
    /// Field type for field targets, return type otherwise.
    pub return_type: ClassId,
    pub full_name: String,
    pub(crate) resolution: OnceLock<Option<MemberId>>,
}

impl AccessTarget {
    pub(crate) fn new(
        kind: TargetKind,
        owner: ClassId,
        name: String,
        parameter_types: Vec<ClassId>,
        return_type: ClassId,
        full_name: String,
    ) -> Self {
        AccessTarget {
            kind,
            owner,
            name,
            parameter_types,
            return_type,
            full_name,
            resolution: OnceLock::new(),
        }
    }

    /// The target a direct call, access or reference to `member` would have.
    ///
    /// Static initializers run implicitly and cannot be targeted, so they
    /// have none.
    pub fn for_member(classes: &JavaClasses, member: MemberId) -> Option<Self> {
        let java_member = classes.member(member);
        let kind = match &java_member.kind {
            MemberKind::Field(_) => TargetKind::Field,
            MemberKind::Constructor(_) => TargetKind::Constructor,
            MemberKind::Method(_) => TargetKind::Method,
            MemberKind::StaticInitializer(_) => return None,
        };
        let return_type = java_member
            .raw_field_type()
            .or_else(|| java_member.code_unit().and_then(|c| c.raw_return_type))
            .unwrap_or_else(|| classes.object_class());
        Some(AccessTarget::new(
            kind,
            java_member.owner,
            java_member.name.clone(),
            java_member.raw_parameter_types(),
            return_type,
            java_member.full_name.clone(),
        ))
    }

    pub fn description(&self) -> String {
        format!("<{}>", self.full_name)
    }
}

impl PartialEq for AccessTarget {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name
    }
}

impl Eq for AccessTarget {}

impl Hash for AccessTarget {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.full_name.hash(state);
    }
}

/// A field access, call or member reference made from a code unit.
#[derive(Debug, Clone)]
pub struct JavaAccess {
    pub id: AccessId,
    pub kind: AccessKind,
    pub origin: MemberId,
    pub origin_full_name: String,
    pub target: AccessTarget,
    pub line: u32,
}

impl JavaAccess {
    pub fn origin_owner(&self, classes: &JavaClasses) -> ClassId {
        classes.member(self.origin).owner
    }

    pub fn target_owner(&self) -> ClassId {
        self.target.owner
    }

    /// E.g. `Method <a.A.foo()> calls method <b.B.bar()> in (A.java:5)`.
    pub fn description(&self, classes: &JavaClasses) -> String {
        let origin = classes.member(self.origin);
        format!(
            "{} {} {} in {}",
            origin.description(),
            self.kind.verb(),
            self.target.description(),
            classes.source_code_location(origin.owner, self.line)
        )
    }
}

impl PartialEq for JavaAccess {
    fn eq(&self, other: &Self) -> bool {
        self.origin_full_name == other.origin_full_name
            && self.target.full_name == other.target.full_name
            && self.line == other.line
    }
}

impl Eq for JavaAccess {}

impl Hash for JavaAccess {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.origin_full_name.hash(state);
        self.target.full_name.hash(state);
        self.line.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(kind: TargetKind, owner: u32, full_name: &str) -> AccessTarget {
        AccessTarget::new(
            kind,
            ClassId(owner),
            "bar".to_string(),
            Vec::new(),
            ClassId(0),
            full_name.to_string(),
        )
    }

    #[test]
    fn test_target_equality_is_by_full_name() {
        let call = target(TargetKind::Method, 1, "b.B.bar()");
        let reference = target(TargetKind::MethodReference, 2, "b.B.bar()");
        let other = target(TargetKind::Method, 1, "b.B.bar(int)");
        assert_eq!(call, reference);
        assert_ne!(call, other);
    }

    #[test]
    fn test_verbs() {
        assert_eq!(AccessKind::MethodCall.verb(), "calls method");
        assert_eq!(
            AccessKind::FieldAccess(FieldAccessType::Set).verb(),
            "sets field"
        );
        assert_eq!(
            AccessKind::ConstructorReference.target_kind(),
            TargetKind::ConstructorReference
        );
        assert!(TargetKind::ConstructorReference.is_constructor());
    }

    #[test]
    fn test_access_equality() {
        let access = |line| JavaAccess {
            id: AccessId(0),
            kind: AccessKind::MethodCall,
            origin: MemberId(0),
            origin_full_name: "a.A.foo()".to_string(),
            target: target(TargetKind::Method, 1, "b.B.bar()"),
            line,
        };
        assert_eq!(access(5), access(5));
        assert_ne!(access(5), access(6));
    }
}
