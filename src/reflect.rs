use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ReflectionError;
use crate::model::{ClassId, JavaClasses, MemberId, MemberKind};

/// Structural view of a class as loaded from a runtime classpath.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeClass {
    pub name: String,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub methods: Vec<RuntimeSignature>,
    #[serde(default)]
    pub constructors: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSignature {
    pub name: String,
    #[serde(default)]
    pub parameter_types: Vec<String>,
}

/// A runtime member matched to an imported one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectedMember {
    Field {
        class: String,
        name: String,
    },
    Method {
        class: String,
        name: String,
        parameter_types: Vec<String>,
    },
    Constructor {
        class: String,
        parameter_types: Vec<String>,
    },
}

/// Trait for loading classes at runtime.
///
/// Implementations may perform I/O. The domain model never calls this while
/// it is being built; reflection is always an explicit request of the caller.
pub trait RuntimeClasspath: Send + Sync {
    fn load_class(&self, name: &str) -> Option<RuntimeClass>;
}

/// A classpath backed by a fixed set of class descriptions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClasspath {
    classes: HashMap<String, RuntimeClass>,
}

impl InMemoryClasspath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, class: RuntimeClass) -> Self {
        self.classes.insert(class.name.clone(), class);
        self
    }
}

impl RuntimeClasspath for InMemoryClasspath {
    fn load_class(&self, name: &str) -> Option<RuntimeClass> {
        self.classes.get(name).cloned()
    }
}

impl JavaClasses {
    /// Load the runtime counterpart of an imported class.
    ///
    /// Fails if the class is missing or if its superclass disagrees with the
    /// imported bytecode.
    pub fn reflect_class(
        &self,
        id: ClassId,
        classpath: &dyn RuntimeClasspath,
    ) -> Result<RuntimeClass, ReflectionError> {
        let class = self.class(id);
        let runtime = match self.descriptors.get(&class.name) {
            Some(descriptor) => descriptor.resolve_class(classpath)?,
            None => classpath
                .load_class(&class.name)
                .ok_or_else(|| ReflectionError::ClassNotFound(class.name.clone()))?,
        };

        if class.fully_imported {
            let imported_super = class.raw_superclass().map(|s| self.class(s).name.clone());
            if imported_super != runtime.superclass {
                return Err(ReflectionError::InconsistentClasspath {
                    name: class.name.clone(),
                    reason: format!(
                        "superclass is {} at runtime but {} in the imported bytecode",
                        runtime.superclass.as_deref().unwrap_or("absent"),
                        imported_super.as_deref().unwrap_or("absent")
                    ),
                });
            }
        }
        Ok(runtime)
    }

    /// Find the runtime counterpart of an imported member.
    pub fn reflect_member(
        &self,
        id: MemberId,
        classpath: &dyn RuntimeClasspath,
    ) -> Result<ReflectedMember, ReflectionError> {
        let member = self.member(id);
        let runtime = self.reflect_class(member.owner, classpath)?;
        let parameter_types: Vec<String> = member
            .raw_parameter_types()
            .into_iter()
            .map(|p| self.class(p).name.clone())
            .collect();
        let missing = |what: &str| ReflectionError::InconsistentClasspath {
            name: runtime.name.clone(),
            reason: format!("{} {} is missing at runtime", what, member.full_name),
        };

        match &member.kind {
            MemberKind::Field(_) => runtime
                .fields
                .iter()
                .any(|field| *field == member.name)
                .then(|| ReflectedMember::Field {
                    class: runtime.name.clone(),
                    name: member.name.clone(),
                })
                .ok_or_else(|| missing("field")),
            MemberKind::Method(_) => runtime
                .methods
                .iter()
                .any(|m| m.name == member.name && m.parameter_types == parameter_types)
                .then(|| ReflectedMember::Method {
                    class: runtime.name.clone(),
                    name: member.name.clone(),
                    parameter_types: parameter_types.clone(),
                })
                .ok_or_else(|| missing("method")),
            MemberKind::Constructor(_) => runtime
                .constructors
                .iter()
                .any(|params| *params == parameter_types)
                .then(|| ReflectedMember::Constructor {
                    class: runtime.name.clone(),
                    parameter_types: parameter_types.clone(),
                })
                .ok_or_else(|| missing("constructor")),
            MemberKind::StaticInitializer(_) => Err(ReflectionError::InconsistentClasspath {
                name: runtime.name.clone(),
                reason: "static initializers have no reflective counterpart".to_string(),
            }),
        }
    }
}
