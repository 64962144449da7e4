use thiserror::Error;

/// Errors raised while building the domain model.
///
/// Absence of a class or member is never an error: unresolved references are
/// represented as `None` throughout the model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A completion phase was invoked before the phases it depends on ran
    /// for the whole import batch.
    #[error("completion phase out of order: expected {expected}, but the engine is at {actual}")]
    PhaseOrder {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("invalid type name: {0:?}")]
    InvalidTypeName(String),

    #[error("invalid package pattern {pattern:?}: {reason}")]
    InvalidPackagePattern { pattern: String, reason: String },

    #[error("unknown code unit {owner}.{name}{descriptor}")]
    UnknownCodeUnit {
        owner: String,
        name: String,
        descriptor: String,
    },
}

/// Failures of the explicit, opt-in reflection step.
///
/// Only raised when a caller asks to reflect an imported entity against a
/// runtime classpath; graph construction never produces these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectionError {
    #[error("class {0} cannot be found on the runtime classpath")]
    ClassNotFound(String),

    #[error("runtime classpath is inconsistent with imported bytecode for {name}: {reason}")]
    InconsistentClasspath { name: String, reason: String },
}

pub type Result<T, E = ModelError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order_message() {
        let err = ModelError::PhaseOrder {
            expected: "members",
            actual: "created",
        };
        assert_eq!(
            err.to_string(),
            "completion phase out of order: expected members, but the engine is at created"
        );
    }

    #[test]
    fn test_inconsistent_classpath_message() {
        let err = ReflectionError::InconsistentClasspath {
            name: "com.example.Foo".to_string(),
            reason: "method bar() is missing".to_string(),
        };
        assert!(err.to_string().contains("com.example.Foo"));
        assert!(err.to_string().contains("bar()"));
    }
}
