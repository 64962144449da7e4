use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub mod access;
pub mod annotation;
pub mod class;
pub mod classes;
pub mod descriptor;
pub mod member;
pub mod package_matcher;
pub mod types;

pub use access::{AccessKind, AccessTarget, FieldAccessType, JavaAccess, TargetKind};
pub use annotation::{AnnotatedElement, AnnotationFormatter, AnnotationValue, JavaAnnotation};
pub use class::JavaClass;
pub use classes::JavaClasses;
pub use member::{CodeUnit, JavaMember, MemberKind, Parameter};
pub use types::{JavaType, TypeVariable, TypeVariableOwner};

/// Index of a class in the snapshot's class arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassId(pub u32);

/// Index of a field, method, constructor or static initializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccessId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeVariableId(pub u32);

macro_rules! arena_index {
    ($($id:ident),*) => {
        $(
            impl $id {
                pub fn index(self) -> usize {
                    self.0 as usize
                }

                pub(crate) fn from_index(index: usize) -> Self {
                    $id(index as u32)
                }
            }
        )*
    };
}

arena_index!(ClassId, MemberId, AccessId, TypeVariableId);

pub const OBJECT_CLASS_NAME: &str = "java.lang.Object";
pub const CONSTRUCTOR_NAME: &str = "<init>";
pub const STATIC_INITIALIZER_NAME: &str = "<clinit>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JavaModifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Volatile,
    Transient,
    Abstract,
    Synchronized,
    Native,
    Bridge,
    Synthetic,
    Enum,
}

impl JavaModifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            JavaModifier::Public => "public",
            JavaModifier::Protected => "protected",
            JavaModifier::Private => "private",
            JavaModifier::Static => "static",
            JavaModifier::Final => "final",
            JavaModifier::Volatile => "volatile",
            JavaModifier::Transient => "transient",
            JavaModifier::Abstract => "abstract",
            JavaModifier::Synchronized => "synchronized",
            JavaModifier::Native => "native",
            JavaModifier::Bridge => "bridge",
            JavaModifier::Synthetic => "synthetic",
            JavaModifier::Enum => "enum",
        }
    }
}

impl FromStr for JavaModifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(JavaModifier::Public),
            "protected" => Ok(JavaModifier::Protected),
            "private" => Ok(JavaModifier::Private),
            "static" => Ok(JavaModifier::Static),
            "final" => Ok(JavaModifier::Final),
            "volatile" => Ok(JavaModifier::Volatile),
            "transient" => Ok(JavaModifier::Transient),
            "abstract" => Ok(JavaModifier::Abstract),
            "synchronized" => Ok(JavaModifier::Synchronized),
            "native" => Ok(JavaModifier::Native),
            "bridge" => Ok(JavaModifier::Bridge),
            "synthetic" => Ok(JavaModifier::Synthetic),
            "enum" => Ok(JavaModifier::Enum),
            _ => Err(format!("unknown modifier: {}", s)),
        }
    }
}

impl fmt::Display for JavaModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// MD5 digest of a class source, if it was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Md5sum {
    /// Hashing is switched off in the import configuration.
    Disabled,
    /// Hashing was requested but the source could not be read.
    Undetermined,
    Digest([u8; 16]),
}

impl fmt::Display for Md5sum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Md5sum::Disabled => write!(f, "DISABLED"),
            Md5sum::Undetermined => write!(f, "UNDETERMINED"),
            Md5sum::Digest(bytes) => {
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

/// Where the bytecode of a class was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    /// `SourceFile` attribute of the class, e.g. `Foo.java`.
    pub file_name: Option<String>,
    pub md5: Md5sum,
}

impl Source {
    pub fn new(uri: impl Into<String>, file_name: Option<String>, md5_enabled: bool) -> Self {
        let uri = uri.into();
        let md5 = if md5_enabled {
            compute_md5(&uri)
        } else {
            Md5sum::Disabled
        };
        Source {
            uri,
            file_name,
            md5,
        }
    }
}

fn compute_md5(uri: &str) -> Md5sum {
    let path = uri.strip_prefix("file://").unwrap_or(uri);
    match std::fs::read(Path::new(path)) {
        Ok(bytes) => Md5sum::Digest(md5::compute(bytes).0),
        Err(err) => {
            tracing::debug!(uri, error = %err, "could not hash class source");
            Md5sum::Undetermined
        }
    }
}

/// A position in a Java source file, rendered as `(Foo.java:12)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceCodeLocation {
    pub source_file_name: String,
    pub line: u32,
}

impl fmt::Display for SourceCodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.source_file_name, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_modifier_round_trip() {
        for modifier in [
            JavaModifier::Public,
            JavaModifier::Synthetic,
            JavaModifier::Bridge,
            JavaModifier::Enum,
        ] {
            assert_eq!(modifier.as_str().parse::<JavaModifier>(), Ok(modifier));
        }
        assert!("sealed".parse::<JavaModifier>().is_err());
    }

    #[test]
    fn test_source_md5_disabled() {
        let source = Source::new("/does/not/matter.class", None, false);
        assert_eq!(source.md5, Md5sum::Disabled);
    }

    #[test]
    fn test_source_md5_of_missing_file_is_undetermined() {
        let source = Source::new("file:///definitely/missing/Foo.class", None, true);
        assert_eq!(source.md5, Md5sum::Undetermined);
        assert_eq!(source.md5.to_string(), "UNDETERMINED");
    }

    #[test]
    fn test_source_md5_of_readable_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();
        let uri = format!("file://{}", file.path().display());
        let source = Source::new(uri, Some("Foo.java".to_string()), true);
        assert_eq!(source.md5.to_string(), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn test_source_code_location_display() {
        let location = SourceCodeLocation {
            source_file_name: "Foo.java".to_string(),
            line: 12,
        };
        assert_eq!(location.to_string(), "(Foo.java:12)");
    }
}
