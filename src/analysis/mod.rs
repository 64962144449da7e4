pub mod cycles;
pub mod dependencies;
pub mod reverse;
pub mod transitive;

use serde::{Deserialize, Serialize};

pub use dependencies::{Dependency, DependencyKind};

/// Confidence level for analysis results.
///
/// Analyses run over an import batch that usually references classes it
/// does not contain. Edges through such stub classes are invisible, so a
/// result over a partial import says so rather than asserting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Certain,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Certain => "certain",
            Confidence::High => "high",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of a dependency query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Classes the origin depends on.
    #[default]
    Out,
    /// Classes that depend on the origin.
    In,
    Both,
}
