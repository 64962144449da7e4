use regex::Regex;

use crate::error::{ModelError, Result};

use super::classes::JavaClasses;
use super::ClassId;

/// Matches package names against patterns such as `..service..`,
/// `com.example.*.api` or `com.(*)..`.
///
/// - `..` stands for any number of packages, including none
/// - `*` stands for one package segment (or part of one)
/// - `( )` capture the enclosed part of the package name
/// - `[a|b]` matches either alternative
#[derive(Debug, Clone)]
pub struct PackageMatcher {
    pattern: String,
    regex: Regex,
}

impl PackageMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        let invalid = |reason: &str| ModelError::InvalidPackagePattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };
        if pattern.contains("...") {
            return Err(invalid("more than two consecutive dots"));
        }
        if pattern.matches('(').count() != pattern.matches(')').count() {
            return Err(invalid("unbalanced capture group"));
        }

        let regex = format!("^{}$", to_regex(pattern));
        let regex = Regex::new(&regex).map_err(|err| invalid(&err.to_string()))?;
        Ok(PackageMatcher {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, package_name: &str) -> bool {
        self.regex.is_match(package_name)
    }

    /// Captured groups, or `None` if the package does not match.
    pub fn capture_groups(&self, package_name: &str) -> Option<Vec<String>> {
        let captures = self.regex.captures(package_name)?;
        Some(
            captures
                .iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }
}

fn to_regex(pattern: &str) -> String {
    if pattern == ".." {
        return ".*".to_string();
    }
    let segments: Vec<&str> = pattern.split("..").collect();
    let last = segments.len() - 1;
    let mut regex = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            let leading = i == 1 && segments[0].is_empty();
            let trailing = i == last && segment.is_empty();
            regex.push_str(match (leading, trailing) {
                (true, _) => r"(?:.*\.)?",
                (false, true) => r"(?:\..*)?",
                (false, false) => r"(?:\.|\..*\.)",
            });
        }
        regex.push_str(&segment_to_regex(segment));
    }
    regex
}

fn segment_to_regex(segment: &str) -> String {
    let mut regex = String::new();
    let mut in_alternation = false;
    for c in segment.chars() {
        match c {
            '*' => regex.push_str(r"[\w$]*"),
            '.' => regex.push_str(r"\."),
            '(' | ')' => regex.push(c),
            '[' => {
                in_alternation = true;
                regex.push_str("(?:");
            }
            ']' if in_alternation => {
                in_alternation = false;
                regex.push(')');
            }
            '|' if in_alternation => regex.push('|'),
            other => regex.push_str(&regex::escape(&other.to_string())),
        }
    }
    regex
}

impl JavaClasses {
    /// Imported classes whose package matches any of the patterns.
    pub fn classes_in_packages(&self, patterns: &[&str]) -> Result<Vec<ClassId>> {
        let matchers = patterns
            .iter()
            .map(|pattern| PackageMatcher::new(pattern))
            .collect::<Result<Vec<_>>>()?;
        Ok(self
            .iter()
            .filter(|class| matchers.iter().any(|m| m.matches(&class.package_name)))
            .map(|class| class.id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_and_trailing_dots() {
        let matcher = PackageMatcher::new("..service..").unwrap();
        assert!(matcher.matches("service"));
        assert!(matcher.matches("com.example.service"));
        assert!(matcher.matches("com.example.service.impl"));
        assert!(!matcher.matches("com.example.services"));
        assert!(!matcher.matches("com.example.myservice.impl"));
    }

    #[test]
    fn test_dots_in_the_middle() {
        let matcher = PackageMatcher::new("com..api").unwrap();
        assert!(matcher.matches("com.api"));
        assert!(matcher.matches("com.example.billing.api"));
        assert!(!matcher.matches("com.example.apis"));
        assert!(!matcher.matches("org.example.api"));
    }

    #[test]
    fn test_star_matches_single_segment() {
        let matcher = PackageMatcher::new("com.*.api").unwrap();
        assert!(matcher.matches("com.billing.api"));
        assert!(!matcher.matches("com.billing.core.api"));
    }

    #[test]
    fn test_capture_groups() {
        let matcher = PackageMatcher::new("com.(*)..").unwrap();
        assert_eq!(
            matcher.capture_groups("com.billing.api"),
            Some(vec!["billing".to_string()])
        );
        assert_eq!(matcher.capture_groups("org.billing"), None);
    }

    #[test]
    fn test_alternation() {
        let matcher = PackageMatcher::new("..[web|rest]..").unwrap();
        assert!(matcher.matches("com.example.web"));
        assert!(matcher.matches("com.example.rest.v1"));
        assert!(!matcher.matches("com.example.grpc"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            PackageMatcher::new("com...api"),
            Err(ModelError::InvalidPackagePattern { .. })
        ));
        assert!(PackageMatcher::new("com.(*").is_err());
    }

    #[test]
    fn test_everything() {
        let matcher = PackageMatcher::new("..").unwrap();
        assert!(matcher.matches(""));
        assert!(matcher.matches("a.b.c"));
    }
}
