use std::collections::{BTreeSet, HashSet};

use crate::model::{ClassId, JavaClasses};

use super::dependencies::Dependency;

impl JavaClasses {
    /// Every dependency reachable from `id` by following dependency targets.
    ///
    /// Array targets are followed through their base component type. Each
    /// class is expanded at most once, so cyclic graphs terminate.
    pub fn transitive_dependencies_from(&self, id: ClassId) -> BTreeSet<Dependency> {
        self.walk(id, |classes, class| {
            classes
                .direct_dependencies_from(class)
                .iter()
                .map(|dependency| (dependency, dependency.target_class))
                .collect()
        })
    }

    /// Every dependency from which `id` can be reached.
    pub fn transitive_dependencies_to(&self, id: ClassId) -> BTreeSet<Dependency> {
        self.walk(id, |classes, class| {
            classes
                .direct_dependencies_to(class)
                .iter()
                .map(|dependency| (dependency, dependency.origin_class))
                .collect()
        })
    }

    fn walk<'c>(
        &'c self,
        start: ClassId,
        next: impl Fn(&'c JavaClasses, ClassId) -> Vec<(&'c Dependency, ClassId)>,
    ) -> BTreeSet<Dependency> {
        let mut result = BTreeSet::new();
        let mut visited = HashSet::from([start]);
        let mut stack = vec![start];

        while let Some(class) = stack.pop() {
            for (dependency, neighbour) in next(self, class) {
                result.insert(dependency.clone());
                let neighbour = self.base_component_type(neighbour);
                if visited.insert(neighbour) {
                    stack.push(neighbour);
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use crate::import::batch::ImportBatch;
    use crate::import::completion::CompletionEngine;
    use crate::import::{RawClass, RawCodeUnit, RawType};
    use crate::model::JavaClasses;

    fn complete(batch: ImportBatch) -> JavaClasses {
        CompletionEngine::complete(&batch, Default::default()).unwrap()
    }

    fn targets(classes: &JavaClasses, name: &str) -> Vec<String> {
        let id = classes.get(name).unwrap().id;
        let mut names: Vec<String> = classes
            .transitive_dependencies_from(id)
            .iter()
            .map(|d| classes.class(d.target_class).name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    #[test]
    fn test_chain_is_followed() {
        let classes = complete(
            ImportBatch::new()
                .with_class(RawClass::new("a.A").field("b", RawType::class("a.B")))
                .with_class(RawClass::new("a.B").field("c", RawType::class("a.C")))
                .with_class(RawClass::new("a.C")),
        );
        assert_eq!(
            targets(&classes, "a.A"),
            vec!["a.B", "a.C", "java.lang.Object"]
        );
    }

    #[test]
    fn test_cycle_terminates_with_both_directions() {
        let classes = complete(
            ImportBatch::new()
                .with_class(RawClass::new("a.A").method(
                    RawCodeUnit::method("ping", &[], "void").calls("a.B", "pong", &[], "void", 3),
                ))
                .with_class(RawClass::new("a.B").method(
                    RawCodeUnit::method("pong", &[], "void").calls("a.A", "ping", &[], "void", 8),
                )),
        );
        let a = classes.get("a.A").unwrap().id;
        let b = classes.get("a.B").unwrap().id;
        let all = classes.transitive_dependencies_from(a);
        assert!(all.iter().any(|d| d.origin_class == a && d.target_class == b));
        assert!(all.iter().any(|d| d.origin_class == b && d.target_class == a));
    }

    #[test]
    fn test_array_targets_follow_component() {
        let classes = complete(
            ImportBatch::new()
                .with_class(RawClass::new("a.A").field("items", RawType::class("a.Item[][]")))
                .with_class(RawClass::new("a.Item").field("owner", RawType::class("a.Owner"))),
        );
        let found = targets(&classes, "a.A");
        assert!(found.contains(&"a.Owner".to_string()));
    }

    #[test]
    fn test_incoming_walk() {
        let classes = complete(
            ImportBatch::new()
                .with_class(RawClass::new("a.A").field("b", RawType::class("a.B")))
                .with_class(RawClass::new("a.B").field("c", RawType::class("a.C")))
                .with_class(RawClass::new("a.C")),
        );
        let c = classes.get("a.C").unwrap().id;
        let mut origins: Vec<String> = classes
            .transitive_dependencies_to(c)
            .iter()
            .map(|d| classes.class(d.origin_class).name.clone())
            .collect();
        origins.sort();
        origins.dedup();
        assert_eq!(origins, vec!["a.A", "a.B"]);
    }
}
