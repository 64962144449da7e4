use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::{ClassId, JavaClasses};

use super::Confidence;

/// A set of classes that all depend on each other, directly or transitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
    /// Classes involved in the cycle, sorted by name.
    pub classes: Vec<CycleClass>,
    /// Length of the cycle (number of classes).
    pub length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleClass {
    pub class_id: ClassId,
    pub name: String,
}

/// Result of class-level cycle detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleResult {
    pub cycles: Vec<Cycle>,
    pub confidence: Confidence,
    pub summary: CycleSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleSummary {
    pub total_classes: usize,
    pub classes_in_cycles: usize,
    pub cycle_count: usize,
    pub shortest_cycle: usize,
    pub longest_cycle: usize,
}

/// Detect dependency cycles between imported classes using Tarjan's SCC
/// algorithm.
///
/// A strongly connected component with more than one class is a cycle.
/// Cycles are ordered by length, shortest first.
pub fn detect_cycles(classes: &JavaClasses) -> CycleResult {
    let graph = ClassGraph::build(classes);
    let sccs = tarjan_scc(&graph, classes.imported_ids());

    let mut cycles: Vec<Cycle> = sccs
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let mut members: Vec<CycleClass> = scc
                .iter()
                .map(|id| CycleClass {
                    class_id: *id,
                    name: classes.class(*id).name.clone(),
                })
                .collect();
            members.sort_by(|a, b| a.name.cmp(&b.name));
            let length = members.len();
            Cycle {
                classes: members,
                length,
            }
        })
        .collect();

    cycles.sort_by(|a, b| {
        a.length
            .cmp(&b.length)
            .then_with(|| a.classes[0].name.cmp(&b.classes[0].name))
    });

    let classes_in_cycles: usize = cycles.iter().map(|c| c.length).sum();
    let shortest = cycles.first().map(|c| c.length).unwrap_or(0);
    let longest = cycles.iter().map(|c| c.length).max().unwrap_or(0);

    // Stubs outside the JDK may hide edges back into the imported classes.
    let confidence = if graph.foreign_stubs.is_empty() {
        Confidence::Certain
    } else {
        Confidence::High
    };

    tracing::debug!(
        cycles = cycles.len(),
        classes_in_cycles,
        %confidence,
        "detected dependency cycles"
    );

    CycleResult {
        summary: CycleSummary {
            total_classes: classes.len(),
            classes_in_cycles,
            cycle_count: cycles.len(),
            shortest_cycle: shortest,
            longest_cycle: longest,
        },
        cycles,
        confidence,
    }
}

/// Class-level dependency edges between imported classes.
struct ClassGraph {
    edges: HashMap<ClassId, BTreeSet<ClassId>>,
    foreign_stubs: BTreeSet<ClassId>,
}

impl ClassGraph {
    fn build(classes: &JavaClasses) -> Self {
        let mut edges: HashMap<ClassId, BTreeSet<ClassId>> = HashMap::new();
        let mut foreign_stubs = BTreeSet::new();

        for origin in classes.imported_ids() {
            let targets = edges.entry(*origin).or_default();
            for dependency in classes.direct_dependencies_from(*origin) {
                let target = classes.base_component_type(dependency.target_class);
                let class = classes.class(target);
                if class.fully_imported {
                    if target != *origin {
                        targets.insert(target);
                    }
                } else if !class.is_primitive && !is_jdk_package(&class.package_name) {
                    foreign_stubs.insert(target);
                }
            }
        }
        ClassGraph {
            edges,
            foreign_stubs,
        }
    }

    fn successors(&self, id: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        self.edges.get(&id).into_iter().flatten().copied()
    }
}

fn is_jdk_package(package: &str) -> bool {
    package == "java" || package.starts_with("java.") || package.starts_with("javax.")
}

/// Tarjan's strongly connected components algorithm.
///
/// Returns every SCC, including single-class ones; the caller filters.
fn tarjan_scc(graph: &ClassGraph, nodes: &[ClassId]) -> Vec<Vec<ClassId>> {
    struct TarjanState {
        index_counter: usize,
        stack: Vec<ClassId>,
        on_stack: HashMap<ClassId, bool>,
        index: HashMap<ClassId, usize>,
        lowlink: HashMap<ClassId, usize>,
        result: Vec<Vec<ClassId>>,
    }

    fn strongconnect(state: &mut TarjanState, graph: &ClassGraph, v: ClassId) {
        state.index.insert(v, state.index_counter);
        state.lowlink.insert(v, state.index_counter);
        state.index_counter += 1;
        state.stack.push(v);
        state.on_stack.insert(v, true);

        for w in graph.successors(v) {
            if !state.index.contains_key(&w) {
                strongconnect(state, graph, w);
                let w_low = state.lowlink[&w];
                if w_low < state.lowlink[&v] {
                    state.lowlink.insert(v, w_low);
                }
            } else if *state.on_stack.get(&w).unwrap_or(&false) {
                let w_idx = state.index[&w];
                if w_idx < state.lowlink[&v] {
                    state.lowlink.insert(v, w_idx);
                }
            }
        }

        // v is the root of an SCC: pop it.
        if state.lowlink[&v] == state.index[&v] {
            let mut scc = Vec::new();
            while let Some(w) = state.stack.pop() {
                state.on_stack.insert(w, false);
                scc.push(w);
                if w == v {
                    break;
                }
            }
            state.result.push(scc);
        }
    }

    let mut state = TarjanState {
        index_counter: 0,
        stack: Vec::new(),
        on_stack: HashMap::new(),
        index: HashMap::new(),
        lowlink: HashMap::new(),
        result: Vec::new(),
    };

    for &node in nodes {
        if !state.index.contains_key(&node) {
            strongconnect(&mut state, graph, node);
        }
    }

    state.result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::batch::ImportBatch;
    use crate::import::completion::CompletionEngine;
    use crate::import::{RawClass, RawType};

    /// One class per `(name, field types)` entry; each field is an edge.
    fn graph(edges: &[(&str, &[&str])]) -> JavaClasses {
        let batch = edges.iter().fold(ImportBatch::new(), |batch, (name, targets)| {
            let class = targets
                .iter()
                .enumerate()
                .fold(RawClass::new(name), |class, (i, target)| {
                    class.field(&format!("f{}", i), RawType::class(*target))
                });
            batch.with_class(class)
        });
        CompletionEngine::complete(&batch, Default::default()).unwrap()
    }

    fn names(cycle: &Cycle) -> Vec<&str> {
        cycle.classes.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_no_cycles() {
        let classes = graph(&[("a.A", &["a.B"]), ("a.B", &["a.C"]), ("a.C", &[])]);
        let result = detect_cycles(&classes);
        assert!(result.cycles.is_empty());
        assert_eq!(result.summary.cycle_count, 0);
        assert_eq!(result.confidence, Confidence::Certain);
    }

    #[test]
    fn test_simple_two_class_cycle() {
        let classes = graph(&[("a.A", &["a.B"]), ("a.B", &["a.A"])]);
        let result = detect_cycles(&classes);
        assert_eq!(result.cycles.len(), 1);
        assert_eq!(names(&result.cycles[0]), vec!["a.A", "a.B"]);
    }

    #[test]
    fn test_cycles_sorted_by_length() {
        let classes = graph(&[
            ("a.A", &["a.B"]),
            ("a.B", &["a.C"]),
            ("a.C", &["a.A"]),
            ("d.D", &["d.E"]),
            ("d.E", &["d.D"]),
        ]);
        let result = detect_cycles(&classes);
        assert_eq!(result.cycles.len(), 2);
        assert_eq!(result.cycles[0].length, 2);
        assert_eq!(result.cycles[1].length, 3);
        assert_eq!(result.summary.classes_in_cycles, 5);
        assert_eq!(result.summary.shortest_cycle, 2);
        assert_eq!(result.summary.longest_cycle, 3);
    }

    #[test]
    fn test_self_reference_is_not_a_cycle() {
        let classes = graph(&[("a.Node", &["a.Node", "a.Node[]"])]);
        let result = detect_cycles(&classes);
        assert!(result.cycles.is_empty());
    }

    #[test]
    fn test_array_edges_count() {
        let classes = graph(&[("a.A", &["a.B[]"]), ("a.B", &["a.A"])]);
        let result = detect_cycles(&classes);
        assert_eq!(result.cycles.len(), 1);
    }

    #[test]
    fn test_cycle_with_tail_class() {
        let classes = graph(&[
            ("a.A", &["a.B"]),
            ("a.B", &["a.C", "a.D"]),
            ("a.C", &["a.A"]),
            ("a.D", &[]),
        ]);
        let result = detect_cycles(&classes);
        assert_eq!(result.cycles.len(), 1);
        assert_eq!(names(&result.cycles[0]), vec!["a.A", "a.B", "a.C"]);
    }

    #[test]
    fn test_foreign_stub_lowers_confidence() {
        let classes = graph(&[("a.A", &["org.lib.Helper", "java.util.List"])]);
        let result = detect_cycles(&classes);
        assert_eq!(result.confidence, Confidence::High);

        let jdk_only = graph(&[("a.A", &["java.util.List"])]);
        assert_eq!(detect_cycles(&jdk_only).confidence, Confidence::Certain);
    }
}
