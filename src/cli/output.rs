use serde::Serialize;

use crate::analysis::cycles::CycleResult;

use super::commands::{
    AccessorsResult, AnnotationsResult, DependencyEntry, DepsResult, PackagesResult,
    SummaryResult,
};
use super::OutputFormat;

/// Format a serializable result; `text` renders the human readable form.
pub fn format_output<T: Serialize>(
    value: &T,
    format: &OutputFormat,
    text: impl FnOnce(&T) -> String,
) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).unwrap_or_default(),
        OutputFormat::Compact => serde_json::to_string(value).unwrap_or_default(),
        OutputFormat::Text => text(value),
    }
}

fn push_dependencies(output: &mut String, heading: &str, entries: &[DependencyEntry]) {
    output.push_str(&format!("{} ({}):\n", heading, entries.len()));
    for entry in entries {
        output.push_str(&format!("  {}\n", entry.description));
    }
}

pub fn format_deps_text(result: &DepsResult) -> String {
    let mut output = format!(
        "{}{}\n",
        result.class,
        if result.transitive { " (transitive)" } else { "" }
    );
    if !result.outgoing.is_empty() || result.summary.incoming == 0 {
        push_dependencies(&mut output, "Depends on", &result.outgoing);
    }
    if !result.incoming.is_empty() {
        push_dependencies(&mut output, "Depended on by", &result.incoming);
    }
    output
}

pub fn format_accessors_text(result: &AccessorsResult) -> String {
    let mut output = format!(
        "{} <{}>: {} accesses\n",
        result.kind, result.member, result.summary.total
    );
    for access in &result.accesses {
        output.push_str(&format!("  {}\n", access.description));
    }
    output
}

pub fn format_cycles_text(result: &CycleResult) -> String {
    if result.cycles.is_empty() {
        return format!(
            "No dependency cycles among {} classes (confidence: {})\n",
            result.summary.total_classes, result.confidence
        );
    }
    let mut output = format!(
        "{} cycles, {} classes involved (confidence: {})\n",
        result.summary.cycle_count, result.summary.classes_in_cycles, result.confidence
    );
    for (i, cycle) in result.cycles.iter().enumerate() {
        let names: Vec<&str> = cycle.classes.iter().map(|c| c.name.as_str()).collect();
        output.push_str(&format!(
            "  {}. [{}] {}\n",
            i + 1,
            cycle.length,
            names.join(" <-> ")
        ));
    }
    output
}

pub fn format_packages_text(result: &PackagesResult) -> String {
    let mut output = String::new();
    for class in &result.classes {
        output.push_str(class);
        output.push('\n');
    }
    output
}

pub fn format_annotations_text(result: &AnnotationsResult) -> String {
    let mut output = String::new();
    for entry in &result.declared {
        output.push_str(&format!("{:<60} {}\n", entry.element, entry.annotation));
    }
    if !result.usages.is_empty() {
        output.push_str(&format!("Used as annotation on {} elements:\n", result.usages.len()));
        for entry in &result.usages {
            output.push_str(&format!("  {}\n", entry.element));
        }
    }
    output
}

pub fn format_summary_text(result: &SummaryResult) -> String {
    let classes = &result.classes;
    let members = &result.members;
    format!(
        "Classes:      {} imported, {} stubs ({} interfaces, {} enums, {} annotations, {} records)\n\
         Members:      {} fields, {} methods, {} constructors, {} static initializers\n\
         Accesses:     {} total, {} resolved, {} unresolved\n\
         Dependencies: {}\n\
         Cycles:       {} ({} classes)\n",
        classes.imported,
        classes.stubs,
        classes.interfaces,
        classes.enums,
        classes.annotations,
        classes.records,
        members.fields,
        members.methods,
        members.constructors,
        members.static_initializers,
        result.accesses.total,
        result.accesses.resolved,
        result.accesses.unresolved,
        result.dependencies,
        result.cycles.cycle_count,
        result.cycles.classes_in_cycles,
    )
}
