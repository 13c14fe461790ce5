//! Text and JSON renderings of an analysed package graph.

use serde::Serialize;

use crate::graph::PackageGraph;
use crate::metrics::PackageMetrics;
use crate::package::{JavaPackage, PackageId};
use crate::pipeline::{AnalysisOutcome, Failure};

const INDENT: &str = "    ";
const RULE: &str = "--------------------------------------------------";

/// At most two fraction digits, trailing zeros dropped: `0.5`, `0.67`, `1`.
pub fn format_metric(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        return "0".to_string();
    }
    trimmed.to_string()
}

/// The cycle trace starting at `id`, if it reaches one.
pub fn cycle_trace(graph: &PackageGraph, id: PackageId, all_cycles: bool) -> Option<Vec<String>> {
    let mut trace = Vec::new();
    let found = if all_cycles {
        graph.collect_all_cycles(id, &mut trace)
    } else {
        graph.collect_cycle(id, &mut trace)
    };
    found.then_some(trace)
}

pub fn text_report(graph: &PackageGraph, all_cycles: bool) -> String {
    let packages = graph.sorted_packages();
    let mut out = String::new();

    for package in &packages {
        write_package(&mut out, package);
    }

    out.push('\n');
    out.push_str(&format!("\n{RULE}\n- Package Dependency Cycles:\n{RULE}\n\n"));
    for package in &packages {
        if let Some(trace) = cycle_trace(graph, package.id(), all_cycles) {
            write_cycle(&mut out, &trace);
        }
    }

    out.push_str(&format!("\n{RULE}\n- Summary:\n{RULE}\n\n"));
    out.push_str("Name, Class Count, Abstract Class Count, Ca, Ce, A, I, D, V:\n\n");
    for package in &packages {
        let m = package.metrics();
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            m.name,
            m.class_count,
            m.abstract_class_count,
            m.afferent_coupling,
            m.efferent_coupling,
            format_metric(m.abstractness),
            format_metric(m.instability),
            format_metric(m.distance),
            m.volatility
        ));
    }
    out
}

fn write_package(out: &mut String, package: &JavaPackage) {
    out.push_str(&format!("\n{RULE}\n- Package: {}\n{RULE}\n", package.name()));

    if package.class_count() == 0 {
        out.push_str("No stats available: package referenced, but not analyzed.\n");
        return;
    }

    let m = package.metrics();
    out.push_str("\nStats:\n");
    out.push_str(&format!("{INDENT}Total Classes: {}\n", m.class_count));
    out.push_str(&format!("{INDENT}Concrete Classes: {}\n", m.concrete_class_count));
    out.push_str(&format!("{INDENT}Abstract Classes: {}\n", m.abstract_class_count));
    out.push('\n');
    out.push_str(&format!("{INDENT}Ca: {}\n", m.afferent_coupling));
    out.push_str(&format!("{INDENT}Ce: {}\n", m.efferent_coupling));
    out.push('\n');
    out.push_str(&format!("{INDENT}A: {}\n", format_metric(m.abstractness)));
    out.push_str(&format!("{INDENT}I: {}\n", format_metric(m.instability)));
    out.push_str(&format!("{INDENT}D: {}\n", format_metric(m.distance)));

    let classes = package.sorted_classes();
    out.push_str("\nAbstract Classes:\n");
    for class in classes.iter().filter(|c| c.is_abstract()) {
        out.push_str(&format!("{INDENT}{}\n", class.name()));
    }
    out.push_str("\nConcrete Classes:\n");
    for class in classes.iter().filter(|c| !c.is_abstract()) {
        out.push_str(&format!("{INDENT}{}\n", class.name()));
    }

    out.push_str("\nDepends Upon:\n");
    write_names(out, package.efferents().keys(), "Not dependent on any packages.");
    out.push_str("\nUsed By:\n");
    write_names(out, package.afferents().keys(), "Not used by any packages.");
}

fn write_names<'a>(out: &mut String, names: impl Iterator<Item = &'a String>, empty: &str) {
    let names = sorted(names);
    if names.is_empty() {
        out.push_str(&format!("{INDENT}{empty}\n"));
    }
    for name in names {
        out.push_str(&format!("{INDENT}{name}\n"));
    }
}

/// First entry is the header; entries equal to the last one are targets.
fn write_cycle(out: &mut String, trace: &[String]) {
    let Some((first, rest)) = trace.split_first() else {
        return;
    };
    let target = trace.last().unwrap_or(first);
    out.push_str(&format!("{first}\n{INDENT}|\n"));
    for name in rest {
        if name == target {
            out.push_str(&format!("{INDENT}|-> {name}\n"));
        } else {
            out.push_str(&format!("{INDENT}|   {name}\n"));
        }
    }
    out.push('\n');
}

fn sorted<'a>(names: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut names: Vec<String> = names.cloned().collect();
    names.sort();
    names
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageReport {
    #[serde(flatten)]
    pub metrics: PackageMetrics,
    pub analyzed: bool,
    pub abstract_classes: Vec<String>,
    pub concrete_classes: Vec<String>,
    pub depends_upon: Vec<String>,
    pub used_by: Vec<String>,
    pub cycle: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    pub classes_parsed: usize,
    pub classes_skipped: usize,
    pub duration_ms: u64,
    pub contains_cycles: bool,
    pub packages: Vec<PackageReport>,
    pub failures: Vec<Failure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint_matched: Option<bool>,
}

pub fn json_report(
    graph: &PackageGraph,
    outcome: &AnalysisOutcome,
    all_cycles: bool,
    constraint_matched: Option<bool>,
) -> JsonReport {
    let packages = graph
        .sorted_packages()
        .into_iter()
        .map(|package| {
            let classes = package.sorted_classes();
            let names = |is_abstract: bool| -> Vec<String> {
                classes
                    .iter()
                    .filter(|c| c.is_abstract() == is_abstract)
                    .map(|c| c.name().to_string())
                    .collect()
            };
            PackageReport {
                metrics: package.metrics(),
                analyzed: package.class_count() > 0,
                abstract_classes: names(true),
                concrete_classes: names(false),
                depends_upon: sorted(package.efferents().keys()),
                used_by: sorted(package.afferents().keys()),
                cycle: cycle_trace(graph, package.id(), all_cycles),
            }
        })
        .collect();

    JsonReport {
        classes_parsed: outcome.classes_parsed,
        classes_skipped: outcome.classes_skipped,
        duration_ms: outcome.duration_ms,
        contains_cycles: graph.contains_cycles(),
        packages,
        failures: outcome.failures.clone(),
        constraint_matched,
    }
}
