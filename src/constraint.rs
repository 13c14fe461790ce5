use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::graph::PackageGraph;
use crate::package::{JavaPackage, PackageId};

/// An expected package graph that an analysed graph can be checked against.
#[derive(Debug, Clone, Default)]
pub struct DependencyConstraint {
    graph: PackageGraph,
}

#[derive(Debug, Deserialize)]
struct ConstraintFile {
    packages: BTreeMap<String, Vec<String>>,
}

impl DependencyConstraint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `{"packages": {"a": ["b", "c"], "b": []}}`.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let file: ConstraintFile = serde_json::from_str(json)?;
        let mut constraint = Self::new();
        for (name, targets) in &file.packages {
            let from = constraint.add_package(name);
            for target in targets {
                let to = constraint.add_package(target);
                constraint.depends_upon(from, to);
            }
        }
        Ok(constraint)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read constraint file: {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("Invalid constraint file: {}", path.display()))
    }

    pub fn add_package(&mut self, name: &str) -> PackageId {
        self.graph.add_package(name)
    }

    pub fn depends_upon(&mut self, from: PackageId, to: PackageId) -> bool {
        self.graph.depends_upon(from, to)
    }

    pub fn graph(&self) -> &PackageGraph {
        &self.graph
    }

    /// True when `analyzed` has exactly the expected packages, each with the
    /// same afferent and efferent package names.
    pub fn matches(&self, analyzed: &PackageGraph) -> bool {
        if self.graph.len() != analyzed.len() {
            return false;
        }
        analyzed.packages().all(|actual| {
            self.graph
                .find(actual.name())
                .is_some_and(|expected| same_edges(expected, actual))
        })
    }
}

fn same_edges(expected: &JavaPackage, actual: &JavaPackage) -> bool {
    names(expected.afferents().keys()) == names(actual.afferents().keys())
        && names(expected.efferents().keys()) == names(actual.efferents().keys())
}

fn names<'a>(keys: impl Iterator<Item = &'a String>) -> BTreeSet<&'a str> {
    keys.map(String::as_str).collect()
}
