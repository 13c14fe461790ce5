//! Graph builder: groups classes into packages and wires their edges.

use tracing::debug;

use crate::filter::PackageFilter;
use crate::graph::PackageGraph;
use crate::package::{JavaClass, PackageId};

#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    filter: PackageFilter,
    components: Vec<String>,
    graph: PackageGraph,
}

impl Analyzer {
    pub fn new(filter: PackageFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn filter(&self) -> &PackageFilter {
        &self.filter
    }

    /// Configures component prefixes from a comma-separated list.
    pub fn set_components(&mut self, components: &str) {
        self.components = components
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Pre-registers configured packages with their volatility.
    pub fn add_configured_packages<'a, I>(&mut self, packages: I)
    where
        I: IntoIterator<Item = (&'a String, &'a u8)>,
    {
        for (name, volatility) in packages {
            let id = self.add_package(name);
            self.graph.package_mut(id).set_volatility(*volatility);
        }
    }

    /// Node name for `package`: the longest component that equals it or
    /// encloses it at a dot boundary, else the package itself.
    pub fn component_of<'a>(&'a self, package: &'a str) -> &'a str {
        self.components
            .iter()
            .filter(|c| {
                package == c.as_str()
                    || package
                        .strip_prefix(c.as_str())
                        .is_some_and(|rest| rest.starts_with('.'))
            })
            .max_by_key(|c| c.len())
            .map_or(package, String::as_str)
    }

    pub fn add_package(&mut self, name: &str) -> PackageId {
        let node = self.component_of(name).to_string();
        self.graph.add_package(&node)
    }

    /// Adds `class` to its package node and records a dependency upon every
    /// imported package. Returns false when the class's own package is
    /// filtered out, in which case nothing is recorded.
    pub fn analyze_class(&mut self, class: JavaClass) -> bool {
        if !self.filter.accept(class.package_name()) {
            debug!(class = class.name(), "skipping class in filtered package");
            return false;
        }

        let id = self.add_package(class.package_name());
        let imports: Vec<PackageId> = class
            .imported_packages()
            .iter()
            .map(|import| self.add_package(import))
            .collect();
        for import in imports {
            self.graph.depends_upon(id, import);
        }
        self.graph.add_class(id, class);
        true
    }

    pub fn graph(&self) -> &PackageGraph {
        &self.graph
    }

    pub fn into_graph(self) -> PackageGraph {
        self.graph
    }
}
