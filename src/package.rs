use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::hash::{Hash, Hasher};

use crate::parse::ParsedClass;

/// Volatility assigned to packages that have no configured value.
pub const DEFAULT_VOLATILITY: u8 = 1;

/// Index of a package inside the [`PackageGraph`](crate::graph::PackageGraph)
/// that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(pub(crate) usize);

/// A class as seen by the dependency graph. Identity is the class name.
#[derive(Debug, Clone, Serialize)]
pub struct JavaClass {
    name: String,
    package_name: String,
    is_abstract: bool,
    source_file: String,
    imported_packages: Vec<String>,
}

impl JavaClass {
    pub fn new(name: impl Into<String>, package_name: impl Into<String>, is_abstract: bool) -> Self {
        Self {
            name: name.into(),
            package_name: package_name.into(),
            is_abstract,
            source_file: crate::parse::UNKNOWN_SOURCE_FILE.to_string(),
            imported_packages: Vec::new(),
        }
    }

    pub fn with_imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for import in imports {
            let import = import.into();
            if import != self.package_name && !self.imported_packages.contains(&import) {
                self.imported_packages.push(import);
            }
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    pub fn imported_packages(&self) -> &[String] {
        &self.imported_packages
    }
}

impl From<ParsedClass> for JavaClass {
    fn from(parsed: ParsedClass) -> Self {
        Self {
            name: parsed.class_name,
            package_name: parsed.package_name,
            is_abstract: parsed.is_abstract,
            source_file: parsed.source_file,
            imported_packages: parsed.imported_packages.into_iter().collect(),
        }
    }
}

impl PartialEq for JavaClass {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for JavaClass {}

impl Hash for JavaClass {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// A node of the package graph.
///
/// Edges are keyed by package name and kept in registration order; the cycle
/// tracer walks `efferents` in that order.
#[derive(Debug, Clone)]
pub struct JavaPackage {
    pub(crate) id: PackageId,
    name: String,
    volatility: u8,
    classes: IndexSet<JavaClass>,
    pub(crate) efferents: IndexMap<String, PackageId>,
    pub(crate) afferents: IndexMap<String, PackageId>,
}

impl JavaPackage {
    pub(crate) fn new(id: PackageId, name: String) -> Self {
        Self {
            id,
            name,
            volatility: DEFAULT_VOLATILITY,
            classes: IndexSet::new(),
            efferents: IndexMap::new(),
            afferents: IndexMap::new(),
        }
    }

    pub fn id(&self) -> PackageId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn volatility(&self) -> u8 {
        self.volatility
    }

    pub fn set_volatility(&mut self, volatility: u8) {
        self.volatility = volatility;
    }

    pub fn classes(&self) -> impl Iterator<Item = &JavaClass> {
        self.classes.iter()
    }

    /// Classes ordered by name.
    pub fn sorted_classes(&self) -> Vec<&JavaClass> {
        let mut classes: Vec<&JavaClass> = self.classes.iter().collect();
        classes.sort_by(|a, b| a.name().cmp(b.name()));
        classes
    }

    /// Returns false when a class with the same name is already present.
    pub fn add_class(&mut self, class: JavaClass) -> bool {
        self.classes.insert(class)
    }

    /// Packages this package depends upon, by name.
    pub fn efferents(&self) -> &IndexMap<String, PackageId> {
        &self.efferents
    }

    /// Packages depending upon this package, by name.
    pub fn afferents(&self) -> &IndexMap<String, PackageId> {
        &self.afferents
    }
}

impl PartialEq for JavaPackage {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for JavaPackage {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn class_identity_is_the_name() {
        let a = JavaClass::new("a.b.C", "a.b", false);
        let b = JavaClass::new("a.b.C", "a.b", true);
        assert_eq!(a, b);

        let mut package = JavaPackage::new(PackageId(0), "a.b".to_string());
        assert!(package.add_class(a));
        assert!(!package.add_class(b));
        assert_eq!(package.classes().count(), 1);
    }

    #[test]
    fn from_parsed_class_keeps_imports_and_flags() {
        let parsed = ParsedClass {
            class_name: "a.b.C".to_string(),
            package_name: "a.b".to_string(),
            super_class_name: Some("x.Base".to_string()),
            interface_names: Vec::new(),
            is_abstract: true,
            source_file: "C.java".to_string(),
            imported_packages: BTreeSet::from(["x".to_string(), "y.z".to_string()]),
            minor_version: 0,
            major_version: 52,
            warnings: Vec::new(),
        };
        let class = JavaClass::from(parsed);
        assert_eq!(class.name(), "a.b.C");
        assert!(class.is_abstract());
        assert_eq!(class.source_file(), "C.java");
        assert_eq!(class.imported_packages(), ["x".to_string(), "y.z".to_string()]);
    }

    #[test]
    fn with_imports_drops_own_package_and_duplicates() {
        let class = JavaClass::new("a.C", "a", false).with_imports(["b", "a", "b", "c"]);
        assert_eq!(class.imported_packages(), ["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn sorted_classes_orders_by_name() {
        let mut package = JavaPackage::new(PackageId(0), "p".to_string());
        package.add_class(JavaClass::new("p.Zeta", "p", false));
        package.add_class(JavaClass::new("p.Alpha", "p", true));
        let names: Vec<&str> = package.sorted_classes().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["p.Alpha", "p.Zeta"]);
    }
}
