use std::collections::HashMap;

use crate::package::{JavaClass, JavaPackage, PackageId};

/// Arena of packages connected by "depends upon" edges.
#[derive(Debug, Clone, Default)]
pub struct PackageGraph {
    packages: Vec<JavaPackage>,
    by_name: HashMap<String, PackageId>,
}

impl PackageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the package called `name`, creating it on first use.
    pub fn add_package(&mut self, name: &str) -> PackageId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = PackageId(self.packages.len());
        self.packages.push(JavaPackage::new(id, name.to_string()));
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn id(&self, name: &str) -> Option<PackageId> {
        self.by_name.get(name).copied()
    }

    /// Panics when `id` was not issued by this graph.
    pub fn package(&self, id: PackageId) -> &JavaPackage {
        &self.packages[id.0]
    }

    pub fn package_mut(&mut self, id: PackageId) -> &mut JavaPackage {
        &mut self.packages[id.0]
    }

    pub fn find(&self, name: &str) -> Option<&JavaPackage> {
        self.id(name).map(|id| self.package(id))
    }

    /// Packages in creation order.
    pub fn packages(&self) -> impl Iterator<Item = &JavaPackage> {
        self.packages.iter()
    }

    pub fn sorted_packages(&self) -> Vec<&JavaPackage> {
        let mut packages: Vec<&JavaPackage> = self.packages.iter().collect();
        packages.sort_by(|a, b| a.name().cmp(b.name()));
        packages
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn add_class(&mut self, id: PackageId, class: JavaClass) -> bool {
        self.package_mut(id).add_class(class)
    }

    /// Records that `from` depends upon `to`, updating both sides.
    ///
    /// Idempotent; a package never depends upon itself, so `from == to` is a
    /// no-op. Returns true when a new edge was added.
    pub fn depends_upon(&mut self, from: PackageId, to: PackageId) -> bool {
        if from == to {
            return false;
        }
        let to_name = self.package(to).name().to_string();
        let from_name = self.package(from).name().to_string();

        let added = self.packages[from.0]
            .efferents
            .insert(to_name, to)
            .is_none();
        self.packages[to.0].afferents.insert(from_name, from);
        added
    }

    /// The `index`-th package `id` depends upon, in registration order.
    pub(crate) fn efferent_at(&self, id: PackageId, index: usize) -> Option<PackageId> {
        self.package(id).efferents.get_index(index).map(|(_, to)| *to)
    }
}
