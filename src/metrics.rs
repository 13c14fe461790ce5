//! Coupling and stability metrics.
//!
//! All values are derived on demand from the package's classes and edges:
//! abstractness `A = abstract / total`, instability `I = Ce / (Ca + Ce)`,
//! and the distance from the main sequence `D = |A + I - 1|`. Ratios over an
//! empty denominator are `0`.

use serde::Serialize;

use crate::package::JavaPackage;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageMetrics {
    pub name: String,
    pub class_count: usize,
    pub abstract_class_count: usize,
    pub concrete_class_count: usize,
    pub afferent_coupling: usize,
    pub efferent_coupling: usize,
    pub abstractness: f64,
    pub instability: f64,
    pub distance: f64,
    pub volatility: u8,
}

impl JavaPackage {
    pub fn class_count(&self) -> usize {
        self.classes().count()
    }

    pub fn abstract_class_count(&self) -> usize {
        self.classes().filter(|c| c.is_abstract()).count()
    }

    pub fn concrete_class_count(&self) -> usize {
        self.classes().filter(|c| !c.is_abstract()).count()
    }

    /// Ca: packages depending upon this one.
    pub fn afferent_coupling(&self) -> usize {
        self.afferents().len()
    }

    /// Ce: packages this one depends upon.
    pub fn efferent_coupling(&self) -> usize {
        self.efferents().len()
    }

    pub fn abstractness(&self) -> f64 {
        ratio(self.abstract_class_count(), self.class_count())
    }

    pub fn instability(&self) -> f64 {
        let ce = self.efferent_coupling();
        ratio(ce, self.afferent_coupling() + ce)
    }

    pub fn distance(&self) -> f64 {
        (self.abstractness() + self.instability() - 1.0).abs()
    }

    pub fn metrics(&self) -> PackageMetrics {
        PackageMetrics {
            name: self.name().to_string(),
            class_count: self.class_count(),
            abstract_class_count: self.abstract_class_count(),
            concrete_class_count: self.concrete_class_count(),
            afferent_coupling: self.afferent_coupling(),
            efferent_coupling: self.efferent_coupling(),
            abstractness: self.abstractness(),
            instability: self.instability(),
            distance: self.distance(),
            volatility: self.volatility(),
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}
