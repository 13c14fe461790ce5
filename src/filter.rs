/// Decides which package names are left out of dependency accounting.
///
/// A pattern ending in `.*` rejects every package strictly nested below its
/// prefix (`com.xyz.tests.*` rejects `com.xyz.tests.a` but keeps
/// `com.xyz.tests`). Any other pattern rejects only the exact name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFilter {
    patterns: Vec<Pattern>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    /// Stored with its trailing dot, e.g. `java.`.
    Nested(String),
    Exact(String),
}

impl PackageFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::new();
        for p in patterns {
            filter.add_pattern(p.as_ref());
        }
        filter
    }

    pub fn add_pattern(&mut self, pattern: &str) {
        let pattern = pattern.trim();
        let parsed = match pattern.strip_suffix('*') {
            Some(prefix) if prefix.ends_with('.') && prefix.len() > 1 => {
                Pattern::Nested(prefix.to_string())
            }
            _ if pattern.is_empty() => return,
            _ => Pattern::Exact(pattern.to_string()),
        };
        if !self.patterns.contains(&parsed) {
            self.patterns.push(parsed);
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns in their configured spelling.
    pub fn patterns(&self) -> Vec<String> {
        self.patterns
            .iter()
            .map(|p| match p {
                Pattern::Nested(prefix) => format!("{prefix}*"),
                Pattern::Exact(name) => name.clone(),
            })
            .collect()
    }

    /// True when `package` should be kept.
    pub fn accept(&self, package: &str) -> bool {
        !self.patterns.iter().any(|p| match p {
            Pattern::Nested(prefix) => package.starts_with(prefix.as_str()),
            Pattern::Exact(name) => package == name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> PackageFilter {
        PackageFilter::from_patterns(["java.*", "javax.*", "sun.*", "com.sun.*", "com.xyz.tests.*"])
    }

    #[test]
    fn nested_patterns_need_a_dot_boundary() {
        let filter = standard();
        assert_eq!(filter.len(), 5);
        assert!(!filter.accept("java.lang"));
        assert!(!filter.accept("javax.ejb"));
        assert!(filter.accept("com.xyz.tests"));
        assert!(!filter.accept("com.xyz.tests.a"));
        assert!(filter.accept("com.xyz.ejb"));
        assert!(filter.accept("javafx.scene"));
    }

    #[test]
    fn plain_pattern_matches_only_exactly() {
        let filter = PackageFilter::from_patterns(["com.xyz"]);
        assert_eq!(filter.len(), 1);
        assert!(!filter.accept("com.xyz"));
        assert!(filter.accept("com.xyz.a"));
        assert!(filter.accept("com.xyzzy"));
    }

    #[test]
    fn duplicates_and_blanks_are_ignored() {
        let filter = PackageFilter::from_patterns(["java.*", " java.* ", "", "  "]);
        assert_eq!(filter.patterns(), vec!["java.*".to_string()]);
    }

    #[test]
    fn empty_filter_accepts_everything() {
        let filter = PackageFilter::new();
        assert!(filter.is_empty());
        assert!(filter.accept("java.lang"));
        assert!(filter.accept("Default"));
    }
}
