//! Read-side attribute filter
//!
//! A set of attribute paths. A read restricted by the filter only visits
//! the sub-directories those paths name; every record below one of them
//! is included.

use pail_core::{AttributePath, Category};
use std::collections::BTreeSet;
use std::fmt;

/// Set of attribute paths a read is restricted to
///
/// Equality is set equality, so the order paths were given in does not
/// matter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AttributeFilter {
    paths: BTreeSet<AttributePath>,
}

impl AttributeFilter {
    /// Filter over `paths`
    pub fn new<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = AttributePath>,
    {
        AttributeFilter {
            paths: paths.into_iter().collect(),
        }
    }

    /// Filter over `/`-separated path strings
    pub fn parse<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(paths.into_iter().map(|p| Category::parse(p.as_ref())))
    }

    /// True if no path was given (the whole version is read)
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Paths as given, sorted
    pub fn paths(&self) -> impl Iterator<Item = &AttributePath> {
        self.paths.iter()
    }

    /// Minimal set of directories to visit
    ///
    /// Paths nested under another requested path are dropped so no record
    /// is read twice. An empty filter yields the root category.
    pub fn roots(&self) -> Vec<AttributePath> {
        if self.paths.is_empty() {
            return vec![Category::root()];
        }
        let mut roots: Vec<AttributePath> = Vec::new();
        // BTreeSet order puts every ancestor before its descendants
        for path in &self.paths {
            if !roots.iter().any(|root| root.is_prefix_of(path)) {
                roots.push(path.clone());
            }
        }
        roots
    }

    /// True if a record under `category` passes the filter
    pub fn matches(&self, category: &Category) -> bool {
        self.paths.is_empty() || self.paths.iter().any(|p| p.is_prefix_of(category))
    }
}

impl FromIterator<AttributePath> for AttributeFilter {
    fn from_iter<I: IntoIterator<Item = AttributePath>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for AttributeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.paths.iter().map(|p| p.to_string()).collect();
        write!(f, "{{{}}}", rendered.join(", "))
    }
}
