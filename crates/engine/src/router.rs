//! Category routers
//!
//! A router maps a record to the [`Category`] it is stored under. Routing
//! is pure and total: every record gets a category, and the same record
//! always gets the same one.
//!
//! - [`DefaultRouter`]: everything under the version root
//! - [`AttributeRouter`]: one segment per named attribute of the value
//! - [`FnRouter`]: an arbitrary closure

use crate::record::Record;
use pail_core::{Category, Value};
use std::fmt;
use std::sync::Arc;

/// Maps records to categories
pub trait CategoryRouter: Send + Sync + fmt::Debug {
    /// Stable identifier, recorded in the dataset MANIFEST
    fn router_id(&self) -> &str;

    /// Category the record is stored under
    fn categorize(&self, record: &Record) -> Category;

    /// Record-local suffix appended to the generated leaf name
    ///
    /// Only makes keys easier to read; uniqueness comes from the writer.
    fn suffix(&self, _record: &Record) -> Option<String> {
        None
    }
}

/// Router that does not partition
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRouter;

impl CategoryRouter for DefaultRouter {
    fn router_id(&self) -> &str {
        "default"
    }

    fn categorize(&self, _record: &Record) -> Category {
        Category::root()
    }
}

/// Router over named attributes of structured values
///
/// Each attribute is a dotted path into the value (`"user.country"`) and
/// contributes one segment, rendered with [`Value::as_segment`]. A missing,
/// null or non-scalar attribute becomes the empty segment (stored as
/// `%00`). Raw records are not partitioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRouter {
    id: String,
    attributes: Vec<String>,
    suffix_attribute: Option<String>,
}

impl AttributeRouter {
    /// Router over `attributes`, in order
    pub fn new<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let attributes: Vec<String> = attributes.into_iter().map(Into::into).collect();
        AttributeRouter {
            id: format!("attributes({})", attributes.join(",")),
            attributes,
            suffix_attribute: None,
        }
    }

    /// Append the rendered value of `attribute` to every leaf name
    pub fn with_suffix(mut self, attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        self.id = format!("{}+suffix({})", self.id, attribute);
        self.suffix_attribute = Some(attribute);
        self
    }

    /// Attribute paths, in routing order
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    fn segment(value: &Value, path: &str) -> String {
        value
            .get_path(path)
            .and_then(Value::as_segment)
            .unwrap_or_default()
    }
}

impl CategoryRouter for AttributeRouter {
    fn router_id(&self) -> &str {
        &self.id
    }

    fn categorize(&self, record: &Record) -> Category {
        match record.as_value() {
            Some(value) => self
                .attributes
                .iter()
                .map(|path| Self::segment(value, path))
                .collect(),
            None => Category::root(),
        }
    }

    fn suffix(&self, record: &Record) -> Option<String> {
        let attribute = self.suffix_attribute.as_deref()?;
        let value = record.as_value()?;
        value.get_path(attribute).and_then(Value::as_segment)
    }
}

type RouteFn = dyn Fn(&Record) -> Category + Send + Sync;

/// Router backed by a closure
#[derive(Clone)]
pub struct FnRouter {
    id: String,
    route: Arc<RouteFn>,
}

impl FnRouter {
    /// Router named `id` calling `route`
    ///
    /// `route` must be deterministic; the id is what the MANIFEST checks.
    pub fn new<F>(id: impl Into<String>, route: F) -> Self
    where
        F: Fn(&Record) -> Category + Send + Sync + 'static,
    {
        FnRouter {
            id: id.into(),
            route: Arc::new(route),
        }
    }
}

impl fmt::Debug for FnRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRouter").field("id", &self.id).finish()
    }
}

impl CategoryRouter for FnRouter {
    fn router_id(&self) -> &str {
        &self.id
    }

    fn categorize(&self, record: &Record) -> Category {
        (self.route)(record)
    }
}
