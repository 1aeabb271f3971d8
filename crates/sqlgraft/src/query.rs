//! The structured query request consumed by the compiler.
//!
//! A [`QueryRequest`] is what an outer protocol layer hands over after
//! parsing its own syntax: entity set, predicate tree, expand paths,
//! projection, ordering, and a result window. Requests are plain values;
//! all name resolution happens later against a model snapshot.

use crate::builder::SortDir;
use crate::condition::Op;
use crate::error::{GraftError, GraftResult};
use crate::value::SqlValue;

/// Predicate tree over property paths and literal values.
///
/// Paths are entity-level names, optionally crossing expanded navigations
/// with `/` (`OrderItems/Price`). Nothing is resolved at construction; the
/// compiler validates paths, flags, and literal types.
///
/// # Example
/// ```ignore
/// use sqlgraft::Filter;
///
/// let filter = Filter::and(vec![
///     Filter::gt("Total", 100),
///     Filter::or(vec![
///         Filter::eq("Status", "open"),
///         Filter::is_null("ClosedAt"),
///     ]),
/// ]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// One comparison over one property path.
    Compare { path: String, op: Op },
    /// All sub-filters must hold. Empty is malformed.
    And(Vec<Filter>),
    /// Any sub-filter must hold. Empty is malformed.
    Or(Vec<Filter>),
    /// Negation.
    Not(Box<Filter>),
}

impl Filter {
    pub fn compare(path: impl Into<String>, op: Op) -> Self {
        Filter::Compare {
            path: path.into(),
            op,
        }
    }

    pub fn eq(path: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(path, Op::eq(value))
    }

    pub fn ne(path: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(path, Op::ne(value))
    }

    pub fn gt(path: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(path, Op::gt(value))
    }

    pub fn gte(path: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(path, Op::gte(value))
    }

    pub fn lt(path: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(path, Op::lt(value))
    }

    pub fn lte(path: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(path, Op::lte(value))
    }

    pub fn like(path: impl Into<String>, pattern: impl Into<SqlValue>) -> Self {
        Self::compare(path, Op::like(pattern))
    }

    pub fn is_null(path: impl Into<String>) -> Self {
        Self::compare(path, Op::is_null())
    }

    pub fn is_not_null(path: impl Into<String>) -> Self {
        Self::compare(path, Op::is_not_null())
    }

    pub fn in_list<T>(path: impl Into<String>, values: impl IntoIterator<Item = T>) -> Self
    where
        T: Into<SqlValue>,
    {
        Self::compare(path, Op::in_list(values))
    }

    pub fn between(
        path: impl Into<String>,
        from: impl Into<SqlValue>,
        to: impl Into<SqlValue>,
    ) -> Self {
        Self::compare(path, Op::between(from, to))
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And(filters)
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or(filters)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Self {
        Filter::Not(Box::new(filter))
    }
}

/// A `/`-separated navigation path, e.g. `OrderItems` or `Customer/Address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandPath {
    segments: Vec<String>,
}

impl ExpandPath {
    /// Parse a path; every segment must be non-empty.
    pub fn parse(path: &str) -> GraftResult<Self> {
        if path.is_empty() {
            return Err(GraftError::schema(path, "empty navigation path"));
        }
        let segments: Vec<String> = path.split('/').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(GraftError::schema(path, "empty navigation path segment"));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of navigation hops.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl std::fmt::Display for ExpandPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// One ordering key: property path plus direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    pub property: String,
    pub dir: SortDir,
}

impl OrderKey {
    pub fn new(property: impl Into<String>, dir: SortDir) -> Self {
        Self {
            property: property.into(),
            dir,
        }
    }
}

/// A complete structured query over one entity set.
///
/// # Example
/// ```ignore
/// use sqlgraft::{Filter, QueryRequest};
///
/// let request = QueryRequest::new("Orders")
///     .filter(Filter::gt("Total", 100))
///     .expand("OrderItems")?
///     .order_by_desc("Created")
///     .top(10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub entity_set: String,
    pub filter: Option<Filter>,
    pub expand: Vec<ExpandPath>,
    /// Requested property names; empty means all selectable properties.
    pub select: Vec<String>,
    pub orderby: Vec<OrderKey>,
    pub top: Option<u64>,
    pub skip: Option<u64>,
}

impl QueryRequest {
    pub fn new(entity_set: impl Into<String>) -> Self {
        Self {
            entity_set: entity_set.into(),
            ..Default::default()
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Add a navigation path to expand; order is preserved.
    pub fn expand(mut self, path: &str) -> GraftResult<Self> {
        self.expand.push(ExpandPath::parse(path)?);
        Ok(self)
    }

    /// Add a property to the projection.
    pub fn select(mut self, property: impl Into<String>) -> Self {
        self.select.push(property.into());
        self
    }

    pub fn order_by(mut self, property: impl Into<String>, dir: SortDir) -> Self {
        self.orderby.push(OrderKey::new(property, dir));
        self
    }

    pub fn order_by_asc(self, property: impl Into<String>) -> Self {
        self.order_by(property, SortDir::Asc)
    }

    pub fn order_by_desc(self, property: impl Into<String>) -> Self {
        self.order_by(property, SortDir::Desc)
    }

    pub fn top(mut self, n: u64) -> Self {
        self.top = Some(n);
        self
    }

    pub fn skip(mut self, n: u64) -> Self {
        self.skip = Some(n);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_path_parse() {
        let path = ExpandPath::parse("Customer/Address").unwrap();
        assert_eq!(path.segments(), &["Customer", "Address"]);
        assert_eq!(path.depth(), 2);
        assert_eq!(path.to_string(), "Customer/Address");
    }

    #[test]
    fn expand_path_rejects_empty_segments() {
        assert!(ExpandPath::parse("").unwrap_err().is_schema());
        assert!(ExpandPath::parse("A//B").unwrap_err().is_schema());
        assert!(ExpandPath::parse("A/").unwrap_err().is_schema());
    }

    #[test]
    fn request_builder_accumulates() {
        let request = QueryRequest::new("Orders")
            .filter(Filter::gt("Total", 100_i64))
            .expand("OrderItems")
            .unwrap()
            .select("Id")
            .select("Total")
            .order_by_desc("Created")
            .top(10)
            .skip(20);
        assert_eq!(request.entity_set, "Orders");
        assert_eq!(request.expand.len(), 1);
        assert_eq!(request.select, vec!["Id", "Total"]);
        assert_eq!(request.orderby[0].dir, SortDir::Desc);
        assert_eq!(request.top, Some(10));
        assert_eq!(request.skip, Some(20));
    }

    #[test]
    fn filter_tree_shape() {
        let filter = Filter::and(vec![
            Filter::gt("Total", 100_i64),
            Filter::or(vec![
                Filter::eq("Status", "open"),
                Filter::is_null("ClosedAt"),
            ]),
        ]);
        match filter {
            Filter::And(children) => {
                assert_eq!(children.len(), 2);
                assert!(matches!(children[0], Filter::Compare { .. }));
                assert!(matches!(&children[1], Filter::Or(inner) if inner.len() == 2));
            }
            _ => panic!("expected And at the root"),
        }
    }
}
