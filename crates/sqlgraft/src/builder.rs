//! Statement builders for dynamic SQL construction.
//!
//! This module provides structured builders that accumulate clauses and
//! render dialect-correct text:
//! - [`SelectBuilder`]: SELECT with joins, WHERE, GROUP BY, ORDER BY, paging
//! - [`InsertBuilder`] / [`UpdateBuilder`] / [`DeleteBuilder`]: DML with binds
//! - [`CreateTableBuilder`] / [`CreateViewBuilder`] / [`CreateSequenceBuilder`] /
//!   [`CreateIndexBuilder`] and the `Drop*` builders: DDL
//! - [`OrderBy`] / [`Pagination`]: shared ORDER BY and paging clauses
//!
//! All builders implement [`SqlBuilder`]; the parameterized ones additionally
//! implement [`ParamBuilder`] and produce a [`Statement`] with bind values.

use crate::dialect::{DialectDescriptor, PaginationStyle};
use crate::error::GraftResult;
use crate::ident::{Ident, IntoIdent};
use crate::sql::Sql;
use crate::value::SqlValue;

mod create_index;
mod create_table;
mod create_view;
mod delete;
mod drop;
mod insert;
mod select;
mod sequence;
mod traits;
mod update;


pub use create_index::CreateIndexBuilder;
pub use create_table::CreateTableBuilder;
pub use create_view::CreateViewBuilder;
pub use delete::DeleteBuilder;
pub use drop::{DropIndexBuilder, DropSequenceBuilder, DropTableBuilder, DropViewBuilder};
pub use insert::InsertBuilder;
pub use select::{Join, JoinKind, SelectBuilder};
pub use sequence::{CreateSequenceBuilder, NextValue};
pub use traits::{ParamBuilder, SqlBuilder, Statement};
pub use update::UpdateBuilder;

/// A column assignment source: a bound value or a raw SQL expression.
#[derive(Debug, Clone)]
pub(crate) enum Assign {
    Bind(SqlValue),
    Raw(String),
}

impl Assign {
    pub(crate) fn append_to_sql(&self, sql: &mut Sql) {
        match self {
            Assign::Bind(value) => {
                sql.push_bind(value.clone());
            }
            Assign::Raw(expr) => {
                sql.push(expr);
            }
        }
    }
}

// ==================== Sorting ====================

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// A single ORDER BY item.
#[derive(Debug, Clone)]
pub enum OrderItem {
    Column { column: Ident, dir: SortDir },
    /// Raw SQL (escape hatch - use with extreme caution).
    Raw(String),
}

impl OrderItem {
    /// Create a new order item (validated identifier).
    pub fn new(column: Ident, dir: SortDir) -> Self {
        Self::Column { column, dir }
    }

    /// Create a raw SQL order item.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    fn append_to_sql(&self, sql: &mut Sql, dialect: &DialectDescriptor) -> GraftResult<()> {
        match self {
            OrderItem::Column { column, dir } => {
                sql.push_ident(column, dialect)?;
                sql.push(" ");
                sql.push(dir.to_sql());
            }
            OrderItem::Raw(s) => {
                sql.push(s);
            }
        }
        Ok(())
    }
}

/// ORDER BY clause builder.
///
/// # Example
/// ```ignore
/// use sqlgraft::{OrderBy, SortDir};
///
/// let order = OrderBy::new().asc("CREATED_AT")?.desc("PRIORITY")?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct OrderBy {
    items: Vec<OrderItem>,
}

impl OrderBy {
    /// Create a new empty OrderBy builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an ascending sort (validated identifier).
    pub fn asc(mut self, column: impl IntoIdent) -> GraftResult<Self> {
        self.items
            .push(OrderItem::new(column.into_ident()?, SortDir::Asc));
        Ok(self)
    }

    /// Add a descending sort (validated identifier).
    pub fn desc(mut self, column: impl IntoIdent) -> GraftResult<Self> {
        self.items
            .push(OrderItem::new(column.into_ident()?, SortDir::Desc));
        Ok(self)
    }

    /// Add a custom order item.
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, item: OrderItem) -> Self {
        self.items.push(item);
        self
    }

    /// Check if this OrderBy is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append this ORDER BY clause to a SQL fragment.
    ///
    /// Does nothing if the OrderBy is empty.
    pub fn append_to_sql(&self, sql: &mut Sql, dialect: &DialectDescriptor) -> GraftResult<()> {
        if self.items.is_empty() {
            return Ok(());
        }
        sql.push(" ORDER BY ");
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                sql.push(", ");
            }
            item.append_to_sql(sql, dialect)?;
        }
        Ok(())
    }
}

// ==================== Pagination ====================

/// A result window: `top` rows after skipping `skip`.
///
/// How the window renders depends on the dialect's [`PaginationStyle`];
/// the values are always rendered as literals, never as binds. The
/// `RowNumSubquery` style rewrites the whole statement and is handled by
/// [`SelectBuilder`]; this type renders the trailing-clause styles.
///
/// # Example
/// ```ignore
/// use sqlgraft::Pagination;
///
/// let page = Pagination::new().top(10).skip(20);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Pagination {
    pub top: Option<u64>,
    pub skip: Option<u64>,
}

impl Pagination {
    /// Create a new empty pagination (no window).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of rows to return.
    pub fn top(mut self, n: u64) -> Self {
        self.top = Some(n);
        self
    }

    /// Set the number of rows to skip.
    pub fn skip(mut self, n: u64) -> Self {
        self.skip = Some(n);
        self
    }

    /// Check if any window is set.
    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.skip.is_none()
    }

    /// Append the window as a trailing clause.
    ///
    /// Covers `LimitOffset` and `FetchFirst`; `RowNumSubquery` wraps the
    /// statement instead and never reaches this method.
    pub(crate) fn append_trailing(&self, sql: &mut Sql, style: PaginationStyle) {
        match style {
            PaginationStyle::LimitOffset => {
                if let Some(top) = self.top {
                    sql.push(" LIMIT ");
                    sql.push(&top.to_string());
                }
                if let Some(skip) = self.skip {
                    sql.push(" OFFSET ");
                    sql.push(&skip.to_string());
                }
            }
            PaginationStyle::FetchFirst => {
                if let Some(skip) = self.skip {
                    sql.push(" OFFSET ");
                    sql.push(&skip.to_string());
                    sql.push(" ROWS");
                    if let Some(top) = self.top {
                        sql.push(" FETCH NEXT ");
                        sql.push(&top.to_string());
                        sql.push(" ROWS ONLY");
                    }
                } else if let Some(top) = self.top {
                    sql.push(" FETCH FIRST ");
                    sql.push(&top.to_string());
                    sql.push(" ROWS ONLY");
                }
            }
            PaginationStyle::RowNumSubquery => {}
        }
    }
}

#[cfg(test)]
mod pagination_tests {
    use super::*;
    use crate::dialect::PlaceholderStyle;

    fn render(pag: Pagination, style: PaginationStyle) -> String {
        let mut sql = Sql::new("SELECT * FROM T");
        pag.append_trailing(&mut sql, style);
        sql.render(PlaceholderStyle::Numbered)
    }

    #[test]
    fn limit_offset_renders_literals() {
        let s = render(
            Pagination::new().top(10).skip(20),
            PaginationStyle::LimitOffset,
        );
        assert_eq!(s, "SELECT * FROM T LIMIT 10 OFFSET 20");
    }

    #[test]
    fn limit_offset_top_only() {
        let s = render(Pagination::new().top(5), PaginationStyle::LimitOffset);
        assert_eq!(s, "SELECT * FROM T LIMIT 5");
    }

    #[test]
    fn limit_offset_skip_only() {
        let s = render(Pagination::new().skip(30), PaginationStyle::LimitOffset);
        assert_eq!(s, "SELECT * FROM T OFFSET 30");
    }

    #[test]
    fn fetch_first_with_skip() {
        let s = render(
            Pagination::new().top(10).skip(20),
            PaginationStyle::FetchFirst,
        );
        assert_eq!(s, "SELECT * FROM T OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY");
    }

    #[test]
    fn fetch_first_without_skip() {
        let s = render(Pagination::new().top(10), PaginationStyle::FetchFirst);
        assert_eq!(s, "SELECT * FROM T FETCH FIRST 10 ROWS ONLY");
    }

    #[test]
    fn fetch_first_skip_only() {
        let s = render(Pagination::new().skip(20), PaginationStyle::FetchFirst);
        assert_eq!(s, "SELECT * FROM T OFFSET 20 ROWS");
    }

    #[test]
    fn empty_window_renders_nothing() {
        let s = render(Pagination::new(), PaginationStyle::LimitOffset);
        assert_eq!(s, "SELECT * FROM T");
        assert!(Pagination::new().is_empty());
    }
}
