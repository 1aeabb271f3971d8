//! SELECT statement builder.

use crate::builder::traits::{ParamBuilder, SqlBuilder};
use crate::builder::{OrderBy, OrderItem, Pagination};
use crate::condition::WhereExpr;
use crate::dialect::{DialectDescriptor, PaginationStyle};
use crate::error::{GraftError, GraftResult};
use crate::ident::{Ident, IntoIdent};
use crate::sql::Sql;

/// One entry in the SELECT list.
#[derive(Debug, Clone)]
enum SelectColumn {
    /// A plain (possibly alias-qualified) column.
    Expr(Ident),
    /// A column with an explicit label: `expr AS "label"`.
    ///
    /// The label is always quoted so readers can key on it verbatim.
    Labeled { expr: Ident, label: String },
    /// Raw SQL expression (escape hatch - use with caution).
    Raw(String),
}

/// Join kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

impl JoinKind {
    pub fn to_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
        }
    }
}

#[derive(Debug, Clone)]
enum JoinOn {
    /// Equality pairs, AND-joined: `left = right`.
    Pairs(Vec<(Ident, Ident)>),
    /// Raw ON expression.
    Raw(String),
}

/// A single JOIN clause.
///
/// # Example
/// ```ignore
/// use sqlgraft::Join;
///
/// let join = Join::left("ORDER_ITEMS")?
///     .alias("T1")
///     .on("T0.ID", "T1.ORDER_ID")?;
/// ```
#[derive(Debug, Clone)]
pub struct Join {
    kind: JoinKind,
    table: Ident,
    alias: Option<String>,
    on: JoinOn,
}

impl Join {
    /// Create an INNER JOIN on `table`.
    pub fn inner(table: impl IntoIdent) -> GraftResult<Self> {
        Ok(Self {
            kind: JoinKind::Inner,
            table: table.into_ident()?,
            alias: None,
            on: JoinOn::Pairs(Vec::new()),
        })
    }

    /// Create a LEFT JOIN on `table`.
    pub fn left(table: impl IntoIdent) -> GraftResult<Self> {
        Ok(Self {
            kind: JoinKind::Left,
            table: table.into_ident()?,
            alias: None,
            on: JoinOn::Pairs(Vec::new()),
        })
    }

    /// Set the table alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Add an equality pair to the ON clause; multiple pairs are AND-joined.
    pub fn on(mut self, left: impl IntoIdent, right: impl IntoIdent) -> GraftResult<Self> {
        let pair = (left.into_ident()?, right.into_ident()?);
        match &mut self.on {
            JoinOn::Pairs(pairs) => pairs.push(pair),
            JoinOn::Raw(_) => self.on = JoinOn::Pairs(vec![pair]),
        }
        Ok(self)
    }

    /// Replace the ON clause with raw SQL (escape hatch - use with caution).
    pub fn on_raw(mut self, sql: impl Into<String>) -> Self {
        self.on = JoinOn::Raw(sql.into());
        self
    }

    fn append_to_sql(&self, sql: &mut Sql, dialect: &DialectDescriptor) -> GraftResult<()> {
        sql.push(" ");
        sql.push(self.kind.to_sql());
        sql.push(" ");
        sql.push_ident(&self.table, dialect)?;
        if let Some(alias) = &self.alias {
            sql.push(" ");
            push_alias(sql, alias, dialect)?;
        }
        sql.push(" ON ");
        match &self.on {
            JoinOn::Pairs(pairs) => {
                if pairs.is_empty() {
                    return Err(GraftError::render(format!(
                        "join on '{}' has no ON condition",
                        self.table.last_part()
                    )));
                }
                for (i, (left, right)) in pairs.iter().enumerate() {
                    if i > 0 {
                        sql.push(" AND ");
                    }
                    sql.push_ident(left, dialect)?;
                    sql.push(" = ");
                    sql.push_ident(right, dialect)?;
                }
            }
            JoinOn::Raw(s) => {
                sql.push(s);
            }
        }
        Ok(())
    }
}

/// SELECT statement builder.
///
/// Clauses render in fixed order: SELECT list, FROM, JOINs (insertion
/// order), WHERE, GROUP BY, HAVING, ORDER BY, pagination. An empty select
/// list renders `*`; an absent WHERE omits the keyword entirely.
///
/// # Example
/// ```ignore
/// use sqlgraft::{Condition, DialectDescriptor, SelectBuilder, SqlBuilder};
///
/// let d = DialectDescriptor::postgres();
/// let sql = SelectBuilder::new()
///     .from_as("ORDERS", "T0")?
///     .and_where(Condition::gt("T0.TOTAL", 100)?)
///     .top(10)
///     .render(&d)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    distinct: bool,
    columns: Vec<SelectColumn>,
    from: Vec<(Ident, Option<String>)>,
    joins: Vec<Join>,
    wheres: Vec<WhereExpr>,
    group_by: Vec<Ident>,
    having: Vec<WhereExpr>,
    order_by: OrderBy,
    pagination: Pagination,
}

impl SelectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add SELECT DISTINCT.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Add a column (validated identifier, may be alias-qualified).
    pub fn column(mut self, column: impl IntoIdent) -> GraftResult<Self> {
        self.columns.push(SelectColumn::Expr(column.into_ident()?));
        Ok(self)
    }

    /// Add a labeled column: `column AS "label"`.
    pub fn column_as(
        mut self,
        column: impl IntoIdent,
        label: impl Into<String>,
    ) -> GraftResult<Self> {
        self.columns.push(SelectColumn::Labeled {
            expr: column.into_ident()?,
            label: label.into(),
        });
        Ok(self)
    }

    /// Add a raw SQL select expression (escape hatch - use with caution).
    pub fn column_raw(mut self, sql: impl Into<String>) -> Self {
        self.columns.push(SelectColumn::Raw(sql.into()));
        self
    }

    /// Add a FROM table.
    pub fn from(mut self, table: impl IntoIdent) -> GraftResult<Self> {
        self.from.push((table.into_ident()?, None));
        Ok(self)
    }

    /// Add a FROM table with an alias.
    pub fn from_as(mut self, table: impl IntoIdent, alias: impl Into<String>) -> GraftResult<Self> {
        self.from.push((table.into_ident()?, Some(alias.into())));
        Ok(self)
    }

    /// Add a join clause; joins render in insertion order.
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Single-pair LEFT JOIN convenience.
    pub fn left_join(
        self,
        table: impl IntoIdent,
        alias: impl Into<String>,
        left: impl IntoIdent,
        right: impl IntoIdent,
    ) -> GraftResult<Self> {
        let join = Join::left(table)?.alias(alias).on(left, right)?;
        Ok(self.join(join))
    }

    /// Single-pair INNER JOIN convenience.
    pub fn inner_join(
        self,
        table: impl IntoIdent,
        alias: impl Into<String>,
        left: impl IntoIdent,
        right: impl IntoIdent,
    ) -> GraftResult<Self> {
        let join = Join::inner(table)?.alias(alias).on(left, right)?;
        Ok(self.join(join))
    }

    /// Add a WHERE predicate; multiple predicates are AND-joined.
    pub fn and_where(mut self, expr: impl Into<WhereExpr>) -> Self {
        self.wheres.push(expr.into());
        self
    }

    /// Add a GROUP BY column.
    pub fn group_by(mut self, column: impl IntoIdent) -> GraftResult<Self> {
        self.group_by.push(column.into_ident()?);
        Ok(self)
    }

    /// Add a HAVING predicate; multiple predicates are AND-joined.
    pub fn and_having(mut self, expr: impl Into<WhereExpr>) -> Self {
        self.having.push(expr.into());
        self
    }

    /// Replace the ORDER BY clause.
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by = order;
        self
    }

    /// Append one ORDER BY item.
    pub fn order_item(mut self, item: OrderItem) -> Self {
        self.order_by = self.order_by.add(item);
        self
    }

    /// Set the maximum number of rows.
    pub fn top(mut self, n: u64) -> Self {
        self.pagination = self.pagination.top(n);
        self
    }

    /// Set the number of rows to skip.
    pub fn skip(mut self, n: u64) -> Self {
        self.pagination = self.pagination.skip(n);
        self
    }

    /// Replace the pagination window.
    pub fn pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    fn append_select_list(&self, sql: &mut Sql, dialect: &DialectDescriptor) -> GraftResult<()> {
        if self.columns.is_empty() {
            sql.push("*");
            return Ok(());
        }
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push(", ");
            }
            match column {
                SelectColumn::Expr(ident) => {
                    sql.push_ident(ident, dialect)?;
                }
                SelectColumn::Labeled { expr, label } => {
                    sql.push_ident(expr, dialect)?;
                    sql.push(" AS ");
                    dialect.check_length(label)?;
                    let mut out = String::new();
                    dialect.write_quoted(label, &mut out);
                    sql.push(&out);
                }
                SelectColumn::Raw(s) => {
                    sql.push(s);
                }
            }
        }
        Ok(())
    }
}

impl SqlBuilder for SelectBuilder {
    fn to_sql(&self, dialect: &DialectDescriptor) -> GraftResult<Sql> {
        if self.from.is_empty() {
            return Err(GraftError::render("SELECT requires at least one FROM table"));
        }

        let mut sql = Sql::new("SELECT ");
        if self.distinct {
            sql.push("DISTINCT ");
        }
        self.append_select_list(&mut sql, dialect)?;

        sql.push(" FROM ");
        for (i, (table, alias)) in self.from.iter().enumerate() {
            if i > 0 {
                sql.push(", ");
            }
            sql.push_ident(table, dialect)?;
            if let Some(alias) = alias {
                sql.push(" ");
                push_alias(&mut sql, alias, dialect)?;
            }
        }

        for join in &self.joins {
            join.append_to_sql(&mut sql, dialect)?;
        }

        if !self.wheres.is_empty() {
            sql.push(" WHERE ");
            for (i, expr) in self.wheres.iter().enumerate() {
                if i > 0 {
                    sql.push(" AND ");
                }
                expr.append_to_sql(&mut sql, dialect)?;
            }
        }

        if !self.group_by.is_empty() {
            sql.push(" GROUP BY ");
            for (i, column) in self.group_by.iter().enumerate() {
                if i > 0 {
                    sql.push(", ");
                }
                sql.push_ident(column, dialect)?;
            }
        }

        if !self.having.is_empty() {
            sql.push(" HAVING ");
            for (i, expr) in self.having.iter().enumerate() {
                if i > 0 {
                    sql.push(" AND ");
                }
                expr.append_to_sql(&mut sql, dialect)?;
            }
        }

        self.order_by.append_to_sql(&mut sql, dialect)?;

        let style = dialect.pagination_style();
        if style == PaginationStyle::RowNumSubquery && !self.pagination.is_empty() {
            return Ok(wrap_rownum(sql, self.pagination));
        }
        self.pagination.append_trailing(&mut sql, style);
        Ok(sql)
    }
}

impl ParamBuilder for SelectBuilder {}

/// Render an alias the same way a bare identifier renders.
fn push_alias(sql: &mut Sql, alias: &str, dialect: &DialectDescriptor) -> GraftResult<()> {
    let mut out = String::new();
    dialect.write_ident(alias, &mut out)?;
    sql.push(&out);
    Ok(())
}

/// ROWNUM pagination rewrites the statement instead of appending a clause.
///
/// Skip present: the statement is wrapped so an outer filter can skip rows
/// by the captured row number. Top only: a single ROWNUM bound suffices.
fn wrap_rownum(inner: Sql, pagination: Pagination) -> Sql {
    let mut outer = Sql::empty();
    if let Some(skip) = pagination.skip {
        outer.push("SELECT * FROM (SELECT inner.*, ROWNUM rn FROM (");
        outer.push_sql(inner);
        outer.push(") inner");
        if let Some(top) = pagination.top {
            outer.push(" WHERE ROWNUM <= ");
            outer.push(&(skip + top).to_string());
        }
        outer.push(") WHERE rn > ");
        outer.push(&skip.to_string());
    } else if let Some(top) = pagination.top {
        outer.push("SELECT * FROM (");
        outer.push_sql(inner);
        outer.push(") WHERE ROWNUM <= ");
        outer.push(&top.to_string());
    }
    outer
}
