//! DELETE statement builder.

use crate::builder::traits::{ParamBuilder, SqlBuilder};
use crate::condition::WhereExpr;
use crate::dialect::DialectDescriptor;
use crate::error::{GraftError, GraftResult};
use crate::ident::{Ident, IntoIdent};
use crate::sql::Sql;

/// DELETE statement builder.
///
/// A DELETE without any WHERE predicate is refused unless
/// [`allow_delete_all`](DeleteBuilder::allow_delete_all) was called, so a
/// forgotten condition cannot wipe a table.
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: Ident,
    wheres: Vec<WhereExpr>,
    allow_delete_all: bool,
}

impl DeleteBuilder {
    pub fn new(table: impl IntoIdent) -> GraftResult<Self> {
        Ok(Self {
            table: table.into_ident()?,
            wheres: Vec::new(),
            allow_delete_all: false,
        })
    }

    /// Allow rendering without a WHERE clause (full-table delete).
    pub fn allow_delete_all(mut self) -> Self {
        self.allow_delete_all = true;
        self
    }

    /// Add a WHERE predicate; multiple predicates are AND-joined.
    pub fn and_where(mut self, expr: impl Into<WhereExpr>) -> Self {
        self.wheres.push(expr.into());
        self
    }
}

impl SqlBuilder for DeleteBuilder {
    fn to_sql(&self, dialect: &DialectDescriptor) -> GraftResult<Sql> {
        if self.wheres.is_empty() && !self.allow_delete_all {
            return Err(GraftError::render(
                "DELETE without WHERE (call allow_delete_all to delete every row)",
            ));
        }

        let mut sql = Sql::new("DELETE FROM ");
        sql.push_ident(&self.table, dialect)?;

        if !self.wheres.is_empty() {
            sql.push(" WHERE ");
            for (i, expr) in self.wheres.iter().enumerate() {
                if i > 0 {
                    sql.push(" AND ");
                }
                expr.append_to_sql(&mut sql, dialect)?;
            }
        }

        Ok(sql)
    }
}

impl ParamBuilder for DeleteBuilder {}
