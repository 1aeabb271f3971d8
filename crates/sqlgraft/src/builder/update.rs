//! UPDATE statement builder.

use crate::builder::Assign;
use crate::builder::traits::{ParamBuilder, SqlBuilder};
use crate::condition::WhereExpr;
use crate::dialect::DialectDescriptor;
use crate::error::{GraftError, GraftResult};
use crate::ident::{Ident, IntoIdent};
use crate::sql::Sql;
use crate::value::SqlValue;

/// UPDATE statement builder.
///
/// SET binds always precede WHERE binds in the parameter list, matching
/// their placeholder order in the rendered text.
///
/// # Example
/// ```ignore
/// use sqlgraft::{Condition, DialectDescriptor, ParamBuilder, UpdateBuilder};
///
/// let d = DialectDescriptor::postgres();
/// let stmt = UpdateBuilder::new("CUSTOMERS")?
///     .set("CITY", "Paris")?
///     .and_where(Condition::eq("ID", 7)?)
///     .build(&d)?;
/// ```
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: Ident,
    sets: Vec<(Ident, Assign)>,
    wheres: Vec<WhereExpr>,
}

impl UpdateBuilder {
    pub fn new(table: impl IntoIdent) -> GraftResult<Self> {
        Ok(Self {
            table: table.into_ident()?,
            sets: Vec::new(),
            wheres: Vec::new(),
        })
    }

    /// Set a column to a bound value.
    pub fn set(mut self, column: impl IntoIdent, value: impl Into<SqlValue>) -> GraftResult<Self> {
        self.sets
            .push((column.into_ident()?, Assign::Bind(value.into())));
        Ok(self)
    }

    /// Set an optional column value (None skips the assignment).
    pub fn set_opt<T>(self, column: impl IntoIdent, value: Option<T>) -> GraftResult<Self>
    where
        T: Into<SqlValue>,
    {
        match value {
            Some(v) => self.set(column, v),
            None => Ok(self),
        }
    }

    /// Set a column to a raw SQL expression (no bind).
    ///
    /// # Safety
    /// Be careful with SQL injection when using raw expressions.
    pub fn set_raw(mut self, column: impl IntoIdent, expr: impl Into<String>) -> GraftResult<Self> {
        self.sets
            .push((column.into_ident()?, Assign::Raw(expr.into())));
        Ok(self)
    }

    /// Add a WHERE predicate; multiple predicates are AND-joined.
    pub fn and_where(mut self, expr: impl Into<WhereExpr>) -> Self {
        self.wheres.push(expr.into());
        self
    }
}

impl SqlBuilder for UpdateBuilder {
    fn to_sql(&self, dialect: &DialectDescriptor) -> GraftResult<Sql> {
        if self.sets.is_empty() {
            return Err(GraftError::render("UPDATE requires at least one SET assignment"));
        }

        let mut sql = Sql::new("UPDATE ");
        sql.push_ident(&self.table, dialect)?;
        sql.push(" SET ");
        for (i, (column, value)) in self.sets.iter().enumerate() {
            if i > 0 {
                sql.push(", ");
            }
            sql.push_ident(column, dialect)?;
            sql.push(" = ");
            value.append_to_sql(&mut sql);
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

        Ok(sql)
    }
}

impl ParamBuilder for UpdateBuilder {}
