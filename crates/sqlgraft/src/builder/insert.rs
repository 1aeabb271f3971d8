//! INSERT statement builder.

use crate::builder::Assign;
use crate::builder::traits::{ParamBuilder, SqlBuilder};
use crate::dialect::DialectDescriptor;
use crate::error::{GraftError, GraftResult};
use crate::ident::{Ident, IntoIdent};
use crate::sql::Sql;
use crate::value::SqlValue;

/// INSERT statement builder.
///
/// Single-row inserts use [`set`](InsertBuilder::set) pairs; multi-row
/// inserts declare [`columns`](InsertBuilder::columns) once and append
/// [`row`](InsertBuilder::row)s. Every row must match the column count.
///
/// # Example
/// ```ignore
/// use sqlgraft::{DialectDescriptor, InsertBuilder, ParamBuilder};
///
/// let d = DialectDescriptor::postgres();
/// let stmt = InsertBuilder::new("CUSTOMERS")?
///     .set("NAME", "Ada")?
///     .set("CITY", "London")?
///     .build(&d)?;
/// ```
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: Ident,
    columns: Vec<Ident>,
    rows: Vec<Vec<Assign>>,
}

impl InsertBuilder {
    pub fn new(table: impl IntoIdent) -> GraftResult<Self> {
        Ok(Self {
            table: table.into_ident()?,
            columns: Vec::new(),
            rows: Vec::new(),
        })
    }

    /// Set a column to a bound value (single-row form).
    pub fn set(mut self, column: impl IntoIdent, value: impl Into<SqlValue>) -> GraftResult<Self> {
        self.columns.push(column.into_ident()?);
        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
        self.rows[0].push(Assign::Bind(value.into()));
        Ok(self)
    }

    /// Set an optional column value (None skips the column).
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
        self.columns.push(column.into_ident()?);
        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
        self.rows[0].push(Assign::Raw(expr.into()));
        Ok(self)
    }

    /// Declare the column list up front (multi-row form).
    pub fn columns<C>(mut self, columns: impl IntoIterator<Item = C>) -> GraftResult<Self>
    where
        C: IntoIdent,
    {
        for column in columns {
            self.columns.push(column.into_ident()?);
        }
        Ok(self)
    }

    /// Append one row of bound values; the length must match the declared
    /// column list.
    pub fn row<T>(mut self, values: impl IntoIterator<Item = T>) -> Self
    where
        T: Into<SqlValue>,
    {
        self.rows
            .push(values.into_iter().map(|v| Assign::Bind(v.into())).collect());
        self
    }
}

impl SqlBuilder for InsertBuilder {
    fn to_sql(&self, dialect: &DialectDescriptor) -> GraftResult<Sql> {
        if self.columns.is_empty() || self.rows.is_empty() {
            return Err(GraftError::render("INSERT requires at least one column"));
        }

        let mut sql = Sql::new("INSERT INTO ");
        sql.push_ident(&self.table, dialect)?;
        sql.push(" (");
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push(", ");
            }
            sql.push_ident(column, dialect)?;
        }
        sql.push(") VALUES ");

        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(GraftError::render(format!(
                    "INSERT row {} has {} values for {} columns",
                    i,
                    row.len(),
                    self.columns.len()
                )));
            }
            if i > 0 {
                sql.push(", ");
            }
            sql.push("(");
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    sql.push(", ");
                }
                value.append_to_sql(&mut sql);
            }
            sql.push(")");
        }

        Ok(sql)
    }
}

impl ParamBuilder for InsertBuilder {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectDescriptor;

    #[test]
    fn single_row_insert() {
        let stmt = InsertBuilder::new("CUSTOMERS")
            .unwrap()
            .set("NAME", "Ada")
            .unwrap()
            .set("CITY", "London")
            .unwrap()
            .build(&DialectDescriptor::postgres())
            .unwrap();
        assert_eq!(stmt.sql, "INSERT INTO CUSTOMERS (NAME, CITY) VALUES ($1, $2)");
        assert_eq!(stmt.params.len(), 2);
    }

    #[test]
    fn raw_expression_is_not_bound() {
        let stmt = InsertBuilder::new("EVENTS")
            .unwrap()
            .set("KIND", "signup")
            .unwrap()
            .set_raw("AT", "CURRENT_TIMESTAMP")
            .unwrap()
            .build(&DialectDescriptor::postgres())
            .unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO EVENTS (KIND, AT) VALUES ($1, CURRENT_TIMESTAMP)"
        );
        assert_eq!(stmt.params.len(), 1);
    }

    #[test]
    fn multi_row_insert() {
        let stmt = InsertBuilder::new("POINTS")
            .unwrap()
            .columns(["X", "Y"])
            .unwrap()
            .row([1_i64, 2])
            .row([3_i64, 4])
            .build(&DialectDescriptor::mysql())
            .unwrap();
        assert_eq!(stmt.sql, "INSERT INTO POINTS (X, Y) VALUES (?, ?), (?, ?)");
        assert_eq!(stmt.params.len(), 4);
    }

    #[test]
    fn set_opt_none_skips_column() {
        let stmt = InsertBuilder::new("CUSTOMERS")
            .unwrap()
            .set("NAME", "Ada")
            .unwrap()
            .set_opt("CITY", None::<&str>)
            .unwrap()
            .build(&DialectDescriptor::postgres())
            .unwrap();
        assert_eq!(stmt.sql, "INSERT INTO CUSTOMERS (NAME) VALUES ($1)");
    }

    #[test]
    fn row_length_mismatch_fails() {
        let err = InsertBuilder::new("POINTS")
            .unwrap()
            .columns(["X", "Y"])
            .unwrap()
            .row([1_i64])
            .build(&DialectDescriptor::postgres())
            .unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn empty_insert_fails() {
        let err = InsertBuilder::new("T")
            .unwrap()
            .render(&DialectDescriptor::postgres())
            .unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn reserved_column_is_quoted() {
        let stmt = InsertBuilder::new("LINES")
            .unwrap()
            .set("ORDER", 1_i64)
            .unwrap()
            .build(&DialectDescriptor::postgres())
            .unwrap();
        assert_eq!(stmt.sql, "INSERT INTO LINES (\"ORDER\") VALUES ($1)");
    }
}
