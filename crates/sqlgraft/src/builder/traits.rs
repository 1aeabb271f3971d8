//! Shared rendering traits for all statement builders.

use crate::dialect::DialectDescriptor;
use crate::error::GraftResult;
use crate::sql::Sql;
use crate::value::SqlValue;

/// A rendered statement: SQL text plus its bind values in placeholder order.
#[derive(Debug, Clone)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// A statement builder that can render itself for one dialect.
pub trait SqlBuilder {
    /// Render the statement into a SQL fragment (text parts + ordered binds).
    fn to_sql(&self, dialect: &DialectDescriptor) -> GraftResult<Sql>;

    /// Render the statement text with the dialect's placeholder style.
    fn render(&self, dialect: &DialectDescriptor) -> GraftResult<String> {
        let sql = self.to_sql(dialect)?;
        sql.validate()?;
        Ok(sql.render(dialect.placeholder_style()))
    }
}

/// A parameterized builder whose output carries bind values.
pub trait ParamBuilder: SqlBuilder {
    /// Render text and bind values together.
    fn build(&self, dialect: &DialectDescriptor) -> GraftResult<Statement> {
        let sql = self.to_sql(dialect)?;
        sql.validate()?;
        let text = sql.render(dialect.placeholder_style());
        Ok(Statement {
            sql: text,
            params: sql.into_params(),
        })
    }
}
