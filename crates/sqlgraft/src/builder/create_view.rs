//! CREATE VIEW statement builder.

use crate::builder::select::SelectBuilder;
use crate::builder::traits::SqlBuilder;
use crate::defs::ViewDef;
use crate::dialect::DialectDescriptor;
use crate::error::{GraftError, GraftResult};
use crate::ident::{Ident, IntoIdent};
use crate::sql::Sql;

#[derive(Debug, Clone)]
enum ViewQuery {
    Missing,
    Raw(String),
    Select(Box<SelectBuilder>),
}

/// CREATE VIEW statement builder.
///
/// The defining query is raw SQL text or a nested [`SelectBuilder`]. DDL
/// cannot carry bind parameters, so a nested query with binds is refused.
#[derive(Debug, Clone)]
pub struct CreateViewBuilder {
    view: Ident,
    columns: Vec<String>,
    query: ViewQuery,
}

impl CreateViewBuilder {
    pub fn new(view: impl IntoIdent) -> GraftResult<Self> {
        Ok(Self {
            view: view.into_ident()?,
            columns: Vec::new(),
            query: ViewQuery::Missing,
        })
    }

    /// Build from a [`ViewDef`] metadata value.
    pub fn from_def(def: &ViewDef) -> GraftResult<Self> {
        Ok(Self {
            view: Ident::parse(&def.name)?,
            columns: def.columns.clone(),
            query: ViewQuery::Raw(def.query.clone()),
        })
    }

    /// Set the explicit view column list.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Set the defining query as raw SQL text.
    pub fn as_query(mut self, query: impl Into<String>) -> Self {
        self.query = ViewQuery::Raw(query.into());
        self
    }

    /// Set the defining query as a nested SELECT.
    pub fn as_select(mut self, select: SelectBuilder) -> Self {
        self.query = ViewQuery::Select(Box::new(select));
        self
    }
}

impl SqlBuilder for CreateViewBuilder {
    fn to_sql(&self, dialect: &DialectDescriptor) -> GraftResult<Sql> {
        let mut sql = Sql::new("CREATE VIEW ");
        sql.push_ident(&self.view, dialect)?;

        if !self.columns.is_empty() {
            sql.push(" (");
            for (i, name) in self.columns.iter().enumerate() {
                if i > 0 {
                    sql.push(", ");
                }
                let ident = Ident::parse(name)?;
                sql.push_ident(&ident, dialect)?;
            }
            sql.push(")");
        }

        sql.push(" AS ");
        match &self.query {
            ViewQuery::Missing => {
                return Err(GraftError::render("CREATE VIEW requires a defining query"));
            }
            ViewQuery::Raw(text) => {
                sql.push(text);
            }
            ViewQuery::Select(select) => {
                let inner = select.to_sql(dialect)?;
                if inner.param_count() > 0 {
                    return Err(GraftError::render(
                        "CREATE VIEW query must not contain bind parameters",
                    ));
                }
                sql.push_sql(inner);
            }
        }
        Ok(sql)
    }
}
