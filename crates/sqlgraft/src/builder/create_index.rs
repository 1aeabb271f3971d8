//! CREATE INDEX statement builder.

use crate::builder::traits::SqlBuilder;
use crate::defs::IndexDef;
use crate::dialect::DialectDescriptor;
use crate::error::{GraftError, GraftResult};
use crate::ident::{Ident, IntoIdent};
use crate::sql::Sql;

/// CREATE INDEX statement builder.
#[derive(Debug, Clone)]
pub struct CreateIndexBuilder {
    index: Ident,
    table: Ident,
    columns: Vec<String>,
    unique: bool,
}

impl CreateIndexBuilder {
    pub fn new(index: impl IntoIdent, table: impl IntoIdent) -> GraftResult<Self> {
        Ok(Self {
            index: index.into_ident()?,
            table: table.into_ident()?,
            columns: Vec::new(),
            unique: false,
        })
    }

    /// Build from an [`IndexDef`] metadata value.
    pub fn from_def(def: &IndexDef) -> GraftResult<Self> {
        Ok(Self {
            index: Ident::parse(&def.name)?,
            table: Ident::parse(&def.table)?,
            columns: def.columns.clone(),
            unique: def.unique,
        })
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

impl SqlBuilder for CreateIndexBuilder {
    fn to_sql(&self, dialect: &DialectDescriptor) -> GraftResult<Sql> {
        if self.columns.is_empty() {
            return Err(GraftError::render("CREATE INDEX requires at least one column"));
        }

        let mut sql = Sql::new("CREATE ");
        if self.unique {
            sql.push("UNIQUE ");
        }
        sql.push("INDEX ");
        sql.push_ident(&self.index, dialect)?;
        sql.push(" ON ");
        sql.push_ident(&self.table, dialect)?;
        sql.push(" (");
        for (i, name) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push(", ");
            }
            let ident = Ident::parse(name)?;
            sql.push_ident(&ident, dialect)?;
        }
        sql.push(")");
        Ok(sql)
    }
}
