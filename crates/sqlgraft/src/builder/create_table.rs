//! CREATE TABLE statement builder.

use crate::builder::traits::SqlBuilder;
use crate::defs::{CheckDef, ColumnDef, ForeignKeyDef, TableDef, UniqueDef};
use crate::dialect::DialectDescriptor;
use crate::error::{GraftError, GraftResult};
use crate::ident::{Ident, IntoIdent};
use crate::sql::Sql;

/// CREATE TABLE statement builder.
///
/// Columns render as `<name> <TYPE> [DEFAULT <expr>] [NOT NULL]` (DEFAULT
/// before NOT NULL, the order every supported dialect accepts), followed by
/// PRIMARY KEY and named constraints.
///
/// # Example
/// ```ignore
/// use sqlgraft::{ColumnDef, CreateTableBuilder, DialectDescriptor, SqlBuilder};
///
/// let d = DialectDescriptor::postgres();
/// let sql = CreateTableBuilder::new("ORDERS")?
///     .column(ColumnDef::new("ID", "BIGINT").not_null())
///     .column(ColumnDef::new("TOTAL", "DECIMAL(10,2)"))
///     .primary_key(&["ID"])
///     .render(&d)?;
/// ```
#[derive(Debug, Clone)]
pub struct CreateTableBuilder {
    table: Ident,
    columns: Vec<ColumnDef>,
    primary_key: Vec<String>,
    foreign_keys: Vec<ForeignKeyDef>,
    unique_constraints: Vec<UniqueDef>,
    checks: Vec<CheckDef>,
}

impl CreateTableBuilder {
    pub fn new(table: impl IntoIdent) -> GraftResult<Self> {
        Ok(Self {
            table: table.into_ident()?,
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            unique_constraints: Vec::new(),
            checks: Vec::new(),
        })
    }

    /// Build from a [`TableDef`] metadata value.
    pub fn from_def(def: &TableDef) -> GraftResult<Self> {
        Ok(Self {
            table: Ident::parse(&def.name)?,
            columns: def.columns.clone(),
            primary_key: def.primary_key.clone(),
            foreign_keys: def.foreign_keys.clone(),
            unique_constraints: def.unique_constraints.clone(),
            checks: def.checks.clone(),
        })
    }

    pub fn column(mut self, def: ColumnDef) -> Self {
        self.columns.push(def);
        self
    }

    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn foreign_key(mut self, def: ForeignKeyDef) -> Self {
        self.foreign_keys.push(def);
        self
    }

    pub fn unique(mut self, def: UniqueDef) -> Self {
        self.unique_constraints.push(def);
        self
    }

    pub fn check(mut self, def: CheckDef) -> Self {
        self.checks.push(def);
        self
    }
}

impl SqlBuilder for CreateTableBuilder {
    fn to_sql(&self, dialect: &DialectDescriptor) -> GraftResult<Sql> {
        if self.columns.is_empty() {
            return Err(GraftError::render("CREATE TABLE requires at least one column"));
        }

        let mut sql = Sql::new("CREATE TABLE ");
        sql.push_ident(&self.table, dialect)?;
        sql.push(" (");

        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push(", ");
            }
            push_name(&mut sql, &column.name, dialect)?;
            sql.push(" ");
            sql.push(&column.sql_type);
            if let Some(default) = &column.default {
                sql.push(" DEFAULT ");
                sql.push(default);
            }
            if !column.nullable {
                sql.push(" NOT NULL");
            }
        }

        if !self.primary_key.is_empty() {
            sql.push(", PRIMARY KEY (");
            push_name_list(&mut sql, &self.primary_key, dialect)?;
            sql.push(")");
        }

        for fk in &self.foreign_keys {
            sql.push(", CONSTRAINT ");
            push_name(&mut sql, &fk.name, dialect)?;
            sql.push(" FOREIGN KEY (");
            push_name_list(&mut sql, &fk.columns, dialect)?;
            sql.push(") REFERENCES ");
            push_name(&mut sql, &fk.referenced_table, dialect)?;
            sql.push(" (");
            push_name_list(&mut sql, &fk.referenced_columns, dialect)?;
            sql.push(")");
        }

        for unique in &self.unique_constraints {
            sql.push(", CONSTRAINT ");
            push_name(&mut sql, &unique.name, dialect)?;
            sql.push(" UNIQUE (");
            push_name_list(&mut sql, &unique.columns, dialect)?;
            sql.push(")");
        }

        for check in &self.checks {
            sql.push(", CONSTRAINT ");
            push_name(&mut sql, &check.name, dialect)?;
            sql.push(" CHECK (");
            sql.push(&check.expression);
            sql.push(")");
        }

        sql.push(")");
        Ok(sql)
    }
}

fn push_name(sql: &mut Sql, name: &str, dialect: &DialectDescriptor) -> GraftResult<()> {
    let ident = Ident::parse(name)?;
    sql.push_ident(&ident, dialect)?;
    Ok(())
}

fn push_name_list(sql: &mut Sql, names: &[String], dialect: &DialectDescriptor) -> GraftResult<()> {
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            sql.push(", ");
        }
        push_name(sql, name, dialect)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_and_primary_key() {
        let sql = CreateTableBuilder::new("ORDERS")
            .unwrap()
            .column(ColumnDef::new("ID", "BIGINT").not_null())
            .column(ColumnDef::new("TOTAL", "DECIMAL(10,2)"))
            .primary_key(&["ID"])
            .render(&DialectDescriptor::postgres())
            .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE ORDERS (ID BIGINT NOT NULL, TOTAL DECIMAL(10,2), PRIMARY KEY (ID))"
        );
    }

    #[test]
    fn default_renders_before_not_null() {
        let sql = CreateTableBuilder::new("EVENTS")
            .unwrap()
            .column(
                ColumnDef::new("CREATED", "DATE")
                    .with_default("CURRENT_DATE")
                    .not_null(),
            )
            .render(&DialectDescriptor::postgres())
            .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE EVENTS (CREATED DATE DEFAULT CURRENT_DATE NOT NULL)"
        );
    }

    #[test]
    fn named_constraints() {
        let sql = CreateTableBuilder::new("ORDER_ITEMS")
            .unwrap()
            .column(ColumnDef::new("ID", "BIGINT").not_null())
            .column(ColumnDef::new("ORDER_ID", "BIGINT").not_null())
            .column(ColumnDef::new("QTY", "INTEGER"))
            .foreign_key(ForeignKeyDef {
                name: "FK_ITEM_ORDER".to_string(),
                columns: vec!["ORDER_ID".to_string()],
                referenced_table: "ORDERS".to_string(),
                referenced_columns: vec!["ID".to_string()],
            })
            .unique(UniqueDef {
                name: "UQ_ITEM".to_string(),
                columns: vec!["ORDER_ID".to_string(), "ID".to_string()],
            })
            .check(CheckDef {
                name: "CK_QTY".to_string(),
                expression: "QTY > 0".to_string(),
            })
            .render(&DialectDescriptor::postgres())
            .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE ORDER_ITEMS (ID BIGINT NOT NULL, ORDER_ID BIGINT NOT NULL, \
             QTY INTEGER, CONSTRAINT FK_ITEM_ORDER FOREIGN KEY (ORDER_ID) REFERENCES ORDERS (ID), \
             CONSTRAINT UQ_ITEM UNIQUE (ORDER_ID, ID), CONSTRAINT CK_QTY CHECK (QTY > 0))"
        );
    }

    #[test]
    fn from_def_matches_builder() {
        let def = TableDef::new("ORDERS")
            .with_column(ColumnDef::new("ID", "BIGINT").not_null())
            .with_primary_key(&["ID"]);
        let from_def = CreateTableBuilder::from_def(&def)
            .unwrap()
            .render(&DialectDescriptor::postgres())
            .unwrap();
        assert_eq!(from_def, "CREATE TABLE ORDERS (ID BIGINT NOT NULL, PRIMARY KEY (ID))");
    }

    #[test]
    fn no_columns_fails() {
        let err = CreateTableBuilder::new("EMPTY")
            .unwrap()
            .render(&DialectDescriptor::postgres())
            .unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn reserved_column_quoted_for_mysql() {
        let sql = CreateTableBuilder::new("T")
            .unwrap()
            .column(ColumnDef::new("order", "INT"))
            .render(&DialectDescriptor::mysql())
            .unwrap();
        assert_eq!(sql, "CREATE TABLE T (`order` INT)");
    }
}
