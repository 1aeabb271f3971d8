//! DROP statement builders.

use crate::builder::traits::SqlBuilder;
use crate::dialect::DialectDescriptor;
use crate::error::{GraftError, GraftResult};
use crate::ident::{Ident, IntoIdent};
use crate::sql::Sql;

/// DROP TABLE statement builder.
#[derive(Debug, Clone)]
pub struct DropTableBuilder {
    table: Ident,
    cascade: bool,
}

impl DropTableBuilder {
    pub fn new(table: impl IntoIdent) -> GraftResult<Self> {
        Ok(Self {
            table: table.into_ident()?,
            cascade: false,
        })
    }

    pub fn cascade(mut self) -> Self {
        self.cascade = true;
        self
    }
}

impl SqlBuilder for DropTableBuilder {
    fn to_sql(&self, dialect: &DialectDescriptor) -> GraftResult<Sql> {
        let mut sql = Sql::new("DROP TABLE ");
        sql.push_ident(&self.table, dialect)?;
        if self.cascade {
            sql.push(" CASCADE");
        }
        Ok(sql)
    }
}

/// DROP VIEW statement builder.
#[derive(Debug, Clone)]
pub struct DropViewBuilder {
    view: Ident,
}

impl DropViewBuilder {
    pub fn new(view: impl IntoIdent) -> GraftResult<Self> {
        Ok(Self {
            view: view.into_ident()?,
        })
    }
}

impl SqlBuilder for DropViewBuilder {
    fn to_sql(&self, dialect: &DialectDescriptor) -> GraftResult<Sql> {
        let mut sql = Sql::new("DROP VIEW ");
        sql.push_ident(&self.view, dialect)?;
        Ok(sql)
    }
}

/// DROP SEQUENCE statement builder (capability-gated).
#[derive(Debug, Clone)]
pub struct DropSequenceBuilder {
    sequence: Ident,
}

impl DropSequenceBuilder {
    pub fn new(sequence: impl IntoIdent) -> GraftResult<Self> {
        Ok(Self {
            sequence: sequence.into_ident()?,
        })
    }
}

impl SqlBuilder for DropSequenceBuilder {
    fn to_sql(&self, dialect: &DialectDescriptor) -> GraftResult<Sql> {
        if !dialect.supports_sequences() {
            return Err(GraftError::unsupported(dialect.name(), "sequences"));
        }
        let mut sql = Sql::new("DROP SEQUENCE ");
        sql.push_ident(&self.sequence, dialect)?;
        Ok(sql)
    }
}

/// DROP INDEX statement builder.
#[derive(Debug, Clone)]
pub struct DropIndexBuilder {
    index: Ident,
}

impl DropIndexBuilder {
    pub fn new(index: impl IntoIdent) -> GraftResult<Self> {
        Ok(Self {
            index: index.into_ident()?,
        })
    }
}

impl SqlBuilder for DropIndexBuilder {
    fn to_sql(&self, dialect: &DialectDescriptor) -> GraftResult<Sql> {
        let mut sql = Sql::new("DROP INDEX ");
        sql.push_ident(&self.index, dialect)?;
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_table_with_cascade() {
        let d = DialectDescriptor::postgres();
        assert_eq!(
            DropTableBuilder::new("ORDERS").unwrap().render(&d).unwrap(),
            "DROP TABLE ORDERS"
        );
        assert_eq!(
            DropTableBuilder::new("ORDERS")
                .unwrap()
                .cascade()
                .render(&d)
                .unwrap(),
            "DROP TABLE ORDERS CASCADE"
        );
    }

    #[test]
    fn drop_view_and_index() {
        let d = DialectDescriptor::postgres();
        assert_eq!(
            DropViewBuilder::new("V").unwrap().render(&d).unwrap(),
            "DROP VIEW V"
        );
        assert_eq!(
            DropIndexBuilder::new("IDX").unwrap().render(&d).unwrap(),
            "DROP INDEX IDX"
        );
    }

    #[test]
    fn drop_sequence_gated_by_capability() {
        assert_eq!(
            DropSequenceBuilder::new("SEQ")
                .unwrap()
                .render(&DialectDescriptor::postgres())
                .unwrap(),
            "DROP SEQUENCE SEQ"
        );
        let err = DropSequenceBuilder::new("SEQ")
            .unwrap()
            .render(&DialectDescriptor::mysql())
            .unwrap_err();
        assert!(err.is_unsupported_feature());
    }

    #[test]
    fn quoted_object_names() {
        let sql = DropTableBuilder::new("order")
            .unwrap()
            .render(&DialectDescriptor::mysql())
            .unwrap();
        assert_eq!(sql, "DROP TABLE `order`");
    }
}
