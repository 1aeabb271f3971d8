//! Sequence DDL and NEXT VALUE generation.
//!
//! Both builders check [`DialectDescriptor::supports_sequences`] before
//! rendering anything; a dialect without sequences fails with
//! `UnsupportedFeature`, never with broken SQL.

use crate::builder::traits::SqlBuilder;
use crate::defs::SequenceDef;
use crate::dialect::DialectDescriptor;
use crate::error::{GraftError, GraftResult};
use crate::ident::{Ident, IntoIdent};
use crate::sql::Sql;

fn check_supported(dialect: &DialectDescriptor) -> GraftResult<()> {
    if !dialect.supports_sequences() {
        return Err(GraftError::unsupported(dialect.name(), "sequences"));
    }
    Ok(())
}

/// CREATE SEQUENCE statement builder.
///
/// # Example
/// ```ignore
/// use sqlgraft::{CreateSequenceBuilder, DialectDescriptor, SqlBuilder};
///
/// let d = DialectDescriptor::postgres();
/// let sql = CreateSequenceBuilder::new("ORDER_SEQ")?
///     .start_with(100)
///     .increment_by(10)
///     .render(&d)?;
/// ```
#[derive(Debug, Clone)]
pub struct CreateSequenceBuilder {
    sequence: Ident,
    start: Option<i64>,
    increment: Option<i64>,
    min_value: Option<i64>,
    max_value: Option<i64>,
    cycle: bool,
}

impl CreateSequenceBuilder {
    pub fn new(sequence: impl IntoIdent) -> GraftResult<Self> {
        Ok(Self {
            sequence: sequence.into_ident()?,
            start: None,
            increment: None,
            min_value: None,
            max_value: None,
            cycle: false,
        })
    }

    /// Build from a [`SequenceDef`] metadata value.
    pub fn from_def(def: &SequenceDef) -> GraftResult<Self> {
        Ok(Self {
            sequence: Ident::parse(&def.name)?,
            start: def.start,
            increment: def.increment,
            min_value: def.min_value,
            max_value: def.max_value,
            cycle: def.cycle,
        })
    }

    pub fn start_with(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn increment_by(mut self, increment: i64) -> Self {
        self.increment = Some(increment);
        self
    }

    pub fn min_value(mut self, min: i64) -> Self {
        self.min_value = Some(min);
        self
    }

    pub fn max_value(mut self, max: i64) -> Self {
        self.max_value = Some(max);
        self
    }

    pub fn cycle(mut self) -> Self {
        self.cycle = true;
        self
    }
}

impl SqlBuilder for CreateSequenceBuilder {
    fn to_sql(&self, dialect: &DialectDescriptor) -> GraftResult<Sql> {
        check_supported(dialect)?;

        let mut sql = Sql::new("CREATE SEQUENCE ");
        sql.push_ident(&self.sequence, dialect)?;
        if let Some(start) = self.start {
            sql.push(" START WITH ");
            sql.push(&start.to_string());
        }
        if let Some(increment) = self.increment {
            sql.push(" INCREMENT BY ");
            sql.push(&increment.to_string());
        }
        if let Some(min) = self.min_value {
            sql.push(" MINVALUE ");
            sql.push(&min.to_string());
        }
        if let Some(max) = self.max_value {
            sql.push(" MAXVALUE ");
            sql.push(&max.to_string());
        }
        if self.cycle {
            sql.push(" CYCLE");
        }
        Ok(sql)
    }
}

/// Renders `SELECT NEXT VALUE FOR <sequence>`.
#[derive(Debug, Clone)]
pub struct NextValue {
    sequence: Ident,
}

impl NextValue {
    pub fn new(sequence: impl IntoIdent) -> GraftResult<Self> {
        Ok(Self {
            sequence: sequence.into_ident()?,
        })
    }
}

impl SqlBuilder for NextValue {
    fn to_sql(&self, dialect: &DialectDescriptor) -> GraftResult<Sql> {
        check_supported(dialect)?;

        let mut sql = Sql::new("SELECT NEXT VALUE FOR ");
        sql.push_ident(&self.sequence, dialect)?;
        Ok(sql)
    }
}
