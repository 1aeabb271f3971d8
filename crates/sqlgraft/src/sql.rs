//! Parameter-safe SQL fragment accumulator.
//!
//! [`Sql`] stores raw SQL pieces and typed parameters separately, so callers
//! compose fragments without tracking placeholder indices. Placeholders are
//! numbered (or rendered as `?`) only at [`Sql::render`] time, per the
//! dialect's placeholder style — which is what keeps parameter order and
//! placeholder order identical by construction.
//!
//! # Example
//!
//! ```ignore
//! use sqlgraft::{PlaceholderStyle, sql};
//!
//! let mut q = sql("SELECT * FROM ORDERS WHERE ");
//! q.push("PRICE > ").push_bind(100_i64);
//! assert_eq!(q.render(PlaceholderStyle::Numbered), "SELECT * FROM ORDERS WHERE PRICE > $1");
//! ```

use crate::dialect::{DialectDescriptor, PlaceholderStyle};
use crate::error::{GraftError, GraftResult};
use crate::ident::Ident;
use crate::value::SqlValue;

#[derive(Debug, Clone)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A parameter-safe dynamic SQL fragment.
///
/// Raw text and bind markers are kept in one ordered list; the values live
/// in a parallel list in bind order.
#[derive(Debug, Clone, Default)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<SqlValue>,
}

/// Start building a SQL fragment.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

impl Sql {
    /// Create a new fragment with initial raw SQL.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
        }
    }

    /// Create an empty fragment.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<SqlValue>) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value.into());
        self
    }

    /// Append a comma-separated list of placeholders and bind all values.
    ///
    /// If `values` is empty, this appends `NULL` (so `IN (NULL)` stays valid
    /// SQL; predicate-level code prefers `1=0` and never calls this empty).
    pub fn push_bind_list<T>(&mut self, values: impl IntoIterator<Item = T>) -> &mut Self
    where
        T: Into<SqlValue>,
    {
        let mut iter = values.into_iter();
        let Some(first) = iter.next() else {
            return self.push("NULL");
        };

        self.push_bind(first);
        for v in iter {
            self.push(", ");
            self.push_bind(v);
        }
        self
    }

    /// Append another fragment, consuming it. Parameter order is preserved:
    /// `other`'s binds come after everything already pushed.
    pub fn push_sql(&mut self, mut other: Sql) -> &mut Self {
        self.parts.append(&mut other.parts);
        self.params.append(&mut other.params);
        self
    }

    /// Append an identifier rendered for `dialect` (quoted as needed).
    ///
    /// Identifiers cannot be parameterized in SQL, so this goes through the
    /// dialect's quoting policy instead of a bind.
    pub fn push_ident(
        &mut self,
        ident: &Ident,
        dialect: &DialectDescriptor,
    ) -> GraftResult<&mut Self> {
        let mut rendered = String::new();
        ident.write_sql(dialect, &mut rendered)?;
        Ok(self.push(&rendered))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
            && !self
                .parts
                .iter()
                .any(|p| matches!(p, SqlPart::Raw(s) if !s.is_empty()))
    }

    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Number of placeholder markers in the fragment.
    pub fn placeholder_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, SqlPart::Param))
            .count()
    }

    /// Bound parameters, in placeholder order.
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    pub fn into_params(self) -> Vec<SqlValue> {
        self.params
    }

    /// Render with placeholders in the given style.
    pub fn render(&self, style: PlaceholderStyle) -> String {
        let mut out = String::new();
        let mut idx: usize = 0;

        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    match style {
                        PlaceholderStyle::Numbered => {
                            use std::fmt::Write;
                            let _ = write!(&mut out, "${idx}");
                        }
                        PlaceholderStyle::QuestionMark => out.push('?'),
                    }
                }
            }
        }
        out
    }

    /// Check the placeholder/parameter parity invariant.
    pub fn validate(&self) -> GraftResult<()> {
        let placeholders = self.placeholder_count();
        if placeholders != self.params.len() {
            return Err(GraftError::render(format!(
                "placeholder/parameter mismatch: {placeholders} placeholders, {} params",
                self.params.len()
            )));
        }
        Ok(())
    }
}
