//! Safe SQL identifier handling.
//!
//! [`Ident`] represents a SQL identifier (schema/table/column), supporting
//! dotted notation and explicitly quoted segments. Unlike the raw strings
//! inside an entity model, an `Ident` is validated at construction and
//! rendered through a [`DialectDescriptor`], so reserved words and exotic
//! characters come out correctly quoted for the target database.
//!
//! - Unquoted parts are validated against: `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted parts allow any characters except NUL and escape `"` as `""`
//!
//! # Example
//! ```ignore
//! use sqlgraft::{DialectDescriptor, Ident};
//!
//! let t = Ident::parse("SALES.ORDERS")?;
//! assert_eq!(t.render(&DialectDescriptor::postgres())?, "SALES.ORDERS");
//! # Ok::<(), sqlgraft::GraftError>(())
//! ```

use crate::dialect::DialectDescriptor;
use crate::error::{GraftError, GraftResult};

/// A part of a SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// Unquoted identifier: must match `[A-Za-z_][A-Za-z0-9_$]*`.
    /// Rendered bare unless the dialect reserves the word.
    Unquoted(String),
    /// Quoted identifier: allows any characters except NUL.
    /// Always rendered inside the dialect's quote characters.
    Quoted(String),
}

/// A SQL identifier (column, table, or schema name).
///
/// Supports dotted notation (e.g., `SCHEMA.TABLE.COLUMN`) and quoted
/// segments (e.g., `"CamelCase"."Order"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

impl Ident {
    /// Create a single-part identifier that will always be quoted.
    pub fn quoted(name: &str) -> GraftResult<Self> {
        if name.is_empty() {
            return Err(GraftError::render("empty quoted identifier"));
        }
        if name.contains('\0') {
            return Err(GraftError::render("identifier cannot contain NUL"));
        }
        Ok(Self {
            parts: vec![IdentPart::Quoted(name.to_string())],
        })
    }

    /// Parse an identifier string, supporting dotted and quoted forms.
    ///
    /// - Dotted: `SCHEMA.TABLE.COLUMN`
    /// - Quoted: `"CamelCase"."Order"`
    /// - Mixed: `SALES."Order".ID`
    pub fn parse(s: &str) -> GraftResult<Self> {
        if s.is_empty() {
            return Err(GraftError::render("identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(GraftError::render("identifier cannot contain NUL"));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            // Consume '.' between parts (but require there is a next part).
            if !parts.is_empty() {
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(GraftError::render("trailing '.' in identifier"));
                        }
                    }
                    Some(c) => {
                        return Err(GraftError::render(format!(
                            "expected '.' between identifier parts, got '{c}'"
                        )));
                    }
                    None => break,
                }
            }

            // Quoted identifier part.
            if chars.peek() == Some(&'"') {
                chars.next(); // opening quote
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('"') => {
                            // Escaped quote: ""
                            if chars.peek() == Some(&'"') {
                                chars.next();
                                name.push('"');
                            } else {
                                break;
                            }
                        }
                        Some(c) => name.push(c),
                        None => return Err(GraftError::render("unclosed quoted identifier")),
                    }
                }
                if name.is_empty() {
                    return Err(GraftError::render("empty quoted identifier"));
                }
                parts.push(IdentPart::Quoted(name));
                continue;
            }

            // Unquoted identifier part.
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                if name.is_empty() {
                    // First char: letter or underscore.
                    if c == '_' || c.is_ascii_alphabetic() {
                        name.push(c);
                        chars.next();
                    } else {
                        return Err(GraftError::render(format!(
                            "invalid identifier start character: '{c}'"
                        )));
                    }
                } else {
                    // Subsequent chars: letter, digit, underscore, or $.
                    if c == '_' || c == '$' || c.is_ascii_alphanumeric() {
                        name.push(c);
                        chars.next();
                    } else {
                        return Err(GraftError::render(format!(
                            "invalid character in identifier: '{c}'"
                        )));
                    }
                }
            }
            if name.is_empty() {
                return Err(GraftError::render("empty identifier segment"));
            }
            parts.push(IdentPart::Unquoted(name));
        }

        if parts.is_empty() {
            return Err(GraftError::render("empty identifier"));
        }

        Ok(Self { parts })
    }

    /// Render the identifier for `dialect`.
    pub fn render(&self, dialect: &DialectDescriptor) -> GraftResult<String> {
        let mut out = String::new();
        self.write_sql(dialect, &mut out)?;
        Ok(out)
    }

    pub(crate) fn write_sql(
        &self,
        dialect: &DialectDescriptor,
        out: &mut String,
    ) -> GraftResult<()> {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Unquoted(s) => dialect.write_ident(s, out)?,
                IdentPart::Quoted(s) => {
                    dialect.check_length(s)?;
                    dialect.write_quoted(s, out);
                }
            }
        }
        Ok(())
    }

    /// The trailing (most specific) part, e.g. the column of
    /// `SCHEMA.TABLE.COLUMN`.
    pub fn last_part(&self) -> &str {
        match self
            .parts
            .last()
            .expect("Ident always has at least one part")
        {
            IdentPart::Unquoted(s) | IdentPart::Quoted(s) => s,
        }
    }
}

/// Convert an input into an [`Ident`].
///
/// This is mainly for ergonomics in builder APIs.
pub trait IntoIdent {
    fn into_ident(self) -> GraftResult<Ident>;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> GraftResult<Ident> {
        Ok(self)
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> GraftResult<Ident> {
        Ok(self.clone())
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> GraftResult<Ident> {
        Ident::parse(self)
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> GraftResult<Ident> {
        Ident::parse(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pg() -> DialectDescriptor {
        DialectDescriptor::postgres()
    }

    #[test]
    fn ident_simple() {
        let ident = Ident::parse("ORDERS").unwrap();
        assert_eq!(ident.render(&pg()).unwrap(), "ORDERS");
    }

    #[test]
    fn ident_dotted() {
        let ident = Ident::parse("SALES.ORDERS").unwrap();
        assert_eq!(ident.render(&pg()).unwrap(), "SALES.ORDERS");
    }

    #[test]
    fn reserved_part_is_quoted() {
        let ident = Ident::parse("SALES.ORDER").unwrap();
        assert_eq!(ident.render(&pg()).unwrap(), "SALES.\"ORDER\"");
    }

    #[test]
    fn quoted_part_stays_quoted() {
        let ident = Ident::parse(r#""CamelCase""#).unwrap();
        assert_eq!(ident.render(&pg()).unwrap(), r#""CamelCase""#);
    }

    #[test]
    fn quoted_part_uses_dialect_quote_char() {
        let ident = Ident::parse(r#""CamelCase""#).unwrap();
        let mysql = DialectDescriptor::mysql();
        assert_eq!(ident.render(&mysql).unwrap(), "`CamelCase`");
    }

    #[test]
    fn embedded_quote_is_doubled() {
        let ident = Ident::parse(r#""has""quote""#).unwrap();
        assert_eq!(ident.render(&pg()).unwrap(), r#""has""quote""#);
    }

    #[test]
    fn mixed_quoted_unquoted() {
        let ident = Ident::parse(r#"SALES."Order".ID"#).unwrap();
        assert_eq!(ident.render(&pg()).unwrap(), r#"SALES."Order".ID"#);
    }

    #[test]
    fn last_part() {
        let ident = Ident::parse("SALES.ORDERS.ID").unwrap();
        assert_eq!(ident.last_part(), "ID");
    }

    #[test]
    fn ident_rejects_empty() {
        assert!(Ident::parse("").is_err());
    }

    #[test]
    fn ident_rejects_start_digit() {
        assert!(Ident::parse("1table").is_err());
    }

    #[test]
    fn ident_rejects_space() {
        assert!(Ident::parse("my table").is_err());
    }

    #[test]
    fn ident_rejects_double_dot() {
        assert!(Ident::parse("schema..table").is_err());
    }

    #[test]
    fn ident_rejects_trailing_dot() {
        assert!(Ident::parse("schema.").is_err());
    }

    #[test]
    fn ident_rejects_unclosed_quote() {
        assert!(Ident::parse(r#""unclosed"#).is_err());
    }

    #[test]
    fn over_long_part_fails_at_render() {
        let ident = Ident::parse(&"A".repeat(40)).unwrap();
        assert!(ident.render(&DialectDescriptor::oracle()).is_err());
    }
}
