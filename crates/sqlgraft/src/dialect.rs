//! Dialect descriptors and the dialect registry.
//!
//! A [`DialectDescriptor`] is a plain data value: quoting rules, reserved
//! words, pagination and placeholder styles, and capability flags. All
//! dialect-dependent decisions downstream key off these fields; there is no
//! per-database type hierarchy. Descriptors are immutable once registered,
//! so one instance is safely shared by any number of concurrent
//! compilations.

use crate::error::{GraftError, GraftResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// How a dialect windows result rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaginationStyle {
    /// Trailing `LIMIT <top> OFFSET <skip>`.
    LimitOffset,
    /// Trailing `OFFSET <skip> ROWS FETCH NEXT <top> ROWS ONLY`.
    FetchFirst,
    /// The whole query is wrapped in a ROWNUM subquery.
    RowNumSubquery,
}

/// How a dialect writes positional placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceholderStyle {
    /// `$1`, `$2`, ... in bind order.
    Numbered,
    /// `?` for every bind.
    QuestionMark,
}

/// ANSI reserved words shared by every built-in descriptor. Per-dialect
/// extras are added on top.
const ANSI_RESERVED: &[&str] = &[
    "ALL", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN", "CONSTRAINT",
    "CREATE", "CROSS", "CURRENT", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE", "END",
    "EXCEPT", "EXISTS", "FETCH", "FOR", "FOREIGN", "FROM", "FULL", "GRANT", "GROUP", "HAVING",
    "IN", "INDEX", "INNER", "INSERT", "INTERSECT", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE",
    "NOT", "NULL", "ON", "OR", "ORDER", "OUTER", "PRIMARY", "REFERENCES", "RIGHT", "SELECT",
    "SET", "TABLE", "THEN", "UNION", "UNIQUE", "UPDATE", "VALUES", "VIEW", "WHEN", "WHERE",
    "WITH",
];

/// Immutable capability and syntax profile of one database product.
///
/// Construction starts from [`DialectDescriptor::new`] (sensible ANSI-ish
/// defaults) and is refined with `with_*` methods, or deserialized from a
/// config document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialectDescriptor {
    name: String,
    #[serde(rename = "identifierQuoteChar")]
    identifier_quote: char,
    /// Stored uppercase; membership checks are case-insensitive.
    #[serde(default)]
    reserved_words: HashSet<String>,
    supports_sequences: bool,
    pagination_style: PaginationStyle,
    placeholder_style: PlaceholderStyle,
    /// 0 means unchecked.
    #[serde(default)]
    max_identifier_length: usize,
}

impl DialectDescriptor {
    /// A descriptor with ANSI defaults: double-quote quoting, `LIMIT/OFFSET`
    /// pagination, `?` placeholders, sequence support, and the shared ANSI
    /// reserved-word list.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier_quote: '"',
            reserved_words: ANSI_RESERVED.iter().map(|w| w.to_string()).collect(),
            supports_sequences: true,
            pagination_style: PaginationStyle::LimitOffset,
            placeholder_style: PlaceholderStyle::QuestionMark,
            max_identifier_length: 128,
        }
    }

    pub fn with_identifier_quote(mut self, quote: char) -> Self {
        self.identifier_quote = quote;
        self
    }

    /// Add reserved words (case-insensitive). Extends the current set.
    pub fn with_reserved_words(mut self, words: &[&str]) -> Self {
        self.reserved_words
            .extend(words.iter().map(|w| w.to_uppercase()));
        self
    }

    pub fn with_sequences(mut self, supported: bool) -> Self {
        self.supports_sequences = supported;
        self
    }

    pub fn with_pagination_style(mut self, style: PaginationStyle) -> Self {
        self.pagination_style = style;
        self
    }

    pub fn with_placeholder_style(mut self, style: PlaceholderStyle) -> Self {
        self.placeholder_style = style;
        self
    }

    /// Maximum identifier length; 0 disables the check.
    pub fn with_max_identifier_length(mut self, max: usize) -> Self {
        self.max_identifier_length = max;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identifier_quote(&self) -> char {
        self.identifier_quote
    }

    pub fn supports_sequences(&self) -> bool {
        self.supports_sequences
    }

    pub fn pagination_style(&self) -> PaginationStyle {
        self.pagination_style
    }

    pub fn placeholder_style(&self) -> PlaceholderStyle {
        self.placeholder_style
    }

    pub fn max_identifier_length(&self) -> usize {
        self.max_identifier_length
    }

    pub fn is_reserved(&self, ident: &str) -> bool {
        self.reserved_words.contains(&ident.to_uppercase())
    }

    /// Render the `n`-th (1-based) positional placeholder.
    pub fn placeholder(&self, n: usize) -> String {
        match self.placeholder_style {
            PlaceholderStyle::Numbered => format!("${n}"),
            PlaceholderStyle::QuestionMark => "?".to_string(),
        }
    }

    /// Render a single identifier: bare when it is shaped like a plain
    /// identifier and not reserved, quoted otherwise.
    pub fn quote(&self, ident: &str) -> GraftResult<String> {
        let mut out = String::with_capacity(ident.len() + 2);
        self.write_ident(ident, &mut out)?;
        Ok(out)
    }

    pub(crate) fn write_ident(&self, ident: &str, out: &mut String) -> GraftResult<()> {
        self.check_length(ident)?;
        if is_bare_identifier(ident) && !self.is_reserved(ident) {
            out.push_str(ident);
        } else {
            self.write_quoted(ident, out);
        }
        Ok(())
    }

    /// Always-quoted rendering with embedded quote chars doubled.
    pub(crate) fn write_quoted(&self, ident: &str, out: &mut String) {
        out.push(self.identifier_quote);
        for ch in ident.chars() {
            if ch == self.identifier_quote {
                out.push(ch);
            }
            out.push(ch);
        }
        out.push(self.identifier_quote);
    }

    pub(crate) fn check_length(&self, ident: &str) -> GraftResult<()> {
        if ident.is_empty() {
            return Err(GraftError::render("empty identifier"));
        }
        let max = self.max_identifier_length;
        if max > 0 && ident.chars().count() > max {
            return Err(GraftError::render(format!(
                "identifier '{ident}' exceeds {max} characters for dialect '{}'",
                self.name
            )));
        }
        Ok(())
    }

    /// PostgreSQL: `"` quoting, `$N` placeholders, LIMIT/OFFSET, sequences.
    pub fn postgres() -> Self {
        Self::new("postgres")
            .with_placeholder_style(PlaceholderStyle::Numbered)
            .with_max_identifier_length(63)
            .with_reserved_words(&["LIMIT", "OFFSET", "RETURNING", "USER", "CAST", "ARRAY"])
    }

    /// MySQL: backtick quoting, `?` placeholders, LIMIT/OFFSET, no
    /// standalone sequences.
    pub fn mysql() -> Self {
        Self::new("mysql")
            .with_identifier_quote('`')
            .with_sequences(false)
            .with_max_identifier_length(64)
            .with_reserved_words(&["LIMIT", "OFFSET", "DATABASE", "SCHEMA", "INTERVAL"])
    }

    /// Oracle-style: `"` quoting, `?` placeholders, ROWNUM subquery
    /// pagination, 30-character identifiers.
    pub fn oracle() -> Self {
        Self::new("oracle")
            .with_pagination_style(PaginationStyle::RowNumSubquery)
            .with_max_identifier_length(30)
            .with_reserved_words(&["ROWNUM", "LEVEL", "SYSDATE", "CONNECT", "START", "MINUS"])
    }

    /// Apache Derby: `"` quoting, `?` placeholders, FETCH FIRST pagination.
    pub fn derby() -> Self {
        Self::new("derby")
            .with_pagination_style(PaginationStyle::FetchFirst)
            .with_reserved_words(&["OFFSET", "ROWS", "ONLY", "NEXT", "FIRST"])
    }

    /// SAP HANA: `"` quoting, `?` placeholders, LIMIT/OFFSET, sequences.
    pub fn hana() -> Self {
        Self::new("hana")
            .with_max_identifier_length(127)
            .with_reserved_words(&["LIMIT", "OFFSET", "TOP", "CONNECT"])
    }
}

/// True when `s` matches `[A-Za-z_][A-Za-z0-9_$]*` and can render without
/// quoting (reserved words aside).
pub fn is_bare_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
}

/// Lookup table from dialect name to shared descriptor.
///
/// Populated once at startup (`register` takes `&mut self`), then handed
/// around behind an `Arc` for lock-free concurrent reads.
#[derive(Debug, Default)]
pub struct DialectRegistry {
    dialects: HashMap<String, Arc<DialectDescriptor>>,
}

impl DialectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in descriptors.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(DialectDescriptor::postgres());
        registry.register(DialectDescriptor::mysql());
        registry.register(DialectDescriptor::oracle());
        registry.register(DialectDescriptor::derby());
        registry.register(DialectDescriptor::hana());
        registry
    }

    /// Register a descriptor under its own name, replacing any previous
    /// entry. Returns the shared handle.
    pub fn register(&mut self, descriptor: DialectDescriptor) -> Arc<DialectDescriptor> {
        let shared = Arc::new(descriptor);
        self.dialects
            .insert(shared.name().to_string(), Arc::clone(&shared));
        shared
    }

    pub fn get(&self, name: &str) -> GraftResult<Arc<DialectDescriptor>> {
        self.dialects
            .get(name)
            .cloned()
            .ok_or_else(|| GraftError::UnknownDialect(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dialects.contains_key(name)
    }

    /// Registered names, sorted for stable output.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dialects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_identifiers_stay_bare() {
        let d = DialectDescriptor::postgres();
        assert_eq!(d.quote("CUSTOMERS").unwrap(), "CUSTOMERS");
        assert_eq!(d.quote("order_items").unwrap(), "order_items");
    }

    #[test]
    fn reserved_words_get_quoted() {
        let d = DialectDescriptor::postgres();
        assert_eq!(d.quote("ORDER").unwrap(), "\"ORDER\"");
        assert_eq!(d.quote("select").unwrap(), "\"select\"");
        assert_eq!(d.quote("LIMIT").unwrap(), "\"LIMIT\"");
    }

    #[test]
    fn exotic_names_get_quoted() {
        let d = DialectDescriptor::postgres();
        assert_eq!(d.quote("my table").unwrap(), "\"my table\"");
        assert_eq!(d.quote("1starts_with_digit").unwrap(), "\"1starts_with_digit\"");
    }

    #[test]
    fn quote_char_is_doubled_when_embedded() {
        let d = DialectDescriptor::postgres();
        assert_eq!(d.quote("we\"ird").unwrap(), "\"we\"\"ird\"");
        let m = DialectDescriptor::mysql();
        assert_eq!(m.quote("back`tick").unwrap(), "`back``tick`");
    }

    #[test]
    fn mysql_uses_backticks_for_reserved() {
        let d = DialectDescriptor::mysql();
        assert_eq!(d.quote("ORDER").unwrap(), "`ORDER`");
    }

    #[test]
    fn over_long_identifier_fails() {
        let d = DialectDescriptor::oracle();
        let long = "A".repeat(31);
        let err = d.quote(&long).unwrap_err();
        assert!(err.is_internal());
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn placeholders_follow_style() {
        assert_eq!(DialectDescriptor::postgres().placeholder(3), "$3");
        assert_eq!(DialectDescriptor::mysql().placeholder(3), "?");
    }

    #[test]
    fn registry_builtin_lookup() {
        let registry = DialectRegistry::with_builtins();
        assert!(registry.contains("postgres"));
        let oracle = registry.get("oracle").unwrap();
        assert_eq!(oracle.pagination_style(), PaginationStyle::RowNumSubquery);
        assert_eq!(
            registry.names(),
            vec!["derby", "hana", "mysql", "oracle", "postgres"]
        );
    }

    #[test]
    fn registry_unknown_dialect() {
        let registry = DialectRegistry::with_builtins();
        let err = registry.get("sybase").unwrap_err();
        assert!(matches!(err, GraftError::UnknownDialect(name) if name == "sybase"));
    }

    #[test]
    fn descriptor_round_trips_through_json() {
        let d = DialectDescriptor::postgres();
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("identifierQuoteChar"));
        let back: DialectDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name(), "postgres");
        assert_eq!(back.placeholder_style(), PlaceholderStyle::Numbered);
        assert!(back.is_reserved("order"));
    }
}
