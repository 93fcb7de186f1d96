//! OData $filter expressions

use std::fmt;

/// Value on the right-hand side of a filter comparison
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    /// GUIDs are emitted bare, OData v4 does not quote them
    Guid(String),
    Integer(i64),
    Boolean(bool),
    Null,
}

impl FilterValue {
    fn to_odata(&self) -> String {
        match self {
            Self::String(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Guid(g) => g.trim_matches(|c| c == '{' || c == '}').to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Null => "null".to_string(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// A $filter expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, FilterValue),
    Ne(String, FilterValue),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    pub fn ne(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Ne(field.into(), value.into())
    }

    /// Compare a lookup's `_<name>_value` column against a record id
    pub fn lookup_eq(field: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Eq(field.into(), FilterValue::Guid(id.into()))
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Self::And(filters)
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Self::Or(filters)
    }

    /// Render as the raw (unencoded) OData expression
    pub fn to_odata(&self) -> String {
        match self {
            Self::Eq(field, value) => format!("{} eq {}", field, value.to_odata()),
            Self::Ne(field, value) => format!("{} ne {}", field, value.to_odata()),
            Self::And(filters) => join_group(filters, " and "),
            Self::Or(filters) => join_group(filters, " or "),
        }
    }
}

fn join_group(filters: &[Filter], separator: &str) -> String {
    let parts: Vec<String> = filters
        .iter()
        .map(|f| match f {
            Filter::And(_) | Filter::Or(_) => format!("({})", f.to_odata()),
            _ => f.to_odata(),
        })
        .collect();
    parts.join(separator)
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_odata())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_equality_is_quoted() {
        let filter = Filter::eq("schemaname", "crff8_AssociateFlow");
        assert_eq!(filter.to_odata(), "schemaname eq 'crff8_AssociateFlow'");
    }

    #[test]
    fn test_single_quotes_are_doubled() {
        let filter = Filter::eq("name", "O'Brien");
        assert_eq!(filter.to_odata(), "name eq 'O''Brien'");
    }

    #[test]
    fn test_lookup_guid_is_bare() {
        let filter = Filter::lookup_eq(
            "_environmentvariabledefinitionid_value",
            "{6f1c5a1e-0000-0000-0000-000000000001}",
        );
        assert_eq!(
            filter.to_odata(),
            "_environmentvariabledefinitionid_value eq 6f1c5a1e-0000-0000-0000-000000000001"
        );
    }

    #[test]
    fn test_nested_groups_are_parenthesised() {
        let filter = Filter::and(vec![
            Filter::eq("statecode", 0i64),
            Filter::or(vec![Filter::eq("a", true), Filter::ne("b", FilterValue::Null)]),
        ]);
        assert_eq!(filter.to_odata(), "statecode eq 0 and (a eq true or b ne null)");
    }
}
