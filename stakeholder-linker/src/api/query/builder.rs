//! Fluent builder for OData retrieve-multiple options

use super::filters::Filter;

/// Query options for a single retrieve-multiple call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub entity: String,
    pub select: Vec<String>,
    pub filter: Option<Filter>,
    pub top: Option<u32>,
}

impl Query {
    /// Individual `key=value` pairs, values percent-encoded
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(filter) = &self.filter {
            params.push(("$filter".to_string(), filter.to_odata()));
        }
        if !self.select.is_empty() {
            params.push(("$select".to_string(), self.select.join(",")));
        }
        if let Some(top) = self.top {
            params.push(("$top".to_string(), top.to_string()));
        }

        params
            .into_iter()
            .map(|(k, v)| (k, urlencoding::encode(&v).into_owned()))
            .collect()
    }

    /// The `?$filter=...&$select=...` options string
    pub fn to_options(&self) -> String {
        let params = self.to_query_params();
        if params.is_empty() {
            return String::new();
        }
        let joined: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        format!("?{}", joined.join("&"))
    }
}

/// Fluent builder producing a [`Query`]
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            query: Query {
                entity: entity.into(),
                ..Default::default()
            },
        }
    }

    pub fn select(mut self, fields: &[&str]) -> Self {
        self.query.select = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Add a filter; repeated calls are combined with `and`
    pub fn filter(mut self, filter: Filter) -> Self {
        self.query.filter = match self.query.filter.take() {
            None => Some(filter),
            Some(Filter::And(mut existing)) => {
                existing.push(filter);
                Some(Filter::And(existing))
            }
            Some(existing) => Some(Filter::And(vec![existing, filter])),
        };
        self
    }

    pub fn top(mut self, count: u32) -> Self {
        self.query.top = Some(count);
        self
    }

    pub fn build(self) -> Query {
        self.query
    }
}
