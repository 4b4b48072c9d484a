//! Request builder for Graph collection queries.
//!
//! The client core assembles a [`GraphRequest`] (method, path, `OData`
//! parameters, headers, JSON body) and hands it to a
//! [`GraphTransport`](crate::transport::GraphTransport); nothing here knows
//! about the HTTP library underneath.

use serde_json::Value;

/// HTTP method of a Graph request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET.
    Get,
    /// POST.
    Post,
    /// DELETE.
    Delete,
}

impl Method {
    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `OData` query options for a collection request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filter: Option<String>,
    search: Option<String>,
    order_by: Option<String>,
    select: Option<String>,
    expand: Option<String>,
    skip: Option<usize>,
    top: Option<usize>,
}

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `$filter`.
    #[must_use]
    pub fn filter(mut self, expr: impl Into<String>) -> Self {
        self.filter = Some(expr.into());
        self
    }

    /// Sets `$search`; the term is quoted when rendered.
    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Sets `$orderby`.
    #[must_use]
    pub fn order_by(mut self, field: &str, descending: bool) -> Self {
        self.order_by = Some(if descending {
            format!("{field} desc")
        } else {
            field.to_string()
        });
        self
    }

    /// Sets `$select`.
    #[must_use]
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.select = Some(fields.join(","));
        self
    }

    /// Sets `$expand`.
    #[must_use]
    pub fn expand(mut self, expr: impl Into<String>) -> Self {
        self.expand = Some(expr.into());
        self
    }

    /// Sets `$skip`.
    #[must_use]
    pub const fn skip(mut self, n: usize) -> Self {
        self.skip = Some(n);
        self
    }

    /// Sets `$top`.
    #[must_use]
    pub const fn top(mut self, n: usize) -> Self {
        self.top = Some(n);
        self
    }

    /// Renders the query as ordered parameter pairs, omitting unset options.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push((
                "$search".to_string(),
                format!("\"{}\"", search.replace('"', "\\\"")),
            ));
        }
        if let Some(filter) = &self.filter {
            pairs.push(("$filter".to_string(), filter.clone()));
        }
        if let Some(order_by) = &self.order_by {
            pairs.push(("$orderby".to_string(), order_by.clone()));
        }
        if let Some(select) = &self.select {
            pairs.push(("$select".to_string(), select.clone()));
        }
        if let Some(expand) = &self.expand {
            pairs.push(("$expand".to_string(), expand.clone()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("$skip".to_string(), skip.to_string()));
        }
        if let Some(top) = self.top {
            pairs.push(("$top".to_string(), top.to_string()));
        }
        pairs
    }
}

/// A single request against the Graph API.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the API base, starting with `/`.
    pub path: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<Value>,
}

impl GraphRequest {
    /// Creates a request with no parameters or body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Appends the parameters of an `OData` query.
    #[must_use]
    pub fn with_query(mut self, query: &Query) -> Self {
        self.query.extend(query.to_pairs());
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns the value of a query parameter, if present.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Plans the `(skip, top)` pages needed to fetch up to `max_count` items.
///
/// Issues `ceil(max_count / page_size)` pages; the last page's `top` is
/// trimmed so the total never exceeds `max_count`. A zero page size is
/// treated as one.
#[must_use]
pub fn page_plan(max_count: usize, page_size: usize) -> Vec<(usize, usize)> {
    let page_size = page_size.max(1);
    (0..max_count.div_ceil(page_size))
        .map(|index| {
            let skip = index * page_size;
            (skip, page_size.min(max_count - skip))
        })
        .collect()
}

/// Quotes a string as an `OData` literal, doubling embedded single quotes.
#[must_use]
pub fn odata_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
