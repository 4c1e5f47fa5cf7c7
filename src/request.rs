//! The in-process request boundary.
//!
//! [`Request`] stands in for the framework adapter's request object: one
//! tree of already-parsed data per [`Location`], readable by selection and
//! writable in place by sanitization. Finished chain contexts attach to
//! the request so results can be aggregated later without threading them
//! through every call site.

use std::fmt::{self, Display};

use serde_json::{Map, Value};

use crate::context::Context;

/// One of the fixed top-level request sub-trees.
///
/// `Headers` is addressed case-insensitively; all other locations are
/// case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// The parsed request body.
    Body,
    /// Query-string parameters.
    Query,
    /// Route/path parameters.
    Params,
    /// Request headers (case-insensitive addressing, lower-cased keys).
    Headers,
    /// Request cookies.
    Cookies,
}

impl Location {
    /// Every location, in canonical order.
    pub const ALL: [Location; 5] = [
        Location::Body,
        Location::Query,
        Location::Params,
        Location::Headers,
        Location::Cookies,
    ];

    /// Returns the location's canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Body => "body",
            Location::Query => "query",
            Location::Params => "params",
            Location::Headers => "headers",
            Location::Cookies => "cookies",
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An in-process request: five location trees plus the contexts of every
/// chain that has run against it.
///
/// Locations default to empty objects, matching what web frameworks hand
/// over for requests with no data in a given location.
///
/// # Example
///
/// ```rust
/// use dragnet::{Location, Request};
/// use serde_json::json;
///
/// let req = Request::new().with_body(json!({ "name": "Alice" }));
/// assert_eq!(req.location(Location::Body)["name"], json!("Alice"));
/// ```
#[derive(Debug)]
pub struct Request {
    body: Value,
    query: Value,
    params: Value,
    headers: Value,
    cookies: Value,
    contexts: Vec<Context>,
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Creates a request with every location set to an empty object.
    pub fn new() -> Self {
        Self {
            body: Value::Object(Map::new()),
            query: Value::Object(Map::new()),
            params: Value::Object(Map::new()),
            headers: Value::Object(Map::new()),
            cookies: Value::Object(Map::new()),
            contexts: Vec::new(),
        }
    }

    /// Replaces the body tree.
    pub fn with_body(mut self, value: Value) -> Self {
        self.body = value;
        self
    }

    /// Replaces the query tree.
    pub fn with_query(mut self, value: Value) -> Self {
        self.query = value;
        self
    }

    /// Replaces the params tree.
    pub fn with_params(mut self, value: Value) -> Self {
        self.params = value;
        self
    }

    /// Replaces the headers tree, lower-casing top-level keys the way
    /// HTTP frameworks normalize incoming headers.
    pub fn with_headers(mut self, value: Value) -> Self {
        self.headers = match value {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k.to_lowercase(), v))
                    .collect(),
            ),
            other => other,
        };
        self
    }

    /// Replaces the cookies tree.
    pub fn with_cookies(mut self, value: Value) -> Self {
        self.cookies = value;
        self
    }

    /// Returns the tree for a location.
    pub fn location(&self, location: Location) -> &Value {
        match location {
            Location::Body => &self.body,
            Location::Query => &self.query,
            Location::Params => &self.params,
            Location::Headers => &self.headers,
            Location::Cookies => &self.cookies,
        }
    }

    /// Returns the tree for a location, mutably.
    pub fn location_mut(&mut self, location: Location) -> &mut Value {
        match location {
            Location::Body => &mut self.body,
            Location::Query => &mut self.query,
            Location::Params => &mut self.params,
            Location::Headers => &mut self.headers,
            Location::Cookies => &mut self.cookies,
        }
    }

    /// Returns the finished contexts of every chain run against this
    /// request, in run order.
    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    /// Attaches a finished context.
    pub(crate) fn push_context(&mut self, context: Context) {
        self.contexts.push(context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_request_has_empty_object_locations() {
        let req = Request::new();
        for location in Location::ALL {
            assert_eq!(req.location(location), &json!({}));
        }
    }

    #[test]
    fn test_location_accessors() {
        let req = Request::new()
            .with_body(json!({ "a": 1 }))
            .with_query(json!({ "b": 2 }));
        assert_eq!(req.location(Location::Body), &json!({ "a": 1 }));
        assert_eq!(req.location(Location::Query), &json!({ "b": 2 }));
        assert_eq!(req.location(Location::Params), &json!({}));
    }

    #[test]
    fn test_headers_are_lowercased() {
        let req = Request::new().with_headers(json!({ "X-Api-Key": "secret" }));
        assert_eq!(
            req.location(Location::Headers),
            &json!({ "x-api-key": "secret" })
        );
    }

    #[test]
    fn test_location_mut_writes_through() {
        let mut req = Request::new();
        *req.location_mut(Location::Body) = json!({ "x": true });
        assert_eq!(req.location(Location::Body), &json!({ "x": true }));
    }

    #[test]
    fn test_location_display() {
        assert_eq!(Location::Body.to_string(), "body");
        assert_eq!(Location::Headers.to_string(), "headers");
    }
}
