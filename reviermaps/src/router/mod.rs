//! Request classification for the interception pipeline.
//!
//! Every outbound map request is classified by its path into a resource
//! class, which selects the caching strategy the engine applies. Requests
//! outside the service namespace are not intercepted at all.

use bytes::Bytes;
use std::fmt;

/// HTTP method of an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// An intercepted outbound request.
///
/// `path` is origin-relative and may carry a query string, e.g.
/// `/api/maps/geocode?q=Stuttgart`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Bytes>,
}

impl MapRequest {
    /// A GET request for the given path.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    /// A POST request with a JSON body.
    pub fn post(path: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body.into()),
        }
    }
}

/// Resource classes with distinct caching strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    /// Map tiles, cache-first
    Tile,
    /// Style documents, network-first
    Style,
    /// Route calculations, network-first
    Routing,
    /// Address geocoding, network-first
    Geocoding,
    /// Anything else under the namespace, network-first
    Generic,
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceClass::Tile => "tile",
            ResourceClass::Style => "style",
            ResourceClass::Routing => "routing",
            ResourceClass::Geocoding => "geocoding",
            ResourceClass::Generic => "generic",
        };
        write!(f, "{}", s)
    }
}

/// Classifies intercepted requests by path.
#[derive(Debug, Clone)]
pub struct RequestRouter {
    namespace: String,
}

impl RequestRouter {
    /// Create a router for the given namespace prefix (e.g. `/api/maps`).
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// The namespace prefix this router intercepts.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Classify a request.
    ///
    /// Returns `None` for paths outside the namespace; those must be passed
    /// through untouched. Sub-path precedence mirrors the interception order:
    /// tiles, then routing, then geocoding, then styles, then generic.
    pub fn classify(&self, request: &MapRequest) -> Option<ResourceClass> {
        let path = request.path.as_str();
        let prefix = format!("{}/", self.namespace);
        if !path.starts_with(&prefix) {
            return None;
        }

        let class = if path.contains("/tiles/") {
            ResourceClass::Tile
        } else if path.contains("/route") {
            ResourceClass::Routing
        } else if path.contains("/geocode") {
            ResourceClass::Geocoding
        } else if path.contains("/styles") {
            ResourceClass::Style
        } else {
            ResourceClass::Generic
        };

        Some(class)
    }
}

impl Default for RequestRouter {
    fn default() -> Self {
        Self::new("/api/maps")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_classification() {
        let router = RequestRouter::default();
        let req = MapRequest::get("/api/maps/tiles/streets/14/8606/5626.pbf");
        assert_eq!(router.classify(&req), Some(ResourceClass::Tile));
    }

    #[test]
    fn test_routing_classification() {
        let router = RequestRouter::default();
        let req = MapRequest::post("/api/maps/route", &b"{}"[..]);
        assert_eq!(router.classify(&req), Some(ResourceClass::Routing));

        // Alternatives endpoint is still a routing request
        let req = MapRequest::post("/api/maps/route/alternatives", &b"{}"[..]);
        assert_eq!(router.classify(&req), Some(ResourceClass::Routing));
    }

    #[test]
    fn test_geocoding_classification() {
        let router = RequestRouter::default();
        let req = MapRequest::get("/api/maps/geocode?q=Stuttgart");
        assert_eq!(router.classify(&req), Some(ResourceClass::Geocoding));
    }

    #[test]
    fn test_style_classification() {
        let router = RequestRouter::default();
        let req = MapRequest::get("/api/maps/styles/police-day");
        assert_eq!(router.classify(&req), Some(ResourceClass::Style));
    }

    #[test]
    fn test_generic_classification() {
        let router = RequestRouter::default();
        for path in ["/api/maps/capabilities", "/api/maps/profiles", "/api/maps/nban"] {
            let req = MapRequest::get(path);
            assert_eq!(
                router.classify(&req),
                Some(ResourceClass::Generic),
                "path {path}"
            );
        }
    }

    #[test]
    fn test_outside_namespace_not_intercepted() {
        let router = RequestRouter::default();
        for path in ["/api/stations", "/assets/logo.png", "/api/mapsy/tiles/1/2/3"] {
            let req = MapRequest::get(path);
            assert_eq!(router.classify(&req), None, "path {path}");
        }
    }

    #[test]
    fn test_custom_namespace() {
        let router = RequestRouter::new("/maps");
        let req = MapRequest::get("/maps/tiles/base/1/2/3.pbf");
        assert_eq!(router.classify(&req), Some(ResourceClass::Tile));

        let req = MapRequest::get("/api/maps/tiles/base/1/2/3.pbf");
        assert_eq!(router.classify(&req), None);
    }
}
