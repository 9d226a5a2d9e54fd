use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::ops::Index;

use crate::error::RoutingError;
use crate::portal::PortalId;

/// Default route parameter values, e.g. `action -> "Get"`.
pub type RouteValues = BTreeMap<String, String>;

pub const NAME_TOKEN: &str = "Name";
pub const NAMESPACES_TOKEN: &str = "Namespaces";

/// A single entry of the routing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub url: String,
    pub defaults: RouteValues,
    pub namespaces: Vec<String>,
    pub data_tokens: BTreeMap<String, String>,
    pub portal_id: PortalId,
    pub module_folder: String,
}

impl Route {
    pub fn new(name: impl Into<String>, url: impl Into<String>, portal_id: PortalId) -> Self {
        let mut data_tokens = BTreeMap::new();
        data_tokens.insert(NAME_TOKEN.to_string(), name.into());
        Self {
            url: url.into(),
            defaults: RouteValues::new(),
            namespaces: Vec::new(),
            data_tokens,
            portal_id,
            module_folder: String::new(),
        }
    }

    pub fn with_defaults(mut self, defaults: RouteValues) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_namespaces(mut self, namespaces: Vec<String>) -> Self {
        self.data_tokens
            .insert(NAMESPACES_TOKEN.to_string(), namespaces.join(","));
        self.namespaces = namespaces;
        self
    }

    pub fn with_module_folder(mut self, folder: impl Into<String>) -> Self {
        self.module_folder = folder.into();
        self
    }

    /// The `Name` data token.
    pub fn name(&self) -> Option<&str> {
        self.data_tokens.get(NAME_TOKEN).map(String::as_str)
    }
}

/// The framework-owned, insert-only route sequence.
pub trait RouteCollection {
    fn contains_name(&self, name: &str) -> bool;

    fn route_names(&self) -> Vec<String>;

    /// Appends a route. Fails if a route with the same name exists.
    fn push(&mut self, route: Route) -> Result<(), RoutingError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered route table with a name index.
#[derive(Debug, Default, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    by_name: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_name(&self, name: &str) -> Option<&Route> {
        self.by_name.get(name).map(|&idx| &self.routes[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.routes.iter().filter_map(Route::name).collect()
    }

    pub fn into_routes(self) -> Vec<Route> {
        self.routes
    }

    pub fn to_json(&self) -> Result<String, RoutingError> {
        Ok(serde_json::to_string_pretty(&self.routes)?)
    }
}

impl RouteCollection for RouteTable {
    fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    fn route_names(&self) -> Vec<String> {
        self.names().into_iter().map(str::to_string).collect()
    }

    fn push(&mut self, route: Route) -> Result<(), RoutingError> {
        if let Some(name) = route.name() {
            if self.by_name.contains_key(name) {
                return Err(RoutingError::DuplicateRoute(name.to_string()));
            }
            self.by_name.insert(name.to_string(), self.routes.len());
        }
        self.routes.push(route);
        Ok(())
    }

    fn len(&self) -> usize {
        self.routes.len()
    }
}

impl Index<usize> for RouteTable {
    type Output = Route;

    fn index(&self, index: usize) -> &Route {
        &self.routes[index]
    }
}
