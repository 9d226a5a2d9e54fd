use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use webx_core::{PortalId, RouteValues, RoutingError};

/// The route-mapping surface handed to every mapper.
pub trait MapRoute {
    /// Maps a route for every active portal.
    fn map_http_route_with_defaults(
        &mut self,
        module_folder: &str,
        route_fragment: &str,
        url: &str,
        defaults: Option<RouteValues>,
        namespaces: &[&str],
    ) -> Result<Vec<String>, RoutingError>;

    /// Maps a route for a single portal.
    fn map_http_route_in_portal(
        &mut self,
        portal_id: PortalId,
        module_folder: &str,
        route_fragment: &str,
        url: &str,
        defaults: Option<RouteValues>,
        namespaces: &[&str],
    ) -> Result<Vec<String>, RoutingError>;

    fn map_http_route(
        &mut self,
        module_folder: &str,
        route_fragment: &str,
        url: &str,
        namespaces: &[&str],
    ) -> Result<Vec<String>, RoutingError> {
        self.map_http_route_with_defaults(module_folder, route_fragment, url, None, namespaces)
    }
}

/// A plugin that registers one or more service routes.
pub trait ServiceRouteMapper: Send {
    fn register_routes(&self, routes: &mut dyn MapRoute) -> Result<(), MapperError>;
}

#[derive(Debug, Error)]
pub enum MapperError {
    #[error("{0}")]
    Failed(String),
    #[error(transparent)]
    Routing(#[from] RoutingError),
    #[error("panicked: {0}")]
    Panicked(String),
    #[error("did not finish within {0:?}")]
    TimedOut(Duration),
}

impl MapperError {
    pub fn failed(reason: impl Into<String>) -> Self {
        MapperError::Failed(reason.into())
    }
}

pub type MapperFactory =
    Arc<dyn Fn() -> Result<Box<dyn ServiceRouteMapper>, MapperError> + Send + Sync>;

/// A registered mapper type.
#[derive(Clone)]
pub struct MapperDescriptor {
    pub name: String,
    pub public: bool,
    pub is_abstract: bool,
    pub factory: MapperFactory,
}

impl std::fmt::Debug for MapperDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperDescriptor")
            .field("name", &self.name)
            .field("public", &self.public)
            .field("is_abstract", &self.is_abstract)
            .finish()
    }
}

impl MapperDescriptor {
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn ServiceRouteMapper>, MapperError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            public: true,
            is_abstract: false,
            factory: Arc::new(factory),
        }
    }

    pub fn of<M>(name: impl Into<String>) -> Self
    where
        M: ServiceRouteMapper + Default + 'static,
    {
        Self::new(name, || Ok(Box::new(M::default()) as Box<dyn ServiceRouteMapper>))
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Only public, concrete mappers take part in a registration pass.
    pub fn is_valid_service_route_mapper(&self) -> bool {
        self.public && !self.is_abstract
    }
}

/// Explicit registry of mapper types, filled by each plugin module at startup.
#[derive(Debug, Clone, Default)]
pub struct MapperRegistry {
    descriptors: Vec<MapperDescriptor>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: MapperDescriptor) -> &mut Self {
        tracing::debug!("MapperRegistry: registered {}", descriptor.name);
        self.descriptors.push(descriptor);
        self
    }

    pub fn register_type<M>(&mut self, name: impl Into<String>) -> &mut Self
    where
        M: ServiceRouteMapper + Default + 'static,
    {
        self.register(MapperDescriptor::of::<M>(name))
    }

    pub fn register_type_with<M, F>(&mut self, name: impl Into<String>, ctor: F) -> &mut Self
    where
        M: ServiceRouteMapper + 'static,
        F: Fn() -> M + Send + Sync + 'static,
    {
        self.register(MapperDescriptor::new(name, move || {
            Ok(Box::new(ctor()) as Box<dyn ServiceRouteMapper>)
        }))
    }

    /// Adds every descriptor a plugin module exports.
    pub fn register_module<I>(&mut self, module: &str, descriptors: I) -> &mut Self
    where
        I: IntoIterator<Item = MapperDescriptor>,
    {
        let before = self.descriptors.len();
        self.descriptors.extend(descriptors);
        tracing::debug!(
            "MapperRegistry: module {} exported {} mapper(s)",
            module,
            self.descriptors.len() - before
        );
        self
    }

    /// Mappers eligible for registration, in registration order.
    pub fn discover(&self) -> impl Iterator<Item = &MapperDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| d.is_valid_service_route_mapper())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
