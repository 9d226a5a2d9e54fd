use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use webx_core::{
    PortalDirectory, PortalId, Route, RouteCollection, RouteTable, RouteValues, RoutingConfig,
    RoutingError,
};

use crate::mapper::MapRoute;
use crate::naming::{legacy_route_name, route_full_name, variant_route_name, RouteLayout};

/// Translates mapper route requests into portal-scoped routing table entries.
///
/// Every request yields one primary route per portal, named
/// `{folder}-{fragment}-{portal_id}`, plus a `-old` alias under the legacy
/// `DesktopModules/...` layout unless both layouts render the same URL.
/// Portals whose aliases sit at several child-path depths get one such pair
/// per depth, deepest first; the shallower pairs carry a `-p{depth}` suffix.
pub struct ServicesRoutingManager<C> {
    routes: C,
    portals: Arc<dyn PortalDirectory>,
    layout: RouteLayout,
    mapper_timeout: Option<Duration>,
}

struct RouteRequest<'a> {
    module_folder: &'a str,
    route_fragment: &'a str,
    url: &'a str,
    defaults: Option<RouteValues>,
    namespaces: Vec<String>,
}

impl<'a> RouteRequest<'a> {
    fn validate(
        module_folder: &'a str,
        route_fragment: &'a str,
        url: &'a str,
        defaults: Option<RouteValues>,
        namespaces: &[&str],
    ) -> Result<Self, RoutingError> {
        if module_folder.is_empty() {
            return Err(RoutingError::invalid("module_folder", "a unique name is required"));
        }

        let namespaces: Vec<String> = namespaces
            .iter()
            .map(|ns| ns.trim())
            .filter(|ns| !ns.is_empty())
            .map(str::to_string)
            .collect();
        if namespaces.is_empty() {
            return Err(RoutingError::invalid(
                "namespaces",
                "at least one non-empty namespace is required",
            ));
        }

        Ok(Self {
            module_folder,
            route_fragment,
            url,
            defaults,
            namespaces,
        })
    }

    fn route(&self, name: String, url: String, portal_id: PortalId) -> Route {
        Route::new(name, url, portal_id)
            .with_defaults(self.defaults.clone().unwrap_or_default())
            .with_namespaces(self.namespaces.clone())
            .with_module_folder(self.module_folder)
    }
}

impl<C: RouteCollection> ServicesRoutingManager<C> {
    pub fn new(routes: C, portals: Arc<dyn PortalDirectory>) -> Self {
        Self {
            routes,
            portals,
            layout: RouteLayout::default(),
            mapper_timeout: None,
        }
    }

    pub fn with_config(mut self, config: &RoutingConfig) -> Self {
        self.layout = RouteLayout::from_config(config);
        self.mapper_timeout = config.mapper_timeout();
        self
    }

    pub fn with_mapper_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.mapper_timeout = timeout;
        self
    }

    pub fn routes(&self) -> &C {
        &self.routes
    }

    pub fn into_routes(self) -> C {
        self.routes
    }

    pub fn mapper_timeout(&self) -> Option<Duration> {
        self.mapper_timeout
    }

    pub(crate) fn routes_mut(&mut self) -> &mut C {
        &mut self.routes
    }

    /// A manager over an empty staging area that sees this table's names.
    pub(crate) fn stage(&self) -> ServicesRoutingManager<RouteStage> {
        ServicesRoutingManager {
            routes: RouteStage::new(self.routes.route_names()),
            portals: Arc::clone(&self.portals),
            layout: self.layout.clone(),
            mapper_timeout: None,
        }
    }

    fn map_for_portals(
        &mut self,
        portal_ids: &[PortalId],
        request: &RouteRequest<'_>,
    ) -> Result<Vec<String>, RoutingError> {
        let mut mapped = Vec::new();

        for &portal_id in portal_ids {
            let primary = route_full_name(request.module_folder, request.route_fragment, portal_id);

            for (variant, depth) in self.portals.prefix_depths(portal_id).into_iter().enumerate() {
                let name = match variant {
                    0 => primary.clone(),
                    _ => variant_route_name(&primary, depth),
                };
                if self.routes.contains_name(&name) {
                    tracing::debug!("ServicesRoutingManager: {} already mapped, skipping", name);
                    continue;
                }

                let url = self.layout.route_url(depth, request.module_folder, request.url);
                let legacy_url = self.layout.legacy_url(depth, request.module_folder, request.url);

                self.routes.push(request.route(name.clone(), url.clone(), portal_id))?;
                tracing::debug!("ServicesRoutingManager: mapped {} -> {}", name, url);
                let legacy_name = legacy_route_name(&name);
                mapped.push(name);

                // Same URL under both layouts: the primary route already covers it.
                if legacy_url == url || self.routes.contains_name(&legacy_name) {
                    continue;
                }
                self.routes
                    .push(request.route(legacy_name.clone(), legacy_url, portal_id))?;
                mapped.push(legacy_name);
            }
        }

        Ok(mapped)
    }
}

impl ServicesRoutingManager<RouteTable> {
    pub fn with_table(portals: Arc<dyn PortalDirectory>) -> Self {
        Self::new(RouteTable::new(), portals)
    }
}

impl<C: RouteCollection> MapRoute for ServicesRoutingManager<C> {
    fn map_http_route_with_defaults(
        &mut self,
        module_folder: &str,
        route_fragment: &str,
        url: &str,
        defaults: Option<RouteValues>,
        namespaces: &[&str],
    ) -> Result<Vec<String>, RoutingError> {
        let request =
            RouteRequest::validate(module_folder, route_fragment, url, defaults, namespaces)?;
        let portal_ids: Vec<PortalId> = self
            .portals
            .portals()
            .into_iter()
            .map(|p| p.portal_id)
            .collect();
        self.map_for_portals(&portal_ids, &request)
    }

    fn map_http_route_in_portal(
        &mut self,
        portal_id: PortalId,
        module_folder: &str,
        route_fragment: &str,
        url: &str,
        defaults: Option<RouteValues>,
        namespaces: &[&str],
    ) -> Result<Vec<String>, RoutingError> {
        let request =
            RouteRequest::validate(module_folder, route_fragment, url, defaults, namespaces)?;
        self.map_for_portals(&[portal_id], &request)
    }
}

/// Routes mapped by one mapper before they are committed to the shared table.
#[derive(Debug, Default)]
pub struct RouteStage {
    existing: HashSet<String>,
    staged: RouteTable,
}

impl RouteStage {
    pub fn new<I: IntoIterator<Item = String>>(existing: I) -> Self {
        Self {
            existing: existing.into_iter().collect(),
            staged: RouteTable::new(),
        }
    }

    pub fn into_routes(self) -> Vec<Route> {
        self.staged.into_routes()
    }
}

impl RouteCollection for RouteStage {
    fn contains_name(&self, name: &str) -> bool {
        self.existing.contains(name) || self.staged.contains_name(name)
    }

    fn route_names(&self) -> Vec<String> {
        self.existing
            .iter()
            .cloned()
            .chain(self.staged.route_names())
            .collect()
    }

    fn push(&mut self, route: Route) -> Result<(), RoutingError> {
        if let Some(name) = route.name() {
            if self.existing.contains(name) {
                return Err(RoutingError::DuplicateRoute(name.to_string()));
            }
        }
        self.staged.push(route)
    }

    fn len(&self) -> usize {
        self.staged.len()
    }
}
