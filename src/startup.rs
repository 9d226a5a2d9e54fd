use std::sync::Arc;
use webx_controllers::{
    add_web_api_controllers, ControllerCatalog, ControllerDescriptor, ServiceCollection,
};
use webx_core::{PortalDirectory, RouteTable, RoutingConfig, StaticPortalDirectory};
use webx_routing::{MapperDescriptor, MapperRegistry, RegistrationReport, ServicesRoutingManager};

/// What a host gets back from application startup.
#[derive(Debug)]
pub struct Startup {
    pub routes: RouteTable,
    pub report: RegistrationReport,
    pub services: ServiceCollection,
}

/// Collects plugin exports and runs the startup registrations.
///
/// Plugins register explicitly here; nothing is discovered by scanning.
pub struct StartupBuilder {
    pub config: RoutingConfig,
    pub mappers: MapperRegistry,
    pub controllers: ControllerCatalog,
    portals: Option<Arc<dyn PortalDirectory>>,
}

impl Default for StartupBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StartupBuilder {
    pub fn new() -> Self {
        Self {
            config: RoutingConfig::default(),
            mappers: MapperRegistry::new(),
            controllers: ControllerCatalog::new(),
            portals: None,
        }
    }

    pub fn with_config(mut self, config: RoutingConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the portals declared in the config.
    pub fn with_portals(mut self, portals: Arc<dyn PortalDirectory>) -> Self {
        self.portals = Some(portals);
        self
    }

    pub fn mapper(mut self, descriptor: MapperDescriptor) -> Self {
        self.mappers.register(descriptor);
        self
    }

    pub fn controller(mut self, descriptor: ControllerDescriptor) -> Self {
        self.controllers.export(descriptor);
        self
    }

    pub fn start(self) -> Startup {
        let portals: Arc<dyn PortalDirectory> = match self.portals {
            Some(portals) => portals,
            None => Arc::new(StaticPortalDirectory::from_config(&self.config)),
        };

        let mut services = ServiceCollection::new();
        add_web_api_controllers(&mut services, &self.controllers);

        let mut manager =
            ServicesRoutingManager::with_table(portals).with_config(&self.config);
        let report = manager.register_routes(&self.mappers);
        tracing::info!(
            "Startup: {} controller(s) scoped, {} mapper(s) run",
            services.len(),
            report.mappers.len()
        );

        Startup {
            routes: manager.into_routes(),
            report,
            services,
        }
    }
}
