/// How long a resolved service instance lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceLifetime {
    /// One instance per request scope.
    Scoped,
}

/// A type a plugin module exports to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerDescriptor {
    pub type_name: String,
    /// Implements the web-API controller capability.
    pub is_controller: bool,
    pub is_abstract: bool,
}

impl ControllerDescriptor {
    pub fn controller(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            is_controller: true,
            is_abstract: false,
        }
    }

    pub fn other(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            is_controller: false,
            is_abstract: false,
        }
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    fn is_registrable(&self) -> bool {
        self.is_controller && !self.is_abstract
    }
}

/// Explicit list of exported types, filled by plugin modules at startup.
#[derive(Debug, Clone, Default)]
pub struct ControllerCatalog {
    types: Vec<ControllerDescriptor>,
}

impl ControllerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn export(&mut self, descriptor: ControllerDescriptor) -> &mut Self {
        self.types.push(descriptor);
        self
    }

    pub fn controllers(&self) -> impl Iterator<Item = &ControllerDescriptor> {
        self.types.iter().filter(|d| d.is_registrable())
    }
}

/// Registration seam of the external dependency-injection container.
pub trait ServiceRegistry {
    fn add(&mut self, type_name: &str, lifetime: ServiceLifetime);
}

/// Records registrations in order; used where no container is attached.
#[derive(Debug, Clone, Default)]
pub struct ServiceCollection {
    services: Vec<(String, ServiceLifetime)>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifetime_of(&self, type_name: &str) -> Option<ServiceLifetime> {
        self.services
            .iter()
            .find(|(name, _)| name == type_name)
            .map(|(_, lifetime)| *lifetime)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl ServiceRegistry for ServiceCollection {
    fn add(&mut self, type_name: &str, lifetime: ServiceLifetime) {
        self.services.push((type_name.to_string(), lifetime));
    }
}

/// Registers every concrete web-API controller as a scoped service.
pub fn add_web_api_controllers<R: ServiceRegistry + ?Sized>(
    services: &mut R,
    catalog: &ControllerCatalog,
) -> usize {
    let mut added = 0;
    for controller in catalog.controllers() {
        services.add(&controller.type_name, ServiceLifetime::Scoped);
        added += 1;
    }
    tracing::debug!("add_web_api_controllers: {} controller(s) registered", added);
    added
}
