pub mod catalog;

pub use catalog::{
    add_web_api_controllers, ControllerCatalog, ControllerDescriptor, ServiceCollection,
    ServiceLifetime, ServiceRegistry,
};
