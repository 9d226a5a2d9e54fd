pub mod manager;
pub mod mapper;
pub mod naming;
pub mod pass;

pub use manager::{RouteStage, ServicesRoutingManager};
pub use mapper::{
    MapRoute, MapperDescriptor, MapperError, MapperFactory, MapperRegistry, ServiceRouteMapper,
};
pub use naming::RouteLayout;
pub use pass::{MapperOutcome, MapperReport, RegistrationReport};
