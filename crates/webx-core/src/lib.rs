pub mod config;
pub mod error;
pub mod portal;
pub mod route;

pub use config::{PortalConfig, RoutingConfig};
pub use error::{ConfigError, RoutingError};
pub use portal::{PortalAlias, PortalDirectory, PortalId, PortalInfo, StaticPortalDirectory};
pub use route::{Route, RouteCollection, RouteTable, RouteValues, NAME_TOKEN, NAMESPACES_TOKEN};
