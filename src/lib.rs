pub use webx_controllers;
pub use webx_core;
pub use webx_installer;
pub use webx_routing;

pub mod startup;

pub use startup::{Startup, StartupBuilder};
