use webx::StartupBuilder;
use webx_core::{RouteCollection, RoutingConfig};
use webx_installer::{InstallLogger, LogTable, TypeNameLocalizer};
use webx_routing::{MapRoute, MapperDescriptor, MapperError, ServiceRouteMapper};

#[derive(Default)]
struct JournalRouteMapper;

impl ServiceRouteMapper for JournalRouteMapper {
    fn register_routes(&self, routes: &mut dyn MapRoute) -> Result<(), MapperError> {
        routes.map_http_route(
            "Journal",
            "default",
            "{controller}/{action}",
            &["Journal.Services"],
        )?;
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Optional TOML config path; defaults to a single portal.
    let config = match std::env::args().nth(1) {
        Some(path) => RoutingConfig::load(path)?,
        None => RoutingConfig::from_toml_str("[[portals]]\nid = 0\naliases = [\"localhost\"]\n")?,
    };

    let mut log = InstallLogger::new();
    log.start_job("Registering service routes");

    let startup = StartupBuilder::new()
        .with_config(config)
        .mapper(MapperDescriptor::of::<JournalRouteMapper>("JournalRouteMapper"))
        .start();

    for failure in startup.report.failures() {
        log.add_failure(format!("{}: {:?}", failure.name, failure.outcome));
    }
    log.add_info(format!("{} route(s) registered", startup.routes.len()));
    log.end_job("Registering service routes");

    println!("{}", startup.routes.to_json()?);
    println!("{}", LogTable::new().render(log.entries(), &TypeNameLocalizer));
    println!("{}", serde_json::to_string_pretty(&log.report())?);

    Ok(())
}
