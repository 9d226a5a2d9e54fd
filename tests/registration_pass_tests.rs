//! # Registration Pass Tests: register_routes
//!
//! Validates that every discovered mapper runs once, that creation and
//! registration failures stay isolated, and that the per-mapper deadline
//! discards overrunning mappers without stalling the pass.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use webx_core::{RouteCollection, RouteTable, StaticPortalDirectory};
use webx_routing::{
    MapRoute, MapperDescriptor, MapperError, MapperOutcome, MapperRegistry, ServiceRouteMapper,
    ServicesRoutingManager,
};

/// Counts completed registration calls and maps one route.
struct CountingMapper {
    calls: Arc<AtomicUsize>,
    folder: &'static str,
}

impl ServiceRouteMapper for CountingMapper {
    fn register_routes(&self, routes: &mut dyn MapRoute) -> Result<(), MapperError> {
        routes.map_http_route(self.folder, "default", "{controller}/{action}", &["Fake.Api"])?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Maps a route, then fails.
struct ExceptionOnRegisterMapper;

impl ServiceRouteMapper for ExceptionOnRegisterMapper {
    fn register_routes(&self, routes: &mut dyn MapRoute) -> Result<(), MapperError> {
        routes.map_http_route("halfway", "default", "url", &["Half.Api"])?;
        Err(MapperError::failed("registration blew up"))
    }
}

struct PanicOnRegisterMapper;

impl ServiceRouteMapper for PanicOnRegisterMapper {
    fn register_routes(&self, routes: &mut dyn MapRoute) -> Result<(), MapperError> {
        routes.map_http_route("panicky", "default", "url", &["Panic.Api"])?;
        panic!("mapper bug");
    }
}

struct SlowMapper;

impl ServiceRouteMapper for SlowMapper {
    fn register_routes(&self, routes: &mut dyn MapRoute) -> Result<(), MapperError> {
        std::thread::sleep(Duration::from_millis(500));
        routes.map_http_route("slow", "default", "url", &["Slow.Api"])?;
        Ok(())
    }
}

/// Registers cleanly, then panics when dropped.
struct PanicOnDropMapper;

impl ServiceRouteMapper for PanicOnDropMapper {
    fn register_routes(&self, routes: &mut dyn MapRoute) -> Result<(), MapperError> {
        routes.map_http_route("dropped", "default", "url", &["Drop.Api"])?;
        Ok(())
    }
}

impl Drop for PanicOnDropMapper {
    fn drop(&mut self) {
        panic!("teardown bug");
    }
}

fn counting(name: &str, calls: &Arc<AtomicUsize>, folder: &'static str) -> MapperDescriptor {
    let calls = Arc::clone(calls);
    MapperDescriptor::new(name, move || {
        Ok(Box::new(CountingMapper {
            calls: Arc::clone(&calls),
            folder,
        }) as Box<dyn ServiceRouteMapper>)
    })
}

fn exception_on_create(name: &str) -> MapperDescriptor {
    MapperDescriptor::new(name, || Err(MapperError::failed("constructor failed")))
}

fn manager() -> ServicesRoutingManager<RouteTable> {
    let portals = StaticPortalDirectory::new().with_portal(0, ["www.foo.com"]);
    ServicesRoutingManager::with_table(Arc::new(portals))
}

/// A single well-behaved mapper is invoked exactly once.
#[test]
fn test_register_routes_is_called_on_service_route_mappers() {
    let t = Instant::now();

    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = MapperRegistry::new();
    registry.register(counting("FakeServiceRouteMapper", &calls, "fake"));

    let mut srm = manager();
    let report = srm.register_routes(&registry);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(report.is_clean());
    assert_eq!(report.routes_added(), 2);
    assert!(srm.routes().by_name("fake-default-0").is_some());

    let overhead = t.elapsed();
    println!(
        "test_register_routes_is_called_on_service_route_mappers: Testing Overhead = {:?}",
        overhead
    );
}

/// Creation and registration failures do not stop the well-behaved mapper.
#[test]
fn test_register_routes_is_called_on_all_mappers_even_when_some_fail() {
    let t = Instant::now();

    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = MapperRegistry::new();
    registry
        .register_type_with("ExceptionOnRegisterServiceRouteMapper", || ExceptionOnRegisterMapper)
        .register(exception_on_create("ExceptionOnCreateInstanceServiceRouteMapper"))
        .register(counting("FakeServiceRouteMapper", &calls, "fake"));

    let mut srm = manager();
    let report = srm.register_routes(&registry);

    assert_eq!(calls.load(Ordering::SeqCst), 1, "Exactly one registration call should complete");
    assert_eq!(report.mappers.len(), 3);
    assert_eq!(report.succeeded(), 1);

    let on_create = report.get("ExceptionOnCreateInstanceServiceRouteMapper").unwrap();
    assert!(!on_create.instantiated);
    assert!(matches!(on_create.outcome, MapperOutcome::InstantiationFailed(_)));

    let on_register = report.get("ExceptionOnRegisterServiceRouteMapper").unwrap();
    assert!(on_register.instantiated);
    assert!(matches!(on_register.outcome, MapperOutcome::RegistrationFailed(_)));

    // Routes mapped before the failure stay; there is no rollback.
    assert_eq!(on_register.routes_added, 2);
    assert!(srm.routes().by_name("halfway-default-0").is_some());

    let overhead = t.elapsed();
    println!(
        "test_register_routes_is_called_on_all_mappers_even_when_some_fail: Testing Overhead = {:?}",
        overhead
    );
}

/// A panicking mapper is reported and contributes no routes.
#[test]
fn test_panicking_mapper_is_isolated() {
    let t = Instant::now();

    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = MapperRegistry::new();
    registry
        .register_type_with("PanicOnRegister", || PanicOnRegisterMapper)
        .register(MapperDescriptor::new("PanicOnCreate", || panic!("constructor bug")))
        .register(counting("Fake", &calls, "fake"));

    let mut srm = manager();
    let report = srm.register_routes(&registry);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(srm.routes().by_name("panicky-default-0").is_none());
    assert_eq!(report.get("PanicOnRegister").map(|m| m.routes_added), Some(0));
    assert!(matches!(
        report.get("PanicOnCreate").map(|m| &m.outcome),
        Some(MapperOutcome::InstantiationFailed(MapperError::Panicked(_)))
    ));

    let overhead = t.elapsed();
    println!("test_panicking_mapper_is_isolated: Testing Overhead = {:?}", overhead);
}

/// Private and abstract mappers are never instantiated.
#[test]
fn test_only_public_concrete_mappers_run() {
    let t = Instant::now();

    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = MapperRegistry::new();
    registry
        .register(counting("Hidden", &calls, "hidden").private())
        .register(counting("Base", &calls, "base").abstract_type())
        .register(counting("Fake", &calls, "fake"));

    let mut srm = manager();
    let report = srm.register_routes(&registry);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(report.mappers.len(), 1);

    let overhead = t.elapsed();
    println!("test_only_public_concrete_mappers_run: Testing Overhead = {:?}", overhead);
}

/// Two mappers claiming the same route: the second commit is a no-op.
#[test]
fn test_overlapping_mappers_do_not_duplicate_routes() {
    let t = Instant::now();

    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = MapperRegistry::new();
    registry
        .register(counting("First", &calls, "shared"))
        .register(counting("Second", &calls, "shared"));

    let mut srm = manager();
    let report = srm.register_routes(&registry);

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(srm.routes().len(), 2);
    assert_eq!(report.get("Second").map(|m| m.routes_added), Some(0));

    let overhead = t.elapsed();
    println!("test_overlapping_mappers_do_not_duplicate_routes: Testing Overhead = {:?}", overhead);
}

/// With a deadline, an overrunning mapper is dropped and the pass moves on.
#[test]
fn test_mapper_deadline_discards_slow_mapper() {
    let t = Instant::now();

    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = MapperRegistry::new();
    registry
        .register_type_with("Slow", || SlowMapper)
        .register(counting("Fake", &calls, "fake"));

    let mut srm = manager().with_mapper_timeout(Some(Duration::from_millis(50)));
    let report = srm.register_routes(&registry);

    assert!(matches!(
        report.get("Slow").map(|m| &m.outcome),
        Some(MapperOutcome::TimedOut(_))
    ));
    assert_eq!(
        report.get("Slow").map(|m| m.instantiated),
        Some(true),
        "The factory returned before the deadline"
    );
    assert!(srm.routes().by_name("slow-default-0").is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(srm.routes().by_name("fake-default-0").is_some());

    let overhead = t.elapsed();
    assert!(overhead < Duration::from_millis(450), "Pass waited for the slow mapper");
    println!("test_mapper_deadline_discards_slow_mapper: Testing Overhead = {:?}", overhead);
}

/// On a worker thread, an erroring mapper keeps its routes and a panicking one loses them.
#[test]
fn test_mapper_deadline_keeps_isolation_rules() {
    let t = Instant::now();

    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = MapperRegistry::new();
    registry
        .register_type_with("ExceptionOnRegister", || ExceptionOnRegisterMapper)
        .register_type_with("PanicOnRegister", || PanicOnRegisterMapper)
        .register(exception_on_create("ExceptionOnCreate"))
        .register(counting("Fake", &calls, "fake"));

    let mut srm = manager().with_mapper_timeout(Some(Duration::from_secs(5)));
    let report = srm.register_routes(&registry);

    let on_register = report.get("ExceptionOnRegister").unwrap();
    assert!(on_register.instantiated);
    assert!(matches!(
        on_register.outcome,
        MapperOutcome::RegistrationFailed(MapperError::Failed(_))
    ));
    assert_eq!(on_register.routes_added, 2);
    assert!(srm.routes().by_name("halfway-default-0").is_some());

    let panicked = report.get("PanicOnRegister").unwrap();
    assert!(panicked.instantiated);
    assert!(matches!(
        panicked.outcome,
        MapperOutcome::RegistrationFailed(MapperError::Panicked(_))
    ));
    assert_eq!(panicked.routes_added, 0);
    assert!(srm.routes().by_name("panicky-default-0").is_none());

    let on_create = report.get("ExceptionOnCreate").unwrap();
    assert!(!on_create.instantiated);
    assert!(matches!(on_create.outcome, MapperOutcome::InstantiationFailed(_)));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(report.succeeded(), 1);

    let overhead = t.elapsed();
    println!("test_mapper_deadline_keeps_isolation_rules: Testing Overhead = {:?}", overhead);
}

/// A mapper that panics while being dropped is contained, inline and on a worker thread.
#[test]
fn test_panic_on_mapper_drop_is_isolated() {
    let t = Instant::now();

    for timeout in [None, Some(Duration::from_secs(5))] {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = MapperRegistry::new();
        registry
            .register_type_with("PanicOnDrop", || PanicOnDropMapper)
            .register(counting("Fake", &calls, "fake"));

        let mut srm = manager().with_mapper_timeout(timeout);
        let report = srm.register_routes(&registry);

        assert!(
            matches!(
                report.get("PanicOnDrop").map(|m| &m.outcome),
                Some(MapperOutcome::RegistrationFailed(MapperError::Panicked(_)))
            ),
            "Drop panic must be reported (timeout {:?})",
            timeout
        );
        assert!(srm.routes().by_name("dropped-default-0").is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1, "Later mappers still run");
        assert!(srm.routes().by_name("fake-default-0").is_some());
    }

    let overhead = t.elapsed();
    println!("test_panic_on_mapper_drop_is_isolated: Testing Overhead = {:?}", overhead);
}
