use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use webx_core::{Route, RouteCollection, RoutingError};

use crate::manager::{RouteStage, ServicesRoutingManager};
use crate::mapper::{MapperDescriptor, MapperError, MapperFactory, MapperRegistry};

#[derive(Debug)]
pub enum MapperOutcome {
    Registered,
    InstantiationFailed(MapperError),
    RegistrationFailed(MapperError),
    TimedOut(Duration),
}

#[derive(Debug)]
pub struct MapperReport {
    pub name: String,
    /// The factory returned a mapper. On a timeout this reflects the moment the deadline passed.
    pub instantiated: bool,
    pub outcome: MapperOutcome,
    /// Routes committed to the shared table on behalf of this mapper.
    pub routes_added: usize,
    pub elapsed: Duration,
}

impl MapperReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, MapperOutcome::Registered)
    }
}

/// Per-mapper results of one registration pass, in discovery order.
#[derive(Debug, Default)]
pub struct RegistrationReport {
    pub mappers: Vec<MapperReport>,
}

impl RegistrationReport {
    pub fn succeeded(&self) -> usize {
        self.mappers.iter().filter(|m| m.is_success()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &MapperReport> {
        self.mappers.iter().filter(|m| !m.is_success())
    }

    pub fn routes_added(&self) -> usize {
        self.mappers.iter().map(|m| m.routes_added).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn get(&self, name: &str) -> Option<&MapperReport> {
        self.mappers.iter().find(|m| m.name == name)
    }
}

enum Attempt {
    NotCreated(MapperError),
    Completed,
    /// The mapper returned an error; what it staged before failing is kept.
    Failed(MapperError),
    /// The mapper panicked; its staged routes are discarded.
    Aborted(MapperError),
    /// The deadline passed, possibly after the factory had already returned.
    TimedOut { limit: Duration, instantiated: bool },
}

impl<C: RouteCollection> ServicesRoutingManager<C> {
    /// Runs every discovered mapper once, isolating failures per mapper.
    ///
    /// Never fails: a mapper that cannot be created, errors, panics or
    /// overruns the configured deadline is logged and reported while the
    /// remaining mappers still register their routes.
    pub fn register_routes(&mut self, registry: &MapperRegistry) -> RegistrationReport {
        let mut report = RegistrationReport::default();

        for descriptor in registry.discover() {
            let started = Instant::now();
            let stage = self.stage();

            let (attempt, stage) = match self.mapper_timeout() {
                None => {
                    let mut stage = stage;
                    let created = AtomicBool::new(false);
                    let attempt = attempt_mapper(&descriptor.factory, &mut stage, &created);
                    (attempt, Some(stage))
                }
                Some(limit) => run_with_deadline(descriptor, stage, limit),
            };

            let name = descriptor.name.as_str();
            let (outcome, instantiated, keep) = match attempt {
                Attempt::Completed => (MapperOutcome::Registered, true, true),
                Attempt::Failed(e) => {
                    tracing::error!(
                        "ServicesRoutingManager: {} failed to register routes: {}",
                        name,
                        e
                    );
                    (MapperOutcome::RegistrationFailed(e), true, true)
                }
                Attempt::Aborted(e) => {
                    tracing::error!(
                        "ServicesRoutingManager: {} aborted while registering routes: {}",
                        name,
                        e
                    );
                    (MapperOutcome::RegistrationFailed(e), true, false)
                }
                Attempt::NotCreated(e) => {
                    tracing::error!("ServicesRoutingManager: unable to create {}: {}", name, e);
                    (MapperOutcome::InstantiationFailed(e), false, false)
                }
                Attempt::TimedOut { limit, instantiated } => {
                    tracing::warn!(
                        "ServicesRoutingManager: {} exceeded {:?}, discarding its routes",
                        name,
                        limit
                    );
                    (MapperOutcome::TimedOut(limit), instantiated, false)
                }
            };

            let routes_added = match stage {
                Some(stage) if keep => self.commit(name, stage.into_routes().into_routes()),
                _ => 0,
            };

            report.mappers.push(MapperReport {
                name: descriptor.name.clone(),
                instantiated,
                outcome,
                routes_added,
                elapsed: started.elapsed(),
            });
        }

        tracing::info!(
            "ServicesRoutingManager: {} of {} mapper(s) registered, {} route(s) added",
            report.succeeded(),
            report.mappers.len(),
            report.routes_added()
        );
        report
    }

    fn commit(&mut self, mapper: &str, routes: Vec<Route>) -> usize {
        let mut added = 0;
        for route in routes {
            match self.routes_mut().push(route) {
                Ok(()) => added += 1,
                Err(RoutingError::DuplicateRoute(name)) => {
                    tracing::debug!(
                        "ServicesRoutingManager: {} re-mapped {}, skipping",
                        mapper,
                        name
                    );
                }
                Err(e) => {
                    tracing::warn!("ServicesRoutingManager: {} route rejected: {}", mapper, e)
                }
            }
        }
        added
    }
}

/// Creates and runs one mapper. `created` is set once the factory has returned a mapper.
fn attempt_mapper(
    factory: &MapperFactory,
    stage: &mut ServicesRoutingManager<RouteStage>,
    created: &AtomicBool,
) -> Attempt {
    let create = &**factory;
    let mapper = match panic::catch_unwind(AssertUnwindSafe(create)) {
        Ok(Ok(mapper)) => mapper,
        Ok(Err(e)) => return Attempt::NotCreated(e),
        Err(payload) => return Attempt::NotCreated(MapperError::Panicked(panic_message(payload))),
    };
    created.store(true, Ordering::SeqCst);

    // The mapper is dropped inside the guard so a panicking `Drop` stays isolated.
    let registered = panic::catch_unwind(AssertUnwindSafe(move || {
        let registered = mapper.register_routes(stage);
        drop(mapper);
        registered
    }));
    match registered {
        Ok(Ok(())) => Attempt::Completed,
        Ok(Err(e)) => Attempt::Failed(e),
        Err(payload) => Attempt::Aborted(MapperError::Panicked(panic_message(payload))),
    }
}

/// Runs a mapper on its own thread and stops waiting once `limit` elapses.
///
/// A mapper that overruns keeps its thread until it returns; its results are dropped.
fn run_with_deadline(
    descriptor: &MapperDescriptor,
    mut stage: ServicesRoutingManager<RouteStage>,
    limit: Duration,
) -> (Attempt, Option<ServicesRoutingManager<RouteStage>>) {
    let (tx, rx) = mpsc::channel();
    let factory = descriptor.factory.clone();
    let created = Arc::new(AtomicBool::new(false));
    let worker_created = Arc::clone(&created);

    let spawned = thread::Builder::new()
        .name(format!("route-mapper:{}", descriptor.name))
        .spawn(move || {
            let attempt = attempt_mapper(&factory, &mut stage, &worker_created);
            let _ = tx.send((attempt, stage));
        });
    if let Err(e) = spawned {
        let reason = format!("worker thread spawn failed: {}", e);
        return (Attempt::NotCreated(MapperError::Failed(reason)), None);
    }

    match rx.recv_timeout(limit) {
        Ok((attempt, stage)) => (attempt, Some(stage)),
        Err(RecvTimeoutError::Timeout) => (
            Attempt::TimedOut {
                limit,
                instantiated: created.load(Ordering::SeqCst),
            },
            None,
        ),
        Err(RecvTimeoutError::Disconnected) => (
            Attempt::Aborted(MapperError::Panicked("worker exited without reporting".into())),
            None,
        ),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
