mod bus;
mod config;
mod repos;
mod services;
mod system;

pub use bus::{DomainEvent, DomainEventBus};
pub use config::{Config, SmtpConfig, VapidConfig};
pub use repos::{IEventRepo, IUserRepo, InMemoryEventRepo, InMemoryUserRepo, Repos};
pub use services::*;
use std::sync::Arc;
pub use system::ISys;
use system::RealSys;

#[derive(Clone)]
pub struct ChronosContext {
    pub repos: Repos,
    pub services: Services,
    pub bus: Arc<DomainEventBus>,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
}

impl ChronosContext {
    fn create(config: Config) -> Self {
        let services = Services::create(&config);
        Self {
            repos: Repos::create_inmemory(),
            services,
            bus: Arc::new(DomainEventBus::default()),
            config,
            sys: Arc::new(RealSys {}),
        }
    }
}

/// Will setup the infrastructure context given the environment. Storage
/// backends live behind the repo traits; this process ships with the
/// in-memory ones.
pub async fn setup_context() -> ChronosContext {
    ChronosContext::create(Config::new())
}
