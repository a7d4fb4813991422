//! Harness Lifecycle
//!
//! Acquires all adapters once at start and releases them exactly once at
//! the end, whatever the outcome.
//!
//! On startup:
//! 1. Validate the config
//! 2. Connect Hot Rod, then REST, then memcached
//! 3. Adapters acquired before a failed connect are dropped, which
//!    releases them

use crate::adapter::{AdapterSet, CacheAdapter, HotRodAdapter, MemcachedAdapter, RestAdapter};
use crate::config::Config;
use crate::error::Result;
use crate::verify::{Report, Scenario, Verifier};

/// Owns the adapters for one verification run
pub struct Harness {
    config: Config,
    adapters: AdapterSet,
}

impl Harness {
    /// Connect every front-end described by `config`
    pub fn connect(config: Config) -> Result<Self> {
        config.validate()?;

        tracing::info!(
            "Connecting to cache {:?} on {} (hotrod {}, rest {}, memcached {})",
            config.cache_name,
            config.host,
            config.hotrod_port,
            config.rest_port,
            config.memcached_port
        );

        let hotrod = HotRodAdapter::connect(&config)?;
        let rest = RestAdapter::connect(&config)?;
        let memcached = MemcachedAdapter::connect(&config)?;

        let adapters: Vec<Box<dyn CacheAdapter>> =
            vec![Box::new(hotrod), Box::new(rest), Box::new(memcached)];
        Ok(Self::with_adapters(config, AdapterSet::new(adapters)?))
    }

    /// Use adapters that are already connected
    pub fn with_adapters(config: Config, adapters: AdapterSet) -> Self {
        Self { config, adapters }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a scenario; a report with any divergence becomes an error
    pub fn run(&mut self, scenario: &Scenario) -> Result<Report> {
        let report = Verifier::new(&mut self.adapters, self.config.failure_policy).run(scenario)?;
        report.into_result()
    }

    /// Release every adapter
    pub fn shutdown(mut self) -> Result<()> {
        let result = self.adapters.close_all();
        tracing::debug!("All adapters released");
        result
    }
}

/// Connect, run the reference scenario, and always release the connections
pub fn run(config: Config) -> Result<Report> {
    let mut harness = Harness::connect(config)?;

    let outcome = harness.run(&Scenario::reference());
    let released = harness.shutdown();

    let report = outcome?;
    released?;

    tracing::info!(
        "All {} steps passed ({} comparisons)",
        report.steps().len(),
        report.comparisons().len()
    );
    Ok(report)
}
