//! cachecompat Verifier Binary
//!
//! Runs the reference cross-protocol scenario once and exits with the
//! outcome.

use clap::{Parser, ValueEnum};
use cachecompat::{Config, FailurePolicy};
use tracing_subscriber::{fmt, EnvFilter};

/// Cross-protocol consistency verifier
#[derive(Parser, Debug)]
#[command(name = "cachecompat-verify")]
#[command(about = "Verify that Hot Rod, REST and memcached see the same cache contents")]
#[command(version)]
struct Args {
    /// Host of every front-end
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Cache name
    #[arg(short, long, default_value = "compat")]
    cache: String,

    /// Hot Rod port
    #[arg(long, default_value = "11222")]
    hotrod_port: u16,

    /// REST port
    #[arg(long, default_value = "8080")]
    rest_port: u16,

    /// memcached port
    #[arg(long, default_value = "11211")]
    memcached_port: u16,

    /// REST username
    #[arg(short, long, default_value = "user")]
    user: String,

    /// REST password
    #[arg(short, long, default_value = "user")]
    password: String,

    /// Default timeout for every front-end, in milliseconds (0 disables)
    #[arg(short, long, default_value = "60000")]
    timeout_ms: u64,

    /// Hot Rod connect timeout in milliseconds [default: --timeout-ms]
    #[arg(long)]
    hotrod_connect_timeout_ms: Option<u64>,

    /// Hot Rod socket timeout in milliseconds [default: --timeout-ms]
    #[arg(long)]
    hotrod_socket_timeout_ms: Option<u64>,

    /// REST request timeout in milliseconds [default: --timeout-ms]
    #[arg(long)]
    rest_timeout_ms: Option<u64>,

    /// memcached operation timeout in milliseconds [default: --timeout-ms]
    #[arg(long)]
    memcached_timeout_ms: Option<u64>,

    /// memcached expiration in seconds
    #[arg(long, default_value = "3600")]
    expiration: u32,

    /// Largest value the memcached transcoder accepts, in bytes
    #[arg(long, default_value = "1048576")]
    max_payload_size: usize,

    /// What to do after the first divergence
    #[arg(long, value_enum, default_value = "abort")]
    on_failure: OnFailure,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OnFailure {
    /// Stop at the first divergence
    Abort,
    /// Report every divergence
    Aggregate,
}

impl Args {
    fn config(&self) -> Config {
        let timeout = |ms: Option<u64>| ms.unwrap_or(self.timeout_ms);

        Config::builder()
            .host(&self.host)
            .cache_name(&self.cache)
            .hotrod_port(self.hotrod_port)
            .rest_port(self.rest_port)
            .memcached_port(self.memcached_port)
            .credentials(&self.user, &self.password)
            .hotrod_connect_timeout_ms(timeout(self.hotrod_connect_timeout_ms))
            .hotrod_socket_timeout_ms(timeout(self.hotrod_socket_timeout_ms))
            .rest_timeout_ms(timeout(self.rest_timeout_ms))
            .memcached_timeout_ms(timeout(self.memcached_timeout_ms))
            .memcached_expiration_secs(self.expiration)
            .max_payload_size(self.max_payload_size)
            .failure_policy(match self.on_failure {
                OnFailure::Abort => FailurePolicy::AbortOnFirst,
                OnFailure::Aggregate => FailurePolicy::Aggregate,
            })
            .build()
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cachecompat=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("cachecompat v{}", cachecompat::VERSION);

    match cachecompat::run(args.config()) {
        Ok(_) => println!("SUCCESS"),
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}
