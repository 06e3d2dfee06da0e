//! Server configuration and CLI argument parsing
//!
//! Settings come from command-line arguments and environment variables
//! with the WINDOWCRAB_ prefix.
//!
//! # Configuration Priority
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables
//! 3. Default values (lowest priority)
//!
//! # Example Usage
//!
//! ```bash
//! # Using CLI arguments
//! windowcrab --http-port 9090 --preset create-idea=3/60 --preset login=5/300
//!
//! # Using environment variables
//! export WINDOWCRAB_HTTP_PORT=8080
//! export WINDOWCRAB_PRESETS=create-idea=3/60,login=5/300
//! windowcrab
//! ```

use anyhow::{Result, anyhow};
use clap::Parser;
use std::collections::HashMap;
use windowcrab::{Quota, QuotaError};

/// Main configuration structure for the server
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP transport configuration
    pub http: HttpConfig,
    /// Rate limiter store configuration
    pub store: StoreConfig,
    /// Quotas applied when a request does not carry its own
    pub quotas: QuotaConfig,
    /// Channel buffer size for actor communication
    pub buffer_size: usize,
    /// Logging level (error, warn, info, debug, trace)
    pub log_level: String,
}

/// HTTP transport configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

/// Rate limiter store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Initial capacity of the store
    pub capacity: usize,
    /// Seconds between sweeps of expired windows (0 disables sweeping)
    pub sweep_interval: u64,
}

/// Default and per-action quotas
#[derive(Debug, Clone)]
pub struct QuotaConfig {
    /// Quota for actions without a preset
    pub default: Quota,
    /// Quota per action name
    pub presets: HashMap<String, Quota>,
}

impl QuotaConfig {
    /// Quota configured for an action
    pub fn for_action(&self, action: &str) -> Quota {
        self.presets.get(action).copied().unwrap_or(self.default)
    }

    /// Fill missing request fields from the action's configured quota
    ///
    /// # Errors
    ///
    /// Returns a [`QuotaError`] when an explicit value is zero.
    pub fn resolve(
        &self,
        action: &str,
        max_requests: Option<u32>,
        window_seconds: Option<u64>,
    ) -> Result<Quota, QuotaError> {
        let base = self.for_action(action);
        Quota::new(
            max_requests.unwrap_or(base.max_requests()),
            window_seconds.unwrap_or(base.window_seconds()),
        )
    }
}

/// A quota bound to an action name, parsed from `action=max/secs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionQuota {
    /// Action name
    pub action: String,
    /// Quota for the action
    pub quota: Quota,
}

impl std::str::FromStr for ActionQuota {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (action, quota) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid preset '{}'. Expected <action>=<max>/<seconds>", s))?;

        let action = action.trim();
        if action.is_empty() {
            return Err(anyhow!("Invalid preset '{}': action name is empty", s));
        }

        let quota = quota
            .parse::<Quota>()
            .map_err(|e| anyhow!("Invalid preset '{}': {}", s, e))?;

        Ok(ActionQuota {
            action: action.to_string(),
            quota,
        })
    }
}

/// Command-line arguments for the server
///
/// All arguments can also be set via environment variables with the
/// WINDOWCRAB_ prefix. CLI arguments take precedence over environment variables.
#[derive(Parser, Debug)]
#[command(
    name = "windowcrab",
    about = "Fixed-window rate limiting server",
    long_about = "A fixed-window rate limiting server with an HTTP/JSON API.\n\nEnvironment variables with WINDOWCRAB_ prefix are supported. CLI arguments take precedence over environment variables."
)]
pub struct Args {
    // HTTP Transport
    #[arg(
        long,
        value_name = "HOST",
        help = "HTTP host",
        default_value = "127.0.0.1",
        env = "WINDOWCRAB_HTTP_HOST"
    )]
    pub http_host: String,
    #[arg(
        long,
        value_name = "PORT",
        help = "HTTP port",
        default_value_t = 8080,
        env = "WINDOWCRAB_HTTP_PORT"
    )]
    pub http_port: u16,

    // Store Configuration
    #[arg(
        long,
        value_name = "SIZE",
        help = "Initial store capacity",
        default_value_t = 100_000,
        env = "WINDOWCRAB_STORE_CAPACITY"
    )]
    pub store_capacity: usize,
    #[arg(
        long,
        value_name = "SECS",
        help = "Seconds between sweeps of expired windows (0 disables)",
        default_value_t = 60,
        env = "WINDOWCRAB_SWEEP_INTERVAL"
    )]
    pub sweep_interval: u64,

    // Quotas
    #[arg(
        long,
        value_name = "N",
        help = "Requests per window for actions without a preset",
        default_value_t = 10,
        env = "WINDOWCRAB_DEFAULT_MAX_REQUESTS"
    )]
    pub default_max_requests: u32,
    #[arg(
        long,
        value_name = "SECS",
        help = "Window length for actions without a preset (seconds)",
        default_value_t = 60,
        env = "WINDOWCRAB_DEFAULT_WINDOW_SECONDS"
    )]
    pub default_window_seconds: u64,
    #[arg(
        long = "preset",
        value_name = "ACTION=MAX/SECS",
        help = "Per-action quota, e.g. create-idea=3/60 (repeatable)",
        env = "WINDOWCRAB_PRESETS",
        value_delimiter = ','
    )]
    pub presets: Vec<ActionQuota>,

    // General options
    #[arg(
        long,
        value_name = "SIZE",
        help = "Channel buffer size",
        default_value_t = 100_000,
        env = "WINDOWCRAB_BUFFER_SIZE"
    )]
    pub buffer_size: usize,
    #[arg(
        long,
        value_name = "LEVEL",
        help = "Log level: error, warn, info, debug, trace",
        default_value = "info",
        env = "WINDOWCRAB_LOG_LEVEL"
    )]
    pub log_level: String,

    // Utility options
    #[arg(
        long,
        help = "List all environment variables and exit",
        action = clap::ArgAction::SetTrue
    )]
    pub list_env_vars: bool,
}

impl Config {
    /// Build configuration from environment variables and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if any value is invalid.
    pub fn from_env_and_args() -> Result<Self> {
        // Clap resolves CLI > env > default for us
        let args = Args::parse();

        if args.list_env_vars {
            Self::print_env_vars();
            std::process::exit(0);
        }

        Self::from_args(args)
    }

    /// Build and validate configuration from parsed arguments
    pub fn from_args(args: Args) -> Result<Self> {
        let default = Quota::new(args.default_max_requests, args.default_window_seconds)
            .map_err(|e| anyhow!("Invalid default quota: {}", e))?;

        let mut presets = HashMap::with_capacity(args.presets.len());
        for preset in args.presets {
            if presets.insert(preset.action.clone(), preset.quota).is_some() {
                return Err(anyhow!(
                    "Preset for action '{}' is specified more than once",
                    preset.action
                ));
            }
        }

        let config = Config {
            http: HttpConfig {
                host: args.http_host,
                port: args.http_port,
            },
            store: StoreConfig {
                capacity: args.store_capacity,
                sweep_interval: args.sweep_interval,
            },
            quotas: QuotaConfig { default, presets },
            buffer_size: args.buffer_size,
            log_level: args.log_level,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(anyhow!("Channel buffer size must be at least 1"));
        }

        if self.http.host.parse::<std::net::IpAddr>().is_err() {
            return Err(anyhow!(
                "Invalid HTTP host '{}'. Expected an IP address such as 127.0.0.1",
                self.http.host
            ));
        }

        Ok(())
    }

    /// Print all available environment variables and their descriptions
    fn print_env_vars() {
        println!("windowcrab Environment Variables");
        println!("================================");
        println!();
        println!("All environment variables use the WINDOWCRAB_ prefix.");
        println!("CLI arguments take precedence over environment variables.");
        println!();

        println!("HTTP Configuration:");
        println!("  WINDOWCRAB_HTTP_HOST=<host>               HTTP host [default: 127.0.0.1]");
        println!("  WINDOWCRAB_HTTP_PORT=<port>               HTTP port [default: 8080]");
        println!();

        println!("Store Configuration:");
        println!(
            "  WINDOWCRAB_STORE_CAPACITY=<size>          Initial store capacity [default: 100000]"
        );
        println!(
            "  WINDOWCRAB_SWEEP_INTERVAL=<secs>          Seconds between sweeps, 0 disables [default: 60]"
        );
        println!();

        println!("Quota Configuration:");
        println!(
            "  WINDOWCRAB_DEFAULT_MAX_REQUESTS=<n>       Requests per window without a preset [default: 10]"
        );
        println!(
            "  WINDOWCRAB_DEFAULT_WINDOW_SECONDS=<secs>  Window length without a preset [default: 60]"
        );
        println!(
            "  WINDOWCRAB_PRESETS=<list>                 Comma separated action=max/secs entries"
        );
        println!();

        println!("General Configuration:");
        println!("  WINDOWCRAB_BUFFER_SIZE=<size>             Channel buffer size [default: 100000]");
        println!(
            "  WINDOWCRAB_LOG_LEVEL=<level>              Log level: error, warn, info, debug, trace [default: info]"
        );
        println!();

        println!("Examples:");
        println!("  # Three ideas and five logins per IP");
        println!("  export WINDOWCRAB_PRESETS=create-idea=3/60,login=5/300");
        println!();
        println!("  # Run server (CLI args override env vars)");
        println!("  windowcrab --http-port 9090");
    }
}
