use std::io::IsTerminal;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{EnvFilter, Layer, filter::ParseError, layer::SubscriberExt};

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum TracerError {
    #[error("Invalid log filter '{filter}', falling back to '{DEFAULT_LOG_FILTER}': {source}")]
    InvalidFilter {
        filter: String,
        #[source]
        source: ParseError,
    },
}

pub struct TracerOptions<'a> {
    pub log_filter: Option<&'a str>,
}

/// This object initialises the stderr tracer, given a TracerOptions struct.
/// Stdout is left to the binaries' own output.
pub struct TracerEngine {
    filter_error: Option<TracerError>,
}

impl TracerEngine {
    /// Initialises the stderr tracer for the crate
    /// #Arguments
    /// * `options` - The caller-specified instance of TracerOptions.
    /// * `service_name` - The name of the binary, reported once the tracer is running.
    /// * `module_name` - The name of the current module.
    /// #Returns
    /// An instance of TracerEngine
    pub fn new(options: TracerOptions, service_name: &str, module_name: &str) -> Self {
        let (log_filter, filter_error) = Self::build_filter(options.log_filter);

        let stderr_tracer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(false);

        let subscriber =
            tracing_subscriber::Registry::default().with(stderr_tracer.with_filter(log_filter));

        //  This is only called once, so will never panic
        tracing::subscriber::set_global_default(subscriber)
            .expect("tracing::subscriber::set_global_default should only be called once");

        debug!("Tracer initialised for {service_name} in {module_name}");
        Self { filter_error }
    }

    /// Returns the error raised while parsing a user supplied filter, if there was one.
    pub fn filter_error(&self) -> Option<&TracerError> {
        self.filter_error.as_ref()
    }

    fn build_filter(log_filter: Option<&str>) -> (EnvFilter, Option<TracerError>) {
        match log_filter {
            Some(filter) => match EnvFilter::try_new(filter) {
                Ok(env_filter) => (env_filter, None),
                Err(source) => (
                    EnvFilter::new(DEFAULT_LOG_FILTER),
                    Some(TracerError::InvalidFilter {
                        filter: filter.to_owned(),
                        source,
                    }),
                ),
            },
            None => (
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
                None,
            ),
        }
    }
}
