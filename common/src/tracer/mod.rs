mod tracer_engine;

pub use tracer_engine::{TracerEngine, TracerError, TracerOptions};

/// Should be called at the start of each binary.
/// The argument is a `&CommonLoggingOpts` (or anything with a `log_filter: Option<String>` field).
#[macro_export]
macro_rules! init_tracer {
    ($logging_opts:expr) => {{
        let options = $crate::tracer::TracerOptions {
            log_filter: $logging_opts.log_filter.as_deref(),
        };
        let tracer =
            $crate::tracer::TracerEngine::new(options, env!("CARGO_BIN_NAME"), module_path!());
        // Emitted here, rather than in `TracerEngine::new`, so the event is attributed to the caller.
        if let Some(e) = tracer.filter_error() {
            tracing::warn!("{e}");
        }
        tracer
    }};
}
