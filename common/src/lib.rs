pub mod tracer;

use clap::Args;

/// Scalar type used for every sample and timestamp.
pub type Real = f64;

/// Time in seconds.
pub type Time = Real;

/// Voltage in microvolts.
pub type Voltage = Real;

/// Options shared by every binary in the workspace which control the stderr tracer.
#[derive(Clone, Debug, Default, Args)]
pub struct CommonLoggingOpts {
    /// Tracing filter directive, e.g. `info` or `spike_detection=debug`.
    /// If absent, `RUST_LOG` is used, and failing that `info`.
    #[clap(long)]
    pub log_filter: Option<String>,
}
