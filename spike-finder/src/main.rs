//! Finds action potentials in a recorded voltage trace, optionally plotting them
//! and scoring them against known spike times.
mod graphics;
mod parameters;

use anyhow::Context;
use clap::Parser;
use parameters::{Mode, PlotSize};
use spike_detection::score;
use spikefinder_common::{CommonLoggingOpts, Time, init_tracer};
use std::{io::Write, path::PathBuf};
use trace_reader::{load_ground_truth, load_recording};
use tracing::{debug, info, warn};

/// [clap] derived stuct to parse command line arguments.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Recording to search, a json document with `time` and `voltage` arrays or a two column csv/txt file.
    #[clap(long, env = "SPIKE_RECORDING")]
    recording: PathBuf,

    /// Known spike times. If given, the detected spikes are scored against them.
    #[clap(long, env = "SPIKE_ANSWERS")]
    answers: Option<PathBuf>,

    /// Tolerance, in seconds, within which a detected spike matches a known one.
    #[clap(long, default_value = "0.0025")]
    jitter: Time,

    /// If set, the trace and spike waveforms are saved as svg files in this directory.
    #[clap(long)]
    plot_path: Option<PathBuf>,

    /// Size of the saved plots in pixels, as `width,height`.
    #[clap(long, default_value = "1280,720")]
    plot_size: PlotSize,

    /// Caption of the trace plot.
    #[clap(long, default_value = "Action Potentials in Raw Signal")]
    title: String,

    #[clap(flatten)]
    logging: CommonLoggingOpts,

    #[command(subcommand)]
    mode: Option<Mode>,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let _tracer = init_tracer!(&args.logging);
    debug!("{args:?}");

    run(&args, &mut std::io::stdout().lock())
}

/// Detects, plots and scores as directed by `args`. Only the spike times and the
/// score report are written to `out`; everything else goes to the tracer.
fn run(args: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let recording = load_recording(&args.recording)
        .with_context(|| format!("Could not load recording {:?}", args.recording))?;
    if !recording.is_paired() {
        warn!(
            "Recording has {} times but {} voltages",
            recording.time.len(),
            recording.voltage.len()
        );
    }

    let mut detector = args.mode.clone().unwrap_or_default().detector();
    let spikes = detector
        .detect(&recording.time, &recording.voltage)
        .with_context(|| format!("{} detector failed", detector.kind()))?;
    info!(
        "{} detector found {} spikes",
        detector.kind(),
        spikes.len()
    );

    for spike in &spikes {
        writeln!(out, "{spike}")?;
    }

    if let Some(plot_path) = &args.plot_path {
        graphics::save_plots(
            &recording,
            &spikes,
            plot_path,
            args.plot_size.into(),
            &args.title,
        )
        .with_context(|| format!("Could not save plots to {plot_path:?}"))?;
    }

    if let Some(answers) = &args.answers {
        let actual = load_ground_truth(answers)
            .with_context(|| format!("Could not load answers {answers:?}"))?;
        let result = score(&spikes, &actual, args.jitter).context("Could not score spikes")?;
        info!("Scored against {} known spikes", actual.len());
        writeln!(out, "{result}")?;
    }
    Ok(())
}
