mod bounds;
mod svg;

use spike_detection::{WAVEFORM_HALF_WIDTH, Waveforms, extract_waveforms};
use spikefinder_common::Time;
use std::{
    fs::create_dir_all,
    path::{Path, PathBuf},
};
use strum::{Display, EnumString};
use tracing::{info, instrument};
use trace_reader::Recording;

pub(crate) use bounds::{Bound, Bounds};
pub(crate) use svg::SvgSaver;

/// Fraction of the data range added above and below each plot.
const PLOT_MARGIN: f64 = 0.05;
/// Height, in microvolts, of the spike markers above the highest sample.
const TICK_OFFSET: f64 = 50.0;

#[derive(Clone, Copy, EnumString, Display)]
pub(crate) enum FileFormat {
    #[strum(to_string = "svg")]
    Svg,
}

impl FileFormat {
    pub(crate) fn build_path(self, dir: &Path, name: &str) -> anyhow::Result<PathBuf> {
        create_dir_all(dir)?;
        let mut path_buf = dir.join(name);

        if path_buf.set_extension(self.to_string()) {
            Ok(path_buf)
        } else {
            Err(anyhow::anyhow!(
                "Could not set file extension {} to {:?}",
                self.to_string(),
                path_buf
            ))
        }
    }
}

pub(crate) trait GraphSaver: Default {
    fn save_spikes_svg(
        recording: &Recording,
        spikes: &[Time],
        path: &Path,
        size: (u32, u32),
        title: &str,
    ) -> anyhow::Result<()>;

    fn save_waveforms_svg(
        waveforms: &Waveforms,
        path: &Path,
        size: (u32, u32),
        title: &str,
    ) -> anyhow::Result<()>;
}

/// Writes `spikes.svg` and `waveforms.svg` into `dir`.
#[instrument(skip_all, fields(dir = ?dir, num_spikes = spikes.len()))]
pub(crate) fn save_plots(
    recording: &Recording,
    spikes: &[Time],
    dir: &Path,
    size: (u32, u32),
    title: &str,
) -> anyhow::Result<()> {
    let spikes_path = FileFormat::Svg.build_path(dir, "spikes")?;
    SvgSaver::save_spikes_svg(recording, spikes, &spikes_path, size, title)?;
    info!("Saved {spikes_path:?}");

    let waveforms = extract_waveforms(
        &recording.time,
        &recording.voltage,
        spikes,
        WAVEFORM_HALF_WIDTH,
    )?;
    let waveforms_path = FileFormat::Svg.build_path(dir, "waveforms")?;
    SvgSaver::save_waveforms_svg(&waveforms, &waveforms_path, size, "Spike Waveforms")?;
    info!("Saved {waveforms_path:?}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording() -> Recording {
        let time: Vec<Time> = (0..200).map(|i| i as f64 * 0.001).collect();
        let voltage = (0..200)
            .map(|i| match i {
                99 | 101 => 250.0,
                100 => 500.0,
                _ => 0.0,
            })
            .collect();
        Recording { time, voltage }
    }

    #[test]
    fn build_path_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("plots");
        let path = FileFormat::Svg.build_path(&nested, "spikes").unwrap();
        assert!(nested.is_dir());
        assert_eq!(path, nested.join("spikes.svg"));
    }

    #[test]
    fn plots_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let recording = recording();
        save_plots(&recording, &[0.1], dir.path(), (640, 480), "Test").unwrap();

        let spikes = std::fs::read_to_string(dir.path().join("spikes.svg")).unwrap();
        assert!(spikes.contains("<svg"));
        assert!(spikes.contains("Voltage (uV)"));
        assert!(dir.path().join("waveforms.svg").is_file());
    }

    #[test]
    fn plots_without_spikes() {
        let dir = tempfile::tempdir().unwrap();
        save_plots(&recording(), &[], dir.path(), (320, 240), "Empty").unwrap();
        assert!(dir.path().join("waveforms.svg").is_file());
    }
}
