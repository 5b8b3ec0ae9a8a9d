use super::{Bound, Bounds, GraphSaver, PLOT_MARGIN, TICK_OFFSET};
use anyhow::Result;
use plotters::{
    chart::{ChartBuilder, ChartContext},
    coord::{Shift, types::RangedCoordf64},
    prelude::{Cartesian2d, DrawingArea, IntoDrawingArea, PathElement, SVGBackend},
    series::LineSeries,
    style::{BLACK, BLUE, Color, IntoFont, RED, WHITE},
};
use spike_detection::Waveforms;
use spikefinder_common::Time;
use std::path::Path;
use trace_reader::Recording;
use tracing::instrument;

type SpikeDrawingArea<'a> = DrawingArea<SVGBackend<'a>, Shift>;
type SpikeChartContext<'a> =
    ChartContext<'a, SVGBackend<'a>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

trait SpikeChartBuilder<'a>: Sized {
    fn build_graph(root: &SpikeDrawingArea<'a>, title: &str, bounds: &Bounds) -> Result<Self>;
    fn draw_trace_to_chart(&mut self, recording: &Recording, label: &str) -> Result<()>;
    fn draw_ticks_to_chart(
        &mut self,
        spikes: &[Time],
        height: f64,
        half_length: f64,
        label: &str,
    ) -> Result<()>;
    fn draw_waveforms_to_chart(&mut self, waveforms: &Waveforms) -> Result<()>;
}

#[derive(Default)]
pub(crate) struct SvgSaver {}

impl<'a> SpikeChartBuilder<'a> for SpikeChartContext<'a> {
    #[instrument(skip_all, level = "debug")]
    fn build_graph(
        root: &SpikeDrawingArea<'a>,
        title: &str,
        bounds: &Bounds,
    ) -> Result<SpikeChartContext<'a>> {
        let mut chart = ChartBuilder::on(root)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .margin(10)
            .caption(title, ("sans-serif", 30.0).into_font())
            .build_cartesian_2d(
                bounds.time.min..bounds.time.max,
                bounds.voltage.min..bounds.voltage.max,
            )?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_desc("Time (s)")
            .y_desc("Voltage (uV)")
            .draw()?;

        Ok(chart)
    }

    #[instrument(skip_all, level = "debug")]
    fn draw_trace_to_chart(&mut self, recording: &Recording, label: &str) -> Result<()> {
        let data = recording
            .time
            .iter()
            .copied()
            .zip(recording.voltage.iter().copied());

        self.draw_series(LineSeries::new(data, &BLUE))?
            .label(label)
            .legend(|(x, y)| PathElement::new(vec![(x - 10, y), (x + 10, y)], BLUE));
        Ok(())
    }

    #[instrument(skip_all, level = "debug", fields(num_spikes = spikes.len()))]
    fn draw_ticks_to_chart(
        &mut self,
        spikes: &[Time],
        height: f64,
        half_length: f64,
        label: &str,
    ) -> Result<()> {
        let ticks = spikes.iter().map(|&spike| {
            PathElement::new(
                vec![(spike, height - half_length), (spike, height + half_length)],
                RED,
            )
        });

        self.draw_series(ticks)?
            .label(label)
            .legend(|(x, y)| PathElement::new(vec![(x, y - 6), (x, y + 6)], RED));
        Ok(())
    }

    #[instrument(skip_all, level = "debug", fields(num_waveforms = waveforms.snippets.len()))]
    fn draw_waveforms_to_chart(&mut self, waveforms: &Waveforms) -> Result<()> {
        for snippet in &waveforms.snippets {
            let data = waveforms.offsets.iter().copied().zip(snippet.iter().copied());
            self.draw_series(LineSeries::new(data, BLUE.mix(0.4)))?;
        }
        Ok(())
    }
}

impl GraphSaver for SvgSaver {
    fn save_spikes_svg(
        recording: &Recording,
        spikes: &[Time],
        path: &Path,
        (width, height): (u32, u32),
        title: &str,
    ) -> Result<()> {
        let tick_height = recording
            .voltage
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
            + TICK_OFFSET;
        let bounds = Bounds {
            time: Bound::from(PLOT_MARGIN, recording.time.iter().copied()),
            voltage: Bound::from(
                PLOT_MARGIN,
                recording
                    .voltage
                    .iter()
                    .copied()
                    .chain(std::iter::once(tick_height + TICK_OFFSET)),
            ),
        };

        let root = SVGBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = SpikeChartContext::build_graph(&root, title, &bounds)?;
        chart.draw_trace_to_chart(recording, "Raw signal")?;
        chart.draw_ticks_to_chart(
            spikes,
            tick_height,
            bounds.voltage.range() / 50.0,
            "Detected spikes",
        )?;

        chart
            .configure_series_labels()
            .background_style(WHITE)
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    fn save_waveforms_svg(
        waveforms: &Waveforms,
        path: &Path,
        (width, height): (u32, u32),
        title: &str,
    ) -> Result<()> {
        let bounds = Bounds {
            time: Bound::from(0.0, waveforms.offsets.iter().copied()),
            voltage: Bound::from(
                PLOT_MARGIN,
                waveforms.snippets.iter().flatten().copied(),
            ),
        };

        let root = SVGBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = SpikeChartContext::build_graph(&root, title, &bounds)?;
        chart.draw_waveforms_to_chart(waveforms)?;

        root.present()?;
        Ok(())
    }
}
