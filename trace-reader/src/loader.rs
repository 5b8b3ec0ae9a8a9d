use serde::{Deserialize, Serialize};
use spikefinder_common::{Time, Voltage};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    str::FromStr,
};
use strum::{Display, EnumString};
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("IO Error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON Error reading {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Parse Error in {path:?} at line {line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("Unsupported file format: {0:?}, expected one of json, csv, txt")]
    UnsupportedFormat(PathBuf),
}

/// File formats understood by the loader, chosen by file extension.
#[derive(Clone, Copy, Debug, PartialEq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FileFormat {
    /// A document with keys `time` and `voltage` for recordings, or a flat array for answers.
    Json,
    /// Comma or whitespace separated columns, one sample per line.
    Csv,
    /// Same as [FileFormat::Csv].
    Txt,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoaderError> {
        path.extension()
            .and_then(|extension| extension.to_str())
            .and_then(|extension| FileFormat::from_str(extension).ok())
            .ok_or_else(|| LoaderError::UnsupportedFormat(path.to_owned()))
    }
}

/// A recorded signal: a voltage (in microvolts) sampled at each time (in seconds).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub time: Vec<Time>,
    pub voltage: Vec<Voltage>,
}

impl Recording {
    /// Number of samples, the shorter of the two columns if they differ.
    pub fn len(&self) -> usize {
        self.time.len().min(self.voltage.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every time has a voltage and vice versa.
    pub fn is_paired(&self) -> bool {
        self.time.len() == self.voltage.len()
    }

    /// The interval between the first two samples.
    pub fn sample_interval(&self) -> Option<Time> {
        Some(self.time.get(1)? - self.time.first()?)
    }

    /// Time between the first and last samples.
    pub fn duration(&self) -> Option<Time> {
        Some(self.time.last()? - self.time.first()?)
    }
}

fn open(path: &Path) -> Result<BufReader<File>, LoaderError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| LoaderError::Io {
            path: path.to_owned(),
            source,
        })
}

/// Reads the rows of a delimited text file, each of which must have `N` numeric fields.
/// Blank lines and lines starting with `#` are ignored, as is a first row in which no
/// field is numeric (a header). A first row with only some numeric fields is an error.
fn load_columns<const N: usize>(path: &Path) -> Result<Vec<[f64; N]>, LoaderError> {
    let mut rows = Vec::new();
    let mut seen_data = false;
    for (index, line) in open(path)?.lines().enumerate() {
        let line = line.map_err(|source| LoaderError::Io {
            path: path.to_owned(),
            source,
        })?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .collect();

        let parse_error = |reason: String| LoaderError::Parse {
            path: path.to_owned(),
            line: index + 1,
            reason,
        };
        let parsed: Vec<_> = fields.iter().map(|field| f64::from_str(field)).collect();
        if !seen_data && parsed.iter().all(Result::is_err) {
            debug!("Skipping header line {}: {line}", index + 1);
            seen_data = true;
            continue;
        }
        seen_data = true;

        let values = parsed
            .into_iter()
            .zip(&fields)
            .map(|(value, field)| value.map_err(|e| parse_error(format!("'{field}': {e}"))))
            .collect::<Result<Vec<_>, _>>()?;
        let row: [f64; N] = values.try_into().map_err(|values: Vec<f64>| {
            parse_error(format!("expected {N} columns, found {}", values.len()))
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Loads a recording from a JSON document (`{"time": [...], "voltage": [...]}`)
/// or from a two column text file.
///
/// The two columns of a JSON recording are not required to have equal length;
/// unpaired recordings are rejected by the detector, not here.
#[instrument(skip_all, fields(path = ?path))]
pub fn load_recording(path: &Path) -> Result<Recording, LoaderError> {
    let recording = match FileFormat::from_path(path)? {
        FileFormat::Json => {
            serde_json::from_reader(open(path)?).map_err(|source| LoaderError::Json {
                path: path.to_owned(),
                source,
            })?
        }
        FileFormat::Csv | FileFormat::Txt => {
            let (time, voltage) = load_columns::<2>(path)?
                .into_iter()
                .map(|[time, voltage]| (time, voltage))
                .unzip();
            Recording { time, voltage }
        }
    };
    info!(
        "Loaded {} samples spanning {:?}s, sample interval {:?}s",
        recording.len(),
        recording.duration(),
        recording.sample_interval()
    );
    Ok(recording)
}

/// Loads known spike times from a flat JSON array or from a one column text file.
#[instrument(skip_all, fields(path = ?path))]
pub fn load_ground_truth(path: &Path) -> Result<Vec<Time>, LoaderError> {
    let times: Vec<Time> = match FileFormat::from_path(path)? {
        FileFormat::Json => {
            serde_json::from_reader(open(path)?).map_err(|source| LoaderError::Json {
                path: path.to_owned(),
                source,
            })?
        }
        FileFormat::Csv | FileFormat::Txt => load_columns::<1>(path)?
            .into_iter()
            .map(|[time]| time)
            .collect(),
    };
    info!("Loaded {} spike times", times.len());
    Ok(times)
}
