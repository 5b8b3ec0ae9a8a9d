//! Loads recordings and known spike times from disk.
pub mod loader;

pub use loader::{FileFormat, LoaderError, Recording, load_ground_truth, load_recording};
