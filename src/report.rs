//! CSV reports of a finished (or partially finished) run.
//!
//! * the population report has one row per day with the four compartment counts,
//! * the incidence report has one row per step with the drawn transitions.

use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::marker::PhantomData;
use std::path::Path;

use csv::Writer;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::engine::SimulationEngine;
use crate::error::SimError;
use crate::sampling::TransitionSampler;

pub const POPULATION_REPORT: &str = "population.csv";
pub const INCIDENCE_REPORT: &str = "incidence.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub day: u64,
    pub locked_down: bool,
    pub normal: u64,
    pub bitten: u64,
    pub dead: u64,
    pub zombie: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncidenceRecord {
    pub day: u64,
    pub locked_down: bool,
    pub infection_probability: f64,
    pub new_infections: u64,
    pub new_dead: u64,
    pub new_zombie: u64,
}

// Checks that the path is a CSV file, creating parent directories as needed.
fn generate_validate_filepath(path: &Path) -> Result<File, SimError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                create_dir_all(parent)?;
            }
            Ok(File::create(path)?)
        }
        _ => Err(SimError::ReportError(format!(
            "report output files must be CSVs: {}",
            path.display()
        ))),
    }
}

/// A CSV file receiving rows of type `T`.
pub struct CsvReport<T> {
    writer: Writer<File>,
    _row: PhantomData<T>,
}

impl<T: Serialize> CsvReport<T> {
    /// # Errors
    ///
    /// Returns a `SimError` if `path` is not a `.csv` path or cannot be created.
    pub fn create(path: &Path) -> Result<Self, SimError> {
        let file = generate_validate_filepath(path)?;
        debug!("writing report to {}", path.display());
        Ok(CsvReport {
            writer: Writer::from_writer(file),
            _row: PhantomData,
        })
    }

    /// # Errors
    ///
    /// Returns a `SimError` if the row cannot be serialized or written.
    pub fn send(&mut self, row: &T) -> Result<(), SimError> {
        self.writer.serialize(row)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a `SimError` if buffered rows cannot be written.
    pub fn flush(&mut self) -> Result<(), SimError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Rows for every day simulated so far.
#[must_use]
pub fn population_records<S: TransitionSampler>(
    engine: &SimulationEngine<S>,
) -> Vec<PopulationRecord> {
    engine
        .history()
        .iter()
        .zip(0_u64..)
        .map(|(state, day)| PopulationRecord {
            day,
            locked_down: engine.locked_down_at(day),
            normal: state.normal,
            bitten: state.bitten,
            dead: state.dead,
            zombie: state.zombie,
        })
        .collect()
}

#[must_use]
pub fn incidence_records<S: TransitionSampler>(
    engine: &SimulationEngine<S>,
) -> Vec<IncidenceRecord> {
    engine
        .transitions()
        .iter()
        .map(|t| IncidenceRecord {
            day: t.day,
            locked_down: t.locked_down,
            infection_probability: t.infection_probability,
            new_infections: t.new_infections,
            new_dead: t.new_dead,
            new_zombie: t.new_zombie,
        })
        .collect()
}

fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<(), SimError> {
    let mut report = CsvReport::create(path)?;
    for record in records {
        report.send(record)?;
    }
    report.flush()
}

/// Writes the population and incidence reports into `output_dir`.
///
/// # Errors
///
/// Returns a `SimError` if either report cannot be written.
pub fn write_reports<S: TransitionSampler>(
    engine: &SimulationEngine<S>,
    output_dir: &Path,
) -> Result<(), SimError> {
    write_records(
        &output_dir.join(POPULATION_REPORT),
        &population_records(engine),
    )?;
    write_records(
        &output_dir.join(INCIDENCE_REPORT),
        &incidence_records(engine),
    )
}
