use std::{fs::File, io::Read, path::Path};

use chrono::{DateTime, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::{
    error::{PipelineError, Result},
    model::ElementId,
    profile::LoadProfile,
};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parses an RFC 3339 timestamp (converted to UTC) or a naive
/// `YYYY-mm-dd HH:MM:SS` one.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    let mut error = match DateTime::parse_from_rfc3339(value) {
        Ok(t) => return Ok(t.naive_utc()),
        Err(e) => e,
    };
    for format in NAIVE_FORMATS {
        match NaiveDateTime::parse_from_str(value, format) {
            Ok(t) => return Ok(t),
            Err(e) => error = e,
        }
    }
    Err(PipelineError::Timestamp {
        value: value.to_string(),
        source: error,
    })
}

fn parse_header(header: &StringRecord) -> Result<Vec<ElementId>> {
    if header.is_empty() {
        return Err(PipelineError::Profile("missing header".into()));
    }
    header
        .iter()
        .skip(1)
        .map(|field| {
            field
                .trim()
                .parse::<ElementId>()
                .map_err(|_| PipelineError::Profile(format!("load id '{field}' is not an integer")))
        })
        .collect()
}

/// Reads a load profile table: a `timestamp` column followed by one column
/// per load id, one row per timestep.
pub fn read_load_profile<R: Read>(reader: R) -> Result<LoadProfile> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let load_ids = parse_header(rdr.headers()?)?;

    let mut timestamps = Vec::new();
    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let mut fields = record.iter();
        let Some(t) = fields.next() else {
            continue;
        };
        timestamps.push(parse_timestamp(t)?);
        let values = fields
            .map(|v| {
                v.parse::<f64>().map_err(|_| {
                    PipelineError::Profile(format!("row {line}: '{v}' is not a number"))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(values);
    }
    debug!(
        timesteps = timestamps.len(),
        loads = load_ids.len(),
        "load profile read"
    );
    LoadProfile::from_rows(timestamps, load_ids, &rows)
}

pub fn load_profile_csv(path: impl AsRef<Path>) -> Result<LoadProfile> {
    read_load_profile(File::open(path)?)
}
