use std::io::Write;

use influxdb::{Client, Timestamp as InfluxTimestamp, WriteQuery};
use jiff::{civil::Date, Timestamp};
use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::config::Config;

/// Name of the InfluxDB measurement all prices are written to.
pub const SERIES_NAME: &str = "elspot";

/// One hourly day-ahead price for one area.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: Timestamp,
    pub area: String,
    pub currency: String,
    pub cost: f64,
}

/// All the price points for one delivery date, across all areas.
pub type Batch = Vec<PricePoint>;

#[derive(Error, Debug)]
pub enum ElspotError {
    #[error("influxdb write failed: {0}")]
    Influx(#[from] influxdb::Error),
    #[error("failed to serialize batch: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to print batch: {0}")]
    Io(#[from] std::io::Error),
    #[error("timestamp {0} is before the unix epoch")]
    PreEpoch(Timestamp),
}

/// Something that can persist a whole batch in one go.
#[allow(async_fn_in_trait)]
pub trait BatchWriter {
    async fn commit(&self, batch: &[PricePoint]) -> Result<(), ElspotError>;
}

#[derive(Clone)]
pub struct InfluxWriter {
    client: Client,
}

impl InfluxWriter {
    pub fn new(config: &Config) -> InfluxWriter {
        InfluxWriter::with_url(config.influx_url(), config)
    }

    /// Use a different server url than the one derived from the config.
    pub fn with_url(url: impl Into<String>, config: &Config) -> InfluxWriter {
        let client = Client::new(url, config.database.clone())
            .with_auth(config.username.clone(), config.password.clone());
        InfluxWriter { client }
    }
}

impl BatchWriter for InfluxWriter {
    async fn commit(&self, batch: &[PricePoint]) -> Result<(), ElspotError> {
        let queries = write_queries(batch)?;
        self.client.query(queries).await?;
        Ok(())
    }
}

/// Line protocol queries for the batch, one per price point.
pub fn write_queries(batch: &[PricePoint]) -> Result<Vec<WriteQuery>, ElspotError> {
    batch
        .iter()
        .map(|point| {
            let seconds = u128::try_from(point.timestamp.as_second())
                .map_err(|_| ElspotError::PreEpoch(point.timestamp))?;
            Ok(
                WriteQuery::new(InfluxTimestamp::Seconds(seconds), SERIES_NAME)
                    .add_tag("area", point.area.as_str())
                    .add_tag("currency", point.currency.as_str())
                    .add_field("cost", point.cost),
            )
        })
        .collect()
}

#[derive(Debug, PartialEq, Serialize)]
pub struct SeriesPoint<'a> {
    pub measurement: &'static str,
    pub fields: Fields,
    pub tags: Tags<'a>,
    pub time: Timestamp,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Fields {
    pub cost: f64,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Tags<'a> {
    pub area: &'a str,
    pub currency: &'a str,
}

/// The json body that mirrors what gets committed to InfluxDB.
pub fn json_body(batch: &[PricePoint]) -> Vec<SeriesPoint<'_>> {
    batch
        .iter()
        .map(|point| SeriesPoint {
            measurement: SERIES_NAME,
            fields: Fields { cost: point.cost },
            tags: Tags {
                area: &point.area,
                currency: &point.currency,
            },
            time: point.timestamp,
        })
        .collect()
}

/// What happened to a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Written to the database, with the number of points.
    Committed(usize),
    /// Nothing to write.
    Skipped,
    /// Test mode, the json body went to the output.
    Printed(usize),
}

/// Send the batch for one delivery date to the database, or print it when
/// there is no writer (test mode).
pub async fn emit<W, O>(
    writer: Option<&W>,
    date: Date,
    batch: Batch,
    out: &mut O,
) -> Result<Outcome, ElspotError>
where
    W: BatchWriter,
    O: Write,
{
    match writer {
        Some(writer) => {
            if batch.is_empty() {
                warn!("No datapoints for {}", date);
                return Ok(Outcome::Skipped);
            }
            writer.commit(&batch).await?;
            info!("Committed {} datapoints for {}", batch.len(), date);
            Ok(Outcome::Committed(batch.len()))
        }
        None => {
            let body = serde_json::to_string(&json_body(&batch))?;
            writeln!(out, "{}", body)?;
            Ok(Outcome::Printed(batch.len()))
        }
    }
}
