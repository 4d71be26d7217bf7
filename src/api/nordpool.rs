use std::collections::BTreeMap;

use jiff::{civil::Date, Timestamp};
use log::{debug, warn};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::db::elspot::{Batch, PricePoint};

pub const NORDPOOL_API: &str = "https://dataportal-api.nordpoolgroup.com";

#[derive(Error, Debug)]
pub enum NordpoolError {
    #[error("request to Nord Pool failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no data for {date}: {reason}")]
    NoData { date: Date, reason: String },
}

/// Day-ahead prices for one delivery date, as returned by the
/// `/api/DayAheadPrices` endpoint.  Only the fields used here are kept.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPeriod {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub multi_area_entries: Vec<MultiAreaEntry>,
}

/// One hour, with a price for each requested area.  An area is missing
/// or null when Nord Pool has no price for it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiAreaEntry {
    pub delivery_start: Timestamp,
    pub entry_per_area: BTreeMap<String, Option<f64>>,
}

/// Something that produces the price points for one delivery date.
#[allow(async_fn_in_trait)]
pub trait PriceSource {
    async fn fetch(&self, date: Date) -> Result<Batch, NordpoolError>;
}

#[derive(Debug, Clone)]
pub struct NordpoolClient {
    http: reqwest::Client,
    base_url: String,
    areas: Vec<String>,
    currency: String,
}

impl NordpoolClient {
    pub fn new(areas: Vec<String>, currency: String) -> NordpoolClient {
        NordpoolClient::with_base_url(NORDPOOL_API, areas, currency)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        areas: Vec<String>,
        currency: String,
    ) -> NordpoolClient {
        NordpoolClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            areas,
            currency,
        }
    }

    /// Get the hourly prices for all areas for one delivery date.
    /// Nord Pool answers with an empty 204 until the auction results for
    /// the date are published, which is reported as [`NordpoolError::NoData`].
    ///
    /// https://dataportal-api.nordpoolgroup.com/api/DayAheadPrices?date=2024-01-01&market=DayAhead&deliveryArea=SE1,SE2&currency=SEK
    pub async fn get_delivery_period(&self, date: Date) -> Result<DeliveryPeriod, NordpoolError> {
        let url = format!("{}/api/DayAheadPrices", self.base_url);
        debug!("Requesting {} for {}", url, date);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("date", date.to_string()),
                ("market", "DayAhead".to_string()),
                ("deliveryArea", self.areas.join(",")),
                ("currency", self.currency.clone()),
            ])
            .send()
            .await?
            .error_for_status()?;
        if response.status() == StatusCode::NO_CONTENT {
            return Err(NordpoolError::NoData {
                date,
                reason: "empty response".to_string(),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| NordpoolError::NoData {
            date,
            reason: e.to_string(),
        })
    }
}

impl PriceSource for NordpoolClient {
    /// A date without published prices gives an empty batch, not an error.
    /// The warning for it is left to whoever consumes the batch.
    async fn fetch(&self, date: Date) -> Result<Batch, NordpoolError> {
        match self.get_delivery_period(date).await {
            Ok(period) => {
                if let Some(currency) = period.currency.as_deref() {
                    if currency != self.currency {
                        warn!(
                            "Requested prices in {} for {}, got {}",
                            self.currency, date, currency
                        );
                    }
                }
                Ok(price_points(&period, &self.areas, &self.currency))
            }
            Err(NordpoolError::NoData { date, reason }) => {
                debug!("No data for {}: {}", date, reason);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

/// Flatten the response into one point per hour and area.
/// Prices that are missing or not finite are dropped.
pub fn price_points(period: &DeliveryPeriod, areas: &[String], currency: &str) -> Batch {
    let mut batch: Batch = Vec::new();
    for entry in &period.multi_area_entries {
        for area in areas {
            let Some(cost) = entry.entry_per_area.get(area).copied().flatten() else {
                continue;
            };
            if !cost.is_finite() {
                continue;
            }
            batch.push(PricePoint {
                timestamp: entry.delivery_start,
                area: area.clone(),
                currency: currency.to_string(),
                cost,
            });
        }
    }
    batch
}
