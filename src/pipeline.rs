use std::io::Write;
use std::time::Duration;

use jiff::civil::Date;
use log::debug;
use thiserror::Error;

use crate::api::nordpool::{NordpoolError, PriceSource};
use crate::db::elspot::{emit, BatchWriter, ElspotError, Outcome};
use crate::interval::date_range::DateRange;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] NordpoolError),
    #[error(transparent)]
    Emit(#[from] ElspotError),
}

/// Fetch and emit the prices for every day in the range, one day at a time.
/// Sleep for `wait` between two consecutive days, never after the last one.
/// The first failure stops the run.
pub async fn run<S, W, O>(
    source: &S,
    writer: Option<&W>,
    range: DateRange,
    wait: Duration,
    out: &mut O,
) -> Result<Vec<(Date, Outcome)>, PipelineError>
where
    S: PriceSource,
    W: BatchWriter,
    O: Write,
{
    let mut outcomes = Vec::new();
    let mut days = range.iter().peekable();
    while let Some(date) = days.next() {
        debug!("Processing {}", date);
        let batch = source.fetch(date).await?;
        let outcome = emit(writer, date, batch, out).await?;
        outcomes.push((date, outcome));
        if days.peek().is_some() && !wait.is_zero() {
            debug!("Sleeping {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }
    Ok(outcomes)
}
