use std::{error::Error, io, path::PathBuf, time::Duration};

use clap::Parser;
use jiff::civil::Date;
use log::debug;
use nordflux::{
    api::nordpool::NordpoolClient,
    config::Config,
    db::elspot::InfluxWriter,
    interval::date_range::DateRange,
    pipeline,
};

const DEFAULT_CONF_FILENAME: &str = "nordflux.json";

#[derive(Parser, Debug)]
#[command(version, about = "Nord Pool to InfluxDB exporter", long_about = None)]
struct Args {
    /// Configuration file
    #[arg(long = "conf", value_name = "filename", default_value = DEFAULT_CONF_FILENAME)]
    conf_filename: PathBuf,

    /// Begin date, defaults to tomorrow
    #[arg(long = "begin", value_name = "date")]
    begin_date: Option<Date>,

    /// End date (inclusive), defaults to tomorrow
    #[arg(long = "end", value_name = "date")]
    end_date: Option<Date>,

    /// Time to sleep between requests
    #[arg(long, value_name = "seconds", default_value_t = 0)]
    wait: u64,

    /// Test mode, print the datapoints instead of writing them to InfluxDB
    #[arg(long)]
    test: bool,

    /// Print debug information
    #[arg(long)]
    debug: bool,
}

/// Run this job every day after the Nord Pool auction results are out (~13:00 CET)
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(if args.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    let config = Config::from_path(&args.conf_filename)?;
    debug!("Loaded {:?}", config);

    let writer = if args.test {
        None
    } else {
        Some(InfluxWriter::new(&config))
    };

    let range = DateRange::or_tomorrow(args.begin_date, args.end_date)?;
    debug!("Processing days {}", range);

    let client = NordpoolClient::new(config.areas.clone(), config.currency.clone());
    pipeline::run(
        &client,
        writer.as_ref(),
        range,
        Duration::from_secs(args.wait),
        &mut io::stdout(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use jiff::civil::date;

    use super::*;

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = Args::parse_from(["nordflux"]);
        assert_eq!(args.conf_filename, PathBuf::from("nordflux.json"));
        assert_eq!(args.begin_date, None);
        assert_eq!(args.end_date, None);
        assert_eq!(args.wait, 0);
        assert!(!args.test);
        assert!(!args.debug);
    }

    #[test]
    fn all_flags() {
        let args = Args::parse_from([
            "nordflux",
            "--conf",
            "/etc/nordflux.json",
            "--begin",
            "2024-01-01",
            "--end",
            "2024-01-03",
            "--wait",
            "5",
            "--test",
            "--debug",
        ]);
        assert_eq!(args.conf_filename, PathBuf::from("/etc/nordflux.json"));
        assert_eq!(args.begin_date, Some(date(2024, 1, 1)));
        assert_eq!(args.end_date, Some(date(2024, 1, 3)));
        assert_eq!(args.wait, 5);
        assert!(args.test);
        assert!(args.debug);
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(Args::try_parse_from(["nordflux", "--begin", "2024-13-01"]).is_err());
    }
}
