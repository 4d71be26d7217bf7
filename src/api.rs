pub mod nordpool;
