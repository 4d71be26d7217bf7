pub mod date_range;
