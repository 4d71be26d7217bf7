pub mod api;
pub mod config;
pub mod db;
pub mod interval;
pub mod pipeline;

#[cfg(test)]
mod test_log;
