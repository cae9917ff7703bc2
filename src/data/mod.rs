//! Data loading for scoring runs

pub mod csv_loader;

pub use csv_loader::PickTable;
