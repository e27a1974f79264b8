pub mod history_csv;
pub mod types;
