pub mod drawdown;
pub mod price;
