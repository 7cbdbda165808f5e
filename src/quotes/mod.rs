pub mod aggregator;
pub mod coinmarketcap;
pub mod symbol;
pub mod traits;
pub mod types;

#[cfg(test)]
mod aggregator_tests;
