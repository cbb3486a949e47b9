pub mod fixture;
pub mod wikipedia;
pub mod yahoo;

pub use fixture::StaticMetricsProvider;
pub use yahoo::YahooMetricsProvider;
