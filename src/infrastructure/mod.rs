mod crawler_parallel;
mod crawler_sequential;
mod fetcher_rest;
mod persister_json;
mod transformer_dataset;
mod transport_rate_limiter;
mod transport_reqwest;

pub use crawler_parallel::*;
pub use crawler_sequential::*;
pub use fetcher_rest::*;
pub use persister_json::*;
pub use transformer_dataset::*;
pub use transport_rate_limiter::*;
pub use transport_reqwest::*;
