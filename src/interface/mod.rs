mod crawler;
mod fetcher;
mod persister;
mod transport;

pub use crawler::*;
pub use fetcher::*;
pub use persister::*;
pub use transport::*;
