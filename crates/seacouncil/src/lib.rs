pub mod config;
pub mod db;
pub mod jurisdiction;
mod parser;
pub mod scraper;
pub mod sync;
pub mod types;

pub use config::ScrapeConfig;
pub use jurisdiction::Jurisdiction;
pub use scraper::WebScraper;
