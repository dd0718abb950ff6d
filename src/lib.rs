pub mod config;
pub mod edge;
pub mod export;
pub mod fake_feed;
pub mod http_cache;
pub mod http_client;
pub mod odds_fetch;
pub mod pipeline;
pub mod prediction;
pub mod report;
pub mod scoring;
pub mod state;
pub mod stats_fetch;
