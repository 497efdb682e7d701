pub mod batch;
pub mod config;
pub mod director;
pub mod error;
pub mod extractors;
pub mod http;
pub mod humanize;
pub mod normalize;
pub mod observability;
pub mod pipeline;
pub mod retry;
pub mod sanitize;
