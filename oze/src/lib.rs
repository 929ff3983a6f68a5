pub mod algorithms;
pub mod analysis;
pub mod catalog;
pub mod commons;
pub mod config;
pub mod engine;
pub mod error;
pub mod expression;
pub mod geo_core;
pub mod pipeline;
pub mod stages;

pub use config::PipelineConfig;
pub use error::PipelineError;
