//! Library root for the `engagement_predictor` crate

// Core error handling
pub mod api_errors;
pub mod errors;

// Configuration & CLI
pub mod cli;
pub mod config;
pub mod config_loader;

// Logging
pub mod log_sink;

// Prediction core
pub mod artifacts;
pub mod explainer;
pub mod features;
pub mod model;
pub mod predictor;
pub mod report;
pub mod scaler;

// Sessions & web server interface
pub mod app_state;
pub mod input_validator;
pub mod session_context;
pub mod web;

// Offline data tools
pub mod loader;
pub mod synth;


pub use errors::{EngageError, EngageResult};
pub use features::{Feature, FeatureMeans, FeatureVector, UserInput};
pub use predictor::{EngagementPredictor, PredictionResult};
