pub mod codec;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod frames;
pub mod request;
pub mod script;
pub mod service;
pub mod telemetry;
