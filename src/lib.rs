//! Desktop client for a CSV upload service.
//!
//! A file is validated locally, posted to the server, and the resulting work item is
//! polled until it reaches a terminal status.

pub mod app;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod surface;
pub mod tracking;
pub mod upload;
pub mod utils;

pub use client::{HttpWorkApi, WorkApi};
pub use config::UploaderConfig;
pub use controller::{Command, Controller, ControllerHandle};
pub use error::{Error, Result};
pub use surface::{ResultPanel, Tone, UploadSurface};
