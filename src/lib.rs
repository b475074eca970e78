//! LiveTV backend bridge
//!
//! Exposes a uniform live-television contract (channels, program guide,
//! timer and series-timer scheduling, live/recorded stream acquisition) to
//! a host media application, translating every operation into the
//! rule-based schedule model of a generic DVR backend.
//!
//! # Overview
//!
//! - [`LiveTvBridge`] is the facade the host talks to.
//! - [`backend::BackendClient`] is the RPC seam toward the recorder;
//!   [`backend::HttpBackend`] is the shipped REST implementation.
//! - [`services::rules`] holds the pure timer ⇄ rule translation.
//! - A background keep-alive task owned by the bridge signals liveness for
//!   every open stream every 30 seconds.
//!
//! # Usage
//!
//! ```rust,ignore
//! use livetv_bridge::{backend::HttpBackend, Config, LiveTvBridge};
//! use std::sync::Arc;
//!
//! let config = Config::from_env();
//! let backend = Arc::new(HttpBackend::from_config(&config));
//! let bridge = LiveTvBridge::new(&config, backend);
//! let channels = bridge.get_channels(&cancel).await?;
//! ```

pub mod backend;
pub mod bridge;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use bridge::{BridgeStatus, LiveTvBridge};
pub use config::{Config, SUPPORTED_API_VERSION};
pub use error::{Error, Result};
