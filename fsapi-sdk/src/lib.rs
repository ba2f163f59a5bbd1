//! # FSAPI SDK - named properties for Frontier Silicon radios
//!
//! Builds on `fsapi-api` with a catalog of well-known nodes and a [`Radio`]
//! handle that reads and writes them as plain Rust types:
//!
//! ```rust,no_run
//! use fsapi_sdk::{ClientConfig, PlayState, Radio};
//!
//! let radio = Radio::connect("http://192.168.1.20/device", "1234", ClientConfig::default())?;
//!
//! if radio.play_status()? != PlayState::Playing {
//!     radio.play()?;
//! }
//! radio.set_volume(radio.volume()? + 1)?;
//!
//! for preset in radio.presets()? {
//!     println!("{}", preset.name);
//! }
//! # Ok::<(), fsapi_sdk::SdkError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! fsapi-sdk (Radio, node catalog)
//!     ↓
//! fsapi-api (sessions, typed get/set, paginated lists)
//!     ↓
//! fsapi-transport (HTTP)
//! ```

pub mod catalog;
pub mod logging;

mod error;
mod radio;

pub use catalog::{lookup, CatalogEntry};
pub use error::{Result, SdkError};
pub use radio::{Mode, PlayControl, PlayState, Preset, Radio};

// Re-export the engine types callers need alongside the Radio
pub use fsapi_api::{ClientConfig, FsapiClient, ListResult, NodeRef, ProtocolError, Value, ValueKind};
