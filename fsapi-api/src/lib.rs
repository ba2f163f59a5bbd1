//! Typed protocol engine for Frontier Silicon FSAPI devices
//!
//! This crate talks to network radios and audio receivers that expose the
//! FSAPI interface over HTTP. It uses the private `fsapi-transport` crate for
//! the HTTP round-trips and handles everything above it: response decoding,
//! typed values, the device session and paginated lists.
//!
//! # Reading and writing nodes
//!
//! ```rust,no_run
//! use fsapi_api::{ClientConfig, FsapiClient, Value, ValueKind};
//!
//! let client = FsapiClient::connect("http://192.168.1.20/device", "1234", ClientConfig::default())?;
//!
//! let power = client.get_value_as("netRemote.sys.power", ValueKind::U8)?;
//! client.set_value("netRemote.sys.info.friendlyName", "Kitchen")?;
//!
//! let presets = client.get_list("netRemote.nav.presets", 0, 10)?;
//! for row in &presets.rows {
//!     println!("{}: {:?}", row.index, row.field("name"));
//! }
//! # Ok::<(), fsapi_api::ProtocolError>(())
//! ```
//!
//! The session is created on the first request and transparently
//! re-established once if the device reports it expired. Dropping the
//! client releases it on the device.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod list;
pub mod node;
pub mod operation;
pub mod operations;
pub mod response;
pub mod session;
pub mod status;
pub mod value;

pub use client::FsapiClient;
pub use config::ClientConfig;
pub use endpoint::DeviceInfo;
pub use error::{CreationFailure, DecodeError, ProtocolError, Result, SessionError};
pub use list::{ListQuery, ListResult, ListRow};
pub use node::NodeRef;
pub use operation::FsapiOperation;
pub use session::{Session, SessionManager};
pub use status::Status;
pub use value::{decode_value, encode_value, Value, ValueKind};

pub use transport::{Transport, TransportError};
