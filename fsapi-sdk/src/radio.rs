//! Radio handle with named property accessors
//!
//! Wraps an [`FsapiClient`] and exposes the common radio properties as typed
//! methods, so callers never deal with node paths or wire types.

use std::fmt;

use fsapi_api::{ClientConfig, FsapiClient, ListRow, Value};
use tracing::debug;

use crate::catalog::{self, CatalogEntry};
use crate::error::{Result, SdkError};

/// Playback state reported by `play.status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    /// Buffering or otherwise transitional
    Unknown,
    Playing,
    Paused,
}

impl PlayState {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(PlayState::Stopped),
            1 => Some(PlayState::Unknown),
            2 => Some(PlayState::Playing),
            3 => Some(PlayState::Paused),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayState::Stopped => "stopped",
            PlayState::Unknown => "unknown",
            PlayState::Playing => "playing",
            PlayState::Paused => "paused",
        }
    }
}

impl fmt::Display for PlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commands accepted by `play.control`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayControl {
    Play = 1,
    Pause = 2,
    Next = 3,
    Previous = 4,
}

/// An entry of `sys.caps.validModes`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mode {
    /// The value `sys.mode` takes when this mode is active
    pub key: Option<String>,
    pub label: String,
    pub selectable: bool,
}

impl Mode {
    fn from_row(row: &ListRow) -> Self {
        Self {
            key: row.key.clone(),
            label: text_field(row, "label"),
            selectable: row
                .field("selectable")
                .and_then(Value::as_u32)
                .map_or(true, |v| v != 0),
        }
    }
}

/// An entry of `nav.presets`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub key: Option<String>,
    pub name: String,
}

fn text_field(row: &ListRow, name: &str) -> String {
    row.field(name)
        .and_then(Value::as_text)
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// A radio reached through one FSAPI client
///
/// # Example
///
/// ```rust,no_run
/// use fsapi_sdk::{ClientConfig, Radio};
///
/// let radio = Radio::connect("http://192.168.1.20/device", "1234", ClientConfig::default())?;
/// radio.set_power(true)?;
/// radio.set_mode("Internet Radio")?;
/// println!("{} at volume {}", radio.play_status()?, radio.volume()?);
/// # Ok::<(), fsapi_sdk::SdkError>(())
/// ```
#[derive(Debug)]
pub struct Radio {
    client: FsapiClient,
}

impl Radio {
    pub fn new(client: FsapiClient) -> Self {
        Self { client }
    }

    /// Resolve the API root from `device_url` and wrap a client for it
    pub fn connect(device_url: &str, pin: impl Into<String>, config: ClientConfig) -> Result<Self> {
        Ok(Self::new(FsapiClient::connect(device_url, pin, config)?))
    }

    pub fn client(&self) -> &FsapiClient {
        &self.client
    }

    pub fn into_client(self) -> FsapiClient {
        self.client
    }

    // ========================================================================
    // Playback
    // ========================================================================

    pub fn play_status(&self) -> Result<PlayState> {
        let code = self.read_u8("play_status")?;
        PlayState::from_code(code).ok_or_else(|| SdkError::UnexpectedValue {
            node: "play.status".to_string(),
            value: code.to_string(),
        })
    }

    pub fn play_control(&self, command: PlayControl) -> Result<()> {
        debug!(?command, "play control");
        self.write("play_control", Value::U8(command as u8))
    }

    pub fn play(&self) -> Result<()> {
        self.play_control(PlayControl::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.play_control(PlayControl::Pause)
    }

    pub fn next(&self) -> Result<()> {
        self.play_control(PlayControl::Next)
    }

    pub fn previous(&self) -> Result<()> {
        self.play_control(PlayControl::Previous)
    }

    pub fn play_info_name(&self) -> Result<String> {
        self.read_text("name")
    }

    pub fn play_info_text(&self) -> Result<String> {
        self.read_text("text")
    }

    pub fn play_info_artist(&self) -> Result<String> {
        self.read_text("artist")
    }

    pub fn play_info_album(&self) -> Result<String> {
        self.read_text("album")
    }

    pub fn play_info_graphic_uri(&self) -> Result<String> {
        self.read_text("graphic_uri")
    }

    /// Track duration in milliseconds; 0 for live streams
    pub fn duration(&self) -> Result<u32> {
        self.read_u32("duration")
    }

    // ========================================================================
    // Audio and system
    // ========================================================================

    pub fn volume(&self) -> Result<u8> {
        self.read_u8("volume")
    }

    pub fn set_volume(&self, volume: u8) -> Result<()> {
        self.write("volume", Value::U8(volume))
    }

    /// Number of volume steps; the maximum volume is one less
    pub fn volume_steps(&self) -> Result<u8> {
        self.read_u8("volume_steps")
    }

    pub fn mute(&self) -> Result<bool> {
        Ok(self.read_u8("mute")? != 0)
    }

    pub fn set_mute(&self, mute: bool) -> Result<()> {
        self.write("mute", Value::from(mute))
    }

    pub fn power(&self) -> Result<bool> {
        Ok(self.read_u8("power")? != 0)
    }

    pub fn set_power(&self, on: bool) -> Result<()> {
        self.write("power", Value::from(on))
    }

    pub fn friendly_name(&self) -> Result<String> {
        self.read_text("friendly_name")
    }

    pub fn set_friendly_name(&self, name: &str) -> Result<()> {
        self.write("friendly_name", Value::from(name))
    }

    // ========================================================================
    // Modes and presets
    // ========================================================================

    pub fn modes(&self) -> Result<Vec<Mode>> {
        Ok(self.read_list("valid_modes")?.iter().map(Mode::from_row).collect())
    }

    /// Labels of the available modes, skipping unlabelled entries
    pub fn mode_labels(&self) -> Result<Vec<String>> {
        Ok(self
            .modes()?
            .into_iter()
            .map(|mode| mode.label)
            .filter(|label| !label.is_empty())
            .collect())
    }

    /// Label of the current mode, or `None` if it is not among the valid modes
    pub fn mode(&self) -> Result<Option<String>> {
        let current = self.read_u32("mode")?.to_string();
        Ok(self
            .modes()?
            .into_iter()
            .find(|mode| mode.key.as_deref() == Some(current.as_str()))
            .map(|mode| mode.label))
    }

    /// Switch to the mode with the given label
    ///
    /// # Errors
    /// `SdkError::UnknownMode` if no valid mode carries that label.
    pub fn set_mode(&self, label: &str) -> Result<()> {
        let mode = self
            .modes()?
            .into_iter()
            .find(|mode| mode.label == label)
            .ok_or_else(|| SdkError::UnknownMode(label.to_string()))?;

        let key = mode.key.unwrap_or_default();
        let value: u32 = key.parse().map_err(|_| SdkError::UnexpectedValue {
            node: "sys.caps.validModes".to_string(),
            value: key.clone(),
        })?;
        debug!(label, key = value, "switching mode");
        self.write("mode", Value::U32(value))
    }

    pub fn presets(&self) -> Result<Vec<Preset>> {
        Ok(self
            .read_list("presets")?
            .iter()
            .map(|row| Preset {
                key: row.key.clone(),
                name: text_field(row, "name"),
            })
            .collect())
    }

    // ========================================================================
    // Node access
    // ========================================================================

    /// Read a catalog node by name, checking the device's value type
    ///
    /// Write-only and list nodes are refused without a request.
    pub fn read(&self, name: &str) -> Result<Value> {
        let entry = catalog::resolve(name)?;
        self.read_entry(entry)
    }

    /// Write a catalog node by name, parsing `text` as the node's type
    ///
    /// Read-only and list nodes are refused without a request.
    pub fn write_text(&self, name: &str, text: &str) -> Result<()> {
        let entry = catalog::resolve(name)?;
        let kind = entry.write_kind()?;
        let value = Value::parse_as(kind, text).map_err(fsapi_api::ProtocolError::from)?;
        Ok(self.client.set_value(entry.node(), value)?)
    }

    fn read_entry(&self, entry: &CatalogEntry) -> Result<Value> {
        let kind = entry.read_kind()?;
        Ok(self.client.get_value_as(entry.node(), kind)?)
    }

    fn read_u8(&self, name: &str) -> Result<u8> {
        match self.read(name)? {
            Value::U8(v) => Ok(v),
            other => Err(unexpected(name, &other)),
        }
    }

    fn read_u32(&self, name: &str) -> Result<u32> {
        match self.read(name)? {
            Value::U32(v) => Ok(v),
            other => Err(unexpected(name, &other)),
        }
    }

    fn read_text(&self, name: &str) -> Result<String> {
        match self.read(name)? {
            Value::Text(text) => Ok(text),
            other => Err(unexpected(name, &other)),
        }
    }

    fn read_list(&self, name: &str) -> Result<Vec<ListRow>> {
        let entry = catalog::resolve(name)?;
        entry.check_list()?;
        let page_size = self.client.config().page_size;
        Ok(self.client.get_list(entry.node(), 0, page_size)?.rows)
    }

    fn write(&self, name: &str, value: Value) -> Result<()> {
        let entry = catalog::resolve(name)?;
        entry.write_kind()?;
        Ok(self.client.set_value(entry.node(), value)?)
    }
}

fn unexpected(name: &str, value: &Value) -> SdkError {
    SdkError::UnexpectedValue {
        node: name.to_string(),
        value: format!("{} {}", value.kind(), value),
    }
}

impl From<FsapiClient> for Radio {
    fn from(client: FsapiClient) -> Self {
        Self::new(client)
    }
}
