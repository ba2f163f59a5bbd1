//! Resolution of the API root from a device description
//!
//! A device publishes a small document at its device URL that names the
//! FSAPI root:
//!
//! ```xml
//! <netRemote>
//!   <friendlyName>Kitchen Radio</friendlyName>
//!   <version>ir-mmi-FS2026-0500-0052</version>
//!   <webfsapi>http://192.168.1.20:80/fsapi</webfsapi>
//! </netRemote>
//! ```

use serde::Deserialize;
use transport::HttpTransport;

use crate::error::{DecodeError, Result};

/// What a device says about itself at its device URL
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// The API root all FSAPI requests go to
    pub webfsapi: String,
}

impl DeviceInfo {
    /// Parse a device description document
    ///
    /// # Errors
    /// `DecodeError::NotWellFormed` if the XML is malformed or lacks `webfsapi`.
    pub fn from_xml(xml: &str) -> std::result::Result<Self, DecodeError> {
        let info: DeviceInfo = quick_xml::de::from_str(xml).map_err(|e| {
            DecodeError::NotWellFormed(format!("Failed to parse device description: {}", e))
        })?;

        if info.webfsapi.trim().is_empty() {
            return Err(DecodeError::NotWellFormed(
                "device description has an empty webfsapi".to_string(),
            ));
        }
        Ok(DeviceInfo {
            webfsapi: info.webfsapi.trim().to_string(),
            ..info
        })
    }
}

/// Fetch and parse the description published at `device_url`
pub fn resolve(transport: &HttpTransport, device_url: &str) -> Result<DeviceInfo> {
    let body = transport.fetch(device_url)?;
    let xml = std::str::from_utf8(&body).map_err(|e| {
        DecodeError::NotWellFormed(format!("device description is not valid UTF-8: {}", e))
    })?;
    Ok(DeviceInfo::from_xml(xml)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_description() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<netRemote>
  <friendlyName>Kitchen Radio</friendlyName>
  <version>ir-mmi-FS2026-0500-0052</version>
  <webfsapi>http://192.168.1.20:80/fsapi</webfsapi>
</netRemote>"#;

        let info = DeviceInfo::from_xml(xml).unwrap();
        assert_eq!(info.friendly_name.as_deref(), Some("Kitchen Radio"));
        assert_eq!(info.version.as_deref(), Some("ir-mmi-FS2026-0500-0052"));
        assert_eq!(info.webfsapi, "http://192.168.1.20:80/fsapi");
    }

    #[test]
    fn test_minimal_description() {
        let info = DeviceInfo::from_xml("<netRemote><webfsapi> http://r/fsapi </webfsapi></netRemote>")
            .unwrap();
        assert_eq!(info.friendly_name, None);
        assert_eq!(info.webfsapi, "http://r/fsapi");
    }

    #[test]
    fn test_missing_webfsapi() {
        assert!(matches!(
            DeviceInfo::from_xml("<netRemote><friendlyName>x</friendlyName></netRemote>"),
            Err(DecodeError::NotWellFormed(_))
        ));
    }
}
