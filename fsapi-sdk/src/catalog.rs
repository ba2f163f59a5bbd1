//! Human-readable names for the nodes a radio exposes
//!
//! Nodes are addressed on the wire by dotted paths under `netRemote`. The
//! catalog maps short names (`volume`, `power`) and relative paths
//! (`sys.audio.volume`) onto those paths together with the value type the
//! device uses for each.

use fsapi_api::{NodeRef, ValueKind};

use crate::error::SdkError;

const ROOT: &str = "netRemote.";

/// How a node may be accessed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
    WriteOnly,
}

/// Whether a node holds a single value or a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Value(ValueKind),
    List,
}

/// One catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Short name, e.g. `volume`
    pub name: &'static str,
    /// Path relative to `netRemote`, e.g. `sys.audio.volume`
    pub path: &'static str,
    pub shape: Shape,
    pub access: Access,
}

impl CatalogEntry {
    const fn value(name: &'static str, path: &'static str, kind: ValueKind, access: Access) -> Self {
        Self {
            name,
            path,
            shape: Shape::Value(kind),
            access,
        }
    }

    const fn list(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            path,
            shape: Shape::List,
            access: Access::ReadOnly,
        }
    }

    /// Full wire path, e.g. `netRemote.sys.audio.volume`
    pub fn full_path(&self) -> String {
        format!("{}{}", ROOT, self.path)
    }

    pub fn node(&self) -> NodeRef {
        NodeRef::Name(self.full_path())
    }

    /// The value type, or `None` for list nodes
    pub fn kind(&self) -> Option<ValueKind> {
        match self.shape {
            Shape::Value(kind) => Some(kind),
            Shape::List => None,
        }
    }

    pub fn is_list(&self) -> bool {
        self.shape == Shape::List
    }

    pub fn is_readable(&self) -> bool {
        self.access != Access::WriteOnly
    }

    pub fn is_writable(&self) -> bool {
        self.access != Access::ReadOnly
    }

    /// The type to read this node's value as
    ///
    /// # Errors
    /// `SdkError::ListNode` for a list, `SdkError::NotReadable` for a
    /// write-only node.
    pub fn read_kind(&self) -> Result<ValueKind, SdkError> {
        let kind = self.value_kind()?;
        if !self.is_readable() {
            return Err(SdkError::NotReadable(self.name.to_string()));
        }
        Ok(kind)
    }

    /// The type to write this node's value as
    ///
    /// # Errors
    /// `SdkError::ListNode` for a list, `SdkError::NotWritable` for a
    /// read-only node.
    pub fn write_kind(&self) -> Result<ValueKind, SdkError> {
        let kind = self.value_kind()?;
        if !self.is_writable() {
            return Err(SdkError::NotWritable(self.name.to_string()));
        }
        Ok(kind)
    }

    /// Fails with `SdkError::NotAList` unless this node is a list
    pub fn check_list(&self) -> Result<(), SdkError> {
        if self.is_list() {
            Ok(())
        } else {
            Err(SdkError::NotAList(self.name.to_string()))
        }
    }

    fn value_kind(&self) -> Result<ValueKind, SdkError> {
        self.kind()
            .ok_or_else(|| SdkError::ListNode(self.name.to_string()))
    }
}

use Access::{ReadOnly, ReadWrite, WriteOnly};

/// Every node the SDK knows by name
pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry::value("play_status", "play.status", ValueKind::U8, ReadOnly),
    CatalogEntry::value("play_control", "play.control", ValueKind::U8, WriteOnly),
    CatalogEntry::value("name", "play.info.name", ValueKind::Text, ReadOnly),
    CatalogEntry::value("text", "play.info.text", ValueKind::Text, ReadOnly),
    CatalogEntry::value("artist", "play.info.artist", ValueKind::Text, ReadOnly),
    CatalogEntry::value("album", "play.info.album", ValueKind::Text, ReadOnly),
    CatalogEntry::value("graphic_uri", "play.info.graphicUri", ValueKind::Text, ReadOnly),
    CatalogEntry::value("duration", "play.info.duration", ValueKind::U32, ReadOnly),
    CatalogEntry::value("volume_steps", "sys.caps.volumeSteps", ValueKind::U8, ReadOnly),
    CatalogEntry::value("volume", "sys.audio.volume", ValueKind::U8, ReadWrite),
    CatalogEntry::value("mute", "sys.audio.mute", ValueKind::U8, ReadWrite),
    CatalogEntry::value("power", "sys.power", ValueKind::U8, ReadWrite),
    CatalogEntry::value("friendly_name", "sys.info.friendlyName", ValueKind::Text, ReadWrite),
    CatalogEntry::value("mode", "sys.mode", ValueKind::U32, ReadWrite),
    CatalogEntry::list("valid_modes", "sys.caps.validModes"),
    CatalogEntry::list("presets", "nav.presets"),
];

/// Find a node by short name, relative path or full path
pub fn lookup(name: &str) -> Option<&'static CatalogEntry> {
    let relative = name.strip_prefix(ROOT).unwrap_or(name);
    CATALOG
        .iter()
        .find(|entry| entry.name == name || entry.path == relative)
}

/// Like [`lookup`], failing with `SdkError::UnknownNode`
pub fn resolve(name: &str) -> Result<&'static CatalogEntry, SdkError> {
    lookup(name).ok_or_else(|| SdkError::UnknownNode(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("volume")]
    #[case("sys.audio.volume")]
    #[case("netRemote.sys.audio.volume")]
    fn test_lookup_forms(#[case] name: &str) {
        let entry = lookup(name).unwrap();
        assert_eq!(entry.full_path(), "netRemote.sys.audio.volume");
        assert_eq!(entry.kind(), Some(ValueKind::U8));
        assert!(entry.is_writable());
    }

    #[test]
    fn test_unknown_node() {
        assert!(lookup("netRemote.sys.nope").is_none());
        assert!(matches!(resolve("bass"), Err(SdkError::UnknownNode(n)) if n == "bass"));
    }

    #[test]
    fn test_list_nodes() {
        let presets = resolve("presets").unwrap();
        assert!(presets.is_list());
        assert_eq!(presets.kind(), None);
        assert!(!presets.is_writable());
    }

    #[test]
    fn test_play_control_is_write_only() {
        let entry = resolve("play.control").unwrap();
        assert!(!entry.is_readable());
        assert!(entry.is_writable());
    }

    #[rstest]
    #[case("volume", Some(ValueKind::U8), Some(ValueKind::U8))]
    #[case("play_status", Some(ValueKind::U8), None)]
    #[case("play_control", None, Some(ValueKind::U8))]
    #[case("friendly_name", Some(ValueKind::Text), Some(ValueKind::Text))]
    fn test_access_checks(
        #[case] name: &str,
        #[case] read: Option<ValueKind>,
        #[case] write: Option<ValueKind>,
    ) {
        let entry = resolve(name).unwrap();
        assert_eq!(entry.read_kind().ok(), read);
        assert_eq!(entry.write_kind().ok(), write);
        assert!(matches!(entry.check_list(), Err(SdkError::NotAList(_))));
    }

    #[test]
    fn test_access_errors_name_the_node() {
        assert!(matches!(
            resolve("play.control").unwrap().read_kind(),
            Err(SdkError::NotReadable(n)) if n == "play_control"
        ));
        assert!(matches!(
            resolve("name").unwrap().write_kind(),
            Err(SdkError::NotWritable(n)) if n == "name"
        ));
        let presets = resolve("presets").unwrap();
        assert!(matches!(presets.read_kind(), Err(SdkError::ListNode(n)) if n == "presets"));
        assert!(matches!(presets.write_kind(), Err(SdkError::ListNode(_))));
        assert!(presets.check_list().is_ok());
    }

    #[test]
    fn test_names_and_paths_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            for b in &CATALOG[i + 1..] {
                assert_ne!(a.name, b.name);
                assert_ne!(a.path, b.path);
            }
        }
    }
}
