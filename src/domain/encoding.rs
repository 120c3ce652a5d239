use serde::Serialize;
use std::fmt;

/// On-disk serialization of a property list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    Xml,
    Binary,
}

impl Encoding {
    /// Format name understood by `plutil -convert`.
    pub fn plutil_format(self) -> &'static str {
        match self {
            Encoding::Xml => "xml1",
            Encoding::Binary => "binary1",
        }
    }

    /// Binary plists always start with this magic.
    pub const BINARY_MAGIC: &'static [u8] = b"bplist00";

    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(Self::BINARY_MAGIC) {
            Encoding::Binary
        } else {
            Encoding::Xml
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Xml => f.write_str("xml"),
            Encoding::Binary => f.write_str("binary"),
        }
    }
}

/// How the store was brought into a parseable text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Parsed directly as XML.
    Text,
    /// Parsed after an in-place conversion to XML.
    ConvertedFromBinary,
    /// The file was unusable and has been replaced by the default skeleton.
    RecoveredFromCorrupt,
}

impl LoadOutcome {
    pub fn was_binary(self) -> bool {
        !matches!(self, LoadOutcome::Text)
    }

    /// Encoding the store must be written back in.
    pub fn write_back_encoding(self) -> Encoding {
        if self.was_binary() {
            Encoding::Binary
        } else {
            Encoding::Xml
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniff_detects_binary_magic() {
        assert_eq!(Encoding::sniff(b"bplist00\x00\x01"), Encoding::Binary);
        assert_eq!(Encoding::sniff(b"<?xml version=\"1.0\"?>"), Encoding::Xml);
        assert_eq!(Encoding::sniff(b""), Encoding::Xml);
    }

    #[test]
    fn every_converted_outcome_writes_back_binary() {
        assert_eq!(LoadOutcome::Text.write_back_encoding(), Encoding::Xml);
        assert_eq!(
            LoadOutcome::ConvertedFromBinary.write_back_encoding(),
            Encoding::Binary
        );
        assert_eq!(
            LoadOutcome::RecoveredFromCorrupt.write_back_encoding(),
            Encoding::Binary
        );
    }
}
