//! Single-line maze layout codec for clipboard and shell transfer.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const LAYOUT_DOMAIN: &str = "pursuit";
const LAYOUT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
pub(crate) const LAYOUT_HEADER: &str = "pursuit:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of a maze layout and the tile geometry it was authored for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct MazeLayoutSnapshot {
    /// Number of tile columns contained in the grid.
    pub columns: u32,
    /// Number of tile rows contained in the grid.
    pub rows: u32,
    /// Length of a single tile edge expressed in world units.
    pub tile_length: f32,
    /// Row-major tile-type codes; zero marks a wall.
    pub tiles: Vec<i32>,
}

impl MazeLayoutSnapshot {
    /// Encodes the snapshot into a single-line string suitable for transfer.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializableLayout {
            tile_length: self.tile_length,
            tiles: self.tiles.clone(),
        };
        let json = serde_json::to_vec(&payload).expect("layout serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{LAYOUT_HEADER}:{}x{}:{encoded}", self.columns, self.rows)
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(LayoutTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != LAYOUT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != LAYOUT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        let decoded: SerializableLayout =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        let expected_tiles = columns as usize * rows as usize;
        if decoded.tiles.len() != expected_tiles {
            return Err(LayoutTransferError::TileCountMismatch {
                expected: expected_tiles,
                actual: decoded.tiles.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            tile_length: decoded.tile_length,
            tiles: decoded.tiles,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableLayout {
    tile_length: f32,
    tiles: Vec<i32>,
}

/// Errors that can occur while decoding layout transfer strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout payload was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded layout.
    #[error("layout string is missing the prefix")]
    MissingPrefix,
    /// The encoded layout did not contain a version segment.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// The encoded layout did not include grid dimensions.
    #[error("layout string is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded layout did not include the payload segment.
    #[error("layout string is missing the payload")]
    MissingPayload,
    /// The encoded layout used an unexpected prefix segment.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded layout used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded layout.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The tile array does not match the declared grid dimensions.
    #[error("layout declares {expected} tiles but carries {actual}")]
    TileCountMismatch {
        /// Tile count implied by the declared dimensions.
        expected: usize,
        /// Tile count actually present in the payload.
        actual: usize,
    },
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse layout payload")]
    InvalidPayload(#[source] serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(LayoutTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_open_layout() {
        let snapshot = MazeLayoutSnapshot {
            columns: 4,
            rows: 3,
            tile_length: 16.0,
            tiles: vec![1; 12],
        };

        let encoded = snapshot.encode();
        assert!(encoded.starts_with(&format!("{LAYOUT_HEADER}:4x3:")));

        let decoded = MazeLayoutSnapshot::decode(&encoded).expect("layout decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn round_trip_walled_layout() {
        let snapshot = MazeLayoutSnapshot {
            columns: 3,
            rows: 3,
            tile_length: 16.0,
            tiles: vec![0, 1, 0, 1, 1, 1, 0, 1, 0],
        };

        let decoded = MazeLayoutSnapshot::decode(&snapshot.encode()).expect("layout decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn rejects_foreign_and_malformed_strings() {
        assert!(matches!(
            MazeLayoutSnapshot::decode("   "),
            Err(LayoutTransferError::EmptyPayload)
        ));
        assert!(matches!(
            MazeLayoutSnapshot::decode("maze:v1:2x2:AAAA"),
            Err(LayoutTransferError::InvalidPrefix(_))
        ));
        assert!(matches!(
            MazeLayoutSnapshot::decode("pursuit:v9:2x2:AAAA"),
            Err(LayoutTransferError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            MazeLayoutSnapshot::decode("pursuit:v1:0x4:AAAA"),
            Err(LayoutTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            MazeLayoutSnapshot::decode("pursuit:v1:2x2:!!!"),
            Err(LayoutTransferError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn rejects_mismatched_tile_counts() {
        let snapshot = MazeLayoutSnapshot {
            columns: 2,
            rows: 2,
            tile_length: 16.0,
            tiles: vec![1; 4],
        };
        let encoded = snapshot.encode().replace(":2x2:", ":2x3:");

        assert!(matches!(
            MazeLayoutSnapshot::decode(&encoded),
            Err(LayoutTransferError::TileCountMismatch {
                expected: 6,
                actual: 4,
            })
        ));
    }
}
