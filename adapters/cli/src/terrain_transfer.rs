//! Single-line text encoding of a terrain occupancy grid.

use artillery_core::TerrainView;
use artillery_world::Terrain;
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use thiserror::Error;

const TRANSFER_DOMAIN: &str = "terrain";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded occupancy payload.
pub(crate) const TRANSFER_HEADER: &str = "terrain:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while decoding terrain transfer strings.
#[derive(Debug, Error)]
pub(crate) enum TerrainTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("terrain string was empty")]
    EmptyPayload,
    /// A segment of the `terrain:v1:WxH:payload` layout is missing.
    #[error("terrain string is missing the {0}")]
    MissingSegment(&'static str),
    /// The encoded string used an unexpected prefix segment.
    #[error("terrain prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded string used an unsupported version identifier.
    #[error("terrain version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode terrain payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The payload does not hold one byte per cell.
    #[error("terrain payload holds {actual} cells, expected {expected}")]
    LengthMismatch {
        /// Cells implied by the dimensions.
        expected: usize,
        /// Cells present in the payload.
        actual: usize,
    },
    /// A payload byte is neither `0` nor `1`.
    #[error("cell {index} holds {value}, expected 0 or 1")]
    InvalidCell {
        /// Position of the offending byte.
        index: usize,
        /// Offending byte.
        value: u8,
    },
}

/// Encodes the occupancy into `terrain:v1:<W>x<H>:<base64>`.
#[must_use]
pub(crate) fn encode(terrain: TerrainView<'_>) -> String {
    let encoded = STANDARD_NO_PAD.encode(terrain.to_bytes());
    format!(
        "{TRANSFER_HEADER}:{}x{}:{encoded}",
        terrain.width(),
        terrain.height()
    )
}

/// Decodes a terrain from the provided string representation.
pub(crate) fn decode(value: &str) -> Result<Terrain, TerrainTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TerrainTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts
        .next()
        .ok_or(TerrainTransferError::MissingSegment("prefix"))?;
    let version = parts
        .next()
        .ok_or(TerrainTransferError::MissingSegment("version"))?;
    let dimensions = parts
        .next()
        .ok_or(TerrainTransferError::MissingSegment("grid dimensions"))?;
    let payload = parts
        .next()
        .ok_or(TerrainTransferError::MissingSegment("payload"))?;

    if domain != TRANSFER_DOMAIN {
        return Err(TerrainTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(TerrainTransferError::UnsupportedVersion(version.to_owned()));
    }

    let (width, height) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;

    let expected = width as usize * height as usize;
    let actual = bytes.len();
    if actual != expected {
        return Err(TerrainTransferError::LengthMismatch { expected, actual });
    }

    let cells = bytes
        .into_iter()
        .enumerate()
        .map(|(index, value)| match value {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(TerrainTransferError::InvalidCell { index, value }),
        })
        .collect::<Result<Vec<bool>, _>>()?;

    Terrain::from_cells(width, height, cells)
        .ok_or(TerrainTransferError::LengthMismatch { expected, actual })
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), TerrainTransferError> {
    let invalid = || TerrainTransferError::InvalidDimensions(dimensions.to_owned());
    let (width, height) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }

    Ok((width, height))
}
