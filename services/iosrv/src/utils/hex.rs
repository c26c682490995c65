//! Hexadecimal Utilities
//!
//! Conversion helpers between byte slices and hex strings. Used by the frame
//! injection API endpoint and for frame logging on the TCP bridge.

use crate::utils::error::{IoSrvError, Result};

/// Convert byte array to lowercase hexadecimal string
///
/// # Example
///
/// ```rust
/// use iosrv::utils::hex::bytes_to_hex;
///
/// let data = &[0x01, 0x05, 0xFF];
/// assert_eq!(bytes_to_hex(data), "0105ff");
/// ```
pub fn bytes_to_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join("")
}

/// Convert hexadecimal string to byte array
///
/// Accepts upper or lower case and ignores whitespace, `:`, `-` and `_`
/// separators.
///
/// # Example
///
/// ```rust
/// use iosrv::utils::hex::hex_to_bytes;
///
/// let bytes = hex_to_bytes("01 05 00 00 ff 00").unwrap();
/// assert_eq!(bytes, vec![0x01, 0x05, 0x00, 0x00, 0xFF, 0x00]);
/// ```
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>> {
    let cleaned = hex
        .chars()
        .filter(|c| c.is_ascii_hexdigit())
        .collect::<String>();

    if cleaned.len() != hex.chars().filter(|c| !is_separator(*c)).count() {
        return Err(IoSrvError::InvalidParameter(format!(
            "Invalid hex string: '{hex}'"
        )));
    }

    if cleaned.len() % 2 != 0 {
        return Err(IoSrvError::InvalidParameter(
            "Hex string must have even length".to_string(),
        ));
    }

    cleaned
        .chars()
        .collect::<Vec<char>>()
        .chunks(2)
        .map(|chunk| {
            let hex_byte = chunk.iter().collect::<String>();
            u8::from_str_radix(&hex_byte, 16).map_err(|e| {
                IoSrvError::InvalidParameter(format!("Invalid hex byte '{}': {}", hex_byte, e))
            })
        })
        .collect()
}

/// Format byte array as space-separated lowercase hex, for log output
pub fn format_hex_spaced(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_separator(c: char) -> bool {
    c.is_ascii_whitespace() || c == ':' || c == '-' || c == '_'
}
