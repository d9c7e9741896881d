/// Byte order of the machine the decoder runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Least significant byte first (x86, most ARM)
    Little,
    /// Most significant byte first
    Big,
}

impl ByteOrder {
    /// The byte order of the current host, known at compile time.
    pub const fn host() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }
}

/// Decodes a 2 or 4 byte little-endian field into a native integer.
///
/// Two-byte fields are zero-extended, so `[0xFF, 0xFF]` decodes to `65535`.
/// Four-byte fields fill the whole integer and keep their bit pattern.
///
/// # Arguments
/// * `bytes` - The raw field as it appears in the file
///
/// # Returns
/// * `i32` - The decoded value
pub fn decode_le(bytes: &[u8]) -> i32 {
    decode_le_on(bytes, ByteOrder::host())
}

/// Decodes a little-endian field as if running on a host with order `host`.
///
/// The field bytes are laid into a native-sized integer's memory the way
/// that host would store them, then read back in the host's own order.
/// On a little-endian host they are copied in place; on a big-endian host
/// they are reversed into the high end first. The result does not depend
/// on `host`.
pub fn decode_le_on(bytes: &[u8], host: ByteOrder) -> i32 {
    debug_assert!(
        matches!(bytes.len(), 2 | 4),
        "fields are 2 or 4 bytes wide, got {}",
        bytes.len()
    );

    let mut memory = [0u8; 4];
    match host {
        ByteOrder::Little => {
            for (slot, byte) in memory.iter_mut().zip(bytes) {
                *slot = *byte;
            }
        }
        ByteOrder::Big => {
            for (i, byte) in bytes.iter().take(4).enumerate() {
                memory[3 - i] = *byte;
            }
        }
    }

    match host {
        ByteOrder::Little => i32::from_le_bytes(memory),
        ByteOrder::Big => i32::from_be_bytes(memory),
    }
}
