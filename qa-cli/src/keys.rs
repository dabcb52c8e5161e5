//! Resolves the AES-256-GCM master key used to encrypt provider keys at rest
//! (`qa_store::secrets::SecretCipher`), following `qa-config`'s "one place for all env" role.

const MASTER_KEY_ENV: &str = "QA_MASTER_KEY";

/// Reads `QA_MASTER_KEY` as 64 hex chars (32 bytes). Falls back to an all-zero key for
/// local/demo use, logging a warning, since a throwaway `qa serve` run has nothing at
/// stake encrypting an empty secrets table.
pub fn resolve_master_key() -> [u8; 32] {
    match std::env::var(MASTER_KEY_ENV) {
        Ok(hex_str) => match decode_hex_32(&hex_str) {
            Some(key) => key,
            None => {
                tracing::warn!(
                    "{} is set but is not 64 hex chars; using a zero key",
                    MASTER_KEY_ENV
                );
                [0u8; 32]
            }
        },
        Err(_) => {
            tracing::warn!(
                "{} not set; using a zero key (fine for local/demo use, not for production)",
                MASTER_KEY_ENV
            );
            [0u8; 32]
        }
    }
}

fn decode_hex_32(s: &str) -> Option<[u8; 32]> {
    let s = s.trim();
    if s.len() != 64 {
        return None;
    }
    let mut out = [0u8; 32];
    for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
        let byte_str = std::str::from_utf8(chunk).ok()?;
        out[i] = u8::from_str_radix(byte_str, 16).ok()?;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_hex_32_rejects_wrong_length() {
        assert!(decode_hex_32("abcd").is_none());
    }

    #[test]
    fn decode_hex_32_round_trips() {
        let hex = "00".repeat(32);
        assert_eq!(decode_hex_32(&hex), Some([0u8; 32]));
        let hex = "ff".repeat(32);
        assert_eq!(decode_hex_32(&hex), Some([0xffu8; 32]));
    }
}
