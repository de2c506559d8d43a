//! base64url helpers: encode without padding, decode with or without it.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::{DecodeError, Engine};

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_LENIENT.encode(bytes)
}

pub fn decode(s: &str) -> Result<Vec<u8>, DecodeError> {
    URL_SAFE_LENIENT.decode(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_has_no_padding() {
        assert_eq!(encode(b"a"), "YQ");
        assert_eq!(encode([0xfbu8, 0xff]), "-_8");
    }

    #[test]
    fn decode_tolerates_padding() {
        assert_eq!(decode("YQ").unwrap(), b"a");
        assert_eq!(decode("YQ==").unwrap(), b"a");
        assert!(decode("Y!").is_err());
        // standard alphabet is rejected
        assert!(decode("+/8").is_err());
    }
}
