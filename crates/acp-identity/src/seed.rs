use acp_types::{AcpError, KEY_LENGTH};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zeroize::Zeroizing;

/// Read a raw seed file: exactly 32 bytes, no envelope.
///
/// Reads at most one byte past the expected length so an oversized file is
/// rejected without being loaded.
pub(crate) fn read_seed_file(path: &Path) -> Result<Zeroizing<Vec<u8>>, AcpError> {
    let file = File::open(path)?;
    let mut buf = Zeroizing::new(Vec::with_capacity(KEY_LENGTH + 1));
    file.take(KEY_LENGTH as u64 + 1).read_to_end(&mut buf)?;
    if buf.len() != KEY_LENGTH {
        return Err(AcpError::InvalidSeedLength(buf.len()));
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AgentIdentity;
    use std::io::Write;

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn load_identity_from_seed_file() {
        let file = write_temp(&[0u8; 32]);
        let id = AgentIdentity::from_seed_file(file.path()).unwrap();
        assert_eq!(
            id.agent_id().as_str(),
            "2KagShR4Usj2uARXJeDw7XJEKvQ3XDr84dC47hUB3Uyd"
        );
    }

    #[test]
    fn short_and_long_files_rejected() {
        let short = write_temp(&[1u8; 16]);
        assert!(matches!(
            read_seed_file(short.path()),
            Err(AcpError::InvalidSeedLength(16))
        ));

        let long = write_temp(&[1u8; 64]);
        assert!(matches!(
            read_seed_file(long.path()),
            Err(AcpError::InvalidSeedLength(33))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AgentIdentity::from_seed_file(dir.path().join("absent.seed")).unwrap_err();
        assert!(matches!(err, AcpError::Io(_)));
    }
}
