//! `(device, inode)` identity via `fstat`.

use std::fs::File;
use std::os::unix::fs::MetadataExt;

use super::{FileIdentity, IdentityError, IdentityResult};

pub(super) fn identity_of(file: &File) -> IdentityResult<FileIdentity> {
    // File::metadata is fstat on the descriptor, so a rename between open and
    // here cannot make us stat a different file.
    let metadata = file
        .metadata()
        .map_err(|source| IdentityError::Stat { path: None, source })?;
    Ok(FileIdentity::Posix {
        device: metadata.dev(),
        inode: metadata.ino(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_matches_path_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.log");
        fs::write(&path, b"x").unwrap();

        let file = File::open(&path).unwrap();
        let meta = fs::metadata(&path).unwrap();
        assert_eq!(
            identity_of(&file).unwrap(),
            FileIdentity::Posix {
                device: meta.dev(),
                inode: meta.ino(),
            }
        );
    }

    #[test]
    fn test_hardlink_shares_identity() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("original.log");
        let link = dir.path().join("link.log");
        fs::write(&original, b"content").unwrap();
        fs::hard_link(&original, &link).unwrap();

        let a = identity_of(&File::open(&original).unwrap()).unwrap();
        let b = identity_of(&File::open(&link).unwrap()).unwrap();
        assert_eq!(a, b);
    }
}
