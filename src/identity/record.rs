//! Serialized form of [`FileIdentity`].
//!
//! Checkpoint records carry the identity as a flat object whose keys depend on
//! the platform that wrote it: `device`/`inode` or `vol`/`idxhi`/`idxlo`. Zero
//! fields are omitted. A reader accepts either key set, or neither, so a record
//! written on one platform never fails to load on another; it just won't
//! compare equal to any live file there.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::FileIdentity;

#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityRecord {
    #[serde(skip_serializing_if = "is_zero")]
    device: u64,
    #[serde(skip_serializing_if = "is_zero")]
    inode: u64,
    #[serde(skip_serializing_if = "is_zero")]
    vol: u64,
    #[serde(skip_serializing_if = "is_zero")]
    idxhi: u64,
    #[serde(skip_serializing_if = "is_zero")]
    idxlo: u64,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

#[derive(Debug, Error)]
#[error("file index half {field}={value} does not fit in 32 bits")]
pub struct IndexOutOfRange {
    field: &'static str,
    value: u64,
}

fn half(field: &'static str, value: u64) -> Result<u32, IndexOutOfRange> {
    u32::try_from(value).map_err(|_| IndexOutOfRange { field, value })
}

impl TryFrom<IdentityRecord> for FileIdentity {
    type Error = IndexOutOfRange;

    fn try_from(record: IdentityRecord) -> Result<Self, Self::Error> {
        if record.vol != 0 || record.idxhi != 0 || record.idxlo != 0 {
            return Ok(Self::Windows {
                volume: record.vol,
                index_high: half("idxhi", record.idxhi)?,
                index_low: half("idxlo", record.idxlo)?,
            });
        }
        if record.device != 0 || record.inode != 0 {
            return Ok(Self::Posix {
                device: record.device,
                inode: record.inode,
            });
        }
        Ok(Self::native_zero())
    }
}

impl From<FileIdentity> for IdentityRecord {
    fn from(identity: FileIdentity) -> Self {
        match identity {
            FileIdentity::Posix { device, inode } => Self {
                device,
                inode,
                ..Self::default()
            },
            FileIdentity::Windows {
                volume,
                index_high,
                index_low,
            } => Self {
                vol: volume,
                idxhi: u64::from(index_high),
                idxlo: u64::from(index_low),
                ..Self::default()
            },
        }
    }
}
