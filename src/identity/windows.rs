//! Volume serial plus file index via `GetFileInformationByHandle`.

use std::fs::File;
use std::io;
use std::mem::MaybeUninit;
use std::os::windows::io::AsRawHandle;

use windows_sys::Win32::Storage::FileSystem::{
    GetFileInformationByHandle, BY_HANDLE_FILE_INFORMATION,
};

use super::{FileIdentity, IdentityError, IdentityResult};

pub(super) fn identity_of(file: &File) -> IdentityResult<FileIdentity> {
    let mut info = MaybeUninit::<BY_HANDLE_FILE_INFORMATION>::uninit();
    // SAFETY: the handle is owned by `file` and stays open for the duration of
    // the call; `info` is only read after the call reports success.
    let ok = unsafe { GetFileInformationByHandle(file.as_raw_handle() as _, info.as_mut_ptr()) };
    if ok == 0 {
        return Err(IdentityError::Stat {
            path: None,
            source: io::Error::last_os_error(),
        });
    }
    // SAFETY: initialized by the successful call above.
    let info = unsafe { info.assume_init() };
    Ok(FileIdentity::Windows {
        volume: u64::from(info.dwVolumeSerialNumber),
        index_high: info.nFileIndexHigh,
        index_low: info.nFileIndexLow,
    })
}
