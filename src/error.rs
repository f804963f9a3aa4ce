//! Exit codes for the `filestate` binary.

/// Process exit codes.
///
/// - 0: Success (and, for `same`/`status`, nothing changed)
/// - 1: General error
/// - 2: Different file (`same`) or at least one rotated/truncated/missing file (`status`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// The command completed and found nothing to report.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// The command completed and found a changed file.
    Changed = 2,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "FS000",
            Self::GeneralError => "FS001",
            Self::Changed => "FS002",
        }
    }
}
