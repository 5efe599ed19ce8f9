//! Exit codes for the `lf-filter` CLI.
//!
//! Exit code ranges:
//! - 0: success
//! - 10-19: user/environment errors (bad arguments, bad config, unreadable input)

/// Exit codes for `lf-filter` operations.
///
/// These codes are a stable contract for scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Ok = 0,

    /// Invalid arguments
    ArgsError = 10,

    /// Config file missing, unparseable or invalid
    ConfigError = 11,

    /// Input could not be read or output could not be written
    IoError = 12,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Ok
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Ok => "OK",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_are_stable() {
        assert_eq!(ExitCode::Ok.as_i32(), 0);
        assert_eq!(ExitCode::ArgsError.as_i32(), 10);
        assert_eq!(ExitCode::ConfigError.as_i32(), 11);
        assert_eq!(i32::from(ExitCode::IoError), 12);
    }

    #[test]
    fn test_display() {
        assert_eq!(ExitCode::ConfigError.to_string(), "ERR_CONFIG (11)");
        assert!(ExitCode::Ok.is_success());
        assert!(!ExitCode::IoError.is_success());
    }
}
