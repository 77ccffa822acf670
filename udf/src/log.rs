//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! Writing to the server's error log
//!
//! Plugins share the server's `stderr`, which is its error log. Lines are formatted like the
//! server's own:
//!
//! ```text
//! 2023-10-15 13:12:54+00:00 [Warning] UDF: this is the message
//! ```
use std::fmt;

use chrono::{DateTime, Utc};

/// Server log severities
#[derive(Clone, Copy, Debug, Ord, PartialOrd, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// Something the framework could not contain, usually a bug in a function
    Critical,
    Error,
    Warning,
    /// Informational
    Note,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Critical => "Critical",
            LogLevel::Error => "Error",
            LogLevel::Warning => "Warning",
            LogLevel::Note => "Note",
            LogLevel::Debug => "Debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.as_str())
    }
}

/// Format one log line. Without a level the message is written as is after the timestamp.
#[doc(hidden)]
pub fn format_log_line(
    now: DateTime<Utc>,
    level: Option<LogLevel>,
    msg: fmt::Arguments<'_>,
) -> String {
    let stamp = now.format("%Y-%m-%d %H:%M:%S%:z");
    match level {
        Some(level) => format!("{stamp} {level} UDF: {msg}"),
        None => format!("{stamp} {msg}"),
    }
}

#[doc(hidden)]
pub fn write_log(level: Option<LogLevel>, msg: fmt::Arguments<'_>) {
    eprintln!("{}", format_log_line(Utc::now(), level, msg));
}

/// Print a message to the server's error log
///
/// Accepts a level followed by anything [`format!`] accepts, or a bare expression printed
/// without level or prefix.
///
/// ```rust,no_run
/// use udf::udf_log;
///
/// // 2023-10-08 05:27:30+00:00 [Error] UDF: this is an error
/// udf_log!(Error: "this is an error");
/// udf_log!(Warning: "this is a warning");
/// udf_log!(Note: "this is info: value {}", 10 + 10);
/// udf_log!(Debug: "this is a debug message");
/// udf_log!("i print without the '[Level] UDF:' formatting");
/// ```
#[macro_export]
macro_rules! udf_log {
    (Critical: $($msg:tt)*) => {
        $crate::log::write_log(Some($crate::log::LogLevel::Critical), format_args!($($msg)*))
    };
    (Error: $($msg:tt)*) => {
        $crate::log::write_log(Some($crate::log::LogLevel::Error), format_args!($($msg)*))
    };
    (Warning: $($msg:tt)*) => {
        $crate::log::write_log(Some($crate::log::LogLevel::Warning), format_args!($($msg)*))
    };
    (Note: $($msg:tt)*) => {
        $crate::log::write_log(Some($crate::log::LogLevel::Note), format_args!($($msg)*))
    };
    (Debug: $($msg:tt)*) => {
        $crate::log::write_log(Some($crate::log::LogLevel::Debug), format_args!($($msg)*))
    };
    ($msg:expr) => {
        $crate::log::write_log(None, format_args!("{}", $msg))
    };
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 10, 15, 13, 12, 54).unwrap()
    }

    #[test]
    fn line_with_level() {
        let line = format_log_line(fixed(), Some(LogLevel::Warning), format_args!("value {}", 20));
        assert_eq!(line, "2023-10-15 13:12:54+00:00 [Warning] UDF: value 20");
    }

    #[test]
    fn line_without_level() {
        let line = format_log_line(fixed(), None, format_args!("bare"));
        assert_eq!(line, "2023-10-15 13:12:54+00:00 bare");
    }

    #[test]
    fn levels_display_bracketed() {
        assert_eq!(LogLevel::Critical.to_string(), "[Critical]");
        assert_eq!(LogLevel::Note.to_string(), "[Note]");
        assert!(LogLevel::Critical < LogLevel::Debug);
    }

    #[test]
    fn macro_forms_expand() {
        crate::udf_log!(Note: "note {}", 1);
        crate::udf_log!(Debug: "plain");
        crate::udf_log!("no level");
        let s = String::from("owned");
        crate::udf_log!(s);
    }
}
