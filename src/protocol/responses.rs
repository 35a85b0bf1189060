//! FTP Response handling
//!
//! Defines the fixed set of status replies and their wire format.

use std::fmt;

/// A status reply sent on the control connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// 150
    AboutToOpenDataConnection,
    /// 200
    CommandOkay,
    /// 220
    ServiceReady,
    /// 221
    Goodbye,
    /// 226
    ClosingDataConnection,
    /// 230
    LoggedIn,
    /// 250, reserved: no transfer path sends it
    FileActionCompleted,
    /// 421
    ServiceNotAvailable,
    /// 425
    CantOpenDataConnection,
    /// 450
    FileActionNotTaken,
    /// 450, STOR flavour
    CannotCreateFile,
    /// 451
    LocalError,
    /// 501
    SyntaxError,
    /// 502
    NotImplemented,
    /// 504
    NotImplementedForParameter,
}

impl Reply {
    pub fn code(&self) -> u16 {
        match self {
            Reply::AboutToOpenDataConnection => 150,
            Reply::CommandOkay => 200,
            Reply::ServiceReady => 220,
            Reply::Goodbye => 221,
            Reply::ClosingDataConnection => 226,
            Reply::LoggedIn => 230,
            Reply::FileActionCompleted => 250,
            Reply::ServiceNotAvailable => 421,
            Reply::CantOpenDataConnection => 425,
            Reply::FileActionNotTaken | Reply::CannotCreateFile => 450,
            Reply::LocalError => 451,
            Reply::SyntaxError => 501,
            Reply::NotImplemented => 502,
            Reply::NotImplementedForParameter => 504,
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Reply::AboutToOpenDataConnection => "File status okay; about to open data connection.",
            Reply::CommandOkay => "Command okay.",
            Reply::ServiceReady => "mini-ftpd ready.",
            Reply::Goodbye => "Good bye.",
            Reply::ClosingDataConnection => "Closing data connection.",
            Reply::LoggedIn => "User logged in, proceed.",
            Reply::FileActionCompleted => "Requested file action okay, completed.",
            Reply::ServiceNotAvailable => "Too many connections, try again later.",
            Reply::CantOpenDataConnection => "Can't open data connection.",
            Reply::FileActionNotTaken => "Requested file action not taken.",
            Reply::CannotCreateFile => "Requested file action not taken: can't create file.",
            Reply::LocalError => "Requested action aborted: local error in processing.",
            Reply::SyntaxError => "Syntax error in parameters or arguments.",
            Reply::NotImplemented => "Command not implemented.",
            Reply::NotImplementedForParameter => "Command not implemented for that parameter.",
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_response(self.code(), self.text()))
    }
}

/// Format an FTP response message
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}
