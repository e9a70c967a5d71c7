use std::fmt;

/// A single numeric reply line on the control channel.
///
/// Serialized as `<code> <text>\n`. Codes follow the conventional FTP
/// taxonomy: 1xx preliminary, 2xx success, 3xx intermediate, 4xx transient
/// failure, 5xx permanent failure.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reply {
    code: u16,
    text: String,
}

impl Reply {
    pub fn new(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    /// The wire form of the reply, newline terminated.
    pub fn as_line(&self) -> String {
        format!("{} {}\n", self.code, self.text)
    }

    pub fn accepted_data_connection() -> Self {
        Self::new(150, "Accepted data connection")
    }

    pub fn type_now_binary() -> Self {
        Self::new(200, "TYPE is now 8-bit binary")
    }

    pub fn no_features() -> Self {
        Self::new(211, "no-features")
    }

    pub fn file_status(size: u64) -> Self {
        Self::new(213, size.to_string())
    }

    pub fn system_type() -> Self {
        Self::new(215, "UNIX Type: L8")
    }

    pub fn service_ready() -> Self {
        Self::new(220, "Service ready for new user")
    }

    pub fn closing_control_connection() -> Self {
        Self::new(221, "Service closing control connection")
    }

    pub fn transfer_complete() -> Self {
        Self::new(226, "File successfully transferred")
    }

    pub fn closing_data_connection() -> Self {
        Self::new(226, "Closing data connection")
    }

    /// `advert` is the comma-separated `h1,h2,h3,h4,p1,p2` form of the
    /// passive address, with `port == p1 * 256 + p2`.
    pub fn entering_passive_mode(advert: &str) -> Self {
        Self::new(227, format!("Entering Passive Mode ({})", advert))
    }

    pub fn logged_in() -> Self {
        Self::new(230, "User logged in, proceed")
    }

    pub fn current_directory_is(path: &str) -> Self {
        Self::new(250, format!("OK. Current directory is {}", path))
    }

    pub fn deleted(name: &str) -> Self {
        Self::new(250, format!("Deleted {}", name))
    }

    pub fn created(name: &str) -> Self {
        Self::new(257, format!("Created \"{}\"", name))
    }

    pub fn working_directory(path: &str) -> Self {
        Self::new(257, format!("\"{}\"", path))
    }

    pub fn need_password(user: &str) -> Self {
        Self::new(331, format!("User {} okay, need password", user))
    }

    pub fn action_not_taken() -> Self {
        Self::new(450, "Requested file action not taken")
    }

    pub fn action_failed(what: &str) -> Self {
        Self::new(500, format!("Requested action has failed \"{}\"", what))
    }

    pub fn not_implemented(verb: &str) -> Self {
        Self::new(502, format!("Command not implemented \"{}\"", verb))
    }

    pub fn retrieve_regular_files_only() -> Self {
        Self::new(550, "Can only retrieve regular files")
    }

    pub fn delete_regular_files_only() -> Self {
        Self::new(550, "Can only delete regular files")
    }

    pub fn size_regular_files_only() -> Self {
        Self::new(550, "Can only size regular files")
    }

    pub fn no_such_file(name: &str) -> Self {
        Self::new(550, format!("No such file or directory {}", name))
    }

    pub fn not_a_directory(name: &str) -> Self {
        Self::new(550, format!("Not a directory {}", name))
    }

    pub fn directory_exists() -> Self {
        Self::new(550, "Can't create existing directory")
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.text)
    }
}
