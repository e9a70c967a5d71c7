// src/constants.rs

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

// Scratch-root seeding
pub const SCRATCH_PREFIX: &str = "ftp-";
pub const SEED_MESSAGE_NAME: &str = "message.md";
pub const SEED_MESSAGE: &[u8] = b"hello\nftp\n";
pub const SEED_SUBDIR: &str = "server";

pub const TRANSFER_BUFFER_SIZE: usize = 64 * 1024;
