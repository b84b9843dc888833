pub mod config;
pub mod error;
pub mod secure;

pub use error::{GemkeyError, GemkeyResult};
pub use secure::SecureBytes;

/// Directory under the user configuration root that holds every gemkey file.
pub const APP_DIR_NAME: &str = "gemini-gtk";

/// Upper bound on a stored secret, in bytes.
pub const MAX_SECRET_LEN: usize = 64 * 1024;
