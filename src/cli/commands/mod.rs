mod hash_password;
mod init;
mod transfer;

pub use hash_password::cmd_hash_password;
pub use init::cmd_init;
pub use transfer::{cmd_export, cmd_import};
