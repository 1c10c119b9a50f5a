//! CLI commands implementation

pub mod generate;
pub mod init;
pub mod review;
pub mod sermons;
pub mod status;

pub use generate::*;
pub use init::*;
pub use review::*;
pub use sermons::*;
pub use status::*;
