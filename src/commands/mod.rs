pub mod hash;
pub mod init;
pub mod update;
pub mod version;
