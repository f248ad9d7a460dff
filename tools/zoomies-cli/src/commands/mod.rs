pub mod analyze;
pub mod check;
pub mod clip;
pub mod info;
pub mod init_config;
