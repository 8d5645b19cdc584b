//! CLI command implementations.

pub mod build;
pub mod compile;
pub mod init;
pub mod install;
pub mod login;
pub mod publish;
pub mod search;
