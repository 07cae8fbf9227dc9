pub mod analyze;
pub mod deps;
pub mod init;
pub mod rapid;
pub mod triage;
pub mod validate;
