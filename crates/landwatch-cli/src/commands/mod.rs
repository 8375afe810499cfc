pub mod classify;
pub mod completion;
pub mod config;
pub mod encroach;
pub mod init;
pub mod job;
pub mod parcel;
pub mod run;
pub mod verdicts;
pub(crate) mod workspace;
