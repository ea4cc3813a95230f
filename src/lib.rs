pub mod agent;
pub mod config;
pub mod git;
pub mod issue;
pub mod logging;
pub mod operations;
pub mod storage;
pub mod tui;
