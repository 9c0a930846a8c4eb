pub mod backend;
pub mod config;
pub mod credentials;
pub mod diff;
pub mod engine;
pub mod git;
pub mod request;
pub mod resolve;
pub mod response;
