// Library exports for the binaries and integration tests
pub mod catalog;
pub mod collector;
pub mod config;
pub mod constants;
pub mod download;
pub mod icon;
pub mod logging;
pub mod projector;
pub mod sanitize;
pub mod summary;
