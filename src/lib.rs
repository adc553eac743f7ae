pub mod application;
pub mod catalog;
pub mod commands;
pub mod download;
pub mod feed;
pub mod http;
pub mod runtime;
pub mod version;
