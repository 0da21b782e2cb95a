pub mod app;
pub mod archive;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod mapper;
pub mod platform;
pub mod records;
pub mod resolver;
pub mod twingraph;
pub mod writer;
