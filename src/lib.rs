pub mod cache;
pub mod client;
pub mod config;
pub mod controller;
pub mod models;
pub mod routes;
pub mod samples;
pub mod store;
