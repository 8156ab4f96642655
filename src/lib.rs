// Library for tests to access modules

pub mod aggregation;
pub mod broker;
pub mod cache;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
pub mod version;
