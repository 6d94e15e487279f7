// Library for tests to access modules

pub mod config;
pub mod lang;
pub mod models;
pub mod normalizer;
pub mod presenter;
pub mod render;
pub mod routes;
pub mod runtime_repo;
pub mod version;
