pub mod app;
pub mod error;
mod extract;
mod routes;
