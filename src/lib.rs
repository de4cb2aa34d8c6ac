pub mod assets;
pub mod config;
pub mod curator;
pub mod gemini;
pub mod models;
pub mod routes;
pub mod view;
