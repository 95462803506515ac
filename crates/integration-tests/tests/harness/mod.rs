pub mod app;
pub mod server;
