pub mod account;
pub mod api_client;
pub mod app;
pub mod backend;
pub mod cache;
pub mod context;
pub mod database;
pub mod entries;
pub mod guard;
pub mod network;
pub mod push;
pub mod router;
pub mod screen;
pub mod session;
pub mod settings;
pub mod utils;
pub mod views;
pub mod weather;
pub mod worker;
