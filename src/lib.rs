pub mod auth;
pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod firestore;
pub mod identity;
pub mod models;
pub mod services;

#[cfg(test)]
pub mod testing;
