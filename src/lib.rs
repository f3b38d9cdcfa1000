pub mod access;
pub mod attention;
pub mod audit;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod middleware;
pub mod notify;
pub mod observer;
pub mod payroll;
pub mod server;
pub mod services;
