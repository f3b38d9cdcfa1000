pub mod access;
pub mod audit;
pub mod db;
pub mod items;
pub mod token;
