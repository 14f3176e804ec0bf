pub mod aur;
pub mod config;
pub mod extract;
pub mod index;
pub mod manager;
