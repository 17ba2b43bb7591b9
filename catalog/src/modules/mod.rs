pub mod catalog;
pub mod services;
