pub mod bootstrap;
pub mod modules;
pub mod runner;
pub mod utils;
