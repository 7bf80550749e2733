pub mod analyzer;
pub mod capture;
pub mod cli;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod history;
pub mod logging;
pub mod sheet;
