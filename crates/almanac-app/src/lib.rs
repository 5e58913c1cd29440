pub mod cli;
pub mod command;
pub mod controller;
pub mod error;
pub mod export;
pub mod runner;
pub mod view;
