// src/commands/mod.rs

pub mod common;
pub mod compare;
pub mod config;
pub mod default;
pub mod parse;
