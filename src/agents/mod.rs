// src/agents/mod.rs

pub mod action;
pub mod config;
pub mod investor_agent;
pub mod memory;
pub mod portfolio;
pub mod profile;
