//! CLI functionality for the measure bundler
//!
//! This module contains all CLI-related functionality including:
//! - Run configuration
//! - Source gathering
//! - Translation service client
//! - Value set lookup
//! - Bundle, combine and composite workflows
//! - Interactive population prompts
//! - Output formatting

pub mod bundle;
pub mod combine;
pub mod composite;
pub mod config;
pub mod interactive;
pub mod output;
pub mod populations;
pub mod sources;
pub mod translator;
pub mod valuesets;
