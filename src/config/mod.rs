//! Configuration module for Deskhand.
//!
//! Handles loading and validating application settings.

mod settings;

pub use settings::{
    AgentSettings, AutomationSettings, DatabaseSettings, GeneralSettings, ServerSettings,
    Settings,
};
