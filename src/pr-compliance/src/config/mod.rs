//! Run settings.
//!
//! Every tunable the crawler and aggregator depend on lives in [`Settings`],
//! which is built once per run and handed to each component. Settings can be
//! loaded from an optional TOML file; missing keys fall back to defaults.

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::{
    default_api_base_url, default_compliance_owner_substring, default_safety_margin_seconds,
    OutputPolicy, Settings,
};
