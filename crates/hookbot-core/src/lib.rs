//! hookbot core - configuration and text helpers shared by all bots.
//!
//! - **config**: Environment-driven configuration for the bots
//! - **text**: MarkdownV2 escaping and display masking
//! - **format**: Number formatting for chat replies

pub mod config;
pub mod format;
pub mod text;

// Re-export commonly used items for convenience
pub use config::{
    env_file, state_dir, ConfigError, HookbotConfig, SessionBackend, SessionConfig,
    TelegramConfig, UpstreamConfig,
};
pub use format::{format_fixed, format_number};
pub use text::{escape_markdown_v2, mask_email, mask_string};
