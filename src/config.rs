//! CLI arguments and server configuration defaults.

use clap::{Parser, ValueEnum};
use shadow_rs::formatcp;

use crate::build;

const VERSION_INFO: &str = formatcp!(
    r#"{}\ncommit_hash: {}\nbuild_time: {}\nbuild_env: {},{}"#,
    build::PKG_VERSION,
    build::SHORT_COMMIT,
    build::BUILD_TIME,
    build::RUST_VERSION,
    build::RUST_CHANNEL
);

pub const API_KEY_HEADER: &str = "x-api-key";
pub const IMAGE_FIELD: &str = "image";
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];
pub const DEFAULT_UPLOAD_MAX_SIZE: u64 = 15 * 1024 * 1024;
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_AUTO_NAME_WIDTH: usize = 1;
pub const SHUTDOWN_GRACE_SECS: u64 = 10;

/// Formatting applied to auto-incremented document names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum AutoNameStyle {
    /// Decimal index, zero-padded to `--auto-name-width` digits.
    #[default]
    Padded,
    /// A literal `0` prepended to the decimal index (`6` becomes `06`).
    Legacy,
}

/// CLI arguments and environment configuration for the server.
#[derive(Parser, Debug)]
#[command(name = "data-gate", version = VERSION_INFO, about = "JSON and image storage gateway")]
pub struct Args {
    #[arg(
        short = 'p',
        long,
        env = "PORT",
        default_value_t = DEFAULT_PORT,
        help = "HTTP port"
    )]
    pub port: u16,
    #[arg(
        long,
        env = "API_KEY",
        hide_env_values = true,
        help = "Secret expected in the x-api-key header"
    )]
    pub api_key: String,
    #[arg(
        short = 'b',
        long,
        env = "DATA_GATE_BIND",
        default_value = "0.0.0.0",
        help = "Bind address"
    )]
    pub bind: String,
    #[arg(
        short = 'r',
        long,
        env = "DATA_GATE_ROOT",
        default_value = ".",
        help = "Service root holding data/, special/ and images/"
    )]
    pub root: String,
    #[arg(
        long,
        env = "DATA_GATE_CORS_ORIGINS",
        default_value = "*",
        help = "Comma separated CORS origins, or * for any"
    )]
    pub cors_origins: String,
    #[arg(
        long,
        env = "DATA_GATE_UPLOAD_MAX_SIZE",
        default_value_t = DEFAULT_UPLOAD_MAX_SIZE,
        help = "Max image upload size in bytes"
    )]
    pub upload_max_size: u64,
    #[arg(
        long,
        env = "DATA_GATE_AUTO_NAME_STYLE",
        value_enum,
        default_value_t = AutoNameStyle::Padded,
        help = "Naming style for documents saved without a name"
    )]
    pub auto_name_style: AutoNameStyle,
    #[arg(
        long,
        env = "DATA_GATE_AUTO_NAME_WIDTH",
        default_value_t = DEFAULT_AUTO_NAME_WIDTH,
        help = "Minimum digit count for padded auto names"
    )]
    pub auto_name_width: usize,
}
