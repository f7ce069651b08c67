use std::path::PathBuf;

use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct Config {
    #[clap(short = 'H', long, env, default_value_t = String::from("127.0.0.1"))]
    pub host: String,
    #[clap(short, long, env, default_value_t = 7205)]
    pub port: u16,

    #[clap(long, env, default_value_t = String::from("production"))]
    pub env: String,

    #[clap(long = "db", env)]
    pub database_url: String,

    #[clap(long, env, default_value_t = 16)]
    pub db_connections: usize,

    #[clap(long, env)]
    pub honeycomb_team: Option<String>,
    #[clap(long, env, default_value_t = String::from("dev"))]
    pub honeycomb_dataset: String,

    /// Base64-encoded key of at least 64 bytes for signing session cookies. Without one, a key
    /// is generated at startup and sessions do not survive a restart.
    #[clap(long, env)]
    pub cookie_key: Option<String>,

    #[clap(long, env, default_value_t = String::from("sid"))]
    pub session_cookie_name: String,

    #[clap(long, env, default_value_t = 14)]
    pub session_expire_days: i64,

    /// Directory where uploaded images and their derived files are stored.
    #[clap(long, env, default_value = "./media")]
    pub storage_root: PathBuf,

    /// Prefix for the links returned to clients. The media routes are served under its path,
    /// so a full URL such as `https://cdn.example.com/media` mounts them at `/media`.
    #[clap(long, env, default_value_t = String::from("/media"))]
    pub media_url_base: String,

    #[clap(long, env, default_value_t = 25 * 1024 * 1024)]
    pub max_upload_size: usize,

    /// Serve media with a content type matching the file extension, instead of always
    /// `image/jpeg`.
    #[clap(long, env)]
    pub detect_content_type: bool,
}
