use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "instalite", about = "Feed client for the Insta-Lite backend")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the REST API, e.g. http://127.0.0.1:8000/api
    #[arg(long)]
    pub base_url: Option<String>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Answer yes to confirmation prompts
    #[arg(short, long)]
    pub yes: bool,

    /// Print the rendered page as HTML instead of text
    #[arg(long)]
    pub html: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log in and store the access token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    /// Forget the stored access token
    Logout,
    /// Show the feed
    Feed,
    /// Publish a post with an image
    Post {
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Change the text of one of your posts
    Edit { post_id: i64, content: String },
    /// Toggle your like on a post
    Like { post_id: i64 },
    /// Show the comments of a post
    Comments { post_id: i64 },
    /// Comment on a post
    Comment { post_id: i64, text: String },
    /// Delete one of your posts
    Delete { post_id: i64 },
    /// Load a page by path and print it
    Render {
        #[arg(default_value = "/")]
        path: String,
    },
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub token_path: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref base_url) = cli.base_url {
            config.api.base_url = base_url.clone();
        }

        Url::parse(&config.api.base_url)?;

        if config.storage.token_path.is_none() {
            config.storage.token_path = Some(data_dir.join("token.json"));
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".instalite")
        })
    }

    pub fn token_path(&self) -> PathBuf {
        self.storage
            .token_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("token.json"))
    }

    pub fn base_url(&self) -> anyhow::Result<Url> {
        Ok(Url::parse(&self.api.base_url)?)
    }
}
