// CLI module for gemini-relay
// Author: kelexine (https://github.com/kelexine)

use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

/// gemini-relay - Key-hiding, CORS-normalizing relay for the Gemini API
#[derive(Parser, Debug, Default)]
#[command(name = "gemini-relay", version, about, long_about = None)]
pub struct Args {
    /// Config file to load instead of ~/.gemini-relay/config.toml
    #[arg(long, short, env = "GEMINI_RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind (overrides the config file)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides the config file)
    #[arg(long, short)]
    pub port: Option<u16>,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
