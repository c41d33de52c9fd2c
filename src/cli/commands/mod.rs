//! CLI command implementations
//!
//! Each command family is implemented in its own submodule.

pub mod env;
pub mod info;
pub mod login;
pub mod target;

use anyhow::{Context as _, Result};
use clap::Subcommand;
use std::path::PathBuf;

use crate::api::ErnestClient;
use crate::core::global_config::GlobalConfig;
use crate::infra::dirs::ErnestDirs;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set the Ernest API target
    Target {
        /// API base URL
        url: String,
    },

    /// Show the current target and user
    Info,

    /// Log in and store a session token
    Login {
        /// User name
        #[arg(short, long)]
        user: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },

    /// Forget the stored session token
    Logout,

    /// Environment subcommands
    Env {
        #[command(subcommand)]
        command: EnvCommands,
    },
}

/// Environment subcommands
#[derive(Subcommand, Debug)]
pub enum EnvCommands {
    /// Apply a definition and follow the build
    Apply {
        /// Path to the YAML definition
        definition: PathBuf,

        /// Only show the changes the build would make
        #[arg(long)]
        dry: bool,
    },

    /// Destroy an environment and follow the build
    Destroy {
        /// Project name
        project: String,

        /// Environment name
        env: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Import existing resources into an environment
    Import {
        /// Project name
        project: String,

        /// Environment name
        env: String,

        /// Only import resources matching these names
        #[arg(long, value_delimiter = ',')]
        filters: Vec<String>,
    },

    /// Follow an environment's current build
    Monitor {
        /// Project name
        project: String,

        /// Environment name
        env: String,
    },
}

/// Per-invocation settings shared by all commands
#[derive(Debug, Clone)]
pub struct Context {
    pub dirs: ErnestDirs,
    pub config: GlobalConfig,
    pub quiet: bool,
    pub color: bool,
}

impl Context {
    /// Load the config file and apply command-line overrides
    pub fn load(
        target: Option<String>,
        token: Option<String>,
        quiet: bool,
        no_color: bool,
    ) -> Result<Self> {
        let dirs = ErnestDirs::new();
        let mut config = GlobalConfig::load(&dirs).context("Failed to load configuration")?;
        let color = !no_color && config.color();
        if target.is_some() {
            config.target = target;
        }
        if token.is_some() {
            config.token = token;
        }
        Ok(Self {
            dirs,
            config,
            quiet,
            color,
        })
    }

    /// API client for the configured target
    pub fn client(&self) -> Result<ErnestClient> {
        let target = self.config.target()?;
        Ok(ErnestClient::new(target, self.config.token.clone()))
    }
}

impl Commands {
    /// Execute the command
    pub async fn run(self, ctx: Context) -> Result<()> {
        match self {
            Self::Target { url } => target::execute(&ctx, &url),
            Self::Info => info::execute(&ctx),
            Self::Login { user, password } => login::execute_login(&ctx, &user, &password).await,
            Self::Logout => login::execute_logout(&ctx),
            Self::Env { command } => match command {
                EnvCommands::Apply { definition, dry } => {
                    env::execute_apply(&ctx, &definition, dry).await
                }
                EnvCommands::Destroy { project, env: name, yes } => {
                    env::execute_destroy(&ctx, &project, &name, yes).await
                }
                EnvCommands::Import {
                    project,
                    env: name,
                    filters,
                } => env::execute_import(&ctx, &project, &name, &filters).await,
                EnvCommands::Monitor { project, env: name } => {
                    env::execute_monitor(&ctx, &project, &name).await
                }
            },
        }
    }
}
