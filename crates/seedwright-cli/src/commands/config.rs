//! `seedwright config`: inspect and edit the export defaults

use clap::{Args, Subcommand, ValueEnum};

use crate::config::Config;
use crate::Cli;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print one export default
    Get { key: ConfigKey },
    /// Change one export default
    Set {
        key: ConfigKey,
        /// `true`/`false` for follow_references, free text otherwise
        value: String,
    },
    /// Put one key back to its built-in default
    Reset { key: ConfigKey },
    /// Print every key with its current value
    List,
    /// Print where the config file is read from
    Path,
    /// Write a config file holding the built-in defaults
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Keys of the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum ConfigKey {
    /// Directory the fixture document is written to
    OutputDir,
    /// Document name without the `.yml` extension
    Filename,
    /// Also export entities only reachable through references
    FollowReferences,
    /// Tool named in the first header line
    ToolName,
    /// URL next to the tool name
    ProjectUrl,
    /// Organisation named in the second header line
    OrgName,
    /// URL next to the organisation name
    OrgUrl,
}

impl ConfigKey {
    fn name(self) -> &'static str {
        match self {
            Self::OutputDir => "output_dir",
            Self::Filename => "filename",
            Self::FollowReferences => "follow_references",
            Self::ToolName => "tool_name",
            Self::ProjectUrl => "project_url",
            Self::OrgName => "org_name",
            Self::OrgUrl => "org_url",
        }
    }
}

pub fn run(args: &ConfigArgs, cli: &Cli) -> anyhow::Result<()> {
    let path = cli.config_path();
    match &args.command {
        ConfigCommands::Get { key } => {
            let config = Config::load(&path)?;
            println!("{}", value_of(&config, *key)?);
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load(&path)?;
            config.set(key.name(), value)?;
            config.save(&path)?;
            tracing::info!("Updated {} in {:?}", key.name(), path);
            println!("Set {} = {}", key.name(), value);
        }
        ConfigCommands::Reset { key } => {
            let mut config = Config::load(&path)?;
            let default = value_of(&Config::default(), *key)?;
            config.set(key.name(), &default)?;
            config.save(&path)?;
            println!("Reset {} = {}", key.name(), default);
        }
        ConfigCommands::List => {
            let config = Config::load(&path)?;
            println!("# {}", path.display());
            for key in Config::keys() {
                if let Some(value) = config.get(key) {
                    println!("{} = {}", key, value);
                }
            }
        }
        ConfigCommands::Path => println!("{}", path.display()),
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Config::default().save(&path)?;
            println!("Created config file at {}", path.display());
        }
    }
    Ok(())
}

fn value_of(config: &Config, key: ConfigKey) -> anyhow::Result<String> {
    config
        .get(key.name())
        .ok_or_else(|| anyhow::anyhow!("Config has no value for {}", key.name()))
}
