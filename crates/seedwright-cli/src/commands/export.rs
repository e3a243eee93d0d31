//! Export command

use std::path::PathBuf;

use clap::Args;

use crate::config::Config;
use crate::Cli;
use seedwright_core::export::{export, export_to_file};
use seedwright_core::{sink, Handle};
use seedwright_storage::{MemorySession, Snapshot};

#[derive(Args)]
pub struct ExportArgs {
    /// Snapshot file (JSON) describing the objects to export
    pub snapshot: PathBuf,

    /// Output directory (default from config)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Document name without extension (default from config)
    #[arg(short = 'n', long)]
    pub filename: Option<String>,

    /// Only use entities of this class as roots (repeatable)
    #[arg(short, long = "class")]
    pub classes: Vec<String>,

    /// Only use the entity with this identifier as a root (repeatable)
    #[arg(short, long = "root")]
    pub roots: Vec<String>,

    /// Do not pull in entities that are only referenced
    #[arg(long)]
    pub no_follow: bool,

    /// Print the document instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

/// Pick the root handles: explicit identifiers, then classes, else everything
fn select_roots(args: &ExportArgs, session: &MemorySession) -> anyhow::Result<Vec<Handle>> {
    if !args.roots.is_empty() {
        return args
            .roots
            .iter()
            .map(|id| {
                session
                    .find_by_identifier(id)
                    .ok_or_else(|| anyhow::anyhow!("No entity with identifier '{}'", id))
            })
            .collect();
    }

    if !args.classes.is_empty() {
        let roots = session.instances_of(&args.classes);
        if roots.is_empty() {
            anyhow::bail!("No entities of class {}", args.classes.join(", "));
        }
        return Ok(roots);
    }

    Ok(session.instances())
}

pub fn run(args: &ExportArgs, cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load(&cli.config_path())?;
    let mut export_config = config.export_config();
    if args.no_follow {
        export_config.follow_references = false;
    }

    tracing::info!("Exporting from {:?}", args.snapshot);
    let session = Snapshot::read(&args.snapshot)?.into_session()?;
    let roots = select_roots(args, &session)?;
    tracing::debug!("Selected {} roots", roots.len());

    if args.stdout {
        let body = export(&session, &roots, &export_config)?;
        print!("{}", sink::document(&export_config.provenance, &body));
        return Ok(());
    }

    let output_dir = args.output_dir.clone().unwrap_or(config.output_dir);
    let filename = args.filename.as_deref().unwrap_or(&config.filename);
    let (path, stats) =
        export_to_file(&session, &roots, &export_config, &output_dir, filename)?;

    println!("Exported {} entities to {}", stats.entities, path.display());
    Ok(())
}
