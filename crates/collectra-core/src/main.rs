use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use collectra_core::{AnnotationSession, SessionConfig};
use collectra_record::{scan_parent, Collection, YamlFileStore};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn record_arg() -> Arg {
    Arg::new("record")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Path to the record YAML file")
}

fn cli() -> Command {
    Command::new("collectra")
        .version(collectra_core::VERSION)
        .about("Inspect and edit Collectra annotation records")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print collection sizes and the lineage listing")
                .arg(record_arg()),
        )
        .subcommand(
            Command::new("rows")
                .about("Print one table row per node")
                .arg(record_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("display")
                .about("Resolve the display value of a node")
                .arg(record_arg())
                .arg(Arg::new("id").required(true).help("Node id")),
        )
        .subcommand(
            Command::new("annotations")
                .about("Print editing-surface annotations as JSON")
                .arg(record_arg()),
        )
        .subcommand(
            Command::new("delete")
                .about("Cascade-delete a node")
                .arg(record_arg())
                .arg(Arg::new("id").required(true).help("Node id"))
                .arg(
                    Arg::new("write")
                        .long("write")
                        .action(ArgAction::SetTrue)
                        .help("Write the result back to the record file"),
                ),
        )
        .subcommand(
            Command::new("scan")
                .about("List record folders inside a parent folder")
                .arg(
                    Arg::new("parent")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Parent folder"),
                ),
        )
}

fn required<'a, T>(args: &'a ArgMatches, name: &str) -> Result<&'a T>
where
    T: Clone + Send + Sync + 'static,
{
    args.get_one::<T>(name)
        .with_context(|| format!("missing argument <{name}>"))
}

fn open(args: &ArgMatches, config: &SessionConfig) -> Result<(YamlFileStore, AnnotationSession)> {
    let path = required::<PathBuf>(args, "record")?;
    let store = YamlFileStore::new(path);
    let session = AnnotationSession::load(&store, config.clone())
        .with_context(|| format!("failed to load {}", path.display()))?;
    Ok((store, session))
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => SessionConfig::load(path).context("failed to load configuration")?,
        None => SessionConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match matches.subcommand() {
        Some(("inspect", args)) => {
            let (_, session) = open(args, &config)?;
            let record = session.record();
            println!("Record Summary");
            println!("==============");
            if let Some(workflow) = record.metadata.as_ref().and_then(|m| m.workflow.as_deref()) {
                println!("Workflow: {workflow}");
            }
            for collection in Collection::ALL {
                println!("  {}: {}", collection, record.collection(collection).len());
            }
            println!(
                "Nodes: {}, edges: {}",
                session.index().node_count(),
                session.index().edge_count()
            );
            println!();
            print!("{}", session.report());
        }
        Some(("rows", args)) => {
            let (_, session) = open(args, &config)?;
            let rows = session.rows();
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in rows {
                    println!(
                        "{:<40} {:<22} {:<8} {}",
                        row.id.as_str(),
                        row.kind,
                        if row.editable { "editable" } else { "locked" },
                        row.display
                    );
                }
            }
        }
        Some(("display", args)) => {
            let (_, session) = open(args, &config)?;
            let id = required::<String>(args, "id")?;
            let display = session.display(id);
            println!("Value: {}", display.value);
            if let Some(source) = &display.source_id {
                println!("Source: {source}");
            }
            println!("Editable: {}", display.editable);
            println!("Reason: {}", display.reason);
        }
        Some(("annotations", args)) => {
            let (_, session) = open(args, &config)?;
            println!("{}", serde_json::to_string_pretty(&session.surface_annotations())?);
        }
        Some(("delete", args)) => {
            let (store, mut session) = open(args, &config)?;
            let id = required::<String>(args, "id")?;
            let removed = session.delete(id)?;
            if removed.is_empty() {
                println!("No node '{id}' in record");
            } else {
                println!("Removed {} nodes:", removed.len());
                for node in &removed {
                    println!("  {node}");
                }
            }
            if args.get_flag("write") && !removed.is_empty() {
                session
                    .save(&store)
                    .with_context(|| format!("failed to write {}", store.path().display()))?;
                println!("Wrote {}", store.path().display());
            }
        }
        Some(("scan", args)) => {
            let parent = required::<PathBuf>(args, "parent")?;
            let folders = scan_parent(parent, &config.folders)
                .with_context(|| format!("failed to scan {}", parent.display()))?;
            for folder in &folders {
                println!(
                    "{}  record={}  image={}",
                    folder.name,
                    folder.record_path.display(),
                    folder.image_path.display()
                );
            }
            println!("{} record folders", folders.len());
        }
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn parses_delete_with_global_config() {
        let matches = cli()
            .try_get_matches_from([
                "collectra", "delete", "r.yaml", "crop_001", "--write", "--config", "c.toml",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "delete");
        assert!(args.get_flag("write"));
        assert_eq!(required::<String>(args, "id").unwrap(), "crop_001");
        assert_eq!(args.get_one::<PathBuf>("config"), Some(&PathBuf::from("c.toml")));
    }
}
