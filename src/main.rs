use std::{
    env,
    io::{self, Write},
};

use anyhow::Context;
use clap::Parser;
use cmd::Commands;
use loosegit::{Config, Oid, Repository};
use tracing_subscriber::EnvFilter;

mod cmd;

fn open_current() -> Result<Repository, anyhow::Error> {
    let root = env::current_dir().with_context(|| "Can't get current working directory")?;
    Ok(Repository::open(root, Config::from_env())?)
}

fn parse_oid(hex: &str) -> Result<Oid, anyhow::Error> {
    hex.parse()
        .with_context(|| format!("Not a valid object id: {hex}"))
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = cmd::Cli::parse();

    match &cli.command {
        Commands::Init { root_path } => {
            let root = match root_path {
                Some(root) => root.to_path_buf(),
                None => {
                    env::current_dir().with_context(|| "Can't get current working directory")?
                }
            };
            Repository::open(root, Config::from_env())?.init()?;
        }
        Commands::HashObject { write, path } => {
            let oid = open_current()?.hash_object(path, *write)?;
            println!("{oid}");
        }
        Commands::WriteTree {} => {
            let oid = open_current()?
                .write_tree()
                .with_context(|| "Could not write tree")?;
            println!("{oid}");
        }
        Commands::CommitTree {
            tree,
            parents,
            message,
        } => {
            let tree = parse_oid(tree)?;
            let parents = parents
                .iter()
                .map(|parent| parse_oid(parent))
                .collect::<Result<Vec<_>, _>>()?;
            let oid = open_current()?
                .commit_tree(tree, parents, message)
                .with_context(|| "Could not store commit")?;
            println!("{oid}");
        }
        Commands::CatFile { oid } => {
            let object = open_current()?.cat_file(&parse_oid(oid)?)?;
            io::stdout().write_all(&object.body)?;
        }
        Commands::Checkout { tree, destination } => {
            open_current()?
                .checkout_oid(&parse_oid(tree)?, destination)
                .with_context(|| format!("Could not check out {tree}"))?;
        }
    }

    Ok(())
}
