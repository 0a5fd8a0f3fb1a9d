use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the object database
    Init {
        /// Root path
        root_path: Option<PathBuf>,
    },

    /// Compute the blob id of a file
    HashObject {
        /// Store the blob as a loose object
        #[arg(short, long)]
        write: bool,

        /// Path
        path: PathBuf,
    },

    /// Store the workspace as a tree and print its id
    WriteTree {},

    /// Create a commit object for a tree
    CommitTree {
        /// Tree id
        tree: String,

        /// Parent commit ids, in order
        #[arg(short, long = "parent")]
        parents: Vec<String>,

        /// Commit message
        #[arg(short, long)]
        message: String,
    },

    /// Print the body of a stored object
    CatFile {
        /// Object id
        oid: String,
    },

    /// Write the files of a stored tree under a directory
    Checkout {
        /// Tree id
        tree: String,

        /// Destination directory
        destination: PathBuf,
    },
}
