use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chatrelay")]
#[command(author, version, about = "Web chat relay with per-session transcripts", long_about = None)]
pub struct Cli {
    /// Transcript directory (overrides `storage.log_dir`)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web chat server
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List stored sessions with their titles
    Sessions,

    /// Print the transcript of one session
    History {
        session_id: String,

        /// Only show the most recent N turns
        #[arg(short = 'n', long)]
        last: Option<usize>,
    },

    /// Send one message to a session from the terminal
    Chat { session_id: String, message: String },

    /// Delete a stored session
    Delete { session_id: String },
}
