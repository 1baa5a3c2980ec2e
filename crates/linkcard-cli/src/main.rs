//! Linkcard maintenance CLI.
//!
//! Provides the `linkcard` binary for working with the stored profile
//! record outside the server: print it, export it as JSON, import a JSON
//! snapshot, and run the links codec by hand.
//!
//! Uses the same `SnapshotClient` load/save path as the HTTP server, so a
//! record written here reads back identically through `/api/get-data`.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};

use linkcard_core::{codec, Snapshot};
use linkcard_storage::rest::DEFAULT_TABLE;
use linkcard_storage::{
    LinkEncoding, RestStore, SnapshotClient, SnapshotStore, SqliteStore, StorageError,
};

/// Linkcard profile record tools.
#[derive(Parser)]
#[command(name = "linkcard", about = "Linkcard profile record tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print a summary of the stored profile.
    Show {
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Write the stored profile as JSON.
    Export {
        #[command(flatten)]
        store: StoreArgs,

        /// Output file (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Overwrite the stored profile with a JSON snapshot.
    Import {
        #[command(flatten)]
        store: StoreArgs,

        /// Snapshot file, or `-` for stdin.
        input: String,
    },
    /// Compress and base64-encode text.
    Encode {
        /// Text to encode (default: stdin).
        text: Option<String>,
    },
    /// Reverse `encode`.
    Decode {
        /// Encoded text (default: stdin).
        text: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendKind {
    Sqlite,
    Remote,
}

/// Where the profile record lives.
#[derive(Args)]
struct StoreArgs {
    /// Storage backend.
    #[arg(long, value_enum, default_value = "sqlite")]
    backend: BackendKind,

    /// Path to the SQLite database file.
    #[arg(short, long, default_value = "linkcard.db")]
    db: String,

    /// Remote store URL (default: $SUPABASE_URL).
    #[arg(long)]
    url: Option<String>,

    /// Remote store key (default: $SUPABASE_ANON_KEY).
    #[arg(long)]
    key: Option<String>,

    /// Remote table name.
    #[arg(long, default_value = DEFAULT_TABLE)]
    table: String,

    /// Write links codec-encoded instead of as a JSON array.
    #[arg(long)]
    compress: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Show { store } => run_show(&store).await,
        Commands::Export { store, output } => run_export(&store, output).await,
        Commands::Import { store, input } => run_import(&store, &input).await,
        Commands::Encode { text } => run_codec(text, codec::try_encode),
        Commands::Decode { text } => run_codec(text, codec::try_decode),
    };
    process::exit(exit_code);
}

/// Execute the show subcommand.
///
/// Returns exit code: 0 = success, 3 = store error.
async fn run_show(args: &StoreArgs) -> i32 {
    let snapshot = match load(args).await {
        Ok(snapshot) => snapshot,
        Err(code) => return code,
    };

    println!("{}", snapshot.title);
    println!("  name:    {}", snapshot.profile.user_name);
    println!("  comment: {}", snapshot.profile.user_comment);
    println!("  icon:    {}", abbreviate(&snapshot.profile.user_icon));
    println!("  links:   {}", snapshot.links.len());
    for (index, link) in snapshot.links.iter().enumerate() {
        match &link.comment {
            Some(comment) => println!("  [{}] {} <{}> ({})", index, link.name, link.url, comment),
            None => println!("  [{}] {} <{}>", index, link.name, link.url),
        }
    }
    0
}

/// Execute the export subcommand.
///
/// Returns exit code: 0 = success, 1 = serialization error, 3 = I/O or store error.
async fn run_export(args: &StoreArgs, output: Option<PathBuf>) -> i32 {
    let snapshot = match load(args).await {
        Ok(snapshot) => snapshot,
        Err(code) => return code,
    };

    let json = match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: failed to serialize snapshot: {}", e);
            return 1;
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = fs::write(&path, json + "\n") {
                eprintln!("Error: failed to write '{}': {}", path.display(), e);
                return 3;
            }
            tracing::info!(path = %path.display(), "snapshot exported");
        }
        None => println!("{}", json),
    }
    0
}

/// Execute the import subcommand.
///
/// Returns exit code: 0 = success, 1 = invalid snapshot, 3 = I/O or store error.
async fn run_import(args: &StoreArgs, input: &str) -> i32 {
    let raw = match read_input(input) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: failed to read '{}': {}", input, e);
            return 3;
        }
    };

    let snapshot: Snapshot = match serde_json::from_str(&raw) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("Error: '{}' is not a profile snapshot: {}", input, e);
            return 1;
        }
    };

    let client = match open_client(args) {
        Ok(client) => client,
        Err(code) => return code,
    };
    match client.save(&snapshot).await {
        Ok(()) => {
            println!("Imported {} link(s) into '{}'", snapshot.links.len(), snapshot.title);
            0
        }
        Err(e) => {
            eprintln!("Error: failed to save snapshot: {}", e);
            3
        }
    }
}

/// Execute the encode or decode subcommand with the strict codec.
///
/// Returns exit code: 0 = success, 1 = codec error, 3 = I/O error.
fn run_codec<E: std::fmt::Display>(
    text: Option<String>,
    transform: impl Fn(&str) -> Result<String, E>,
) -> i32 {
    let text = match text {
        Some(text) => text,
        None => match read_input("-") {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error: failed to read stdin: {}", e);
                return 3;
            }
        },
    };

    match transform(&text) {
        Ok(out) => {
            println!("{}", out);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn load(args: &StoreArgs) -> Result<Snapshot, i32> {
    let client = open_client(args)?;
    client.load().await.map_err(|e| {
        match e {
            StorageError::NotFound => eprintln!("Error: no profile has been saved yet"),
            other => eprintln!("Error: failed to load profile: {}", other),
        }
        3
    })
}

fn open_client(args: &StoreArgs) -> Result<SnapshotClient, i32> {
    let store: Arc<dyn SnapshotStore> = match args.backend {
        BackendKind::Sqlite => match SqliteStore::new(&args.db) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                eprintln!("Error: failed to open database '{}': {}", args.db, e);
                return Err(3);
            }
        },
        BackendKind::Remote => {
            let url = args.url.clone().or_else(|| env_setting("SUPABASE_URL"));
            let key = args.key.clone().or_else(|| env_setting("SUPABASE_ANON_KEY"));
            match (url, key) {
                (Some(url), Some(key)) => Arc::new(RestStore::new(&url, &key, &args.table)),
                _ => {
                    eprintln!("Error: remote backend needs --url and --key (or SUPABASE_URL and SUPABASE_ANON_KEY)");
                    return Err(1);
                }
            }
        }
    };

    let encoding = if args.compress {
        LinkEncoding::Compressed
    } else {
        LinkEncoding::Json
    };
    Ok(SnapshotClient::new(store, encoding))
}

/// Reads `NAME`, falling back to `VITE_NAME`.
fn env_setting(name: &str) -> Option<String> {
    std::env::var(name)
        .or_else(|_| std::env::var(format!("VITE_{}", name)))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn read_input(input: &str) -> io::Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf.trim_end_matches(['\r', '\n']).to_string())
    } else {
        fs::read_to_string(input)
    }
}

/// Shortens long values such as `data:` URLs for terminal output.
fn abbreviate(value: &str) -> String {
    const MAX: usize = 60;
    if value.chars().count() <= MAX {
        value.to_string()
    } else {
        let head: String = value.chars().take(MAX).collect();
        format!("{}... ({} bytes)", head, value.len())
    }
}
