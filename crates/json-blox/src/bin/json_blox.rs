//! `json-blox` - inspect, edit and share JSON documents as collapsible rows.
//!
//! Usage:
//!   json-blox rows <file> [--expand-all]
//!   json-blox search <file> <keyword>...
//!   json-blox edit <file> --path <root.a.b> [--key <key>] --value <text> [--in-place]
//!   json-blox share <file> [--frozen <file>] [--tab <0|1|2>] [--store <dir>]
//!   json-blox resolve <id-or-link> [--store <dir>]
//!
//! Settings come from `--config` or `JSON_BLOX_CONFIG` (default
//! `json-blox.toml`). Logs go to stderr, filtered by `RUST_LOG`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use json_blox::search::display_text;
use json_blox::{
    compute_matches, flatten, parse_editor_text, to_editor_text, CollapseState, Config, DirStore,
    Error, LaunchParams, NodePath, Row, ShareCodec, Session, ViewTab,
};

#[derive(Parser, Debug)]
#[command(
    name = "json-blox",
    about = "Inspect, edit and share JSON documents as collapsible rows."
)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true, env = "JSON_BLOX_CONFIG", default_value = "json-blox.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the flattened rows of a document.
    Rows {
        file: PathBuf,
        /// Show every container expanded.
        #[arg(long)]
        expand_all: bool,
    },
    /// Print the paths of rows matching any keyword.
    Search {
        file: PathBuf,
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// Edit one node and print the resulting document.
    Edit {
        file: PathBuf,
        /// Dotted display path, e.g. `root.features.editor`.
        #[arg(long)]
        path: String,
        /// New key; defaults to the current one.
        #[arg(long)]
        key: Option<String>,
        /// Raw value text, parsed like the inline value field.
        #[arg(long)]
        value: String,
        /// Write the result back to `file`.
        #[arg(long)]
        in_place: bool,
    },
    /// Store a document (and optional frozen original) and print its link.
    Share {
        file: PathBuf,
        #[arg(long)]
        frozen: Option<PathBuf>,
        /// Tab index recorded in the link (0 blocks, 1 editor, 2 diff).
        #[arg(long, default_value_t = 0)]
        tab: u8,
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Print the documents behind a share id or link.
    Resolve {
        id_or_url: String,
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("json-blox: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let default_level = "warn";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> Result<(), Error> {
    let config = Config::load(&cli.config)?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Command::Rows { file, expand_all } => {
            let doc = read_document(&file).await?;
            let collapsed = if expand_all {
                CollapseState::expanded()
            } else {
                CollapseState::collapsed_all(&doc)
            };
            for row in flatten(&doc, &collapsed) {
                println!("{}", render_row(&row));
            }
        }
        Command::Search { file, keywords } => {
            let doc = read_document(&file).await?;
            let rows = flatten(&doc, &CollapseState::expanded());
            for path in compute_matches(&rows, &keywords, "") {
                println!("{path}");
            }
        }
        Command::Edit {
            file,
            path,
            key,
            value,
            in_place,
        } => {
            let doc = read_document(&file).await?;
            let target =
                NodePath::resolve(&doc, &path).ok_or_else(|| Error::UnknownPath(path.clone()))?;
            let key = match key {
                Some(key) => key,
                None => target.last().map(ToString::to_string).unwrap_or_default(),
            };
            let mut session = Session::with_document(config, doc);
            session.edit_node(&target, &key, &value)?;
            let text = to_editor_text(session.document());
            if in_place {
                tokio::fs::write(&file, format!("{text}\n")).await?;
            } else {
                println!("{text}");
            }
        }
        Command::Share {
            file,
            frozen,
            tab,
            store,
        } => {
            let live = read_document(&file).await?;
            let frozen = match frozen {
                Some(path) => Some(read_document(&path).await?),
                None => None,
            };
            let mut session = Session::with_document(config.clone(), live);
            session.set_tab(ViewTab::from_index(tab).unwrap_or_default());
            session.set_frozen(frozen);
            let codec = codec_for(&config, store);
            println!("{}", session.share(&codec).await?);
        }
        Command::Resolve { id_or_url, store } => {
            let id = match LaunchParams::from_url(&id_or_url) {
                Ok(LaunchParams { share: Some(id), .. }) => id,
                _ => id_or_url,
            };
            let shared = codec_for(&config, store).resolve(&id).await?;
            let out = json!({
                "frozen": shared.frozen,
                "live": shared.live,
                "createdAt": shared.created_at.to_rfc3339(),
            });
            println!("{}", to_editor_text(&out));
        }
    }
    Ok(())
}

fn codec_for(config: &Config, store: Option<PathBuf>) -> ShareCodec<DirStore> {
    let dir = store.unwrap_or_else(|| config.share.store_dir.clone());
    ShareCodec::with_ttl(DirStore::new(dir), config.share.ttl())
}

async fn read_document(path: &Path) -> Result<Value, Error> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(parse_editor_text(&text)?)
}

fn render_row(row: &Row<'_>) -> String {
    let indent = "  ".repeat(row.level());
    let marker = match (row.kind().is_container(), row.is_expanded()) {
        (false, _) => " ",
        (true, true) => "-",
        (true, false) => "+",
    };
    let summary = match row.value() {
        Value::Object(map) => format!("{{{}}}", map.len()),
        Value::Array(items) => format!("[{}]", items.len()),
        Value::String(s) => format!("{s:?}"),
        other => display_text(other),
    };
    format!("{indent}{marker} {}: {summary}", row.label())
}
