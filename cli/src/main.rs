//! chainwatch CLI: query a running chainwatch server from the terminal.
//!
//! Usage:
//! ```bash
//! # Last indexed height
//! chainwatch-cli getCurrentBlock
//!
//! # Start watching an address
//! chainwatch-cli subscribe 0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045
//!
//! # Transactions indexed so far for an address
//! chainwatch-cli --server http://10.0.0.5:8080 getTransactions 0xd8dA6BF2...
//! ```
//!
//! Each command prints the server's response body as-is.

use std::env;
use std::process;

use clap::{Parser, Subcommand};

const DEFAULT_PORT: &str = "8080";

#[derive(Parser, Debug)]
#[command(name = "chainwatch-cli", version, about = "Query a running chainwatch server")]
struct Cli {
    /// Server base URL [default: http://localhost:$PORT]
    #[arg(long, env = "CHAINWATCH_SERVER", global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the last indexed block height
    #[command(name = "getCurrentBlock")]
    GetCurrentBlock,
    /// Watch an address for inbound and outbound transactions
    #[command(name = "subscribe")]
    Subscribe { address: String },
    /// List transactions indexed for an address
    #[command(name = "getTransactions")]
    GetTransactions { address: String },
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let server = cli.server.unwrap_or_else(default_server);
    let base = server.trim_end_matches('/');
    let http = reqwest::Client::new();

    let result = match cli.command {
        Command::GetCurrentBlock => cmd_get_current_block(&http, base).await,
        Command::Subscribe { address } => cmd_subscribe(&http, base, &address).await,
        Command::GetTransactions { address } => {
            cmd_get_transactions(&http, base, &address).await
        }
    };

    match result {
        Ok(body) => println!("{body}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn default_server() -> String {
    let port = env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
    format!("http://localhost:{port}")
}

async fn cmd_get_current_block(http: &reqwest::Client, base: &str) -> Result<String, String> {
    let resp = http
        .get(format!("{base}/getCurrentBlock"))
        .send()
        .await
        .map_err(|e| format!("getting current block: {e}"))?;
    read_body(resp).await
}

async fn cmd_subscribe(http: &reqwest::Client, base: &str, address: &str) -> Result<String, String> {
    let resp = http
        .post(format!("{base}/subscribe"))
        .json(&serde_json::json!({ "address": address }))
        .send()
        .await
        .map_err(|e| format!("subscribing to {address}: {e}"))?;
    read_body(resp).await
}

async fn cmd_get_transactions(
    http: &reqwest::Client,
    base: &str,
    address: &str,
) -> Result<String, String> {
    let resp = http
        .get(format!("{base}/getTransactions"))
        .query(&[("address", address)])
        .send()
        .await
        .map_err(|e| format!("getting transactions for {address}: {e}"))?;
    read_body(resp).await
}

async fn read_body(resp: reqwest::Response) -> Result<String, String> {
    let body = resp
        .text()
        .await
        .map_err(|e| format!("reading response: {e}"))?;
    Ok(body.trim_end().to_string())
}
