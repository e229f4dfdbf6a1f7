use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "users-cli")]
#[command(about = "Command-line client for the users API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all users
    List {
        /// Query parameters echoed back by the server, as key=value
        #[arg(short, long, value_parser = parse_pair)]
        query: Vec<(String, String)>,
    },
    /// Check server health
    Health,
    /// Create a user
    Create { name: String, email: String },
    /// Replace the user with the given id
    Update { id: u64, name: String, email: String },
    /// Delete the user with the given id
    Delete { id: u64 },
    /// Fetch the contacts dataset
    Contacts,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::List { query } => {
            client
                .get(format!("{}/api/users", base))
                .query(&query)
                .send()
                .await?
        }
        Commands::Health => client.get(format!("{}/api/health", base)).send().await?,
        Commands::Create { name, email } => {
            client
                .post(format!("{}/api/users", base))
                .json(&json!({ "name": name, "email": email }))
                .send()
                .await?
        }
        Commands::Update { id, name, email } => {
            client
                .put(format!("{}/api/users/{}", base, id))
                .json(&json!({ "name": name, "email": email }))
                .send()
                .await?
        }
        Commands::Delete { id } => {
            client
                .delete(format!("{}/api/users/{}", base, id))
                .send()
                .await?
        }
        Commands::Contacts => client.get(format!("{}/contacts", base)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
