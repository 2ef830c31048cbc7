use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "users-cli")]
#[command(about = "Client for the traced users API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3333")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all users
    List,
    /// Show one user
    Get { id: i64 },
    /// Create a user
    Create {
        name: String,
        #[arg(short, long)]
        password: String,
    },
    /// Replace a user's name and password
    Update {
        id: i64,
        name: String,
        #[arg(short, long)]
        password: String,
    },
    /// Delete a user
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let users = format!("{}/users", cli.url.trim_end_matches('/'));

    let res = match cli.command {
        Commands::List => client.get(&users).send().await?,
        Commands::Get { id } => client.get(format!("{users}/{id}")).send().await?,
        Commands::Create { name, password } => {
            client
                .post(&users)
                .json(&json!({ "name": name, "password": password }))
                .send()
                .await?
        }
        Commands::Update { id, name, password } => {
            client
                .put(format!("{users}/{id}"))
                .json(&json!({ "name": name, "password": password }))
                .send()
                .await?
        }
        Commands::Delete { id } => client.delete(format!("{users}/{id}")).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if let Some(id) = res.headers().get("x-request-id").and_then(|v| v.to_str().ok()) {
        eprintln!("request id: {id}");
    }

    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let text = res.text().await?;
    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }
    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
