use clap::{Parser, Subcommand};
use reqwest::{Client, RequestBuilder};
use std::error::Error;

#[derive(Parser)]
#[command(name = "board-cli")]
#[command(about = "Board catalog CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "BOARD_CATALOG_ENDPOINT", default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct PageArgs {
    #[arg(short, long)]
    page: Option<u32>,

    #[arg(short = 's', long)]
    page_size: Option<u32>,

    #[arg(long)]
    sort_by: Option<String>,

    /// asc or desc
    #[arg(long)]
    sort_order: Option<String>,
}

impl PageArgs {
    fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            query.push(("pageSize".to_string(), page_size.to_string()));
        }
        if let Some(sort_by) = &self.sort_by {
            query.push(("sortBy".to_string(), sort_by.clone()));
        }
        if let Some(sort_order) = &self.sort_order {
            query.push(("sortOrder".to_string(), sort_order.clone()));
        }
        query
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate random boards
    Seed {
        #[arg(value_name = "NUM")]
        num: u32,
    },

    /// List boards, optionally filtered by facet values
    List {
        /// Facet filter as NAME=VALUE, e.g. size=158W
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Fuzzy search over board text fields
    Search {
        #[arg(value_name = "QUERY")]
        query: String,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Get board details
    Get {
        #[arg(value_name = "BOARD_ID")]
        id: String,
    },

    /// Delete a board
    Delete {
        #[arg(value_name = "BOARD_ID")]
        id: String,
    },

    /// Delete every board
    DeleteAll,

    /// Show facet values and counts
    Filters,

    /// Check server health
    Health,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

async fn print_response(request: RequestBuilder) -> Result<(), Box<dyn Error>> {
    let response = request.send().await?;
    let status = response.status();
    let body: serde_json::Value = response.json().await?;

    println!("{}", serde_json::to_string_pretty(&body)?);
    if !status.is_success() {
        return Err(format!("request failed with status {}", status).into());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let client = Client::new();
    let boards = format!("{}/boards", cli.endpoint.trim_end_matches('/'));

    let request = match cli.command {
        Commands::Seed { num } => client.post(format!("{}/addRandom/{}", boards, num)),

        Commands::List { filters, page } => {
            let mut query = page.query();
            query.extend(filters);
            client.get(&boards).query(&query)
        }

        Commands::Search { query: text, page } => {
            let mut query = page.query();
            query.push(("q".to_string(), text));
            client.get(format!("{}/search", boards)).query(&query)
        }

        Commands::Get { id } => client.get(format!("{}/{}", boards, id)),

        Commands::Delete { id } => client.delete(format!("{}/{}", boards, id)),

        Commands::DeleteAll => client.delete(&boards),

        Commands::Filters => client.get(format!("{}/filters", boards)),

        Commands::Health => client.get(format!("{}/health", cli.endpoint.trim_end_matches('/'))),
    };

    print_response(request).await
}
