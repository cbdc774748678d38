use std::sync::Arc;

use clap::{Parser, Subcommand};

use pkdseek::cache::QueryCache;
use pkdseek::client::PkdClient;
use pkdseek::config::CONFIG;
use pkdseek::controller::{Dispatch, SearchController, SearchState};
use pkdseek::models::{PkdCode, SearchResults};
use pkdseek::samples;
use pkdseek::store::MemorySessionStore;

#[derive(Parser)]
#[command(name = "pkdseek", about = "Wyszukiwarka kodów PKD", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find PKD codes matching a free-text business description
    Search {
        /// Description of the business activity, e.g. "sprzedaż odzieży"
        description: Vec<String>,
    },
    /// Browse sample PKD codes
    Samples {
        /// How many sample codes to fetch
        #[arg(long, default_value_t = samples::DEFAULT_LIMIT)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber (warnings only, stdout is for results)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let client = PkdClient::new(CONFIG.base_url.clone());

    match cli.command {
        Command::Search { description } => {
            let text = description.join(" ");
            let store = Arc::new(MemorySessionStore::new());
            let controller = Arc::new(SearchController::new(client, QueryCache::new(), store));

            match controller.clone().search(&text) {
                Dispatch::Ignored => {
                    println!("Opisz swoją działalność, aby wyszukać kody PKD.");
                    return Ok(());
                }
                Dispatch::CacheHit => {}
                Dispatch::Spawned(handle) => handle.await?,
            }

            match controller.current_state() {
                SearchState::Succeeded { results, .. } => print_results(&results),
                SearchState::Failed { message, .. } => println!("{message}"),
                _ => {}
            }
        }
        Command::Samples { limit } => {
            let codes = samples::samples_or_fallback(&client, limit).await;
            println!("Przykładowe kody PKD\n");
            for code in &codes {
                print_code(code, true);
            }
        }
    }

    Ok(())
}

fn print_results(results: &SearchResults) {
    let suggestion = &results.ai_suggestion;
    println!(
        "Sugerowany kod PKD (Trafność: {}%)\n",
        suggestion.score_percent()
    );
    print_code(suggestion, false);

    let others: Vec<&PkdCode> = results.other_matches().collect();
    if !others.is_empty() {
        println!("Pozostałe pasujące kody\n");
        for code in others {
            print_code(code, true);
        }
    }
}

fn print_code(code: &PkdCode, with_score: bool) {
    println!(
        "  {}  {}",
        code.payload.grupa_klasa_podklasa, code.payload.nazwa_grupowania
    );
    if !code.payload.opis_dodatkowy.is_empty() {
        println!("      {}", code.payload.opis_dodatkowy);
    }
    if with_score {
        println!("      Trafność: {}%", code.score_percent());
    }
    println!();
}
