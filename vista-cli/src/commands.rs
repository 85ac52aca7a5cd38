//! CLI command implementations

use anyhow::{Context, Result, bail};
use clap::{Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use vista_core::{
    RuntimeMode, SearchCoordinatorHandle, SearchSnapshot, SearchSource, Status, VistaConfig,
    spawn_search_coordinator,
};
use vista_search::{CitySearch, NewsCategory, NewsFeed, ProxyClient, SymbolSearch};

use crate::render::Render;

/// Searchable data domains
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Feed {
    /// City lookup for weather
    Cities,
    /// Ticker symbols
    Symbols,
    /// News articles
    News,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the API proxy
    Server {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
        /// production forwards to the providers, development serves demo data
        #[arg(long)]
        mode: Option<RuntimeMode>,
    },
    /// Run one search through the proxy and print the results
    Search {
        /// Feed to search
        feed: Feed,
        /// Query text; omit for news headlines
        query: Option<String>,
        /// News category used when no query is given
        #[arg(long)]
        category: Option<NewsCategory>,
        /// Number of pages to load
        #[arg(long, default_value = "1")]
        pages: u32,
        /// Proxy base URL
        #[arg(long)]
        proxy: Option<String>,
    },
    /// Interactive search; each line updates the query
    Repl {
        /// Feed to search
        feed: Feed,
        /// Proxy base URL
        #[arg(long)]
        proxy: Option<String>,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Server { host, port, mode } => start_server(host, port, mode).await,
        Commands::Search {
            feed,
            query,
            category,
            pages,
            proxy,
        } => {
            let client = proxy_client(proxy)?;
            let query = query.unwrap_or_default();
            let filter = category.map(|c| c.to_string());
            match feed {
                Feed::Cities => search(CitySearch::new(client), &query, filter, pages).await,
                Feed::Symbols => search(SymbolSearch::new(client), &query, filter, pages).await,
                Feed::News => search(NewsFeed::new(client), &query, filter, pages).await,
            }
        }
        Commands::Repl { feed, proxy } => {
            let client = proxy_client(proxy)?;
            match feed {
                Feed::Cities => repl(CitySearch::new(client), false).await,
                Feed::Symbols => repl(SymbolSearch::new(client), false).await,
                Feed::News => repl(NewsFeed::new(client), true).await,
            }
        }
    }
}

/// Start the proxy with environment configuration and CLI overrides.
///
/// # Errors
/// - Server could not bind or failed while running
pub async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    mode: Option<RuntimeMode>,
) -> Result<()> {
    let mut config = VistaConfig::from_env();
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(mode) = mode {
        config.runtime_mode = mode;
    }

    vista_web::run_server(config).await.map_err(|e| {
        if e.is_user_error() {
            anyhow::anyhow!(e.user_message())
        } else {
            anyhow::Error::new(e).context("Proxy server failed")
        }
    })
}

fn proxy_client(proxy: Option<String>) -> Result<ProxyClient> {
    let mut config = VistaConfig::from_env();
    if let Some(proxy) = proxy {
        config.server.proxy_url = proxy.trim_end_matches('/').to_string();
    }
    ProxyClient::from_config(&config).context("Invalid proxy configuration")
}

fn coordinator<S>(source: S) -> SearchCoordinatorHandle<S::Item>
where
    S: SearchSource + 'static,
{
    let debounce = VistaConfig::from_env().coordinator.debounce;
    let policy = source.policy().with_debounce(debounce);
    spawn_search_coordinator(source, policy)
}

/// Fetch up to `pages` pages for one query and print them.
///
/// The debounce is skipped: the query is complete when the command starts.
///
/// # Errors
/// - Query below the feed's minimum length
/// - Fetch failed
pub async fn search<S>(source: S, query: &str, filter: Option<String>, pages: u32) -> Result<()>
where
    S: SearchSource + 'static,
    S::Item: Render,
{
    let policy = source.policy();
    if !policy.accepts(query) {
        bail!(
            "Query must be at least {} characters",
            policy.min_query_len
        );
    }

    let handle = coordinator(source);
    handle.set_query(query).await?;
    handle.trigger_initial_load(filter).await?;
    let mut snapshot = settle(&handle).await?;

    while snapshot.status == Status::Idle && snapshot.has_more && snapshot.page < pages {
        handle.load_next_page().await?;
        snapshot = settle(&handle).await?;
    }

    let _ = handle.shutdown().await;

    if let Some(error) = snapshot.error {
        bail!(error);
    }
    if snapshot.items.is_empty() {
        println!("No results");
    }
    for (index, item) in snapshot.items.iter().enumerate() {
        println!("{:>3}. {}", index + 1, item.render());
    }
    if snapshot.has_more {
        println!("  ... more available, use --pages {}", snapshot.page + 1);
    }
    Ok(())
}

/// Wait until the latest issued fetch has been applied.
async fn settle<T>(handle: &SearchCoordinatorHandle<T>) -> Result<SearchSnapshot<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let generation = handle.snapshot().await?.generation;
    Ok(handle
        .wait_for(|s| s.generation == generation && s.is_settled())
        .await?)
}

/// Line-driven search: every line is a query update, as if typed.
///
/// Commands: `:more` loads the next page, `:cat NAME` switches the news
/// category, `:quit` exits.
///
/// # Errors
/// - stdin could not be read
pub async fn repl<S>(source: S, has_categories: bool) -> Result<()>
where
    S: SearchSource + 'static,
    S::Item: Render,
{
    let handle = coordinator(source);
    let printer = tokio::spawn(print_updates(handle.clone()));

    if has_categories {
        handle
            .trigger_initial_load(Some(NewsCategory::default().to_string()))
            .await?;
    }

    println!("Type to search; :more, :cat NAME, :quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match line.trim() {
            ":quit" | ":q" => break,
            ":more" => handle.load_next_page().await?,
            command if command.starts_with(":cat") => {
                if !has_categories {
                    println!("This feed has no categories");
                    continue;
                }
                match command.trim_start_matches(":cat").trim().parse::<NewsCategory>() {
                    Ok(category) => {
                        handle.set_query("").await?;
                        handle.trigger_initial_load(Some(category.to_string())).await?;
                    }
                    Err(message) => println!("{message}"),
                }
            }
            _ => handle.set_query(line.as_str()).await?,
        }
    }

    handle.shutdown().await?;
    let _ = printer.await;
    Ok(())
}

/// Print each settled state once.
async fn print_updates<T>(handle: SearchCoordinatorHandle<T>)
where
    T: Render + Clone + Send + Sync + 'static,
{
    let mut updates = handle.subscribe();
    let mut last_shown: Option<(u64, usize, Status)> = None;

    while updates.changed().await.is_ok() {
        let snapshot = updates.borrow_and_update().clone();
        let key = (snapshot.generation, snapshot.items.len(), snapshot.status);
        if last_shown == Some(key) {
            continue;
        }

        match snapshot.status {
            Status::Loading => println!("Searching..."),
            Status::LoadingMore => println!("Loading page {}...", snapshot.page + 1),
            Status::Error => {
                println!("Error: {}", snapshot.error.as_deref().unwrap_or("unknown"))
            }
            Status::Idle if snapshot.items.is_empty() => {
                if snapshot.generation > 0 && last_shown.is_some() {
                    println!("(no results)");
                }
            }
            Status::Idle => {
                println!("-- {} results, page {} --", snapshot.items.len(), snapshot.page);
                for (index, item) in snapshot.items.iter().enumerate() {
                    println!("{:>3}. {}", index + 1, item.render());
                }
                if snapshot.has_more {
                    println!("   (:more for the next page)");
                }
            }
        }
        last_shown = Some(key);
    }
}
