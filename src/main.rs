//! Deal title parsing CLI.
//!
//! Parses deal titles given on the command line or stdin, or builds a deals
//! listing from an RSS feed file with an optional on-disk cache. Results go to
//! stdout as JSON; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dealparse::cache::now_millis;
use dealparse::{
    DealCache, DealRequest, DealService, FeedSource, FileFeedSource, ParsedTitle,
    StaticFeedSource, TitleParser, DEFAULT_ITEM_LIMIT, DEFAULT_MODE,
};

/// Deal Title Parser
///
/// Split deal listing titles into name, price and note.
/// Titles are read from the arguments, or one per line from stdin.
/// Use the 'feed' subcommand to process a deals RSS feed.
#[derive(Parser)]
#[command(name = "dealparse")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Deal titles to parse (reads stdin when omitted)
    #[arg(value_name = "TITLE")]
    titles: Vec<String>,

    /// Print one JSON object per line instead of a JSON array
    #[arg(long)]
    lines: bool,

    /// Enable verbose logging (matched rules, cache activity)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a deals listing from an RSS feed
    Feed {
        /// RSS feed file ('-' for stdin)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Feed mode, used as the response cache key
        #[arg(short, long, default_value = DEFAULT_MODE)]
        mode: String,

        /// Maximum number of feed items to read
        #[arg(short, long, default_value_t = DEFAULT_ITEM_LIMIT)]
        limit: usize,

        /// JSON cache file (created if missing)
        #[arg(short, long, value_name = "FILE")]
        cache: Option<PathBuf>,

        /// Ignore any cached response for this mode
        #[arg(long)]
        bypass_response_cache: bool,

        /// Re-parse every title instead of using cached results
        #[arg(long)]
        bypass_title_cache: bool,
    },
}

fn init_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dealparse=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dealparse=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal())
                .with_target(false)
                .compact(),
        )
        .init();
}

/// Command handler for both modes.
struct DealHandler {
    parser: TitleParser,
}

impl DealHandler {
    fn new() -> Self {
        Self {
            parser: TitleParser::new(),
        }
    }

    /// Parses titles and prints the results.
    fn parse_titles(&self, titles: &[String], lines: bool) -> Result<()> {
        let results: Vec<ParsedTitle> = titles
            .iter()
            .map(|title| {
                let trace = self.parser.trace(title);
                debug!(
                    title = %title,
                    trailing = ?trace.trailing_rules,
                    price = ?trace.price_rule,
                    post_price = ?trace.post_price_rule,
                    "parsed title"
                );
                trace.parsed
            })
            .collect();

        if lines {
            for parsed in &results {
                println!("{}", serde_json::to_string(parsed)?);
            }
        } else {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }

        Ok(())
    }

    /// Builds the deals listing for a feed and prints it.
    fn feed(&self, input: &Path, request: DealRequest, cache_path: Option<&Path>) -> Result<()> {
        let source: Box<dyn FeedSource> = if input == Path::new("-") {
            let mut document = String::new();
            io::stdin()
                .read_to_string(&mut document)
                .context("Failed to read feed from stdin")?;
            Box::new(StaticFeedSource::new(document))
        } else {
            if !input.exists() {
                anyhow::bail!("Input file does not exist: {}", input.display());
            }
            Box::new(FileFeedSource::new(input))
        };

        let mut cache = match cache_path {
            Some(path) => DealCache::load(path)
                .with_context(|| format!("Failed to load cache {}", path.display()))?,
            None => DealCache::new(),
        };

        let service = DealService::new(source);
        let response = service
            .ingest(&request, &mut cache, now_millis())
            .with_context(|| "Feed processing failed")?;

        info!(
            status = %response.cache_status,
            deals = response.deals.len(),
            "served feed"
        );

        if let Some(path) = cache_path {
            cache
                .save(path)
                .with_context(|| format!("Failed to write cache {}", path.display()))?;
        }

        println!("{}", serde_json::to_string_pretty(&response.deals)?);
        Ok(())
    }
}

/// Reads non-empty lines from stdin.
fn read_titles(reader: impl BufRead) -> Result<Vec<String>> {
    let mut titles = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read titles from stdin")?;
        if !line.trim().is_empty() {
            titles.push(line);
        }
    }
    Ok(titles)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    let handler = DealHandler::new();

    match cli.command {
        Some(Commands::Feed {
            input,
            mode,
            limit,
            cache,
            bypass_response_cache,
            bypass_title_cache,
        }) => {
            let request = DealRequest {
                mode,
                bypass_response_cache,
                bypass_title_cache,
                limit,
            };
            handler.feed(&input, request, cache.as_deref())?;
        }
        None => {
            let titles = if cli.titles.is_empty() {
                read_titles(io::stdin().lock())?
            } else {
                cli.titles
            };
            handler.parse_titles(&titles, cli.lines)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_titles_skips_blank_lines() {
        let input = "Game $10\n\n   \nFree Thing Free\n";
        let titles = read_titles(input.as_bytes()).unwrap();
        assert_eq!(titles, vec!["Game $10", "Free Thing Free"]);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
