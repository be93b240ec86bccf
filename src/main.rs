use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use log::{debug, info};

use github_dataset_fetcher::{
    DEFAULT_SEARCH_FILTER, FetcherConfig, GITHUB_API_ENDPOINT, GITHUB_RAW_CONTENT_ENDPOINT,
    JsonFilePersister, PhaseParallelCrawler, RepositoryCrawler, RepositoryFetcher,
    RepositoryOutputFormat, RepositoryPersister, ReqwestTransport, RestFetcher, SearchQuery,
    SequentialCrawler, StdResult, TransportRateLimitEnforcer, transform_dataset,
    transform_document,
};

/// Command line arguments for the GitHub dataset fetcher
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetches a list of repositories from GitHub
    Fetch(FetchArgs),

    /// Transforms a collected dataset to a JSON object per line
    TransformDoc {
        /// Path to input JSON
        #[arg(long)]
        input: PathBuf,

        /// Path to output JSON
        #[arg(long)]
        output: PathBuf,
    },

    /// Emits the documents and labels text files of a JSON-lines dataset
    TransformDataset {
        /// Path to input JSON lines
        #[arg(long)]
        input: PathBuf,

        /// Directory to output files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct FetchArgs {
    /// Number of repositories to fetch
    #[arg(value_name = "NUM_TO_FETCH", value_parser = clap::value_parser!(u32).range(1..))]
    num_to_fetch: u32,

    /// GitHub token
    #[arg(long, env = "GITHUB_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitHub query string override
    #[arg(long, default_value = DEFAULT_SEARCH_FILTER)]
    query: String,

    /// Fetch topics and README concurrently
    #[arg(long)]
    parallel: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Omit null members from the JSON output
    #[arg(long)]
    omit_nulls: bool,

    /// JSON output path
    #[arg(long, default_value = "output.json")]
    output: PathBuf,

    /// Number of repositories per search page (GitHub default when unset)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    per_page: Option<u8>,

    /// GitHub REST API root URL
    #[arg(long, default_value = GITHUB_API_ENDPOINT)]
    api_url: String,

    /// GitHub raw content root URL
    #[arg(long, default_value = GITHUB_RAW_CONTENT_ENDPOINT)]
    raw_content_url: String,
}

#[tokio::main]
async fn main() -> StdResult<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Fetch(fetch_args) => fetch(fetch_args).await,
        Command::TransformDoc { input, output } => {
            transform_document(&input, &output)?;

            Ok(())
        }
        Command::TransformDataset { input, output_dir } => {
            transform_dataset(&input, &output_dir)?;

            Ok(())
        }
    }
}

async fn fetch(args: FetchArgs) -> StdResult<()> {
    info!("Starting GitHub fetching");
    let config = FetcherConfig::new(&args.api_url, &args.raw_content_url)
        .with_token(args.token.clone())
        .with_per_page(args.per_page);
    let query = SearchQuery::new(&args.query);
    debug!("Search query: {query}");

    let crawler = build_crawler(config, query, args.parallel)?;
    let enriched_repositories = crawler.crawl(args.num_to_fetch).await?;
    let records = enriched_repositories
        .iter()
        .map(RepositoryOutputFormat::from)
        .collect::<Vec<_>>();

    let persister = JsonFilePersister::new(&args.output, args.pretty, !args.omit_nulls);
    persister.persist(&records).await?;
    info!("Fetching completed");

    Ok(())
}

fn build_crawler(
    config: FetcherConfig,
    query: SearchQuery,
    parallel: bool,
) -> StdResult<Arc<dyn RepositoryCrawler>> {
    let transport = Arc::new(TransportRateLimitEnforcer::new(Arc::new(
        ReqwestTransport::try_new()?,
    )));
    let fetcher: Arc<dyn RepositoryFetcher> = Arc::new(RestFetcher::new(transport, config));

    Ok(if parallel {
        Arc::new(PhaseParallelCrawler::new(fetcher, query))
    } else {
        Arc::new(SequentialCrawler::new(fetcher, query))
    })
}
