use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use c9s::api::{
  ApiClient, CloneDomainPayload, CreateDomainPayload, DomainType, ImportZonePayload, Params,
  UpdateDomainPayload,
};
use c9s::cache::{CacheLayer, CacheStore, MemoryStore, NoopStore};
use c9s::config::Config;
use c9s::queries::{DomainQueries, TypeQueries};

#[derive(Parser, Debug)]
#[command(name = "c9s")]
#[command(about = "A terminal client for cloud domains and instance types")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/c9s/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Bypass the query cache
  #[arg(long)]
  no_cache: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Manage DNS domains
  #[command(subcommand)]
  Domains(DomainsCommand),
  /// Inspect compute instance types
  #[command(subcommand)]
  Types(TypesCommand),
}

#[derive(Subcommand, Debug)]
enum DomainsCommand {
  /// List one page of domains
  List {
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    page_size: Option<u32>,
  },
  /// List every domain on the account
  All,
  /// Show a single domain
  Get { id: u64 },
  /// List every record of a domain
  Records { id: u64 },
  /// Create a domain
  Create {
    domain: String,
    /// master or slave
    #[arg(long, default_value = "master")]
    zone_type: String,
    #[arg(long)]
    soa_email: Option<String>,
  },
  /// Update a domain
  Update {
    id: u64,
    #[arg(long)]
    domain: Option<String>,
    #[arg(long)]
    soa_email: Option<String>,
    #[arg(long)]
    description: Option<String>,
  },
  /// Delete a domain
  Delete { id: u64 },
  /// Clone a domain's records onto a new domain
  Clone { id: u64, new_domain: String },
  /// Import a zone from a remote nameserver
  Import {
    domain: String,
    remote_nameserver: String,
  },
}

#[derive(Subcommand, Debug)]
enum TypesCommand {
  /// List the full instance type catalogue
  All,
  /// Show one or more instance types by id
  Get { ids: Vec<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let config = Config::load(args.config.as_deref())?;
  let api = ApiClient::new(&config)?;

  if args.no_cache || !config.cache.enabled {
    run(args.command, api, CacheLayer::new(NoopStore)).await
  } else {
    let stale_time = chrono::Duration::minutes(config.cache.stale_minutes);
    let cache = CacheLayer::new(MemoryStore::new()).with_stale_time(stale_time);
    run(args.command, api, cache).await
  }
}

async fn run<S: CacheStore>(command: Command, api: ApiClient, cache: CacheLayer<S>) -> Result<()> {
  match command {
    Command::Domains(cmd) => {
      let domains = DomainQueries::new(api, cache);
      match cmd {
        DomainsCommand::List { page, page_size } => {
          let params = Params { page, page_size };
          print_json(&domains.paginated(params, None).await?)
        }
        DomainsCommand::All => print_json(&domains.all().await?),
        DomainsCommand::Get { id } => print_json(&domains.get(id).await?),
        DomainsCommand::Records { id } => print_json(&domains.records(id).await?),
        DomainsCommand::Create {
          domain,
          zone_type,
          soa_email,
        } => {
          let payload = CreateDomainPayload {
            domain,
            kind: parse_domain_type(&zone_type)?,
            soa_email,
            master_ips: Vec::new(),
            tags: Vec::new(),
          };
          print_json(&domains.create(&payload).await?)
        }
        DomainsCommand::Update {
          id,
          domain,
          soa_email,
          description,
        } => {
          let payload = UpdateDomainPayload {
            domain,
            soa_email,
            description,
            ..Default::default()
          };
          print_json(&domains.update(id, &payload).await?)
        }
        DomainsCommand::Delete { id } => {
          domains.delete(id).await?;
          println!("Deleted domain {}", id);
          Ok(())
        }
        DomainsCommand::Clone { id, new_domain } => {
          let payload = CloneDomainPayload { domain: new_domain };
          print_json(&domains.clone_domain(id, &payload).await?)
        }
        DomainsCommand::Import {
          domain,
          remote_nameserver,
        } => {
          let payload = ImportZonePayload {
            domain,
            remote_nameserver,
          };
          print_json(&domains.import_zone(&payload).await?)
        }
      }
    }
    Command::Types(cmd) => {
      let types = TypeQueries::new(api, cache);
      match cmd {
        TypesCommand::All => print_json(&types.all().await?),
        TypesCommand::Get { ids } => print_json(&types.specific(&ids).await?),
      }
    }
  }
}

fn parse_domain_type(value: &str) -> Result<DomainType> {
  match value {
    "master" => Ok(DomainType::Master),
    "slave" => Ok(DomainType::Slave),
    other => Err(eyre!(
      "Unknown domain type '{}': expected master or slave",
      other
    )),
  }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
  let rendered =
    serde_json::to_string_pretty(value).map_err(|e| eyre!("Failed to render output: {}", e))?;
  println!("{}", rendered);
  Ok(())
}
