//! betblock: CLI for refreshing, inspecting and exporting the gambling blocklist.

use betblock::blocker::{connect, Blocker, BlockerConfig};
use betblock::converter::{to_content_blocker_rules, to_domain_list};
use betblock::{BlocklistCache, BlocklistUpdater, FileStore, Settings, UpdateOutcome};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::UNIX_EPOCH;

#[derive(Parser)]
#[command(name = "betblock")]
#[command(author = "BetHunter")]
#[command(version = "0.1.0")]
#[command(about = "Maintain the BetHunter gambling blocklist", long_about = None)]
struct Cli {
    /// YAML settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the blocklist, falling back to the cached copy
    Update {
        /// Update even if the update interval has not elapsed
        #[arg(short, long)]
        force: bool,
    },

    /// Show blocker state and cached list details
    Status,

    /// Enable blocking with the cached and custom domains
    Enable,

    /// Disable blocking (cached domains are kept)
    Disable,

    /// Add a custom domain
    AddDomain {
        /// Domain to block
        domain: String,
    },

    /// Add a custom app identifier
    AddApp {
        /// App package or bundle identifier
        app_id: String,
    },

    /// Export the blocklist for an enforcement mechanism
    Export {
        /// Output shape
        #[arg(short, long, value_enum, default_value = "domains")]
        format: ExportFormat,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List blocked access attempts
    Attempts,

    /// Show permission state
    Permissions {
        /// Prompt for permissions instead of only checking
        #[arg(short, long)]
        request: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// One domain per line
    Domains,
    /// Content-blocker JSON rules
    ContentBlocker,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let store = Arc::new(FileStore::open(&settings.cache_dir)?);
    let cache = BlocklistCache::with_prefix(store, settings.key_prefix.clone());
    // No platform enforcement is reachable from a CLI
    let blocker = connect(cache.clone(), None);

    match cli.command {
        Commands::Update { force } => update(&settings, &cache, blocker.as_ref(), force),
        Commands::Status => status(&cache, blocker.as_ref()),
        Commands::Enable => {
            let config = BlockerConfig {
                enabled: true,
                domains: cache.effective_domains().to_sorted_vec(),
                apps: cache.custom_apps(),
            };
            let ok = blocker.enable(&config)?;
            println!(
                "Blocking {} ({} domains, {} apps)",
                if ok { "enabled" } else { "could not be enabled" },
                config.domains.len(),
                config.apps.len()
            );
            Ok(())
        }
        Commands::Disable => {
            blocker.disable()?;
            println!("Blocking disabled");
            Ok(())
        }
        Commands::AddDomain { domain } => {
            if blocker.add_custom_domain(&domain)? {
                println!("Added {}", domain.trim().to_lowercase());
            } else {
                println!("{} is already blocked", domain.trim().to_lowercase());
            }
            Ok(())
        }
        Commands::AddApp { app_id } => {
            if blocker.add_custom_app(&app_id)? {
                println!("Added {}", app_id.trim());
            } else {
                println!("{} is already blocked", app_id.trim());
            }
            Ok(())
        }
        Commands::Export { format, output } => export(&cache, format, output),
        Commands::Attempts => {
            let attempts = blocker.blocked_attempts()?;
            if attempts.is_empty() {
                println!("No blocked attempts recorded");
            }
            for attempt in attempts {
                let ms = attempt
                    .timestamp
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_millis();
                println!("{} {} via {}", ms, attempt.target, attempt.layer);
            }
            Ok(())
        }
        Commands::Permissions { request } => {
            let perms = if request {
                blocker.request_permissions()?
            } else {
                blocker.check_permissions()?
            };
            println!("vpn:           {}", perms.vpn);
            println!("accessibility: {}", perms.accessibility);
            println!("usage_stats:   {}", perms.usage_stats);
            println!("notifications: {}", perms.notifications);
            Ok(())
        }
    }
}

fn update(settings: &Settings, cache: &BlocklistCache, blocker: &dyn Blocker, force: bool) -> CliResult {
    let updater = BlocklistUpdater::from_settings(settings, cache.clone());

    let outcome = if force {
        updater.update_with_fallback()
    } else {
        match updater.update_if_needed() {
            Ok(Some(outcome)) => Ok(outcome),
            Ok(None) => {
                println!(
                    "Blocklist is up to date ({} domains), use --force to update anyway",
                    cache.domains().len()
                );
                return Ok(());
            }
            Err(e) => Err(e),
        }
    };

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => return Err(format!("no blocklist has ever been downloaded: {}", e).into()),
    };
    println!("{}", outcome);

    if let UpdateOutcome::Fresh(_) = outcome {
        if blocker.status()?.active {
            let domains = cache.effective_domains().to_sorted_vec();
            blocker.update_blocklist(&domains)?;
        }
    }
    Ok(())
}

fn status(cache: &BlocklistCache, blocker: &dyn Blocker) -> CliResult {
    let status = blocker.status()?;
    let record = cache.record();

    let layers: Vec<&str> = status.layers.iter().map(|l| l.as_str()).collect();
    println!("Active:         {}", status.active);
    println!("Layers:         {}", layers.join(", "));
    println!("Cached domains: {}", record.domains.len());
    match record.last_updated_at {
        Some(time) => {
            let ms = time.duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
            println!("Last updated:   {} (ms since epoch)", ms);
        }
        None => println!("Last updated:   never"),
    }
    println!("Custom domains: {}", cache.custom_domains().len());
    println!("Custom apps:    {}", cache.custom_apps().len());
    Ok(())
}

fn export(cache: &BlocklistCache, format: ExportFormat, output: Option<PathBuf>) -> CliResult {
    let domains = cache.effective_domains();

    let content = match format {
        ExportFormat::Domains => {
            let mut list = to_domain_list(&domains);
            list.sort_unstable();
            let mut text = list.join("\n");
            text.push('\n');
            text
        }
        ExportFormat::ContentBlocker => {
            let rules = to_content_blocker_rules(&domains);
            if rules.len() < domains.len() {
                eprintln!(
                    "Warning: {} of {} domains exported (rule limit)",
                    rules.len(),
                    domains.len()
                );
            }
            serde_json::to_string_pretty(&rules)?
        }
    };

    match output {
        Some(path) => {
            fs::write(&path, content)?;
            println!("Exported {} domains to {:?}", domains.len(), path);
        }
        None => print!("{}", content),
    }
    Ok(())
}
