//! # GradBot: graduation countdown bot
//!
//! Usage:
//!   gradbot                          # Run the bot (same as `gradbot run`)
//!   gradbot run --dry-run            # Log notifications instead of sending them
//!   gradbot countdown                # Print the countdown and exit
//!   gradbot init                     # Write a default config file
//!   gradbot check-config             # Validate the config and exit

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use gradbot_channels::{DiscordChannel, DiscordWebhook, LogNotifier};
use gradbot_core::{GradBotConfig, Notifier, SystemClock};
use gradbot_scheduler::calendar::GraduationCalendar;
use gradbot_scheduler::{GradBot, MilestoneTracker, cron};

#[derive(Parser)]
#[command(name = "gradbot", version, about = "🎓 GradBot: graduation countdown bot for Discord")]
struct Cli {
    /// Config file (default: ~/.gradbot/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the scheduler, the Discord notifier and the dashboard API
    Run {
        /// Log notifications instead of sending them; no token needed
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the current countdown
    Countdown {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate the config file
    CheckConfig,
}

fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config
        .as_deref()
        .map(expand_path)
        .unwrap_or_else(GradBotConfig::default_path)
}

fn load_config(cli: &Cli) -> Result<GradBotConfig> {
    let path = config_path(cli);
    let mut config = if path.exists() {
        GradBotConfig::load_from(&path)
            .with_context(|| format!("failed to load {}", path.display()))?
    } else {
        tracing::debug!("No config at {}, using defaults", path.display());
        GradBotConfig::default()
    };
    config.apply_env_overrides();
    Ok(config)
}

fn init_logging(cli: &Cli) {
    let filter = if cli.verbose {
        "gradbot=debug,gradbot_scheduler=debug,gradbot_channels=debug,gradbot_gateway=debug,tower_http=debug"
    } else {
        "gradbot=info,gradbot_scheduler=info,gradbot_channels=info,gradbot_gateway=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.command {
        None => run(&cli, false).await,
        Some(Commands::Run { dry_run }) => run(&cli, dry_run).await,
        Some(Commands::Countdown { json }) => countdown(&cli, json),
        Some(Commands::Init { force }) => init(&cli, force),
        Some(Commands::CheckConfig) => check_config(&cli),
    }
}

async fn run(cli: &Cli, dry_run: bool) -> Result<()> {
    let config = load_config(cli)?;
    if !dry_run {
        config.require_credentials()?;
    }

    let discord = (!dry_run && config.bot.webhook_url.is_empty())
        .then(|| Arc::new(DiscordChannel::new(&config.bot.token)));
    let notifier: Arc<dyn Notifier> = if dry_run {
        tracing::info!("🧪 Dry run: notifications go to the log");
        Arc::new(LogNotifier::new())
    } else if let Some(discord) = &discord {
        discord.clone()
    } else {
        Arc::new(DiscordWebhook::new(&config.bot.webhook_url))
    };

    let bot = Arc::new(GradBot::new(config.clone(), notifier, Arc::new(SystemClock))?);
    tracing::info!(
        "🎓 GradBot ready: {} days until {}",
        bot.scheduler().calendar().days_left(bot.scheduler().now()),
        config.graduation.date
    );

    if let Some(discord) = discord {
        let application_id = config.bot.application_id.clone();
        tokio::spawn(async move {
            let app_id = if application_id.is_empty() {
                discord.application_id().await
            } else {
                Ok(application_id)
            };
            let registered = match app_id {
                Ok(id) => discord.register_commands(&id).await,
                Err(e) => Err(e),
            };
            if let Err(e) = registered {
                tracing::warn!("⚠️ Slash command registration failed: {e}");
            }
        });
    }

    bot.start();

    let shutdown = CancellationToken::new();
    let gateway = config.gateway.enabled.then(|| {
        let gateway_config = config.gateway.clone();
        let bot = bot.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = gradbot_gateway::start(&gateway_config, bot, shutdown).await {
                tracing::error!("❌ Gateway server failed: {e}");
            }
        })
    });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    tracing::info!("🛑 Shutting down...");

    bot.stop();
    shutdown.cancel();
    if let Some(handle) = gateway {
        handle.await.ok();
    }
    Ok(())
}

fn countdown(cli: &Cli, json: bool) -> Result<()> {
    let config = load_config(cli)?;
    config.validate()?;
    let calendar = GraduationCalendar::from_config(&config.graduation)?;
    let tracker = MilestoneTracker::new(
        config.graduation.milestones.clone(),
        config.graduation.milestone_trigger,
    );

    let now = chrono::Utc::now();
    let c = calendar.countdown(now);
    let progress = calendar.progress(now);
    let next = tracker.next(c.days);

    if json {
        let out = serde_json::json!({
            "target_date": calendar.target_date(),
            "countdown": c,
            "progress": progress,
            "next_milestone": next,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("🎓 Graduation: {}\n", calendar.target_date());
    println!("   📅 Days:        {}", c.days);
    println!("   📚 School days: {}", c.school_days);
    println!("   📝 Weeks:       {}", c.weeks);
    println!("   🗓️  Months:      {}", c.months);
    println!("\n   {} {}%", progress.bar, progress.percentage);
    match next {
        Some(n) => println!("\n   🎯 Next milestone: {} days (in {} days)", n.threshold, n.days_until),
        None => println!("\n   🎉 All milestones passed!"),
    }
    Ok(())
}

fn init(cli: &Cli, force: bool) -> Result<()> {
    let path = config_path(cli);
    if path.exists() && !force {
        println!("⚠️  {} already exists (use --force to overwrite)", path.display());
        return Ok(());
    }
    GradBotConfig::default().save_to(&path)?;
    println!("✅ Wrote default config to {}", path.display());
    println!("   Set [bot] token and user_id, or BOT_TOKEN and USER_ID.");
    Ok(())
}

fn check_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    config.validate()?;

    let schedule = &config.schedule;
    for (name, expr) in [
        ("daily", &schedule.daily),
        ("milestone", &schedule.milestone),
        ("reminder", &schedule.reminder),
    ] {
        anyhow::ensure!(cron::is_valid(expr), "invalid {name} cron expression: '{expr}'");
    }

    match config.require_credentials() {
        Ok(()) => println!("✅ Credentials present"),
        Err(e) => println!("⚠️  {e} (fine for --dry-run)"),
    }
    println!("✅ Config OK: graduation {}, {} milestones, {} holidays",
        config.graduation.date,
        config.graduation.milestones.len(),
        config.graduation.holidays.len()
    );
    Ok(())
}
