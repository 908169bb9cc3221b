use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use pf_console::console::{Confirm, Console, Notify, Progress};
use pf_console::editor::{self, RuleList};
use pf_console::error::Result;
use pf_console::gateway::HttpGateway;
use pf_console::statsview::StatsRefresher;
use pf_console::types::{Listener, Policy};

mod config;

#[derive(Parser)]
#[command(name = "pf-console", about = "Operator console for the port-forwarding service")]
struct Args {
    /// Path to the console profile YAML
    #[clap(short, long)]
    profile: String,

    /// Answer every confirmation prompt with yes
    #[clap(long)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the current DNS overrides and listener definitions
    Show,

    /// Edit DNS overrides
    Dns {
        #[command(subcommand)]
        command: DnsCommand,
    },

    /// Edit listener definitions
    Listener {
        #[command(subcommand)]
        command: ListenerCommand,
    },

    /// Edit a listener's host/pattern allow rules
    Rule {
        #[command(subcommand)]
        command: RuleCommand,
    },

    /// Save the fetched configuration back to the server
    Save,

    /// Start the service from the last saved configuration
    Start,

    /// Stop the service
    Stop,

    /// Restart the service, applying the last saved configuration
    Restart,

    /// Restore the saved configuration to the last applied one
    Restore,

    /// Poll and print listener statistics
    Watch,
}

#[derive(Subcommand)]
enum DnsCommand {
    /// Set an override; a blank target deletes it
    Set { from: String, to: String },

    /// Remove an override
    Rm { from: String },
}

#[derive(Subcommand)]
enum ListenerCommand {
    Add {
        name: String,
        bind: String,
        target_port: u16,

        #[clap(long, default_value_t = 600_000)]
        max_idle_ms: u64,

        #[clap(long, default_value = "allow")]
        policy: String,
    },
    Rm {
        name: String,
    },
}

#[derive(Subcommand)]
enum RuleCommand {
    Add {
        listener: String,
        value: String,

        /// Edit the pattern list instead of the static host list
        #[clap(long)]
        patterns: bool,
    },
    Edit {
        listener: String,
        old: String,
        new: String,

        #[clap(long)]
        patterns: bool,
    },
    Rm {
        listener: String,
        value: String,

        #[clap(long)]
        patterns: bool,
    },
}

struct StdinConfirm {
    assume_yes: bool,
}

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            println!("{} [y/N] y", prompt);
            return true;
        }

        print!("{} [y/N] ", prompt);
        let _ = std::io::stdout().flush();

        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

struct LogProgress;

impl Progress for LogProgress {
    fn begin(&self) {
        log::debug!("request in flight");
    }

    fn end(&self) {
        log::debug!("request finished");
    }
}

struct TermNotify;

impl Notify for TermNotify {
    fn success(&self, message: &str) {
        println!("{}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("error: {}", message);
    }
}

fn rule_list(patterns: bool) -> RuleList {
    if patterns {
        RuleList::Patterns
    } else {
        RuleList::StaticHosts
    }
}

fn parse_policy(input: &str) -> Policy {
    match input.to_ascii_lowercase().as_str() {
        "deny" => Policy::Deny,
        _ => Policy::Allow,
    }
}

fn print_config(console: &Console<HttpGateway>) {
    println!("DNS overrides:");
    for (from, to) in console.model.dns.iter() {
        println!("  {} -> {}", from, to);
    }

    println!("Listeners:");
    for (name, listener) in console.model.listeners.iter() {
        println!(
            "  {}  bind={} target_port={} max_idle_ms={} policy={:?}",
            name, listener.bind, listener.target_port, listener.max_idle_time_ms, listener.policy
        );
        for host in &listener.rules.static_hosts {
            println!("    host    {}", host);
        }
        for pattern in &listener.rules.patterns {
            println!("    pattern {}", pattern);
        }
    }
}

async fn watch(gateway: HttpGateway, interval: Duration) {
    let gateway = Arc::new(gateway);
    let refresher = StatsRefresher::new(gateway, interval);
    let snapshot = refresher.snapshot();
    refresher.spawn();

    loop {
        tokio::time::sleep(interval).await;

        let snap = snapshot.lock().unwrap();
        println!("-- cycle {} --", snap.cycles);
        for stats in &snap.stats {
            println!(
                "{}  bind={}  total={} active={} down={} up={}",
                stats.name,
                snap.bind_of(&stats.name).unwrap_or("?"),
                stats.total,
                stats.active,
                stats.downloaded_bytes,
                stats.uploaded_bytes
            );
        }
        for (name, reason) in &snap.failed {
            println!("FAILED {}: {}", name, reason);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let profile = config::Parser::parse_yaml(&args.profile)?;
    let gateway = HttpGateway::new(&profile.endpoint, &profile.username, &profile.password);

    if let Command::Watch = args.command {
        watch(gateway, Duration::from_millis(profile.refresh_interval_ms)).await;
        return Ok(());
    }

    let mut console = Console::new(
        gateway,
        Box::new(StdinConfirm {
            assume_yes: args.yes,
        }),
        Box::new(LogProgress),
        Box::new(TermNotify),
    );

    match args.command {
        Command::Show => {
            console.fetch_data().await;
            print_config(&console);
        }
        Command::Dns { command } => {
            console.fetch_data().await;
            match command {
                DnsCommand::Set { from, to } => console.model.replace_dns(&from, &to),
                DnsCommand::Rm { from } => console.model.replace_dns(&from, ""),
            }
            console.save().await;
        }
        Command::Listener { command } => {
            console.fetch_data().await;
            match command {
                ListenerCommand::Add {
                    name,
                    bind,
                    target_port,
                    max_idle_ms,
                    policy,
                } => {
                    let mut listener = Listener::new(bind, target_port);
                    listener.max_idle_time_ms = max_idle_ms;
                    listener.policy = parse_policy(&policy);
                    console.model.add_listener(&name, listener);
                }
                ListenerCommand::Rm { name } => console.model.remove_listener(&name),
            }
            console.save().await;
        }
        Command::Rule { command } => {
            console.fetch_data().await;
            match command {
                RuleCommand::Add {
                    listener,
                    value,
                    patterns,
                } => editor::add_entry(
                    &mut console.model.listeners,
                    &listener,
                    rule_list(patterns),
                    &value,
                ),
                RuleCommand::Edit {
                    listener,
                    old,
                    new,
                    patterns,
                } => editor::edit_entry(
                    &mut console.model.listeners,
                    &listener,
                    rule_list(patterns),
                    &old,
                    &new,
                ),
                RuleCommand::Rm {
                    listener,
                    value,
                    patterns,
                } => editor::remove_entry(
                    &mut console.model.listeners,
                    &listener,
                    rule_list(patterns),
                    &value,
                ),
            }
            console.save().await;
        }
        Command::Save => {
            console.fetch_data().await;
            console.save().await;
        }
        Command::Start => console.start().await,
        Command::Stop => console.stop().await,
        Command::Restart => console.restart().await,
        Command::Restore => console.restore().await,
        Command::Watch => unreachable!(),
    }

    Ok(())
}
