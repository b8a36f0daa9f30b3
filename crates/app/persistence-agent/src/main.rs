use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use persistence_agent::{AgentGraph, AgentSettings, AgentStateUpdate, require_mcp_servers};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "persistence-agent")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scripted two-thread scenario with a replay and a fork.
    Demo {
        #[arg(short, long, default_value = "user-1")]
        user_id: String,
    },
    /// Print the MCP client entries resolved from the environment.
    McpConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    // --- Tracing ---
    let app_level = if cli.verbose || cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let global_filter = Targets::new()
        .with_default(LevelFilter::WARN)
        .with_target("persistence_agent", app_level)
        .with_target("agent_graph", app_level)
        .with_target("hyper", LevelFilter::OFF)
        .with_target("reqwest", LevelFilter::OFF);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(global_filter)
        .try_init()
        .context("failed to initialise tracing")?;

    match cli.command {
        Commands::Demo { user_id } => demo(&user_id).await,
        Commands::McpConfig => mcp_config(),
    }
}

async fn demo(user_id: &str) -> anyhow::Result<()> {
    let settings = AgentSettings::from_env()?;
    let agent = AgentGraph::from_settings(&settings)?;

    println!("== Thread 1: initial turn ==");
    let first = agent
        .run_turn()
        .thread_id("thread-1")
        .user_id(user_id)
        .message("My name is Jon. Please remember this as a durable fact.")
        .call()
        .await?;
    println!("{}", first.response.unwrap_or_default());

    println!("\n== Thread 1: follow-up turn ==");
    let second = agent
        .run_turn()
        .thread_id("thread-1")
        .user_id(user_id)
        .message("I like pizza. Save that preference too.")
        .call()
        .await?;
    println!("{}", second.response.unwrap_or_default());
    println!("timeline={}", second.timeline.join(","));

    println!("\n== Thread 2: same user, memory shared via store ==");
    let cross_thread = agent
        .run_turn()
        .thread_id("thread-2")
        .user_id(user_id)
        .message("What do you remember about me?")
        .call()
        .await?;
    println!("{}", cross_thread.response.unwrap_or_default());

    println!("\n== Checkpoint history for thread-1 ==");
    let history = agent.state_history("thread-1").await?;
    println!("checkpoint_count={}", history.len());
    for snapshot in &history {
        println!(
            "  {} step={} source={:?} writer={} next={:?}",
            snapshot.checkpoint_id().unwrap_or("-"),
            snapshot.metadata.step,
            snapshot.metadata.source,
            snapshot.metadata.writer.as_deref().unwrap_or("-"),
            snapshot.next,
        );
    }

    if let Some(selected) = history.get(1) {
        println!("\n== Replay from a prior checkpoint ==");
        let replayed = agent
            .run_turn()
            .thread_id("thread-1")
            .user_id(user_id)
            .maybe_checkpoint_id(selected.checkpoint_id())
            .call()
            .await?;
        println!("{}", replayed.response.unwrap_or_default());
    }

    println!("\n== Fork by editing state ==");
    let fork = agent
        .edit_state()
        .thread_id("thread-1")
        .values(AgentStateUpdate::user_message(
            "I love ramen. Remember that too.",
        ))
        .as_node("load_memories")
        .call()
        .await?;
    let fork_checkpoint_id = fork.checkpoint_id.clone().unwrap_or_default();
    println!("fork_checkpoint_id={fork_checkpoint_id}");

    let forked = agent
        .run_turn()
        .thread_id("thread-1")
        .user_id(user_id)
        .checkpoint_id(fork_checkpoint_id)
        .call()
        .await?;
    println!("{}", forked.response.unwrap_or_default());

    let history = agent.state_history("thread-1").await?;
    println!("checkpoint_count={}", history.len());

    Ok(())
}

fn mcp_config() -> anyhow::Result<()> {
    let servers = require_mcp_servers()?;
    println!("{}", serde_json::to_string_pretty(&servers)?);
    Ok(())
}
