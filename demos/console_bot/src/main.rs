//! Console Bot Demo
//!
//! Reads one message per line from stdin and dispatches it as if it came from
//! a chat platform. Replies are printed to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package console-bot -- --platform discord --user 1001 --place guild-1
//! ```
//!
//! Then try:
//!
//! ```text
//! !ping
//! !help
//! !roll 20 --count 3
//! !prefix set ?
//! ?echo "quoted args" stay together
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use framed::prelude::*;
use rand::Rng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

static RUNTIME: OnceLock<Arc<FramedRuntime>> = OnceLock::new();

fn runtime() -> Option<&'static Arc<FramedRuntime>> {
    RUNTIME.get()
}

// ============================================================================
// Info plugin
// ============================================================================

async fn ping(_: CommandContext) {
    println!("Pong!");
}

async fn echo(ctx: CommandContext) -> bool {
    let content = ctx.message().args_content();
    if content.is_empty() {
        return false;
    }
    println!("{content}");
    true
}

async fn help(_: CommandContext) -> Option<()> {
    let snapshot = runtime()?.dispatcher().registry().load();

    let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for registry in snapshot.plugins() {
        for command in registry.commands() {
            let mut line = command.id().to_string();
            if let Some(about) = command.about() {
                line.push_str(&format!(" - {about}"));
            }
            groups
                .entry(command.group().unwrap_or("Other"))
                .or_default()
                .push(line);
        }
    }

    for (group, commands) in groups {
        println!("[{group}]");
        for command in commands {
            println!("  {command}");
        }
    }
    Some(())
}

fn register_info(r: &mut PluginRegistrar) {
    r.command(CommandBuilder::new("ping").about("Replies with pong").handler(ping))
        .command(
            CommandBuilder::new("echo")
                .alias("say")
                .about("Repeats the message")
                .usage("<text>")
                .handler(echo),
        )
        .command(
            CommandBuilder::new("help")
                .aliases(["h", "commands"])
                .about("Lists commands")
                .handler(help),
        );
}

pub static INFO: PluginDescriptor = define_plugin! {
    id: "default.bot.info",
    name: "Info",
    group: "Info",
    register: register_info,
};

submit_plugin!(INFO);

// ============================================================================
// Dice plugin
// ============================================================================

#[derive(Parser, Debug)]
struct RollArgs {
    /// Sides per die.
    #[arg(default_value_t = 6)]
    sides: u32,
    /// Number of dice.
    #[arg(short, long, default_value_t = 1)]
    count: u32,
}

/// Rolls `count` dice (at most 100) with `sides` faces each.
fn roll_dice<R: Rng>(rng: &mut R, sides: u32, count: u32) -> Vec<u32> {
    let sides = sides.max(1);
    (0..count.min(100)).map(|_| rng.gen_range(1..=sides)).collect()
}

async fn roll(ctx: CommandContext) -> Result<(), clap::Error> {
    let args = ctx.message().parse_args::<RollArgs>().inspect_err(|e| {
        println!("{e}");
    })?;
    let rolls = roll_dice(&mut rand::thread_rng(), args.sides, args.count);
    let total: u64 = rolls.iter().map(|&r| u64::from(r)).sum();
    println!("{rolls:?} = {total}");
    Ok(())
}

fn register_dice(r: &mut PluginRegistrar) {
    r.command(
        CommandBuilder::new("roll")
            .alias("r")
            .about("Rolls dice")
            .usage("[sides] [--count N]")
            .handler(roll),
    );
}

pub static DICE: PluginDescriptor = define_plugin! {
    id: "default.bot.dice",
    name: "Dice",
    group: "Fun",
    group_emote: "🎲",
    register: register_dice,
};

submit_plugin!(DICE);

// ============================================================================
// Manage plugin
// ============================================================================

async fn prefix_set(ctx: CommandContext) -> Option<bool> {
    let prefix = ctx.args().first()?;
    let runtime = runtime()?;
    let place = ctx.message().place();
    runtime.prefixes().set(place.id.clone(), prefix.clone());
    println!("Prefix for {} is now {prefix}", place.id);
    Some(true)
}

async fn prefix_reset(ctx: CommandContext) -> Option<()> {
    let place = ctx.message().place();
    runtime()?.prefixes().remove(&place.id);
    println!("Prefix for {} reset", place.id);
    Some(())
}

async fn prefix_show(ctx: CommandContext) -> Option<()> {
    let runtime = runtime()?;
    let place = ctx.message().place();
    let prefixes = runtime.dispatcher().general_prefixes(&place);
    println!("Prefixes here: {}", prefixes.as_slice().join(" "));
    Some(())
}

fn register_manage(r: &mut PluginRegistrar) {
    let manage_guild =
        UserPermissions::discord(DiscordPermissions::default().permissions(["MANAGE_GUILD"]));

    r.command(
        CommandBuilder::new("prefix")
            .about("Shows or changes the prefix for this place")
            .handler(prefix_show)
            .subcommand(
                CommandBuilder::new("set")
                    .usage("<prefix>")
                    .permissions(manage_guild.clone())
                    .handler(prefix_set),
            )
            .subcommand(
                CommandBuilder::new("reset")
                    .alias("clear")
                    .permissions(manage_guild)
                    .handler(prefix_reset),
            ),
    );
}

const MANAGE: PluginDescriptor = define_plugin! {
    id: "default.bot.manage",
    name: "Manage",
    group: "Manage",
    register: register_manage,
};

// ============================================================================
// Main Entry Point
// ============================================================================

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PlatformArg {
    Discord,
    Twitch,
    Plain,
}

#[derive(Parser, Debug)]
#[command(about = "Dispatches stdin lines as chat messages")]
struct Cli {
    /// Platform the messages appear to come from.
    #[arg(long, value_enum, default_value_t = PlatformArg::Discord)]
    platform: PlatformArg,
    /// Author id.
    #[arg(long, default_value = "1001")]
    user: String,
    /// Guild id (Discord) or channel.
    #[arg(long, default_value = "guild-1")]
    place: String,
    /// Configuration file; the default locations are searched otherwise.
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

fn inbound(cli: &Cli, line: &str) -> Result<InboundMessage> {
    let source = match cli.platform {
        PlatformArg::Discord => PlatformMessage::Discord(
            DiscordMessage::builder()
                .channel_id(format!("{}-general", cli.place))
                .guild_id(&cli.place)
                .author_id(&cli.user)
                .build()?,
        ),
        PlatformArg::Twitch => PlatformMessage::Twitch(TwitchMessage::new(&cli.place, &cli.user)?),
        PlatformArg::Plain => PlatformMessage::plain(&cli.place, &cli.user)?,
    };
    Ok(InboundMessage::new(line, source))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = FramedRuntime::builder();
    if let Some(path) = &cli.config {
        builder = builder.config_file(path);
    }
    let runtime = Arc::new(builder.build()?);
    let _ = RUNTIME.set(Arc::clone(&runtime));

    runtime.register_manifest();
    runtime.register_plugin(MANAGE);
    let summary = runtime.start();
    info!(
        plugins = summary.plugins,
        commands = summary.commands,
        "Console bot ready, type a command"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let message = inbound(&cli, &line)?;
        if !runtime.handle(&message).await {
            tracing::debug!(line = %line, "No command ran");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_roll_dice_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let rolls = roll_dice(&mut rng, 6, 500);
        assert_eq!(rolls.len(), 100);
        assert!(rolls.iter().all(|r| (1..=6).contains(r)));

        assert_eq!(roll_dice(&mut rng, 0, 3), vec![1, 1, 1]);
    }
}
