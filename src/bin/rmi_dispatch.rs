//! RMI Dispatch - command-line host for the dispatch core
//!
//! Reads RMI command messages as JSON lines on stdin and writes the matching
//! controller telegrams to stdout. Also dumps the handler table, parses
//! telegrams and classifies controller replies.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rmi_driver::{
    handler::dump_sample,
    json_output::{self, EntriesEvent, ErrorEvent, HandlerEvent, ReplyEvent, TelegramEvent},
    util::params_to_string,
    Command, CommandRegister, Dispatch, DriverConfig, HandlerCatalog, RmiCommand,
    RmiCommandList, SampleHandler, TelegramParser,
};
use serde::Serialize;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rmi_dispatch")]
#[command(about = "Translate Robot Movement Interface commands into controller telegrams")]
#[command(version)]
struct Args {
    /// Path to the driver configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Emit JSON events instead of raw telegrams
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read RMI messages (JSON, one per line) and print telegrams
    Dispatch,
    /// Print the match criteria of every registered handler
    Dump,
    /// Parse telegram lines into their entries
    Parse,
    /// Classify controller replies as accepted or rejected
    Check,
}

/// Handlers for the common RMI motion and settings commands
struct GenericCatalog {
    precision: usize,
}

impl GenericCatalog {
    fn motion(
        verb: &'static str,
        precision: usize,
    ) -> impl Fn(&RmiCommand) -> Command + Send + Sync {
        move |msg| {
            let mut cmd = Command::motion(verb, params_to_string(&msg.pose, precision))
                .with_id(msg.command_id);
            if !msg.velocity.is_empty() {
                cmd.add_param("velocity", params_to_string(&msg.velocity, precision));
            }
            if !msg.blending.is_empty() {
                cmd.add_param("blending", params_to_string(&msg.blending, precision));
            }
            cmd
        }
    }
}

impl HandlerCatalog for GenericCatalog {
    fn name(&self) -> &str {
        "generic"
    }

    fn register_handlers(&self, register: &mut CommandRegister) {
        let precision = self.precision;

        register
            .add_handler(
                "ptp_joints",
                RmiCommand::with_type("PTP").pose_type("JOINTS"),
                Self::motion("ptp", precision),
            )
            .register(
                SampleHandler::new(
                    "lin_quaternion",
                    RmiCommand::with_type("LIN").pose_type("QUATERNION"),
                    Self::motion("lin", precision),
                )
                .with_guard(|msg| msg.pose.len() == 7),
            )
            .register(
                SampleHandler::new(
                    "lin_euler",
                    RmiCommand::with_type("LIN").pose_type("EULER_INTRINSIC_ZYX"),
                    Self::motion("lin", precision),
                )
                .with_guard(|msg| msg.pose.len() == 6),
            )
            .add_handler(
                "set_tool",
                RmiCommand::with_type("SETTING").pose_reference("TOOL"),
                move |msg| {
                    Command::info("settool", params_to_string(&msg.pose, precision))
                        .with_id(msg.command_id)
                },
            )
            .add_handler("setting", RmiCommand::with_type("SETTING"), move |msg| {
                let mut cmd = Command::info("setting", "").with_id(msg.command_id);
                for (key, value) in msg.additional_parameters.iter().zip(&msg.additional_values) {
                    cmd.add_param(key.as_str(), params_to_string(&[*value], precision));
                }
                cmd
            });
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = DriverConfig::resolve(args.config.as_deref())
        .context("Failed to load driver configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("RMI dispatch ({})", config.driver.name);

    let mut register = CommandRegister::new();
    register.install(&GenericCatalog {
        precision: config.formatting.precision(),
    });

    let stdin = BufReader::new(io::stdin());
    let mut stdout = io::stdout();

    match args.command.unwrap_or(Commands::Dispatch) {
        Commands::Dispatch => dispatch(&register, &config, args.json, stdin, &mut stdout).await?,
        Commands::Dump => dump(&register, args.json, &mut stdout).await?,
        Commands::Parse => parse(args.json, stdin, &mut stdout).await?,
        Commands::Check => check(args.json, stdin, &mut stdout).await?,
    }

    stdout.flush().await.context("Failed to flush stdout")?;
    Ok(())
}

/// Decode one input line as either a single message or a list
fn decode_messages(line: &str) -> Result<Vec<RmiCommand>> {
    let value: serde_json::Value = serde_json::from_str(line).context("Invalid JSON")?;
    if value.get("commands").is_some() {
        let list: RmiCommandList =
            serde_json::from_value(value).context("Invalid command list")?;
        Ok(list.commands)
    } else {
        let msg: RmiCommand = serde_json::from_value(value).context("Invalid command")?;
        Ok(vec![msg])
    }
}

async fn write_event<W, T>(out: &mut W, event: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let line = json_output::event_line(event)?;
    out.write_all(line.as_bytes()).await.context("Failed to write event")?;
    Ok(())
}

async fn dispatch<R, W>(
    register: &CommandRegister,
    config: &DriverConfig,
    json: bool,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let newline = config.formatting.newline();
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let messages = match decode_messages(line) {
            Ok(messages) => messages,
            Err(e) => {
                warn!("Skipping input line: {:#}", e);
                if json {
                    write_event(out, &ErrorEvent::bad_input(&format!("{:#}", e))).await?;
                }
                continue;
            }
        };

        for msg in messages {
            if msg.has_non_finite() {
                warn!("Command {} carries non-finite values", msg.command_id);
            }

            match register.dispatch(&msg) {
                Dispatch::Command { handler, command } => {
                    debug!("Command {} -> {}", msg.command_id, command);
                    if json {
                        let event = TelegramEvent::new(handler.name(), &command, newline);
                        write_event(out, &event).await?;
                    } else {
                        out.write_all(command.to_telegram(newline).as_bytes())
                            .await
                            .context("Failed to write telegram")?;
                    }
                }
                Dispatch::NoHandler if json => {
                    let event = ErrorEvent::no_handler(msg.command_id, &msg.command_type);
                    write_event(out, &event).await?;
                }
                Dispatch::Failed { handler } if json => {
                    let event = ErrorEvent::handler_failed(msg.command_id, handler.name());
                    write_event(out, &event).await?;
                }
                Dispatch::NoHandler | Dispatch::Failed { .. } => {}
            }
        }
    }
    Ok(())
}

async fn dump<W>(register: &CommandRegister, json: bool, out: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if !json {
        let mut text = String::new();
        register.dump(&mut text).context("Failed to format handler table")?;
        out.write_all(text.as_bytes()).await.context("Failed to write handler table")?;
        return Ok(());
    }

    for (index, handler) in register.handlers().iter().enumerate() {
        let mut criteria = String::new();
        dump_sample(handler.sample(), &mut criteria).context("Failed to format criteria")?;
        let criteria = criteria.lines().map(str::to_string).collect();
        write_event(out, &HandlerEvent::new(index, handler.name(), criteria)).await?;
    }
    Ok(())
}

async fn parse<R, W>(json: bool, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let parser = TelegramParser::new()?;
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        match parser.parse(&line) {
            Ok(entries) if json => write_event(out, &EntriesEvent::new(entries)).await?,
            Ok(entries) => {
                for (key, value) in entries {
                    let row = format!("{}\t{}\n", key, value);
                    out.write_all(row.as_bytes()).await.context("Failed to write entry")?;
                }
            }
            Err(e) => {
                error!("{}", e);
                if json {
                    write_event(out, &ErrorEvent::bad_input(&e.to_string())).await?;
                }
            }
        }
    }
    Ok(())
}

async fn check<R, W>(json: bool, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let reference = Command::default();
    let mut lines = input.lines();

    while let Some(reply) = lines.next_line().await.context("Failed to read input")? {
        let accepted = reference.check_response(&reply);
        if !accepted {
            warn!("Controller rejected telegram: {}", reply);
        }

        if json {
            write_event(out, &ReplyEvent::new(&reply, accepted)).await?;
        } else {
            let verdict = if accepted { "accepted\n" } else { "rejected\n" };
            out.write_all(verdict.as_bytes()).await.context("Failed to write verdict")?;
        }
    }
    Ok(())
}
