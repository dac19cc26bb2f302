//! nexusctl - command line control of FLIR PTZ cameras over Nexus CGI.
//!
//! Every command takes the camera address and a session id obtained from
//! `nexusctl authenticate`, and prints the camera's reply. Write commands
//! answered with return code 21 print a freshly issued session id instead;
//! re-run the command with it.

use clap::{Parser, Subcommand};
use nexus_cgi::{
    Action, CameraEndpoint, Client, CommandOutcome, DEFAULT_HTTP_TIMEOUT, DEFAULT_SLEW_SPEED,
    NEXUS_CGI_PATH, NEXUS_DEFAULT_PORT, RawReply, ReachabilityGate, SessionId,
};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nexusctl")]
#[command(version, about = "Control FLIR PTZ cameras over the Nexus CGI interface", long_about = None)]
struct Cli {
    /// Camera web server port
    #[arg(long, default_value_t = NEXUS_DEFAULT_PORT, global = true)]
    port: u16,

    /// Path of the CGI handler on the camera
    #[arg(long, default_value = NEXUS_CGI_PATH, global = true)]
    cgi_path: String,

    /// HTTP timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_HTTP_TIMEOUT.as_secs(), global = true)]
    timeout: u64,

    /// Wait for the camera to answer probes before sending the command
    #[arg(long, global = true)]
    wait: bool,

    /// Give up waiting after this many seconds (implies --wait)
    #[arg(long, value_name = "SECS", global = true)]
    wait_timeout: Option<u64>,

    /// Pretty-print JSON replies
    #[arg(long, global = true)]
    pretty: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Obtain a fresh session id from the camera
    Authenticate {
        /// Camera IP address or hostname
        host: String,
    },

    /// Read the current pan/tilt angle in degrees
    GetPosition { host: String, session: String },

    /// Read the pan/tilt axis speeds
    GetSpeed { host: String, session: String },

    /// Set the pan/tilt axis speeds
    SetSpeed {
        host: String,
        session: String,
        azimuth_speed: i32,
        elevation_speed: i32,
    },

    /// Read the zoom magnification factor
    GetZoom { host: String, session: String },

    /// Set the zoom magnification factor
    SetZoom {
        host: String,
        session: String,
        magnification: f64,
    },

    /// Read the zoomed field of view in degrees
    GetZoomFov { host: String, session: String },

    /// Trigger a one-shot autofocus
    AutoFocus { host: String, session: String },

    /// Re-aim the camera so a screen point becomes the new center
    Center {
        host: String,
        session: String,
        screen_x: f64,
        screen_y: f64,
    },

    /// Slew to an absolute azimuth/elevation
    Move {
        host: String,
        session: String,
        azimuth: f64,
        elevation: f64,

        /// Azimuth axis speed
        #[arg(long, default_value_t = DEFAULT_SLEW_SPEED)]
        azimuth_speed: i32,

        /// Elevation axis speed
        #[arg(long, default_value_t = DEFAULT_SLEW_SPEED)]
        elevation_speed: i32,
    },

    /// Issue any action with free-form parameters
    Raw {
        host: String,
        session: String,
        /// Action name as the firmware spells it
        action: String,
        /// Query parameters as key=value pairs, sent in the given order
        params: Vec<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays pipeable (session ids, JSON replies).
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    match &cli.command {
        Command::Authenticate { host } => {
            let client = connect(&cli, host).await?;
            let session = client.authenticate().await?;
            println!("{session}");
        }
        Command::GetPosition { host, session } => {
            read_command(&cli, host, session, Action::PtAzimuthElevationGet).await?;
        }
        Command::GetSpeed { host, session } => {
            read_command(&cli, host, session, Action::PtSpeedGet).await?;
        }
        Command::GetZoom { host, session } => {
            read_command(&cli, host, session, Action::DltvFovMagnificationGet).await?;
        }
        Command::GetZoomFov { host, session } => {
            read_command(&cli, host, session, Action::DltvZoomDegreesGet).await?;
        }
        Command::SetSpeed {
            host,
            session,
            azimuth_speed,
            elevation_speed,
        } => {
            let client = connect(&cli, host).await?;
            let outcome = client
                .set_speed(&session_id(session), *azimuth_speed, *elevation_speed)
                .await?;
            report_outcome(outcome, cli.pretty);
        }
        Command::SetZoom {
            host,
            session,
            magnification,
        } => {
            let client = connect(&cli, host).await?;
            let outcome = client
                .set_magnification(&session_id(session), *magnification)
                .await?;
            report_outcome(outcome, cli.pretty);
        }
        Command::AutoFocus { host, session } => {
            let client = connect(&cli, host).await?;
            let outcome = client.auto_focus(&session_id(session)).await?;
            report_outcome(outcome, cli.pretty);
        }
        Command::Center {
            host,
            session,
            screen_x,
            screen_y,
        } => {
            let client = connect(&cli, host).await?;
            let outcome = client
                .center_on_screen(&session_id(session), *screen_x, *screen_y)
                .await?;
            report_outcome(outcome, cli.pretty);
        }
        Command::Move {
            host,
            session,
            azimuth,
            elevation,
            azimuth_speed,
            elevation_speed,
        } => {
            let client = connect(&cli, host).await?;
            let outcome = client
                .slew_to(
                    &session_id(session),
                    *azimuth,
                    *elevation,
                    *azimuth_speed,
                    *elevation_speed,
                )
                .await?;
            report_outcome(outcome, cli.pretty);
        }
        Command::Raw {
            host,
            session,
            action,
            params,
        } => {
            let pairs = parse_param_pairs(params)?;
            let client = connect(&cli, host).await?;
            let reply = client
                .invoke_raw(action, Some(&session_id(session)), &pairs)
                .await?;
            print_reply(&reply, cli.pretty);
        }
    }

    Ok(())
}

/// Build the endpoint and client for one command, holding it back behind
/// the reachability gate when asked to.
async fn connect(cli: &Cli, host: &str) -> eyre::Result<Client> {
    let endpoint = CameraEndpoint::new(host)
        .with_port(cli.port)
        .with_cgi_path(cli.cgi_path.clone());

    if cli.wait || cli.wait_timeout.is_some() {
        let mut gate = ReachabilityGate::new();
        if let Some(secs) = cli.wait_timeout {
            gate = gate.with_deadline(Duration::from_secs(secs));
        }
        gate.wait(&endpoint).await?;
    }

    let client = Client::with_timeout(endpoint, Duration::from_secs(cli.timeout))?;
    Ok(client)
}

fn session_id(session: &str) -> SessionId {
    SessionId::from(session)
}

async fn read_command(cli: &Cli, host: &str, session: &str, action: Action) -> eyre::Result<()> {
    let client = connect(cli, host).await?;
    let reply = client.invoke(action, Some(&session_id(session)), &[]).await?;
    print_reply(&reply, cli.pretty);
    Ok(())
}

fn report_outcome(outcome: CommandOutcome, pretty: bool) {
    match outcome {
        CommandOutcome::Completed(reply) => print_reply(&reply, pretty),
        CommandOutcome::SessionRefreshed(session) => {
            tracing::warn!(
                "Session had expired; printing the fresh id, re-run the command with it"
            );
            println!("{session}");
        }
    }
}

fn print_reply(reply: &RawReply, pretty: bool) {
    if pretty {
        if let Some(value) = reply.json() {
            if let Ok(text) = serde_json::to_string_pretty(&value) {
                println!("{text}");
                return;
            }
        }
    }
    println!("{reply}");
}

fn parse_param_pairs(params: &[String]) -> eyre::Result<Vec<(String, String)>> {
    params
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .ok_or_else(|| eyre::eyre!("Parameter {pair:?} is not in key=value form"))
        })
        .collect()
}
