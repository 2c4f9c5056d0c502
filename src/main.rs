//! Command line interface for running light scenes.
//!
//! Run with: lively-lights --help

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use log::{error, info};
use serde_json::{Map, Value, json};

use lively_lights::runtime::Cancel;
use lively_lights::{
    AddressProbe, Bridge, Configuration, DayNight, Error, HueBridge, Launcher, LightId, Parameter,
    ReachableLights, SceneConfig, SceneContext, SceneKind, Seconds, SolarDayNight,
    StandingPolicy,
};

#[derive(Parser)]
#[command(name = "lively-lights")]
#[command(about = "Timed color and brightness scenes for Hue lights", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Path to the configuration file (default: ~/.lively-lights.toml)
    #[arg(short, long, global = true)]
    config_file: Option<PathBuf>,

    /// Address of the bridge
    #[arg(short, long, global = true)]
    ip: Option<String>,

    /// Username to log in to the bridge
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// Light ids to use (e.g. -l 1 2 3); all lights of the bridge if omitted
    #[arg(short, long, global = true, num_args = 1..)]
    lights: Option<Vec<LightId>>,

    /// Make output more verbose (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Seconds a light's reachability is trusted before asking the bridge again
    #[arg(long, global = true, default_value = "60")]
    refresh_interval: f64,

    /// Do nothing while it is night
    #[arg(long, global = true)]
    not_at_night: bool,

    /// Do nothing while it is day
    #[arg(long, global = true)]
    not_during_daytime: bool,

    /// Do nothing while this host (or host:port) is up
    #[arg(long, global = true, value_name = "ADDR")]
    not_host_up: Option<String>,

    /// Switch the lights off while scenes are suppressed
    #[arg(long, global = true)]
    turn_off: bool,

    /// Run for this many seconds
    #[arg(short, long, global = true)]
    duration: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print information about the lights or the sun
    #[command(subcommand)]
    Info(Info),

    /// Run one scene
    #[command(subcommand)]
    Scene(SceneCommand),

    /// Run the scenes of a TOML ([[scenes]]) or JSON (array) file
    Launch {
        file: PathBuf,

        /// Shuffle the scenes on every pass
        #[arg(long)]
        randomized: bool,

        /// Repeat the scenes until interrupted
        #[arg(long)]
        endless: bool,
    },
}

#[derive(Subcommand)]
enum Info {
    /// List the lights known to the bridge
    Lights,

    /// Print dawn, sunrise, noon, sunset and dusk of today
    Daynight,
}

#[derive(Subcommand)]
enum SceneCommand {
    /// Fade every light independently between random colors
    Breath(BreathArgs),

    /// Swing two groups of lights between two colors
    Pendulum(PendulumArgs),

    /// Step all lights through a sequence of colors
    Sequence(SequenceArgs),
}

#[derive(Args)]
struct BreathArgs {
    /// Two brightness values (e.g. 10 254)
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    brightness_range: Option<Vec<f64>>,

    /// Two hue values (e.g. 23461 40123)
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    hue_range: Option<Vec<f64>>,

    /// Two time spans in seconds (e.g. 1 5)
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    time_range: Option<Vec<f64>>,
}

#[derive(Args)]
struct PendulumArgs {
    /// Hue (0 - 65535) of light group 1
    #[arg(long)]
    color1: Option<f64>,

    /// Hue (0 - 65535) of light group 2
    #[arg(long)]
    color2: Option<f64>,

    /// Light group 1 (e.g. 1 2 3)
    #[arg(long, num_args = 1..)]
    lights1: Option<Vec<u32>>,

    /// Light group 2 (e.g. 4 5 6)
    #[arg(long, num_args = 1..)]
    lights2: Option<Vec<u32>>,

    /// Seconds between switching the colors of the groups
    #[arg(long)]
    sleep_time: Option<f64>,

    /// Seconds of the color fade
    #[arg(long)]
    transition_time: Option<f64>,
}

#[derive(Args)]
struct SequenceArgs {
    /// Brightness (1 - 254)
    #[arg(long)]
    brightness: Option<f64>,

    /// Hues (0 - 65535) to step through
    #[arg(long, num_args = 1..)]
    hue_sequence: Option<Vec<f64>>,

    /// Seconds between color changes
    #[arg(long)]
    sleep_time: Option<f64>,

    /// Seconds of the color fade
    #[arg(long)]
    transition_time: Option<f64>,
}

/// Collects the flags that were given into a scene property map.
#[derive(Default)]
struct Properties(Map<String, Value>);

impl Properties {
    fn set<T: serde::Serialize>(&mut self, name: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.0.insert(name.to_string(), json!(value));
        }
        self
    }
}

impl SceneCommand {
    fn into_parts(self) -> (&'static str, Map<String, Value>) {
        let mut properties = Properties::default();
        let name = match self {
            SceneCommand::Breath(args) => {
                properties
                    .set("brightness_range", args.brightness_range)
                    .set("hue_range", args.hue_range)
                    .set("time_range", args.time_range);
                "breath"
            }
            SceneCommand::Pendulum(args) => {
                properties
                    .set("color1", args.color1)
                    .set("color2", args.color2)
                    .set("lights1", args.lights1)
                    .set("lights2", args.lights2)
                    .set("sleep_time", args.sleep_time)
                    .set("transition_time", args.transition_time);
                "pendulum"
            }
            SceneCommand::Sequence(args) => {
                properties
                    .set("brightness", args.brightness)
                    .set("hue_sequence", args.hue_sequence)
                    .set("sleep_time", args.sleep_time)
                    .set("transition_time", args.transition_time);
                "sequence"
            }
        };
        (name, properties.0)
    }
}

fn seconds(field: &str, value: f64) -> Result<Duration, Error> {
    Ok(Seconds::parse(field, &Value::from(value))?.as_duration())
}

fn hue_bridge(cli: &GlobalArgs, config: &Configuration) -> Result<HueBridge, Error> {
    let address = match &cli.ip {
        Some(ip) => ip.clone(),
        None => config.bridge_address()?,
    };
    let username = match &cli.username {
        Some(username) => username.clone(),
        None => config.bridge_username()?,
    };
    HueBridge::new(&address, &username)
}

fn standing_policy(cli: &GlobalArgs, config: &Configuration) -> Result<StandingPolicy, Error> {
    let mut policy = StandingPolicy::new().turn_off(cli.turn_off);
    if cli.not_at_night || cli.not_during_daytime {
        let day_night: Arc<dyn DayNight> = Arc::new(SolarDayNight::new(config.location()?)?);
        if cli.not_at_night {
            policy = policy.not_at_night(day_night.clone());
        }
        if cli.not_during_daytime {
            policy = policy.not_during_daytime(day_night);
        }
    }
    if let Some(address) = &cli.not_host_up {
        policy = policy.not_host_up(address, Arc::new(AddressProbe::new()));
    }
    Ok(policy)
}

fn scene_context(
    cli: &GlobalArgs,
    config: &Configuration,
    cancel: Cancel,
) -> Result<SceneContext, Error> {
    let bridge: Arc<dyn Bridge> = Arc::new(hue_bridge(cli, config)?);
    let mut lights = ReachableLights::new(bridge)
        .with_policy(standing_policy(cli, config)?)
        .with_refresh_interval(seconds("refresh_interval", cli.refresh_interval)?);
    if let Some(light_ids) = &cli.lights {
        lights = lights.with_light_ids(light_ids.clone());
    }
    Ok(SceneContext::new(Arc::new(lights)).with_cancel(cancel))
}

/// Cancels once Ctrl-C is pressed.
fn cancel_on_interrupt() -> Cancel {
    let cancel = Cancel::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, stopping at the next check point");
            signal.cancel();
        }
    });
    cancel
}

async fn run(cli: Cli, config: Configuration) -> Result<(), Error> {
    let Cli {
        global: cli,
        command,
    } = cli;
    let duration = cli
        .duration
        .map(|duration| seconds("duration", duration))
        .transpose()?;

    match command {
        Commands::Info(Info::Lights) => {
            let bridge = hue_bridge(&cli, &config)?;
            for light in bridge.list_lights().await? {
                let reachable = if light.reachable() { "" } else { " (unreachable)" };
                println!(
                    "{}: {}{}",
                    light.light_id(),
                    light.name().unwrap_or("-"),
                    reachable
                );
            }
        }

        Commands::Info(Info::Daynight) => {
            let day_night = SolarDayNight::new(config.location()?)?;
            println!("{}", day_night.overview());
        }

        Commands::Scene(command) => {
            let (name, properties) = command.into_parts();

            let context = scene_context(&cli, &config, cancel_on_interrupt())?;
            let mut scene = SceneKind::with_properties(name, &properties, context)?;
            scene.validate()?;
            let actual = scene.start(duration).await?;
            info!("scene {name} ran for {actual:?}");
        }

        Commands::Launch {
            file,
            randomized,
            endless,
        } => {
            let configs = SceneConfig::load(&file)?;
            let context = scene_context(&cli, &config, cancel_on_interrupt())?;
            let launcher = Launcher::new(context, configs)?;
            launcher.launch(randomized, endless, duration).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Configuration::load(cli.global.config_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let level = match config.log_level() {
        Ok(level) => level.raised(cli.global.verbose),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
