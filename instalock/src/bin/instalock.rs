use clap::{Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Select};
use instalock::{
    detection, AssetSet, Config, Error, FrameSource, ImageFileSource, Instalocker, KwinCapture,
    LockOptions, Resolution, Template, VirtualPointer, WorkerEvent,
};
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "instalock")]
#[command(about = "Insta-lock your favorite VALORANT agent!")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// The agent to instalock
    agent: Option<String>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file (default: ~/.config/instalock/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Template asset directory, containing one folder per resolution
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// Match confidence threshold (0.0 to 1.0)
    #[arg(long, global = true)]
    confidence: Option<f32>,

    /// Polling interval in milliseconds
    #[arg(long, global = true)]
    interval: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// List agents with templates for this screen
    Agents {
        /// Use this resolution instead of detecting it (WxH)
        #[arg(long)]
        resolution: Option<Resolution>,
    },
    /// Interactive session: pick an agent, toggle instalocking on and off
    Session,
    /// Find a template on screen and print the best match as JSON
    Find {
        /// Template image to find
        template: PathBuf,
        /// Screenshot to search in (captures the screen if not provided)
        #[arg(short, long)]
        screenshot: Option<PathBuf>,
    },
    /// Capture the screen to a PNG, e.g. to cut new templates from
    Screenshot {
        /// Output path for screenshot
        #[arg(default_value = "/tmp/instalock_screenshot.png")]
        output: PathBuf,
    },
}

/// Config file values with command-line overrides applied
struct Settings {
    assets_dir: PathBuf,
    options: LockOptions,
}

impl Settings {
    fn resolve(cli: &Cli) -> instalock::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Config::read(path)?,
            None => Config::load(),
        };
        if let Some(dir) = &cli.assets {
            config.assets.dir = dir.clone();
        }
        if let Some(confidence) = cli.confidence {
            config.matching.confidence = confidence;
        }
        if let Some(interval) = cli.interval {
            config.timing.poll_interval_ms = interval;
        }
        config.validate()?;

        Ok(Self {
            assets_dir: config.assets.dir.clone(),
            options: config.lock_options(),
        })
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "instalock={},instalock_capture={},instalock_input={}",
            level, level, level
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> instalock::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    let settings = Settings::resolve(&cli)?;

    match (&cli.command, &cli.agent) {
        (Some(command), _) => match command {
            Commands::Agents { resolution } => run_agents(&settings, *resolution),
            Commands::Session => run_session(&settings),
            Commands::Find {
                template,
                screenshot,
            } => run_find(&settings, template, screenshot.as_deref()),
            Commands::Screenshot { output } => run_screenshot(output),
        },
        (None, Some(agent)) => run_lock(&settings, agent),
        (None, None) => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

/// Connect to the screen and open the templates for its resolution
fn open_screen(settings: &Settings) -> instalock::Result<(KwinCapture, AssetSet)> {
    let mut screen = KwinCapture::connect()?;
    let resolution = Resolution::from(screen.resolution()?);
    debug!(%resolution, "Detected screen resolution");
    let assets = AssetSet::open(&settings.assets_dir, resolution)?;
    Ok((screen, assets))
}

fn run_lock(settings: &Settings, agent: &str) -> instalock::Result<()> {
    let (mut screen, assets) = open_screen(settings)?;
    let templates = assets.load_templates(agent)?;
    let resolution = assets.resolution();
    let mut pointer = VirtualPointer::new(resolution.width, resolution.height)?;

    println!("Watching for {}...", templates.agent());
    let at = instalock::run_until_locked(&mut screen, &mut pointer, &templates, &settings.options)?;
    info!(
        agent = %templates.agent(),
        avatar_confidence = at.avatar.confidence,
        lock_in_confidence = at.lock_in.confidence,
        "Locked"
    );
    println!("Locked!");
    Ok(())
}

fn run_agents(settings: &Settings, resolution: Option<Resolution>) -> instalock::Result<()> {
    let assets = match resolution {
        Some(resolution) => AssetSet::open(&settings.assets_dir, resolution)?,
        None => open_screen(settings)?.1,
    };
    let agents = assets.agents()?;
    if agents.is_empty() {
        warn!(dir = %assets.dir().display(), "No agent avatars found");
    }
    for agent in agents {
        println!("{}", agent);
    }
    Ok(())
}

fn run_session(settings: &Settings) -> instalock::Result<()> {
    let (screen, assets) = open_screen(settings)?;
    let agents = assets.agents()?;
    if agents.is_empty() {
        return Err(Error::NoAgents(assets.dir().join("avatars")));
    }

    let templates = assets.load_templates(&agents[pick_agent(&agents, 0)?])?;
    let resolution = assets.resolution();
    let pointer = VirtualPointer::new(resolution.width, resolution.height)?;
    let mut worker = Instalocker::spawn(screen, pointer, templates, settings.options.clone())?;

    if let Some(events) = worker.take_events() {
        thread::spawn(move || {
            for event in events {
                match event {
                    WorkerEvent::Locked { agent, .. } => println!("\nLocked {}!", agent),
                    WorkerEvent::Failed(message) => {
                        eprintln!("\nInstalocking stopped: {}", message)
                    }
                }
            }
        });
    }

    loop {
        if !worker.is_running() {
            warn!("Instalock worker is no longer running");
            break;
        }

        let toggle = if worker.is_enabled() {
            format!("Stop instalocking {}", worker.agent())
        } else {
            format!("Start instalocking {}", worker.agent())
        };
        let actions = [toggle.as_str(), "Change agent", "Quit"];
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Instalock ({})", worker.phase()))
            .items(&actions)
            .default(0)
            .interact()
            .map_err(prompt_error)?;

        match choice {
            0 => worker.set_enabled(!worker.is_enabled()),
            1 => {
                let current = agents.iter().position(|a| *a == worker.agent()).unwrap_or(0);
                let agent = &agents[pick_agent(&agents, current)?];
                match assets.load_templates(agent) {
                    Ok(templates) => worker.set_agent(templates),
                    Err(e) => warn!(agent = %agent, error = %e, "Keeping previous agent"),
                }
            }
            _ => break,
        }
    }

    worker.stop();
    Ok(())
}

fn pick_agent(agents: &[String], default: usize) -> instalock::Result<usize> {
    Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Agent")
        .items(agents)
        .default(default)
        .interact()
        .map_err(prompt_error)
}

fn prompt_error(e: dialoguer::Error) -> Error {
    match e {
        dialoguer::Error::IO(e) => Error::Io(e),
    }
}

fn run_find(
    settings: &Settings,
    template: &Path,
    screenshot: Option<&Path>,
) -> instalock::Result<()> {
    let frame = match screenshot {
        Some(path) => ImageFileSource::new(path).capture()?,
        None => KwinCapture::connect()?.capture()?,
    };
    let template = Template::open(template)?;

    info!(
        template = %template.name(),
        confidence = settings.options.confidence,
        "Finding template"
    );

    let found = detection::find_in_frame(&frame, &template, settings.options.confidence);
    println!("{}", serde_json::to_string_pretty(&found)?);

    if found.is_none() {
        warn!("No match found");
    }
    Ok(())
}

fn run_screenshot(output: &Path) -> instalock::Result<()> {
    let frame = KwinCapture::connect()?.capture()?;
    instalock_capture::save_png(&frame, output)?;
    println!("Saved {}x{} screenshot to {}", frame.width(), frame.height(), output.display());
    Ok(())
}
