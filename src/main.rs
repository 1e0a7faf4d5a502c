//! NBFC Fan Control
//!
//! Terminal front-end for the Notebook FanControl utility. Without a
//! subcommand it runs the interactive session; the other subcommands are
//! one-shot helpers for scripting.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use nbfc_gui::config::POLL_INTERVAL;
use nbfc_gui::cooling::{CommandWorker, PollHandle, PollLoop};
use nbfc_gui::device::{NbfcUtility, Serialized};
use nbfc_gui::storage::{self, AppConfig};
use nbfc_gui::ui::{Action, App, AppOptions, UiEvent, parse_line};
use nbfc_gui::{StatusSnapshot, logging};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Fan control for laptops driven by NBFC
#[derive(Parser, Debug)]
#[command(name = "nbfc-gui")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Utility binary name or path (overrides the settings file)
    #[arg(long, global = true)]
    binary: Option<String>,

    /// Per-command timeout in seconds, 0 waits forever (overrides the settings file)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log to stderr at debug level (one-shot subcommands)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session (default)
    Run,

    /// Show current fan status
    Status,

    /// Print a fresh status every poll period
    Monitor {
        /// Stop after this many readings
        #[arg(short, long)]
        count: Option<u32>,
    },

    /// List the profiles recommended for this machine
    Profiles,

    /// Apply a fan profile
    Apply {
        /// Profile name as listed by `profiles`
        name: String,
    },

    /// Hold the fan at a fixed speed
    SetSpeed {
        /// Speed percentage (0-100)
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percent: u8,
    },

    /// Hand fan control back to the utility
    Auto,

    /// Print the settings file location
    ConfigPath,
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    let mut args = Args::parse();
    let command = args.command.take().unwrap_or(Command::Run);

    if !matches!(command, Command::Run) {
        logging::init_stderr(args.verbose);
    }

    match command {
        Command::Run => cmd_run(&args),
        Command::Status => cmd_status(&args),
        Command::Monitor { count } => cmd_monitor(&args, count),
        Command::Profiles => cmd_profiles(&args),
        Command::Apply { name } => cmd_apply(&args, &name),
        Command::SetSpeed { percent } => cmd_set_speed(&args, percent),
        Command::Auto => cmd_auto(&args),
        Command::ConfigPath => cmd_config_path(),
    }
}

// =============================================================================
// Setup helpers
// =============================================================================

/// Settings file merged with the command-line overrides.
fn load_settings(args: &Args) -> Result<AppConfig> {
    let mut config = storage::load_config().context("Failed to load settings")?;

    if let Some(binary) = &args.binary {
        config.utility.binary = binary.clone();
    }
    if let Some(secs) = args.timeout {
        config.utility.command_timeout_secs = (secs > 0).then_some(secs);
    }

    Ok(config)
}

/// Client for the one-shot subcommands; fails early when the utility is absent.
fn open_utility(args: &Args) -> Result<NbfcUtility> {
    let nbfc = load_settings(args)?.utility_client();
    let path = nbfc
        .resolve()
        .with_context(|| format!("Failed to locate '{}'", nbfc.binary()))?;
    tracing::debug!("Using utility at {}", path.display());
    Ok(nbfc)
}

// =============================================================================
// Interactive session
// =============================================================================

/// Everything the session loop reacts to, funnelled through one channel.
enum Incoming {
    Line(String),
    Ui(UiEvent),
    InputClosed,
}

/// Background tasks, present once the main screen is reached.
struct Tasks {
    poll: PollHandle,
    worker: CommandWorker,
}

fn cmd_run(args: &Args) -> Result<()> {
    let config_path = storage::ensure_config_exists().context("Failed to create settings file")?;
    let config = load_settings(args)?;

    // The session draws on the terminal, so logs go to a file.
    if args.verbose {
        logging::init_stderr(true);
    } else if let Err(e) = logging::init_file() {
        eprintln!("⚠️  File logging disabled: {}", e);
    }
    tracing::info!("Settings loaded from {}", config_path.display());

    let client = Arc::new(Serialized::new(config.utility_client()));
    let options = AppOptions {
        binary: config.utility.binary.clone(),
        fallback_profiles: config.effective_fallback(),
        slider_step: config.slider_step,
    };
    let mut app = App::bootstrap(Arc::clone(&client), options);
    tracing::info!("Starting in phase {}", app.phase());

    let (tx, rx) = mpsc::channel();
    spawn_stdin_reader(tx.clone())?;

    let quit = tx.clone();
    ctrlc::set_handler(move || {
        let _ = quit.send(Incoming::Ui(UiEvent::Quit));
    })
    .context("Failed to set Ctrl+C handler")?;

    let mut tasks: Option<Tasks> = None;
    let mut pending = app.startup_actions();

    'session: loop {
        for action in pending.drain(..) {
            match action {
                Action::StartPolling => {
                    if tasks.is_none() {
                        tasks = Some(start_tasks(&client, &tx));
                    }
                }
                Action::Send(command) => match &tasks {
                    Some(tasks) => {
                        tasks.worker.submit(command);
                    }
                    None => tracing::warn!("Dropping {} before polling started", command),
                },
                Action::RefreshNow => {
                    if let Some(tasks) = &tasks {
                        tasks.poll.refresh_now();
                    }
                }
                Action::Render => render(&app)?,
                Action::Quit => break 'session,
            }
        }

        let Ok(incoming) = rx.recv() else {
            break;
        };

        pending = match incoming {
            Incoming::Ui(event) => app.handle(event),
            Incoming::Line(line) => {
                match parse_line(&line, app.screen(), app.profile_count()) {
                    Ok(event) => app.handle(event),
                    Err(e) => app.reject_input(e.to_string()),
                }
            }
            Incoming::InputClosed => vec![Action::Quit],
        };
    }

    if let Some(Tasks { poll, worker }) = tasks {
        // Let a committed speed reach the utility before exiting.
        worker.shutdown();
        poll.join();
    }

    tracing::info!("Session ended");
    Ok(())
}

fn spawn_stdin_reader(tx: Sender<Incoming>) -> Result<()> {
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(Incoming::Line(line)).is_err() {
                    return;
                }
            }
            let _ = tx.send(Incoming::InputClosed);
        })
        .context("Failed to start input reader")?;
    Ok(())
}

fn start_tasks(client: &Arc<Serialized<NbfcUtility>>, tx: &Sender<Incoming>) -> Tasks {
    let snapshots = tx.clone();
    let poll = PollLoop::new(Arc::clone(client))
        .spawn(move |snapshot| snapshots.send(Incoming::Ui(UiEvent::Snapshot(snapshot))).is_ok());

    let trigger = poll.trigger();
    let worker = CommandWorker::spawn(Arc::clone(client), move || trigger.refresh_now());

    Tasks { poll, worker }
}

fn render<C: nbfc_gui::FanControl + ?Sized>(app: &App<C>) -> Result<()> {
    let mut out = std::io::stdout().lock();
    // Clear screen and move cursor to top
    write!(out, "\x1B[2J\x1B[1;1H")?;
    write!(out, "{}", app.view())?;
    if app.show_help() {
        writeln!(out)?;
        writeln!(out, "{}", SESSION_HELP)?;
    }
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

const SESSION_HELP: &str = "\
Setup screen:
  <n>          select profile n
  n / p        next / previous profile
  Enter        apply the selected profile
Main screen:
  + / -        move the slider by one step (repeat for more: +++)
  <0-100>      move the slider to a value
  Enter, ok    apply the slider value
  x            put the slider back
  set <n>      move and apply in one go
  a            enable automatic mode
  r            refresh now
Anywhere:
  h            toggle this help
  q            quit";

// =============================================================================
// One-shot commands
// =============================================================================

fn cmd_status(args: &Args) -> Result<()> {
    let nbfc = open_utility(args)?;
    let status = nbfc.try_status().context("Failed to read status")?;
    print!("{}", status);
    Ok(())
}

fn cmd_monitor(args: &Args, count: Option<u32>) -> Result<()> {
    let nbfc = open_utility(args)?;

    // Setup Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    println!("🌡️  Monitoring fan status (Ctrl+C to stop)...\n");

    let mut readings = 0u32;
    let mut last: Option<StatusSnapshot> = None;

    while running.load(Ordering::SeqCst) {
        match nbfc.try_status() {
            Ok(status) => {
                // Clear screen and move cursor to top
                print!("\x1B[2J\x1B[1;1H");
                print!("{}", status);
                last = Some(status);
            }
            Err(e) => {
                tracing::warn!("Status query failed: {}", e);
                if last.is_none() {
                    println!("⚠️  Status unavailable: {}", e);
                }
            }
        }

        readings += 1;
        if count.is_some_and(|n| readings >= n) {
            break;
        }

        sleep_while(&running, POLL_INTERVAL);
    }

    println!("\n👋 Monitoring stopped.");
    Ok(())
}

/// Sleep for `total`, waking early once `running` clears.
fn sleep_while(running: &AtomicBool, total: Duration) {
    let step = Duration::from_millis(100);
    let mut slept = Duration::ZERO;
    while slept < total && running.load(Ordering::SeqCst) {
        thread::sleep(step);
        slept += step;
    }
}

fn cmd_profiles(args: &Args) -> Result<()> {
    let nbfc = open_utility(args)?;
    let recommended = nbfc
        .try_recommendations()
        .context("Failed to list recommended profiles")?;

    if recommended.is_empty() {
        println!("No recommendation for this machine. Generic vendors:");
        for name in load_settings(args)?.effective_fallback() {
            println!("  • {} (fallback)", name);
        }
    } else {
        println!("Recommended profiles:");
        for name in &recommended {
            println!("  • {}", name);
        }
    }
    Ok(())
}

fn cmd_apply(args: &Args, name: &str) -> Result<()> {
    let nbfc = open_utility(args)?;

    println!("⚙️  Applying profile '{}'...", name);
    if let Err(e) = nbfc.try_apply_config(name) {
        tracing::debug!("Apply failed: {:?}", e);
        bail!("Failed to apply configuration: {}", e);
    }
    println!("✅ Profile '{}' applied.", name);
    Ok(())
}

fn cmd_set_speed(args: &Args, percent: u8) -> Result<()> {
    let nbfc = open_utility(args)?;
    nbfc.try_set_speed(percent).context("Failed to set fan speed")?;
    println!("✅ Fan speed set to {}%", percent);
    Ok(())
}

fn cmd_auto(args: &Args) -> Result<()> {
    let nbfc = open_utility(args)?;
    nbfc.try_set_auto().context("Failed to enable auto mode")?;
    println!("✅ Automatic fan control enabled.");
    Ok(())
}

fn cmd_config_path() -> Result<()> {
    let path = storage::get_config_path().context("Failed to resolve settings path")?;
    println!("{}", path.display());
    Ok(())
}
