use anyhow::Result;
use backdrop::{
    AudioPreference, Config, FilePreferenceStore, GestureSource, InteractionKind,
    MemoryPreferenceStore, PlaybackPort, PreferenceStore, SimulatedSink, ToggleBinder,
    UnlockController, Visibility,
};
use backdrop::unlock::ListenerOptions;
use clap::Parser;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::writer::MakeWriterExt, EnvFilter};

#[derive(Parser)]
#[command(name = "backdrop-sim")]
#[command(about = "Drive the background audio controller against a simulated sink")]
struct Args {
    /// Enable developer logging (stderr + file)
    #[arg(long)]
    dev: bool,

    /// Let the simulated sink play without a user gesture
    #[arg(long)]
    autoplay_allowed: bool,

    /// Config file to use instead of the one in the user config dir
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep the on/off preference in memory only
    #[arg(long)]
    memory: bool,

    /// Simulated play() latency in milliseconds
    #[arg(long, default_value_t = 30)]
    latency_ms: u64,
}

fn init_logging(dev: bool) -> Result<WorkerGuard> {
    let log_dir = PathBuf::from("logs");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotating file appender
    let file_appender = tracing_appender::rolling::daily(&log_dir, "backdrop.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let base_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,backdrop=debug"));

    let builder = tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(base_filter);

    if dev {
        let subscriber = builder
            .with_writer(file_writer.and(std::io::stderr))
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = builder.with_writer(file_writer).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(guard)
}

/// Prints the toggle state the way a checkbox would show it
struct ConsoleToggle;

impl ToggleBinder for ConsoleToggle {
    fn reflect(&self, enabled: bool) {
        println!("[toggle] {}", if enabled { "[x] music" } else { "[ ] music" });
    }
}

struct ConsoleGestures;

impl GestureSource for ConsoleGestures {
    fn bind(&self, kinds: &[InteractionKind], options: ListenerOptions) {
        let names: Vec<_> = kinds.iter().map(|k| k.event_name()).collect();
        info!("Listening for {:?} (passive: {})", names, options.passive);
    }

    fn unbind(&self, kinds: &[InteractionKind]) {
        info!("Stopped listening for {} gesture kinds", kinds.len());
        println!("[gestures] unlocked, listeners removed");
    }
}

fn print_help() {
    println!("commands: tap | touch | key | hide | show | on | off | seek <seconds> | status | quit");
}

fn print_status(controller: &UnlockController, sink: &SimulatedSink) {
    let session = controller.session();
    let sim = sink.snapshot();
    println!(
        "phase={:?} enabled={} unlocked={} attempting={} resume_on_visible={} listeners={}",
        session.phase(),
        session.enabled,
        session.unlocked,
        session.attempting,
        session.resume_on_visible,
        session.listeners_bound,
    );
    println!(
        "sink: paused={} muted={} volume={:.2} time={:.1}s gesture_seen={}",
        sim.paused, sim.muted, sim.volume, sim.current_time, sim.gesture_seen
    );
    if let Some(err) = &session.last_error {
        println!("last error: {}", err);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(args.dev)?;

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let store: Arc<dyn PreferenceStore> = if args.memory {
        Arc::new(MemoryPreferenceStore::new())
    } else {
        let file_store = FilePreferenceStore::new(&config.preference.path);
        info!("Audio preference stored in {}", file_store.path().display());
        Arc::new(file_store)
    };

    let sink = SimulatedSink::new(args.autoplay_allowed, Duration::from_millis(args.latency_ms));
    let port: Arc<dyn PlaybackPort> = Arc::new(sink.clone());

    let controller = UnlockController::new(
        Some(port),
        AudioPreference::new(store, config.preference.key.clone()),
    )
    .with_gestures(Arc::new(ConsoleGestures))
    .with_toggle(Arc::new(ConsoleToggle));
    let fader = controller.fader(config.fade.clone());

    info!("backdrop-sim starting (autoplay allowed: {})", args.autoplay_allowed);
    println!("backdrop simulator");
    print_help();

    controller.start().await;
    print_status(&controller, &sink);

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };

        let gesture = match command {
            "tap" => Some(InteractionKind::PointerDown),
            "touch" => Some(InteractionKind::TouchStart),
            "key" => Some(InteractionKind::KeyDown),
            _ => None,
        };
        if let Some(kind) = gesture {
            sink.note_gesture();
            controller.handle_interaction(kind).await;
            print_status(&controller, &sink);
            continue;
        }

        match command {
            "hide" => controller.handle_visibility_change(Visibility::Hidden).await,
            "show" => controller.handle_visibility_change(Visibility::Visible).await,
            "on" => controller.on_preference_changed(true).await,
            "off" => controller.on_preference_changed(false).await,
            "seek" => match parts.next().map(str::parse::<f64>) {
                Some(Ok(target)) => {
                    // runs in the background so status can be checked mid-fade
                    let fader = fader.clone();
                    tokio::spawn(async move { fader.crossfade_to_time(target).await });
                }
                _ => println!("usage: seek <seconds>"),
            },
            "status" => {}
            "quit" | "exit" => break,
            "help" => {
                print_help();
                continue;
            }
            other => {
                warn!("Unknown command: {}", other);
                print_help();
                continue;
            }
        }
        print_status(&controller, &sink);
    }

    info!("backdrop-sim shutting down");
    Ok(())
}
