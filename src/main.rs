//! # Mazechase Main Entry Point
//!
//! Runs a headless game: either steered by the autopilot for a fixed time, or
//! driven by commands typed on stdin. Frames are printed as text and the final
//! score can be recorded in a high-score file.

use clap::Parser;
use crossbeam_channel::{never, select, unbounded, Receiver};
use log::{error, info, LevelFilter};
use mazechase::{
    AsciiDisplay, Autopilot, ChaseConfig, ChaseResult, GameEvent, GameSession, HighScoreTable,
    InputHandler, DEFAULT_COLS, DEFAULT_ROWS,
};
use std::io::BufRead;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Command line arguments for mazechase.
#[derive(Parser, Debug)]
#[command(name = "mazechase")]
#[command(about = "A real-time maze chase with procedural mazes and pursuer AI")]
#[command(version)]
struct Args {
    /// Board height in cells
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    rows: usize,

    /// Board width in cells
    #[arg(long, default_value_t = DEFAULT_COLS)]
    cols: usize,

    /// Random seed for maze and pursuer randomness
    #[arg(short, long)]
    seed: Option<u64>,

    /// How long an autopilot run lasts
    #[arg(long, default_value_t = 30)]
    duration_secs: u64,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// High-score file to record the final score in
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Name recorded with the final score
    #[arg(long, default_value = "autopilot")]
    player_name: String,

    /// Read commands (w/a/s/d, p, t, n, q) from stdin; the autopilot starts off and `t` toggles it
    #[arg(long)]
    interactive: bool,

    /// Minimum time between printed frames
    #[arg(long, default_value_t = 1000)]
    frame_interval_ms: u64,

    /// Log level (error, warn, info, debug, trace); overrides RUST_LOG
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ChaseResult<()> {
    let args = Args::parse();
    initialize_logging(args.log_level.as_deref());

    info!("Starting mazechase v{}", mazechase::VERSION);

    if let Err(e) = run(&args) {
        error!("mazechase stopped: {}", e);
        return Err(e);
    }
    Ok(())
}

/// Initializes env_logger, honouring `RUST_LOG` unless a level is given.
fn initialize_logging(log_level: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = log_level.and_then(|l| l.parse::<LevelFilter>().ok()) {
        builder.filter_level(level);
    }
    builder.format_target(false).init();
}

fn load_config(args: &Args) -> ChaseResult<ChaseConfig> {
    let mut config = match &args.config {
        Some(path) => ChaseConfig::load_from_path(path)?,
        None => ChaseConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;
    Ok(config)
}

/// Forwards stdin lines until it closes.
fn spawn_stdin_reader() -> ChaseResult<Receiver<String>> {
    let (tx, rx) = unbounded();
    std::thread::Builder::new()
        .name("mazechase-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

fn run(args: &Args) -> ChaseResult<()> {
    let session = GameSession::new(load_config(args)?);
    let events = session.events();
    let session_id = session.start_game(args.rows, args.cols)?;
    info!("Game {} started on a {}x{} board", session_id, args.rows, args.cols);

    let inputs = if args.interactive {
        spawn_stdin_reader()?
    } else {
        never()
    };
    let mut autopilot = if args.interactive {
        Autopilot::new()
    } else {
        Autopilot::enabled()
    };
    let handler = InputHandler::new();
    let mut display = AsciiDisplay::new();

    let deadline = Instant::now() + Duration::from_secs(args.duration_secs);
    let frame_interval = Duration::from_millis(args.frame_interval_ms);
    let mut last_frame: Option<Instant> = None;
    let mut final_score = None;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if !args.interactive && remaining.is_zero() {
            info!("Time limit reached");
            break;
        }
        let wait = if args.interactive {
            Duration::from_millis(250)
        } else {
            remaining.min(Duration::from_millis(250))
        };

        select! {
            recv(events) -> event => match event {
                Ok(GameEvent::Render(snapshot)) => {
                    if let Some(direction) = autopilot.next_direction(&snapshot) {
                        session.set_direction_intent(direction);
                    }
                    if last_frame.map_or(true, |shown| shown.elapsed() >= frame_interval) {
                        println!("{}", display.render_game(&snapshot));
                        last_frame = Some(Instant::now());
                    }
                }
                Ok(GameEvent::GameOver { score }) => {
                    display.add_message(format!("GAME OVER with {} points (n: new game, q: quit)", score));
                    final_score = Some(score);
                    if !args.interactive {
                        break;
                    }
                }
                Ok(GameEvent::Victory { score }) => {
                    display.add_message(format!("VICTORY with {} points", score));
                    final_score = Some(score);
                    if !args.interactive {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            },
            recv(inputs) -> line => {
                let Ok(line) = line else { break };
                let intents = handler.parse_line(&line);
                if intents.is_empty() {
                    display.add_message(format!("Unknown command: {}", line.trim()));
                }
                let mut keep_going = true;
                for intent in intents {
                    let was_steering = autopilot.enabled;
                    let consumed = autopilot.handle_intent(intent);
                    if autopilot.enabled != was_steering {
                        let state = if autopilot.enabled { "enabled" } else { "disabled" };
                        display.add_message(format!("Autopilot {}", state));
                    }
                    if consumed {
                        continue;
                    }
                    keep_going = session.apply_intent(intent)?;
                    if !keep_going {
                        break;
                    }
                }
                if !keep_going {
                    break;
                }
            },
            default(wait) => {}
        }
    }

    let last = session.snapshot();
    let report = session.stop();
    if !report.is_clean() {
        info!("Abandoned workers: {:?}", report.abandoned);
    }
    if let Some(snapshot) = &last {
        println!("{}", display.render_game(snapshot));
    }

    let score = final_score
        .or_else(|| last.as_ref().map(|s| s.score))
        .unwrap_or(0);
    println!("Final score: {}", score);

    if let Some(path) = &args.scores {
        let mut table = HighScoreTable::load_from_path(path)?;
        match table.add(&args.player_name, score)? {
            Some(rank) => println!("New high score! Rank #{}", rank),
            None => println!("No high score this time"),
        }
        table.save_to_path(path)?;
        print!("{}", table.export());
    }

    Ok(())
}
