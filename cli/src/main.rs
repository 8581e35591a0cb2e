use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use mathtiles_core::*;

mod commands;
mod render;

use commands::Command;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum MathType {
    /// Addition and subtraction
    #[default]
    AddSub,
    /// Multiplication and division
    MulDiv,
}

impl From<MathType> for Operators {
    fn from(math: MathType) -> Self {
        match math {
            MathType::AddSub => Operators::ADD_SUB,
            MathType::MulDiv => Operators::MUL_DIV,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Tiles per side
    #[arg(short, long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(2..=4))]
    grid: u8,

    /// Number family every problem is built around
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=12))]
    family: u8,

    /// Kind of problems to ask
    #[arg(short, long, value_enum, default_value_t)]
    math: MathType,

    /// Picture hidden behind the tiles
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

fn load_picture(path: &Path) -> anyhow::Result<Picture> {
    let data = std::fs::read(path)
        .with_context(|| format!("failed to read picture {}", path.display()))?;
    let label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Picture::new(label, data))
}

fn pick_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        web_time::SystemTime::now()
            .duration_since(web_time::UNIX_EPOCH)
            .map(|since| since.as_nanos() as u64)
            .unwrap_or_default()
    })
}

/// Lets pending results play out, so the next prompt never lands on a locked board.
fn settle(session: &mut GameSession) {
    session.poll();
    while session.is_locked() {
        if let Some(due) = session.next_deadline() {
            let now = session.clock().now();
            std::thread::sleep(due.saturating_sub(now));
        }
        session.poll();
    }
}

fn report(summary: &GameSummary, json: bool) -> anyhow::Result<()> {
    if json {
        let text = serde_json::to_string_pretty(summary).context("failed to encode report")?;
        println!("{text}");
    } else {
        println!("{summary}");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    // stderr keeps log lines apart from the board on stdout
    tracing_subscriber::fmt()
        .with_max_level(args.verbose.tracing_level_filter())
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("failed to init logging")?;

    let picture = args.image.as_deref().and_then(|path| {
        load_picture(path)
            .inspect_err(|err| log::warn!("{err:#}, playing without a picture"))
            .ok()
    });
    let config = GameConfig::new(args.family, args.grid, args.math.into())?.with_picture(picture);
    let seed = pick_seed(args.seed);
    log::info!("seed: {seed}");

    let mut session = GameSession::new(config, seed)?;
    let finished: Rc<RefCell<Option<GameSummary>>> = Rc::default();
    let sink = finished.clone();
    session.subscribe(move |event| match event {
        SessionEvent::TileCompleted(record) => log::debug!(
            "tile {:?} done, correct: {}, tries: {}, time: {}",
            record.tile,
            record.correct,
            record.tries,
            format_elapsed(record.elapsed)
        ),
        SessionEvent::GameCompleted(summary) => {
            sink.borrow_mut().replace(summary.clone());
        }
        _ => {}
    });

    println!("{}", commands::HELP);
    print!("{}", render::board(&session));

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let command = match commands::parse(&line?) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match command {
            Command::Inputs(inputs) => {
                for input in inputs {
                    match session.handle(input) {
                        Ok(InputOutcome::Locked) => log::debug!("{input:?} ignored while locked"),
                        Ok(_) => {}
                        Err(err) => eprintln!("{err}"),
                    }
                }
            }
            Command::NewGame => {
                session.restart();
                finished.borrow_mut().take();
            }
            Command::Show => {}
            Command::Help => {
                println!("{}", commands::HELP);
                continue;
            }
            Command::Quit => break,
        }

        settle(&mut session);
        print!("{}", render::board(&session));

        let summary = finished.borrow_mut().take();
        if let Some(summary) = summary {
            report(&summary, args.json)?;
            break;
        }
    }
    Ok(())
}
