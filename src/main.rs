//! Polytris terminal runner (default binary).
//!
//! `play` and `load` run the game in the terminal with crossterm input and the
//! framebuffer renderer; the other subcommands manage saves and print
//! leaderboards.

mod cli;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{debug, info};

use cli::{Cli, Command};
use polytris::core::GameState;
use polytris::input::{key_name, should_quit, InputHandler, KeyBindings};
use polytris::logging;
use polytris::session::{Flow, Saver, Session};
use polytris::store::{BackgroundSaver, Config, LeaderboardStore, SaveStore};
use polytris::term::{GameView, Hud, Screen, Viewport};
use polytris::types::{GameCommand, GameSettings, TICK_MS};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Play {
        player: None,
        piece_size: None,
        width: None,
        height: None,
    });

    match command {
        Command::Play {
            player,
            piece_size,
            width,
            height,
        } => {
            let config = Config::load_or_create(&cli.config);
            logging::init_file(&config.storage.log_path())?;
            let settings = settings_from(&config, width, height, piece_size);
            let name = player.unwrap_or_else(|| config.game.player_name.clone());
            let game = GameState::new(settings, &name);
            info!(player = %game.player_name(), ?settings, "Starting game");
            let session = Session::new(game, open_leaders(&config)?, open_saver(&config)?);
            play(&config, session)
        }
        Command::Load { file } => {
            let config = Config::load_or_create(&cli.config);
            logging::init_file(&config.storage.log_path())?;
            let record = SaveStore::open(config.storage.saves_dir())?
                .load(&file)
                .with_context(|| format!("cannot load save {file}"))?;
            let session = Session::load(&record, open_leaders(&config)?, open_saver(&config)?)
                .with_context(|| format!("save {file} is not a valid game"))?;
            play(&config, session)
        }
        Command::Saves => {
            logging::init_stderr();
            let config = Config::load_or_create(&cli.config);
            let saves = SaveStore::open(config.storage.saves_dir())?.list()?;
            if saves.is_empty() {
                println!("No saved games.");
            }
            for save in saves {
                println!(
                    "{:<40} {:<12} score {:>7}  level {:>2}  lines {:>4}  {} size {}  {}",
                    save.file_name,
                    save.player_name,
                    save.score,
                    save.level,
                    save.lines,
                    save.field_size,
                    save.piece_size,
                    save.saved_at.format("%Y-%m-%d %H:%M:%S"),
                );
            }
            Ok(())
        }
        Command::Delete { file } => {
            logging::init_stderr();
            let config = Config::load_or_create(&cli.config);
            SaveStore::open(config.storage.saves_dir())?
                .delete(&file)
                .with_context(|| format!("cannot delete save {file}"))?;
            println!("Deleted {file}");
            Ok(())
        }
        Command::Leaders {
            piece_size,
            width,
            height,
        } => {
            logging::init_stderr();
            let config = Config::load_or_create(&cli.config);
            let settings = settings_from(&config, width, height, piece_size);
            let field_size = settings.field_size();
            let leaders = open_leaders(&config)?.leaders(settings.piece_size, &field_size);
            println!("Leaders {field_size}, piece size {}", settings.piece_size);
            if leaders.is_empty() {
                println!("No scores yet.");
            }
            for (rank, entry) in leaders.iter().enumerate() {
                println!(
                    "{:>2}. {:<16} {:>7}  level {:>2}  lines {:>4}  {}",
                    rank + 1,
                    entry.player_name,
                    entry.score,
                    entry.level,
                    entry.lines,
                    entry.recorded_at.format("%Y-%m-%d"),
                );
            }
            Ok(())
        }
    }
}

fn settings_from(
    config: &Config,
    width: Option<usize>,
    height: Option<usize>,
    piece_size: Option<u8>,
) -> GameSettings {
    let base = config.game.settings();
    GameSettings::new(
        width.unwrap_or(base.width),
        height.unwrap_or(base.height),
        piece_size.unwrap_or(base.piece_size),
    )
}

fn open_leaders(config: &Config) -> Result<LeaderboardStore> {
    Ok(LeaderboardStore::open(config.storage.leaders_path())?)
}

fn open_saver(config: &Config) -> Result<Saver> {
    let store = SaveStore::open(config.storage.saves_dir())?;
    if config.storage.background_saves {
        Ok(Saver::Background(BackgroundSaver::start(store)?))
    } else {
        Ok(Saver::Direct(store))
    }
}

fn play(config: &Config, mut session: Session) -> Result<()> {
    let mut screen = Screen::new();
    screen.enter()?;

    let result = run(config, &mut session, &mut screen);

    // Always try to restore terminal state.
    let _ = screen.leave();
    session.close();
    result
}

fn run(config: &Config, session: &mut Session, screen: &mut Screen) -> Result<()> {
    let bindings = KeyBindings::from_names(|command| config.controls.key_for(command));
    let mut input = InputHandler::with_repeat_ms(config.input.move_repeat_ms);
    let view = GameView::default()
        .with_ghost(config.graphics.show_ghost)
        .with_grid(config.graphics.show_grid);

    let help_text: Vec<(String, String)> = GameCommand::ALL
        .iter()
        .filter_map(|&command| {
            let key = bindings.key_for(command)?;
            Some((key_name(key), command.as_str().replace('_', " ")))
        })
        .collect();
    let help: Vec<(&str, &str)> = help_text
        .iter()
        .map(|(key, action)| (key.as_str(), action.as_str()))
        .collect();

    let started = Instant::now();
    let now_ms = || started.elapsed().as_millis() as u64;
    let tick_duration = Duration::from_millis(u64::from(TICK_MS));
    let mut last_tick = Instant::now();
    let mut fb = polytris::term::FrameBuffer::new(0, 0);

    session.start(now_ms());

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let hud = Hud {
            notification: session.notification(now_ms()),
            help: &help,
        };
        view.render_into(session.game(), &hud, Viewport::new(w, h), &mut fb);
        screen.draw(&fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        let now = now_ms();
                        if should_quit(key) {
                            session.apply(GameCommand::Menu, now);
                            return Ok(());
                        }
                        let command = bindings
                            .command_for(key)
                            .and_then(|command| input.press(command, now));
                        match command {
                            // Soft drop acts per tick while held.
                            None | Some(GameCommand::SoftDrop) => {}
                            Some(command) => {
                                if session.apply(command, now) == Flow::Exit {
                                    return Ok(());
                                }
                                if command == GameCommand::NewGame {
                                    input.reset();
                                }
                            }
                        }
                    }
                    KeyEventKind::Release => {
                        if let Some(command) = bindings.command_for(key) {
                            if input.release(command) {
                                session.end_soft_drop();
                            }
                        }
                    }
                },
                Event::Resize(..) => screen.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            let now = now_ms();

            let held = input.update(now);
            if held.soft_drop_released {
                session.end_soft_drop();
            }
            if let Some(command) = held.repeat {
                session.apply(command, now);
            }

            for event in session.tick(now, input.soft_drop_held()) {
                debug!(?event, "Session event");
            }
        }
    }
}
