mod app;
mod atlas;
mod braille;
mod cli;
mod config;
mod data;
mod map;
mod ui;

use anyhow::{Context, Result};
use app::{App, MapView};
use clap::Parser;
use cli::Cli;
use config::AppConfig;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::layout::Rect;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::sync::Mutex;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    init_logging(&config)?;
    info!(?config, map = ?cli.map, "starting");

    // Both maps load before the terminal is touched so errors print normally
    let (world, us) = rayon::join(
        || data::load_map(&config.world_sources()),
        || data::load_map(&config.us_sources()),
    );
    let world = world.context("Failed to load the world map")?;
    let us = us.context("Failed to load the US map")?;

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let size = terminal.size()?;
    let area = ui::map_inner_area(Rect::new(0, 0, size.width, size.height));
    let interval = config.playback_interval();
    let mut app = App::new(
        MapView::new(world, config.world.initial_year, interval, area),
        MapView::new(us, config.us.initial_year, interval, area),
        cli.map,
        size.width,
        size.height,
    );

    // Run the app
    let result = run(&mut terminal, &mut app);
    if let Err(err) = &result {
        error!("event loop failed: {err:#}");
    }

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Log to a file; the terminal belongs to the UI
fn init_logging(config: &AppConfig) -> Result<()> {
    let file = File::create(&config.log.file)
        .with_context(|| format!("Failed to create log file: {:?}", config.log.file))?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(config.log.filter.parse()?)
        .with_env_var("URBAN_ATLAS_LOG")
        .from_env()?;

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter)
        .init();

    Ok(())
}

/// Handle mouse events for panning, zooming, and hover
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for the tooltip
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        // Click or drag on the slider picks a year; elsewhere it pans
        MouseEventKind::Down(MouseButton::Left) => {
            if !app.press_slider(mouse.column, mouse.row) {
                app.last_mouse = Some((mouse.column, mouse.row));
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if app.scrubbing {
                app.scrub(mouse.column);
            } else {
                app.handle_drag(mouse.column, mouse.row);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
        }
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    loop {
        app.refresh();

        // Draw
        terminal.draw(|frame| ui::render(frame, app))?;

        // Wake for the next frame or the next playback tick, whichever is first
        if event::poll(app.poll_timeout(Instant::now()))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            KeyCode::Tab => app.switch_map(),

                            // Year slider
                            KeyCode::Left => app.step_year(-1),
                            KeyCode::Right => app.step_year(1),
                            KeyCode::Home => app.first_year(),
                            KeyCode::End => app.last_year(),
                            KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => {
                                app.toggle_playback(Instant::now());
                            }

                            // Pan with hjkl or up/down
                            KeyCode::Char('h') => app.pan(-10, 0),
                            KeyCode::Char('l') => app.pan(10, 0),
                            KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
                            KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

                            // Zoom
                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                            KeyCode::Char('b') | KeyCode::Char('B') => app.toggle_borders(),

                            // Reset view
                            KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width, height);
                }
                _ => {}
            }
        }

        // Advance playback
        app.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
