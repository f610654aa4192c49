mod app;
mod render;

use std::fs::File;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use app::App;
use keywatch_core::config::Config;

fn init_logging(verbose: bool) {
    use simplelog::*;

    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("keywatch")
        .join("keywatch.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = File::create(&log_path)
        .unwrap_or_else(|_| File::create("/tmp/keywatch.log").expect("Cannot create log file"));

    WriteLogger::init(log_level, simplelog::Config::default(), log_file)
        .expect("Failed to initialize logger");

    log::info!("keywatch starting (log level: {:?})", log_level);
}

fn main() -> io::Result<()> {
    let verbose = std::env::args().any(|a| a == "--verbose" || a == "-v");
    init_logging(verbose);

    let config = Config::load();
    let mut app = App::new(&config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app, &config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    config: &Config,
) -> io::Result<()> {
    let render_interval = Duration::from_millis(1000 / config.fps() as u64);
    let mut last_render = Instant::now()
        .checked_sub(render_interval)
        .unwrap_or_else(Instant::now);

    loop {
        if event::poll(Duration::from_millis(10))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    // Connect acts only while idle; denied/error stay put
                    KeyCode::Char('c') => app.request_access(),
                    _ => {}
                },
                Event::Resize(_, _) => {
                    // Redraw on the next pass
                    last_render = Instant::now()
                        .checked_sub(render_interval)
                        .unwrap_or_else(Instant::now);
                }
                _ => {}
            }
        }

        // Drain MIDI events and keep the device list current
        app.tick();

        if last_render.elapsed() >= render_interval {
            last_render = Instant::now();
            terminal.draw(|frame| render::draw(frame, app))?;
        }
    }

    Ok(())
}
