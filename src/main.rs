use std::io;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use confab::app::App;
use confab::client::AgentClient;
use confab::config::Config;
use confab::terminal::{enter_tui_mode, leave_tui_mode};
use confab::ui;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    if std::env::args().skip(1).any(|arg| arg == "--version" || arg == "-V") {
        println!("confab {VERSION}");
        return Ok(());
    }

    color_eyre::install()?;
    init_tracing();

    let config = Config::from_env();
    tracing::info!(
        base_url = %config.base_url,
        user_id = %config.user_id,
        session_id = %config.session_id,
        "starting"
    );

    let runtime = tokio::runtime::Runtime::new()?;

    // Setup terminal
    let mut stdout = io::stdout();
    enter_tui_mode(&mut stdout)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(AgentClient::new(&config));

    // Main event loop
    let result = runtime.block_on(run_app(&mut terminal, &mut app));

    // Restore the terminal before any error gets printed
    leave_tui_mode(&mut io::stdout());

    result
}

/// Set up logging when `CONFAB_LOG` names a file.
///
/// The TUI owns stdout and stderr, so there is no default subscriber;
/// without the env var, logging is a no-op.
fn init_tracing() {
    let Ok(path) = std::env::var("CONFAB_LOG") else {
        return;
    };
    if path.is_empty() {
        return;
    }
    let Ok(file) = std::fs::File::create(&path) else {
        eprintln!("confab: cannot open log file {path}");
        return;
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("confab=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();
}

/// Drive the UI: redraw when dirty, then wait on either a terminal event
/// or a message from a receive loop.
async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let mut event_stream = EventStream::new();

    // Take the message receiver from the app (we need ownership for select!)
    let mut message_rx = app
        .message_rx
        .take()
        .ok_or_else(|| eyre!("message receiver already taken"))?;

    loop {
        if app.needs_redraw || app.is_streaming() {
            terminal.draw(|frame| ui::render(frame, app))?;
            app.needs_redraw = false;
        }

        tokio::select! {
            event = event_stream.next() => {
                match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        handle_key(app, key);
                    }
                    Some(Ok(Event::Resize(_, _))) => {
                        app.mark_dirty();
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(()),
                }
            }
            message = message_rx.recv() => {
                if let Some(message) = message {
                    app.handle_message(message);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        KeyCode::Esc => app.quit(),
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => app.backspace_input(),
        KeyCode::Char(c) => app.push_input_char(c),
        _ => {}
    }
}
