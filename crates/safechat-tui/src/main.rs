mod app;
mod handler;
mod profile;
mod tui;
mod ui;

use anyhow::Result;
use safechat_core::logging::{default_log_dir, init_logging};
use safechat_core::{client_from_config, Config};
use tracing::{error, info};

use app::App;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    let _log_guard = init_logging(&default_log_dir()?, config.log_level())?;

    // Fail on a missing API key before the terminal is taken over
    let client = client_from_config(&config)?;
    info!(
        provider = client.provider().as_str(),
        model = client.model(),
        "starting safechat"
    );

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut app = App::new(&config, client);

    let result = run(&mut terminal, &mut app).await;

    tui::restore()?;
    if let Err(err) = &result {
        error!(error = %err, "safechat exited with error");
    }
    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    Ok(())
}
