use std::io::stdout;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tokio::runtime::Runtime;

use crate::app::{App, Model, update};
use crate::coordinator::IndentFollow;
use crate::editor::ScratchBuffer;

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the terminal cannot be
    /// initialized, or the event loop hits an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let text = match &self.file_path {
            Some(path) if path.exists() => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            _ => String::new(),
        };
        let buffer = ScratchBuffer::from_text(&text);

        // The coordinator's handlers are async (they suspend at movement
        // delegation and edit application); a current-thread runtime
        // drives them from the synchronous terminal loop.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to build async runtime")?;
        let coordinator = IndentFollow::new();

        let mut terminal = ratatui::try_init()
            .context("failed to initialize terminal — autodent requires an interactive terminal")?;
        execute!(stdout(), EnableMouseCapture)?;
        let size = terminal.size()?;

        let mut model = Model::new(self.file_path.clone(), buffer, (size.width, size.height));
        model.show_whitespace = self.show_whitespace;

        let result = Self::event_loop(&mut terminal, &runtime, &coordinator, &mut model);

        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();
        result
    }

    fn event_loop(
        terminal: &mut DefaultTerminal,
        runtime: &Runtime,
        coordinator: &IndentFollow,
        model: &mut Model,
    ) -> Result<()> {
        let mut needs_render = true;

        loop {
            if needs_render {
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }

            if event::poll(Duration::from_millis(250))? {
                if let Some(msg) = Self::handle_event(&event::read()?, model) {
                    runtime.block_on(update::apply(coordinator, model, msg));
                    needs_render = true;
                }

                // Coalesce key-repeat bursts into a single render.
                while event::poll(Duration::ZERO)? {
                    if let Some(msg) = Self::handle_event(&event::read()?, model) {
                        runtime.block_on(update::apply(coordinator, model, msg));
                        needs_render = true;
                    }
                }
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}
