use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::operations::ProcessLauncher;

use super::render::{self, Layout};
use super::session::{Effect, Message, Session, Suspension};
use super::text::column_window;

type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

/// Terminal front end: draws the session, feeds it events and performs the
/// effects it asks for
pub struct App {
    terminal: Terminal,
    session: Session,
    launcher: Arc<dyn ProcessLauncher>,
}

impl App {
    pub fn new(session: Session, launcher: Arc<dyn ProcessLauncher>) -> Result<Self> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let mut app = Self {
            terminal,
            session,
            launcher,
        };

        let (width, height) = terminal::size()?;
        app.dispatch(Message::Resize(width, height))?;
        app.session.reload();

        Ok(app)
    }

    pub async fn run(&mut self) -> Result<()> {
        let tick = Duration::from_millis(self.session.config().tick_ms);
        let mut last_tick = Instant::now();

        while !self.session.should_quit() {
            self.draw()?;

            // Drain finished background tasks
            while let Some(result) = self.session.next_result() {
                self.dispatch(Message::TaskFinished(result))?;
            }

            let timeout = tick.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.dispatch(Message::Key(key))?;
                    }
                    Event::Resize(width, height) => {
                        self.dispatch(Message::Resize(width, height))?;
                    }
                    _ => {}
                }
            }

            if last_tick.elapsed() >= tick {
                self.dispatch(Message::Tick)?;
                last_tick = Instant::now();
            }
        }

        if !self.session.processing().is_empty() {
            tracing::info!(
                in_flight = self.session.processing().len(),
                "quitting with background tasks still running"
            );
        }
        Ok(())
    }

    fn dispatch(&mut self, msg: Message) -> Result<()> {
        for effect in self.session.update(msg) {
            match effect {
                Effect::Refresh => self.session.reload(),
                Effect::Suspend(suspension) => self.suspend(suspension)?,
                Effect::Quit => {}
            }
        }
        Ok(())
    }

    /// Give the terminal to a foreground process and take it back afterwards
    fn suspend(&mut self, suspension: Suspension) -> Result<()> {
        let Suspension { command, sync_issue } = suspension;

        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;

        let outcome = self.launcher.run_foreground(&command);

        enable_raw_mode()?;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen)?;
        self.terminal.clear()?;

        let error = match outcome {
            Ok(code) => {
                if code != 0 {
                    tracing::info!(program = %command.program, code, "foreground process exited non-zero");
                }
                None
            }
            Err(e) => {
                tracing::warn!(program = %command.program, error = %e, "failed to launch foreground process");
                Some(format!("Failed to launch {}: {}", command.program, e))
            }
        };

        self.dispatch(Message::ForegroundExited { sync_issue, error })
    }

    fn draw(&mut self) -> Result<()> {
        let session = &self.session;
        let layout = session.layout();
        let lines = styled_lines(
            render::frame_lines(session),
            render::selected_row(session),
            &layout,
        );
        self.terminal.draw(|frame| {
            frame.render_widget(Paragraph::new(lines), frame.area());
        })?;

        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
    }
}

fn styled_lines(rows: Vec<String>, selected: Option<usize>, layout: &Layout) -> Vec<Line<'static>> {
    let last = rows.len().saturating_sub(1);
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| {
            if Some(idx) == selected && layout.list_width > 0 {
                let list = column_window(&row, 0, layout.list_width);
                let rest = column_window(&row, layout.list_width, layout.width.saturating_sub(layout.list_width));
                return Line::from(vec![
                    Span::styled(list, Style::default().add_modifier(Modifier::REVERSED)),
                    Span::raw(rest),
                ]);
            }
            match idx {
                0 => Line::styled(row, Style::default().add_modifier(Modifier::BOLD)),
                i if i == last => Line::styled(row, Style::default().fg(Color::Yellow)),
                _ => Line::raw(row),
            }
        })
        .collect()
}
