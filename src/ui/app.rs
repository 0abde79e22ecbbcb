use std::io;
use std::time::Duration;

use crossterm::{
    event::{Event as CrosstermEvent, EventStream, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{Interval, MissedTickBehavior};

use crate::config::KeyBindings;
use crate::error::Result;
use crate::tmux::TmuxManager;

use super::intent::{run_intent, AppEvent, Backends, Intent};
use super::sessions::SessionsView;
use super::windows::{WindowAction, WindowsView};

/// Startup options for [`App`]
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub keys: KeyBindings,
    /// Background refresh period, `None` disables it
    pub refresh: Option<Duration>,
    /// Switch with `switch-client` instead of attaching in the foreground
    pub inside_tmux: bool,
}

/// Main TUI application
pub struct App {
    // Terminal state
    width: u16,
    height: u16,
    should_quit: bool,

    // Views
    sessions: SessionsView,
    windows: Option<WindowsView>,
    /// Last failure, shown in the footer until the next key
    flash: Option<String>,

    // Deferred actions that require terminal access
    pending_attach: Option<String>,

    options: AppOptions,
    backends: Backends,
    tmux: TmuxManager,
    tx: UnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(backends: Backends, tmux: TmuxManager, options: AppOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            width: 0,
            height: 0,
            should_quit: false,
            sessions: SessionsView::new(options.keys.clone()),
            windows: None,
            flash: None,
            pending_attach: None,
            options,
            backends,
            tmux,
            tx,
            rx,
        }
    }

    /// Run the TUI application
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        terminal.clear()?;

        let result = self.event_loop(&mut terminal).await;

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        let mut events = EventStream::new();
        let mut refresh = self.options.refresh.map(refresh_interval);

        self.dispatch(Intent::Reload);

        loop {
            terminal.draw(|f| {
                let area = f.area();
                self.resize(area.width, area.height);
                super::render::draw(f, self);
            })?;

            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key.code, key.modifiers);
                    }
                    // Resize is picked up by the next draw
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                Some(event) = self.rx.recv() => self.apply(event),
                _ = next_tick(&mut refresh) => self.dispatch(Intent::Reload),
            }

            if let Some(target) = self.pending_attach.take() {
                if let Err(e) = self.perform_attach(terminal, &target).await {
                    tracing::warn!("attach to {} failed: {}", target, e);
                    self.flash = Some(format!("attach failed: {e}"));
                }
                self.dispatch(Intent::Reload);
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn resize(&mut self, width: u16, height: u16) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.sessions.set_size(width, height);
        if let Some(view) = self.windows.as_mut() {
            view.set_size(width, height);
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        self.flash = None;

        if let Some(view) = self.windows.as_mut() {
            if self.options.keys.matches("quit", &code, modifiers) {
                self.should_quit = true;
                return;
            }
            match view.handle_key(code, modifiers) {
                Some(WindowAction::Back) => self.windows = None,
                Some(WindowAction::Select(target)) => {
                    self.windows = None;
                    self.dispatch(Intent::SelectWindow(target));
                }
                None => {}
            }
            return;
        }

        // Prompts take every key, quit keys included
        if !self.sessions.is_editing() && self.options.keys.matches("quit", &code, modifiers) {
            self.should_quit = true;
            return;
        }

        if let Some(intent) = self.sessions.handle_key(code, modifiers) {
            self.dispatch(intent);
        }
    }

    /// Hand an intent to a background task, or queue a foreground attach
    /// when there is no tmux client to switch.
    fn dispatch(&mut self, intent: Intent) {
        match intent {
            Intent::Switch(target) | Intent::SelectWindow(target) if !self.options.inside_tmux => {
                self.pending_attach = Some(target);
            }
            intent => {
                tokio::spawn(run_intent(intent, self.backends.clone(), self.tx.clone()));
            }
        }
    }

    fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::SessionsLoaded { sessions, roots } => {
                self.sessions.set_sessions(&sessions, &roots);
            }
            AppEvent::WindowsLoaded { session, windows } => {
                if self.sessions.is_editing() {
                    tracing::debug!("dropping window list for {}: prompt open", session);
                    return;
                }
                let mut view = WindowsView::new(session, windows, self.options.keys.clone());
                view.set_size(self.width, self.height);
                self.windows = Some(view);
            }
            AppEvent::Failed { action, error } => {
                self.flash = Some(format!("{action} failed: {error}"));
            }
        }
    }

    async fn perform_attach(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        target: &str,
    ) -> Result<()> {
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        let attach_result = self.tmux.attach_session(target).await;

        enable_raw_mode()?;
        execute!(terminal.backend_mut(), EnterAlternateScreen)?;
        terminal.clear()?;

        attach_result
    }

    pub fn sessions_view(&self) -> &SessionsView {
        &self.sessions
    }

    /// Drill-down view, when open
    pub fn windows_view(&self) -> Option<&WindowsView> {
        self.windows.as_ref()
    }

    pub fn flash(&self) -> Option<&str> {
        self.flash.as_deref()
    }
}

fn refresh_interval(period: Duration) -> Interval {
    // First tick one period out; startup already loads once
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
