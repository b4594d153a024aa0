use crate::blog::{BlogClient, BlogSession, DataAccess};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::ui;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::ListState;
use std::io::stdout;
use std::time::Duration;
use tracing::info;

const TICK_RATE: Duration = Duration::from_millis(100);

/// Main application state
pub struct App<A: DataAccess = BlogClient> {
  session: BlogSession<A>,

  /// API host shown in the header
  host: String,

  /// Cursor in the post list
  list_state: ListState,

  should_quit: bool,
}

impl App<BlogClient> {
  pub fn new(config: Config) -> Result<Self> {
    let settings = config.session_settings()?;
    let client = BlogClient::new(&config.api)?;
    let host = client.host().to_string();

    info!(%host, max_page = %settings.max_page, "Starting");
    Ok(Self::with_session(BlogSession::new(client, settings), host))
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Restore the terminal even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(
    &mut self,
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
  ) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);
    self.session.start();

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    info!("Quitting");
    Ok(())
  }
}

impl<A: DataAccess> App<A> {
  pub fn with_session(session: BlogSession<A>, host: String) -> Self {
    Self {
      session,
      host,
      list_state: ListState::default().with_selected(Some(0)),
      should_quit: false,
    }
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      // Redrawn on the next loop iteration
      Event::Resize | Event::Tick => {}
    }
    // Keys can arrive faster than ticks, poll on every event
    self.session.tick();
  }

  fn handle_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('q') => self.should_quit = true,
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }

      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
      KeyCode::Enter => self.open_selected(),
      KeyCode::Esc => self.session.clear_selection(),

      KeyCode::Right | KeyCode::Char('n') => {
        if self.session.next_page() {
          self.list_state.select(Some(0));
        }
      }
      KeyCode::Left | KeyCode::Char('p') => {
        if self.session.previous_page() {
          self.list_state.select(Some(0));
        }
      }
      KeyCode::Char('r') => self.session.refresh(),

      KeyCode::Char('d') => self.session.delete_selected(),
      KeyCode::Char('u') => self.session.update_selected(),

      _ => {}
    }
  }

  fn move_selection(&mut self, delta: i32) {
    let len = self.session.posts().data().map_or(0, Vec::len);
    if len == 0 {
      return;
    }
    let selected = self.list_state.selected().unwrap_or(0);
    let next = (selected as i32 + delta).rem_euclid(len as i32) as usize;
    self.list_state.select(Some(next));
  }

  fn open_selected(&mut self) {
    if let Some(index) = self.list_state.selected() {
      self.session.select_index(index);
    }
  }

  // Accessors for UI rendering
  pub fn host(&self) -> &str {
    &self.host
  }

  /// Split borrow for rendering the list with its cursor.
  pub fn view_parts(&mut self) -> (&BlogSession<A>, &mut ListState) {
    (&self.session, &mut self.list_state)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::blog::fake::FakeApi;
  use crate::blog::{Page, SessionSettings};
  use crate::query::{CacheOptions, RetryPolicy};

  fn new_app(api: FakeApi) -> App<FakeApi> {
    let settings = SessionSettings {
      max_page: Page::new(10).unwrap(),
      posts_stale_time: Duration::from_millis(2000),
      comments_stale_time: Duration::ZERO,
      cache: CacheOptions {
        retry: RetryPolicy::none(),
        max_entries: None,
      },
    };
    let mut app = App::with_session(BlogSession::new(api, settings), "localhost".to_string());
    app.session.start();
    app
  }

  fn press(app: &mut App<FakeApi>, code: KeyCode) {
    app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
  }

  async fn settle(app: &mut App<FakeApi>) {
    tokio::time::sleep(Duration::from_millis(10)).await;
    app.handle_event(Event::Tick);
  }

  #[tokio::test(start_paused = true)]
  async fn test_cursor_wraps_around_page() {
    let mut app = new_app(FakeApi::new());
    settle(&mut app).await;

    press(&mut app, KeyCode::Up);
    assert_eq!(app.list_state.selected(), Some(9));
    press(&mut app, KeyCode::Char('j'));
    assert_eq!(app.list_state.selected(), Some(0));
  }

  #[tokio::test(start_paused = true)]
  async fn test_enter_opens_post_under_cursor() {
    let mut app = new_app(FakeApi::new());
    settle(&mut app).await;

    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.session.selected_post().map(|p| p.id.0), Some(3));

    press(&mut app, KeyCode::Esc);
    assert!(app.session.selected_post().is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn test_page_keys_move_and_reset_cursor() {
    let mut app = new_app(FakeApi::new());
    settle(&mut app).await;

    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.session.current_page().get(), 2);
    assert_eq!(app.list_state.selected(), Some(0));

    press(&mut app, KeyCode::Left);
    assert_eq!(app.session.current_page().get(), 1);
    // Already on the first page
    press(&mut app, KeyCode::Char('p'));
    assert_eq!(app.session.current_page().get(), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn test_quit_keys() {
    let mut app = new_app(FakeApi::new());
    press(&mut app, KeyCode::Char('c'));
    assert!(!app.should_quit);

    app.handle_event(Event::Key(KeyEvent::new(
      KeyCode::Char('c'),
      KeyModifiers::CONTROL,
    )));
    assert!(app.should_quit);

    let mut app = new_app(FakeApi::new());
    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit);
  }

  #[tokio::test(start_paused = true)]
  async fn test_mutation_keys_need_selection() {
    let api = FakeApi::new();
    let mut app = new_app(api.clone());
    settle(&mut app).await;

    press(&mut app, KeyCode::Char('d'));
    settle(&mut app).await;
    assert!(api.deleted().is_empty());

    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Char('d'));
    press(&mut app, KeyCode::Char('u'));
    settle(&mut app).await;
    assert_eq!(api.deleted().iter().map(|id| id.0).collect::<Vec<_>>(), vec![1]);
    assert_eq!(api.updated().iter().map(|id| id.0).collect::<Vec<_>>(), vec![1]);
  }
}
