mod detail;
mod posts;
mod renderfns;

use crate::app::App;
use crate::blog::DataAccess;
use ratatui::prelude::*;
use ratatui::widgets::ListState;

/// Main draw function
pub fn draw<A: DataAccess>(frame: &mut Frame, app: &mut App<A>) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Key hints
    ])
    .split(frame.area());

  let host = app.host().to_string();
  let (session, list_state) = app.view_parts();

  renderfns::draw_header(frame, chunks[0], &host, session.current_page(), session.max_page());

  let columns = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
    .split(chunks[1]);

  posts::draw_posts(frame, columns[0], session, list_state);
  detail::draw_detail(frame, columns[1], session);

  renderfns::draw_footer(frame, chunks[2], session.selected_post().is_some());
}

/// Keep the list cursor inside `len` items.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
  } else {
    match state.selected() {
      Some(i) if i >= len => state.select(Some(len - 1)),
      None => state.select(Some(0)),
      _ => {}
    }
  }
}
