use crate::blog::{BlogSession, DataAccess, Post};
use crate::query::{QueryResult, QueryStatus};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

/// Post list for the current page plus the pager line underneath.
pub fn draw_posts<A: DataAccess>(
  frame: &mut Frame,
  area: Rect,
  session: &BlogSession<A>,
  list_state: &mut ListState,
) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Min(1), Constraint::Length(1)])
    .split(area);

  draw_list(frame, chunks[0], session, list_state);
  draw_pager(frame, chunks[1], session);
}

fn draw_list<A: DataAccess>(
  frame: &mut Frame,
  area: Rect,
  session: &BlogSession<A>,
  list_state: &mut ListState,
) {
  let result = session.posts();
  let posts = result.data().map(Vec::as_slice).unwrap_or(&[]);
  ensure_valid_selection(list_state, posts.len());

  let banner = refresh_error(result);
  let area = if let Some(message) = &banner {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(1), Constraint::Min(1)])
      .split(area);
    let line = Paragraph::new(message.as_str()).style(Style::default().fg(Color::Red).bold());
    frame.render_widget(line, chunks[0]);
    chunks[1]
  } else {
    area
  };

  let fetched = result
    .updated_at
    .map(|at| format!(" · {}", at.with_timezone(&chrono::Local).format("%H:%M:%S")))
    .unwrap_or_default();
  let title = if result.is_loading() && !posts.is_empty() {
    format!(" Posts (refreshing...){} ", fetched)
  } else if banner.is_some() {
    format!(" Posts ({}, outdated){} ", posts.len(), fetched)
  } else {
    format!(" Posts ({}){} ", posts.len(), fetched)
  };
  let border = if result.is_error() { Color::Red } else { Color::Blue };

  let block = Block::default()
    .title(title)
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  // Cached posts win over the loading and error states
  if posts.is_empty() {
    let paragraph = if let Some(error) = result.error() {
      Paragraph::new(vec![
        Line::styled("Oops, something went wrong", Style::default().fg(Color::Red).bold()),
        Line::raw(""),
        Line::styled(error.to_string(), Style::default().fg(Color::Red)),
        Line::raw(""),
        Line::styled("Press 'r' to retry.", Style::default().fg(Color::DarkGray)),
      ])
    } else if result.is_pending() || result.status == QueryStatus::Idle {
      Paragraph::new("Loading...").style(Style::default().fg(Color::DarkGray))
    } else {
      Paragraph::new("No posts on this page.").style(Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(paragraph.block(block).wrap(Wrap { trim: true }), area);
    return;
  }

  let selected_id = session.selected_post().map(|post| post.id);
  let width = area.width.saturating_sub(10) as usize;

  let items: Vec<ListItem> = posts
    .iter()
    .map(|post| {
      let marker = if Some(post.id) == selected_id { "▶" } else { " " };
      let line = Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Yellow)),
        Span::styled(format!("{:>4} ", post.id.0), Style::default().fg(Color::Cyan)),
        Span::raw(truncate(&post.title, width)),
      ]);
      ListItem::new(line)
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  frame.render_stateful_widget(list, area, list_state);
}

fn draw_pager<A: DataAccess>(frame: &mut Frame, area: Rect, session: &BlogSession<A>) {
  let enabled = Style::default().fg(Color::Cyan);
  let disabled = Style::default().fg(Color::DarkGray);

  let line = Line::from(vec![
    Span::styled(
      "<p> Previous",
      if session.can_go_previous() { enabled } else { disabled },
    ),
    Span::raw("   "),
    Span::styled(
      format!("Page {}", session.current_page()),
      Style::default().fg(Color::White).bold(),
    ),
    Span::raw("   "),
    Span::styled(
      "Next page <n>",
      if session.can_go_next() { enabled } else { disabled },
    ),
  ]);

  frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

/// Banner for a failed refresh over cached posts. An error with nothing
/// cached is drawn in place of the list instead.
fn refresh_error(result: &QueryResult<Vec<Post>>) -> Option<String> {
  match (result.error(), result.data()) {
    (Some(error), Some(posts)) if result.is_error() && !posts.is_empty() => {
      Some(format!("Refresh failed: {} (press 'r' to retry)", error))
    }
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::blog::fake::post;
  use crate::query::FetchError;
  use std::sync::Arc;

  fn result(status: QueryStatus, data: Option<Vec<Post>>) -> QueryResult<Vec<Post>> {
    QueryResult {
      data: data.map(Arc::new),
      status,
      error: (status == QueryStatus::Error).then(|| FetchError::request("network down")),
      ..QueryResult::idle()
    }
  }

  #[test]
  fn test_failed_refresh_over_cached_posts_is_reported() {
    let failed = result(QueryStatus::Error, Some(vec![post(1), post(2)]));
    assert_eq!(
      refresh_error(&failed).as_deref(),
      Some("Refresh failed: Error: network down (press 'r' to retry)")
    );
  }

  #[test]
  fn test_no_banner_without_cached_posts_or_error() {
    assert_eq!(refresh_error(&result(QueryStatus::Error, None)), None);
    assert_eq!(
      refresh_error(&result(QueryStatus::Success, Some(vec![post(1)]))),
      None
    );
    assert_eq!(
      refresh_error(&result(QueryStatus::Loading, Some(vec![post(1)]))),
      None
    );
  }
}
