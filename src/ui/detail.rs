use crate::blog::{BlogSession, Comment, DataAccess, Post};
use crate::query::{MutationState, QueryResult};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Detail pane: the selected post, mutation status and its comments.
pub fn draw_detail<A: DataAccess>(frame: &mut Frame, area: Rect, session: &BlogSession<A>) {
  let block = Block::default()
    .title(" Post ")
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  let Some(post) = session.selected_post() else {
    let paragraph = Paragraph::new("Select a post with <enter>.")
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  };

  let mut lines = post_lines(post);

  let statuses = [
    delete_status(session.delete_state()),
    update_status(session.update_state()),
  ];
  for (text, color) in statuses.into_iter().flatten() {
    lines.push(Line::styled(text, Style::default().fg(color)));
  }
  lines.push(Line::raw(""));

  lines.extend(comment_lines(session.comments()));

  let paragraph = Paragraph::new(lines)
    .block(block)
    .wrap(Wrap { trim: false });
  frame.render_widget(paragraph, area);
}

fn post_lines(post: &Post) -> Vec<Line<'static>> {
  vec![
    Line::styled(post.title.clone(), Style::default().fg(Color::Cyan).bold()),
    Line::from(vec![
      Span::styled("<d>", Style::default().fg(Color::Cyan)),
      Span::styled(" delete  ", Style::default().fg(Color::DarkGray)),
      Span::styled("<u>", Style::default().fg(Color::Cyan)),
      Span::styled(" update title", Style::default().fg(Color::DarkGray)),
    ]),
    Line::raw(""),
    Line::raw(post.body.clone()),
    Line::raw(""),
  ]
}

fn comment_lines(comments: Option<&QueryResult<Vec<Comment>>>) -> Vec<Line<'static>> {
  let mut lines = vec![Line::styled("Comments", Style::default().bold())];

  let Some(result) = comments else {
    return lines;
  };

  match result.data() {
    Some(comments) => {
      if result.is_loading() {
        lines.push(Line::styled("Refreshing...", Style::default().fg(Color::DarkGray)));
      }
      for comment in comments {
        lines.push(Line::from(vec![
          Span::styled(format!("• {}", comment.email), Style::default().fg(Color::Yellow)),
          Span::raw(format!(": {}", comment.body)),
        ]));
      }
    }
    None => match result.error() {
      Some(error) => {
        lines.push(Line::styled(error.to_string(), Style::default().fg(Color::Red)));
      }
      None => {
        lines.push(Line::styled("Loading...", Style::default().fg(Color::DarkGray)));
      }
    },
  }

  lines
}

/// Status line for the delete mutation.
pub fn delete_status<T>(state: &MutationState<T>) -> Option<(&'static str, Color)> {
  match state {
    MutationState::Idle => None,
    MutationState::Pending => Some(("Deleting the post...", Color::Magenta)),
    MutationState::Error(_) => Some(("Error deleting the post", Color::Red)),
    MutationState::Success(_) => Some(("Post (not actually) deleted", Color::Green)),
  }
}

/// Status line for the update mutation.
pub fn update_status<T>(state: &MutationState<T>) -> Option<(&'static str, Color)> {
  match state {
    MutationState::Idle => None,
    MutationState::Pending => Some(("Updating the post...", Color::Magenta)),
    MutationState::Error(_) => Some(("Error updating the post", Color::Red)),
    MutationState::Success(_) => Some(("Post (not actually) updated", Color::Green)),
  }
}
