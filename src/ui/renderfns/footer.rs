use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer bar with key hints for the current state
pub fn draw_footer(frame: &mut Frame, area: Rect, has_selection: bool) {
  let mut spans = vec![Span::raw(" ")];

  for (i, (key, action)) in hints(has_selection).into_iter().enumerate() {
    if i > 0 {
      spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(format!("<{}>", key), Style::default().fg(Color::Cyan)));
    spans.push(Span::styled(
      format!(" {}", action),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

fn hints(has_selection: bool) -> Vec<(&'static str, &'static str)> {
  let mut hints = vec![
    ("j/k", "move"),
    ("enter", "open"),
    ("n/p", "page"),
    ("r", "refresh"),
  ];
  if has_selection {
    hints.extend([("d", "delete"), ("u", "update"), ("esc", "close")]);
  }
  hints.push(("q", "quit"));
  hints
}
