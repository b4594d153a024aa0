use crate::blog::Page;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with app name, API host and page position
pub fn draw_header(frame: &mut Frame, area: Rect, host: &str, page: Page, max_page: Page) {
  let header = Line::from(vec![
    Span::styled(" postq ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", host), Style::default().fg(Color::White)),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", page_label(page, max_page)),
      Style::default().fg(Color::Yellow).bold(),
    ),
  ]);

  let paragraph = Paragraph::new(header).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

fn page_label(page: Page, max_page: Page) -> String {
  format!("Page {} of {}", page, max_page)
}
