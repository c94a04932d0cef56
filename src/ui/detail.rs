use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(item) = app.current_item() else {
        let block = Block::default().borders(Borders::ALL).title("Item");
        let empty = Paragraph::new("No item selected")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    };

    let body = serde_json::to_string_pretty(&item.record.raw)
        .unwrap_or_else(|_| item.record.raw.to_string());
    let lines: Vec<Line> = body.lines().map(|l| Line::raw(l.to_string())).collect();

    let inner_height = area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(inner_height);
    let scroll_offset = app.scroll_offset.min(max_scroll);

    let visible_lines: Vec<Line> = lines
        .into_iter()
        .skip(scroll_offset)
        .take(inner_height)
        .collect();

    frame.render_widget(Clear, area);

    let title = if item.is_del {
        format!("{} (deleted)", item.record.title)
    } else {
        item.record.title.clone()
    };
    let paragraph = Paragraph::new(Text::from(visible_lines))
        .block(Block::default().borders(Borders::ALL).title(title));

    frame.render_widget(paragraph, area);
}
