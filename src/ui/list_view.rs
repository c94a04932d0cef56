use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::App;

use super::truncate;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.list.state();

    if app.visible_len() == 0 && !state.loading {
        let block = Block::default().borders(Borders::ALL).title("Items");
        let empty = Paragraph::new("No items")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let fixed = 8; // index(6) + spaces(2)
    let flex = w.saturating_sub(fixed).max(10);

    let mut items: Vec<ListItem> = state
        .visible_items()
        .enumerate()
        .map(|(row, (index, item))| {
            let style = if row == app.selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let line = Line::from(vec![
                Span::styled(
                    format!("{:>6}", index + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw("  "),
                Span::styled(truncate(&item.record.title, flex), style),
            ]);

            ListItem::new(line)
        })
        .collect();

    if state.reached_end {
        items.push(ListItem::new(Line::from(Span::styled(
            "  -- end --",
            Style::default().fg(Color::DarkGray),
        ))));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Items ({})", app.visible_len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut list_state = ListState::default();
    list_state.select(Some(app.selected));

    frame.render_stateful_widget(list, area, &mut list_state);
}
