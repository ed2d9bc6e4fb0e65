//! Token columns widget - one list per category

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::application::chart::{format_change, format_price};
use crate::application::visualizer::App;
use crate::domain::{PriceDirection, TokenCategory, TokenView};

/// Draw the three category columns side by side
pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let categories = TokenCategory::all();
    let constraints: Vec<Constraint> = categories
        .iter()
        .map(|_| Constraint::Ratio(1, categories.len() as u32))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (column, category) in categories.iter().enumerate() {
        draw_column(frame, app, *category, column, chunks[column]);
    }
}

fn draw_column(frame: &mut Frame, app: &App, category: TokenCategory, column: usize, area: Rect) {
    let rows = app.dashboard.category_view(category);
    let focused = column == app.selected_column;
    let selected = app.selected_rows[column].min(rows.len().saturating_sub(1));

    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, view)| token_item(view, focused && i == selected))
        .collect();

    let title_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                format!(" {} ({}) ", category.title(), rows.len()),
                title_style,
            )),
    );

    let mut state = ListState::default();
    if !rows.is_empty() {
        state.select(Some(selected));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn token_item(view: &TokenView, is_selected: bool) -> ListItem<'static> {
    let base = if is_selected {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let price_style = if is_selected {
        base
    } else {
        base.fg(direction_color(view.price_direction()))
    };

    let change_style = if is_selected {
        base
    } else if view.change_1h >= 0.0 {
        base.fg(Color::Green)
    } else {
        base.fg(Color::Red)
    };

    let prefix = if is_selected { "> " } else { "  " };

    let symbol = if view.symbol.chars().count() > 10 {
        format!("{}...", view.symbol.chars().take(7).collect::<String>())
    } else {
        view.symbol.clone()
    };

    let content = Line::from(vec![
        Span::styled(prefix, base),
        Span::styled(format!("{:<10} ", symbol), base),
        Span::styled(format!("{:<4}", view.chain.as_str()), base),
        Span::styled(format!("{:>12} ", format_price(view.price)), price_style),
        Span::styled(format!("MC {:>9} ", format_price(view.market_cap)), base),
        Span::styled(format!("{:>8}", format_change(view.change_1h)), change_style),
    ]);

    ListItem::new(content)
}

/// Flash colour for the last price move
pub fn direction_color(direction: PriceDirection) -> Color {
    match direction {
        PriceDirection::Up => Color::Green,
        PriceDirection::Down => Color::Red,
        PriceDirection::Neutral => Color::White,
    }
}
