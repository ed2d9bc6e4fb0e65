//! UI widgets for the dashboard

pub mod detail;
pub mod token_list;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::App;
use crate::application::LoadState;

/// Draw the main UI layout
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_main(frame, app, chunks[1]);
    draw_footer(frame, app, chunks[2]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let status = app.feed_status.label();
    let status_color = match status {
        "LIVE" => Color::Green,
        "OFFLINE" => Color::Red,
        _ => Color::Yellow,
    };

    let load = match app.dashboard.load_state() {
        LoadState::Idle => "idle".to_string(),
        LoadState::Loading => "loading".to_string(),
        LoadState::Ready => format!("{} tokens", app.dashboard.sorted_tokens().len()),
        LoadState::Failed(_) => "load failed".to_string(),
    };

    let header_text = format!(
        " Feed: {} | {} | Chain: {} | Sort: {} | Updates: {}",
        status,
        load,
        app.dashboard.chain_filter(),
        app.dashboard.sort_key().label(),
        app.updates_applied
    );

    let header = Paragraph::new(header_text)
        .style(Style::default().fg(status_color))
        .block(Block::default().borders(Borders::ALL).title(" Token Dashboard "));

    frame.render_widget(header, area);
}

fn draw_main(frame: &mut Frame, app: &App, area: Rect) {
    if let LoadState::Failed(error) = app.dashboard.load_state() {
        let failed = Paragraph::new(format!(" Failed to load tokens: {}", error))
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL).title(" Tokens "));
        frame.render_widget(failed, area);
        return;
    }

    if !app.detail_open {
        token_list::draw(frame, app, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    token_list::draw(frame, app, chunks[0]);
    detail::draw(frame, app, chunks[1]);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let status = app.status_message.as_deref().unwrap_or("");

    let footer_text = if status.is_empty() {
        " q=quit h/l=column j/k=row enter=detail esc=close 1-4=sort c=chain".to_string()
    } else {
        format!(" {}", status)
    };

    let footer = Paragraph::new(footer_text).block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}
