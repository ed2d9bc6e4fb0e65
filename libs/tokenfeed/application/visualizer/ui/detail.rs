//! Detail widget - live price chart and stats for the observed token

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::application::chart::{format_change, format_price, format_time, price_domain, y_ticks};
use crate::application::visualizer::App;
use crate::application::LivePriceSeries;
use crate::domain::TokenView;

/// Draw the detail pane
pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let (Some(token), Some(series)) = (app.dashboard.observed_token(), app.dashboard.observed_series())
    else {
        let empty = Paragraph::new(" No token observed. Select one and press Enter.")
            .block(Block::default().borders(Borders::ALL).title(" Detail "));
        frame.render_widget(empty, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(0)])
        .split(area);

    draw_stats(frame, &token, &series, chunks[0]);
    draw_chart(frame, &token, &series, chunks[1]);
}

fn draw_stats(frame: &mut Frame, token: &TokenView, series: &LivePriceSeries, area: Rect) {
    let trend_color = if series.is_up { Color::Green } else { Color::Red };
    let label = Style::default().fg(Color::DarkGray);

    let lines = vec![
        Line::from(Span::styled(
            format!("{} ({})", token.name, token.symbol),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Chain     ", label),
            Span::raw(token.chain.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Price     ", label),
            Span::styled(format_price(series.current_price), Style::default().fg(trend_color)),
        ]),
        Line::from(vec![
            Span::styled("Prev      ", label),
            Span::raw(format_price(series.previous_price)),
        ]),
        Line::from(vec![
            Span::styled("MCap      ", label),
            Span::raw(format_price(token.market_cap)),
        ]),
        Line::from(vec![
            Span::styled("Vol 24h   ", label),
            Span::raw(format_price(token.volume_24h)),
        ]),
        Line::from(vec![
            Span::styled("1h        ", label),
            Span::raw(format_change(token.change_1h)),
        ]),
        Line::from(vec![
            Span::styled("24h       ", label),
            Span::raw(format_change(token.change_24h)),
        ]),
        Line::from(vec![
            Span::styled("Txs       ", label),
            Span::raw(token.tx_count.to_string()),
        ]),
    ];

    let stats = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Stats "));
    frame.render_widget(stats, area);
}

fn draw_chart(frame: &mut Frame, token: &TokenView, series: &LivePriceSeries, area: Rect) {
    let (first_time, last_time) = match (series.series.first(), series.series.last()) {
        (Some(first), Some(last)) => (first.time, last.time),
        _ => (0, 0),
    };

    let data: Vec<(f64, f64)> = series
        .series
        .iter()
        .map(|p| ((p.time - first_time) as f64, p.price))
        .collect();

    let domain = price_domain(&series.series);
    let line_color = if series.is_up { Color::Green } else { Color::Red };

    let datasets = vec![Dataset::default()
        .name(token.symbol.clone())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(line_color))
        .data(&data)];

    let x_labels = vec![
        Span::raw(format_time(first_time)),
        Span::raw(format_time(last_time)),
    ];
    let y_labels: Vec<Span> = y_ticks(domain, 3)
        .into_iter()
        .map(|tick| Span::raw(format_price(tick)))
        .collect();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} - {} points ", token.symbol, series.series.len())),
        )
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, ((last_time - first_time) as f64).max(1.0)])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([domain.min, domain.max])
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}
