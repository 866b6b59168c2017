use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{footer_hints, render_input, render_transcript};
use crate::app::App;

/// Widest the conversation column grows on large terminals
const MAX_CONTENT_WIDTH: u16 = 100;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let column = centered_column(body_area);
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(column);

    let title = format!(" {} ", app.model());
    render_transcript(app, frame, chat_area, &title);
    render_input(app, frame, input_area);

    let footer = Paragraph::new(footer_hints()).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status = if app.busy() {
        Span::styled(" đang trả lời ", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(" sẵn sàng ", Style::default().fg(Color::Green))
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(" ♥ Tư vấn thiệp cưới ", Style::default().fg(Color::LightRed).bold()),
            status,
            Span::styled(
                format!("v{}", env!("CARGO_PKG_VERSION")),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(Span::styled(
            " Chatbot hỗ trợ 24/7 · Ctrl+L xoá hội thoại",
            Style::default().fg(Color::Gray),
        )),
    ];

    let header = Paragraph::new(lines).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn centered_column(area: Rect) -> Rect {
    let width = area.width.min(MAX_CONTENT_WIDTH);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}
