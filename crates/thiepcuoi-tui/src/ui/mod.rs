//! Presentation bindings. Both layouts draw the same controller state; the
//! controller never knows which one is active.

mod full;
mod widget;

use clap::ValueEnum;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use thiepcuoi_core::{ChatMessage, Sender, Severity};

use crate::app::App;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LayoutMode {
    /// Whole-terminal chat page
    #[default]
    Full,
    /// Compact panel docked in the bottom-right corner
    Widget,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Full => "full",
            LayoutMode::Widget => "widget",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "full" => Some(LayoutMode::Full),
            "widget" => Some(LayoutMode::Widget),
            _ => None,
        }
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    match app.layout {
        LayoutMode::Full => full::render(app, frame),
        LayoutMode::Widget => widget::render(app, frame),
    }

    // Toast sits above either layout
    let area = frame.area();
    render_toast(app, frame, area);
}

const USER_COLOR: Color = Color::Cyan;
const BOT_COLOR: Color = Color::Magenta;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        match after.find("**") {
            Some(end) if end > 0 => {
                if start > 0 {
                    spans.push(Span::raw(rest[..start].to_string()));
                }
                spans.push(Span::styled(
                    after[..end].to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                rest = &after[end + 2..];
            }
            // No closing **, treat as literal
            _ => break,
        }
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

/// Lines for one message: author, body, time, blank separator.
fn message_lines(message: &ChatMessage) -> Vec<Line<'static>> {
    let (label, color, alignment) = match message.sender {
        Sender::User => ("Bạn", USER_COLOR, Alignment::Right),
        Sender::Bot => ("Tư vấn viên", BOT_COLOR, Alignment::Left),
    };

    let mut lines = vec![Line::from(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .alignment(alignment)];

    for line in message.content.lines() {
        let body = match message.sender {
            Sender::User => Line::from(line.to_string()),
            Sender::Bot => parse_markdown_line(line),
        };
        lines.push(body.alignment(alignment));
    }

    lines.push(
        Line::from(Span::styled(
            message.display_time(),
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(alignment),
    );
    lines.push(Line::default());
    lines
}

/// Everything inside the transcript box, typing indicator included.
fn transcript_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = app
        .snapshot
        .messages
        .iter()
        .flat_map(message_lines)
        .collect();

    if app.busy() {
        lines.push(Line::from(Span::styled(
            "Tư vấn viên",
            Style::default().fg(BOT_COLOR).add_modifier(Modifier::BOLD),
        )));
        // Animated dots: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Đang soạn trả lời{}", dots),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

/// Rows the paragraph takes once word-wrapped to `width`.
fn wrapped_height(paragraph: &Paragraph, width: u16) -> u16 {
    paragraph.line_count(width).min(u16::MAX as usize) as u16
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect, title: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title.to_string());

    let inner = block.inner(area);
    let transcript = Paragraph::new(Text::from(transcript_lines(app))).wrap(Wrap { trim: false });
    app.set_scroll_bounds(wrapped_height(&transcript, inner.width), inner.height);

    let transcript = transcript.block(block).scroll((app.scroll, 0));
    frame.render_widget(transcript, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let (border_color, title) = if app.busy() {
        (Color::DarkGray, " Đang chờ trả lời... ")
    } else {
        (Color::Yellow, " Nhập câu hỏi (Enter gửi) ")
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    // Keep the cursor visible with horizontal scrolling
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    // Newlines from Shift+Enter show as a return glyph on the single input row
    let visible_text: String = app
        .input()
        .chars()
        .map(|c| if c == '\n' { '↵' } else { c })
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(USER_COLOR))
        .block(block);
    frame.render_widget(input, area);

    if !app.busy() && area.width > 2 {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_toast(app: &App, frame: &mut Frame, area: Rect) {
    let Some(toast) = app.current_toast() else {
        return;
    };
    let notification = &toast.notification;

    let width = area.width.min(52);
    let height = 4.min(area.height);
    let popup = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + 1.min(area.height.saturating_sub(height)),
        width,
        height,
    };

    let color = match notification.severity {
        Severity::Destructive => Color::Red,
        Severity::Info => Color::Blue,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            format!(" {} ", notification.title),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));

    let body = Paragraph::new(notification.description.clone())
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, popup);
    frame.render_widget(body, popup);
}

fn footer_hints() -> Line<'static> {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    Line::from(vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" gửi ", label_style),
        Span::styled(" Shift+Enter ", key_style),
        Span::styled(" xuống dòng ", label_style),
        Span::styled(" Ctrl+L ", key_style),
        Span::styled(" xoá hội thoại ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" cuộn ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" thoát ", label_style),
    ])
}
