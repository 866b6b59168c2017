use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{render_input, render_transcript};
use crate::app::App;

const PANEL_WIDTH: u16 = 48;
const PANEL_HEIGHT: u16 = 26;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let backdrop = Paragraph::new(Line::from(Span::styled(
        " Esc thoát · Ctrl+L xoá hội thoại ",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(backdrop, area);

    let panel = docked_panel(area);
    frame.render_widget(Clear, panel);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::LightRed))
        .title(Span::styled(
            " ♥ Tư vấn thiệp cưới ",
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(inner);

    render_transcript(app, frame, chat_area, " Chatbot hỗ trợ 24/7 ");
    render_input(app, frame, input_area);
}

/// Bottom-right panel, shrunk to fit small terminals
fn docked_panel(area: Rect) -> Rect {
    let width = area.width.min(PANEL_WIDTH);
    let height = area.height.min(PANEL_HEIGHT);
    Rect {
        x: area.x + area.width - width,
        y: area.y + area.height - height,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_docks_bottom_right() {
        let panel = docked_panel(Rect::new(0, 0, 120, 40));
        assert_eq!(panel, Rect::new(72, 14, PANEL_WIDTH, PANEL_HEIGHT));
    }

    #[test]
    fn panel_fills_tiny_terminal() {
        let area = Rect::new(0, 0, 30, 10);
        assert_eq!(docked_panel(area), area);
    }
}
