use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use chat_widget_core::{Entry, Origin};
use crate::app::{App, FocusPane};

const SEND_LABEL: &str = " Send ";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, shortcuts, input, footer
    let [header_area, chat_area, shortcuts_area, input_row, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_shortcuts(app, frame, shortcuts_area);
    render_input(app, frame, input_row);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.endpoint.clone(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);
    if app.follow_latest {
        app.scroll_to_bottom();
    }

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let chat = chat_paragraph(app)
        .block(chat_block)
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

/// The chat log as drawn, without border or scroll offset. Also used to
/// measure how many rows the log needs.
pub fn chat_paragraph(app: &App) -> Paragraph<'static> {
    let log = app.controller.log();
    let chat_text = if log.is_empty() {
        Text::from(Span::styled(
            "Type a message or pick a shortcut...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line<'static>> = Vec::new();

        for entry in log.entries() {
            match entry {
                Entry::Message(msg) => {
                    lines.push(origin_label(msg.origin));
                    // Replies are untrusted: raw text only, no markup
                    for line in msg.content.split('\n') {
                        lines.push(Line::raw(line.to_string()));
                    }
                    lines.push(Line::default());
                }
                Entry::Pending(_) => {
                    lines.push(origin_label(Origin::Assistant));
                    // Animated ellipsis: cycles through ".", "..", "..."
                    let dots = ".".repeat((app.animation_frame as usize) + 1);
                    lines.push(Line::from(Span::styled(
                        format!("Thinking{}", dots),
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                    )));
                }
            }
        }

        Text::from(lines)
    };

    Paragraph::new(chat_text).wrap(Wrap { trim: false })
}

fn origin_label(origin: Origin) -> Line<'static> {
    match origin {
        Origin::User => Line::from(Span::styled(
            "You:",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Origin::Assistant => Line::from(Span::styled(
            "AI:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    }
}

fn render_shortcuts(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Shortcuts;
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Shortcuts (Tab to focus, click to send) ");
    let inner = block.inner(area);

    // Lay bubbles out left to right on one row, remembering each hit box
    let mut spans: Vec<Span> = Vec::new();
    let mut bubble_areas: Vec<Rect> = Vec::new();
    let mut x = inner.x;
    let right_edge = inner.x + inner.width;

    for (i, shortcut) in app.controller.shortcuts().iter().enumerate() {
        let label = format!(" {} ", shortcut);
        let width = label.chars().count() as u16;
        if x + width > right_edge {
            break;
        }

        let style = if focused && i == app.selected_shortcut {
            Style::default()
                .bg(Color::Magenta)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(Color::Blue).fg(Color::White)
        };

        bubble_areas.push(Rect::new(x, inner.y, width, 1));
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
        x += width + 1;
    }

    app.shortcut_areas = bubble_areas;
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let send_width = SEND_LABEL.len() as u16 + 2;
    let [input_area, send_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(send_width),
    ])
    .areas(area);
    app.send_area = Some(send_area);

    let input_focused = app.focus == FocusPane::Input;
    let input_border_color = if input_focused { Color::Yellow } else { Color::DarkGray };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(" Message ");

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let input = app.controller.input();
    let cursor_pos = input.cursor();

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = input
        .value()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input_widget = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input_widget, input_area);

    // Send control is disabled while a reply is outstanding
    let send_style = if app.controller.is_awaiting_reply() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Black).bg(Color::Green).bold()
    };
    let send = Paragraph::new(Span::styled(SEND_LABEL, send_style)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(send, send_area);

    if input_focused {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let status = if app.controller.is_awaiting_reply() {
        Span::styled(
            " WAITING ",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        )
    } else {
        Span::styled(" READY ", Style::default().bg(Color::Blue).fg(Color::White))
    };

    let hints = if app.controller.is_awaiting_reply() {
        " Esc cancel | PgUp/PgDn scroll | Ctrl+C quit"
    } else {
        " Enter send | Tab shortcuts | Ctrl+L clear | PgUp/PgDn scroll | Ctrl+C quit"
    };

    let footer = Line::from(vec![
        status,
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(footer), area);
}
