use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};
use safechat_core::persona::{PLACEHOLDER, TYPING_INDICATOR};
use safechat_core::Speaker;
use unicode_width::UnicodeWidthChar;

use crate::app::{App, InputMode, Tab};
use crate::profile::PROFILE_OPTIONS;

/// A whitespace-free run of text, possibly spanning several styles
#[derive(Default)]
struct Word {
    pieces: Vec<(String, Style)>,
    width: usize,
}

fn split_words(line: &Line) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current = Word::default();

    for span in &line.spans {
        let mut piece = String::new();
        for c in span.content.chars() {
            if c.is_whitespace() {
                if !piece.is_empty() {
                    current.pieces.push((std::mem::take(&mut piece), span.style));
                }
                if !current.pieces.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            } else {
                piece.push(c);
                current.width += c.width().unwrap_or(0);
            }
        }
        // No whitespace at a span boundary keeps the word joined
        if !piece.is_empty() {
            current.pieces.push((piece, span.style));
        }
    }

    if !current.pieces.is_empty() {
        words.push(current);
    }
    words
}

/// Wrap a styled line to a given display width, returning the rows it occupies
/// Uses word boundaries for wrapping (doesn't break mid-word unless the word
/// is wider than the row). Wide characters count as two columns.
fn wrap_line_to_width(line: &Line, width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut rows: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0;

    for word in split_words(line) {
        if current_width > 0 {
            if current_width + 1 + word.width <= width {
                current.push(Span::raw(" "));
                current_width += 1;
            } else {
                rows.push(Line::from(std::mem::take(&mut current)).style(line.style));
                current_width = 0;
            }
        }

        for (text, style) in word.pieces {
            let mut chunk = String::new();
            for c in text.chars() {
                let char_width = c.width().unwrap_or(0);
                if current_width > 0 && current_width + char_width > width {
                    if !chunk.is_empty() {
                        current.push(Span::styled(std::mem::take(&mut chunk), style));
                    }
                    rows.push(Line::from(std::mem::take(&mut current)).style(line.style));
                    current_width = 0;
                }
                chunk.push(c);
                current_width += char_width;
            }
            if !chunk.is_empty() {
                current.push(Span::styled(chunk, style));
            }
        }
    }

    if !current.is_empty() || rows.is_empty() {
        rows.push(Line::from(current).style(line.style));
    }
    rows
}

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, tabs, body, footer
    let [header_area, tabs_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_tabs(app, frame, tabs_area);

    match app.tab {
        Tab::Chat => render_chat_screen(app, frame, body_area),
        Tab::Profile => render_profile_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let client = app.chat.client();
    let title = Line::from(vec![
        Span::styled(" SafeChat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!("{}: {}", client.provider().short_name(), client.model()),
            Style::default().fg(Color::White),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_tabs(app: &App, frame: &mut Frame, area: Rect) {
    let selected = match app.tab {
        Tab::Chat => 0,
        Tab::Profile => 1,
    };
    let tabs = Tabs::new(vec![" Chat ", " Profile "])
        .select(selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider("│");
    frame.render_widget(tabs, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match (app.tab, app.input_mode) {
        (Tab::Chat, InputMode::Editing) => " TYPE ",
        (Tab::Chat, InputMode::Normal) => " CHAT ",
        (Tab::Profile, _) => " PROFILE ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match (app.tab, app.input_mode) {
        (Tab::Chat, InputMode::Editing) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" PgUp/PgDn ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
            Span::styled(" ^N ", key_style),
            Span::styled(" new chat ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" profile ", label_style),
        ],
        (Tab::Chat, InputMode::Normal) => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" ^N ", key_style),
            Span::styled(" new chat ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" profile ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        (Tab::Profile, _) => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" nav ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" open ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" chat ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    let mut spans = vec![
        Span::styled(mode_text, mode_style),
        Span::styled(" ", label_style),
    ];
    spans.extend(hints);
    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!("  {}", status),
            Style::default().bg(Color::Black).fg(Color::Yellow),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

/// Transcript lines for the chat pane, including the typing indicator
fn chat_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for turn in app.transcript() {
        match turn.speaker() {
            Speaker::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in turn.text().lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            Speaker::Bot => {
                lines.push(Line::from(Span::styled(
                    "Bot:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                for line in turn.text().lines() {
                    lines.push(parse_markdown_line(line));
                }
            }
        }
        lines.push(Line::default());
    }

    if app.is_awaiting() {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("{}{}", TYPING_INDICATOR, dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    let builder = app.chat.context_builder();
    let used_units = app.chat.last_window().map(|w| w.estimated_units).unwrap_or(0);
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(
            " Chat · context {}/{} ",
            used_units,
            builder.budget().max_units
        ));

    let inner_width = chat_area.width.saturating_sub(2) as usize;
    app.chat_height = chat_area.height.saturating_sub(2);

    if app.transcript().is_empty() && !app.is_awaiting() {
        app.chat_total_lines = 0;
        app.chat_scroll = 0;

        let inner = chat_block.inner(chat_area);
        frame.render_widget(chat_block, chat_area);

        let [_, placeholder_area, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(3),
            Constraint::Fill(1),
        ])
        .areas(inner);
        let placeholder = Paragraph::new(PLACEHOLDER)
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
            .centered()
            .wrap(Wrap { trim: true });
        frame.render_widget(placeholder, placeholder_area);
    } else {
        // Pre-wrapped so the scroll math counts exactly the rows drawn
        let rows: Vec<Line<'static>> = chat_lines(app)
            .iter()
            .flat_map(|line| wrap_line_to_width(line, inner_width))
            .collect();
        app.chat_total_lines = rows.len().min(u16::MAX as usize) as u16;
        if app.follow_bottom {
            app.chat_scroll = app.max_chat_scroll();
        } else {
            app.chat_scroll = app.chat_scroll.min(app.max_chat_scroll());
        }

        let chat = Paragraph::new(Text::from(rows))
            .block(chat_block)
            .scroll((app.chat_scroll, 0));
        frame.render_widget(chat, chat_area);
    }

    render_input(app, frame, input_area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let title = if app.is_awaiting() {
        " Message (waiting for reply) "
    } else {
        " Message "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = input_viewport(&app.input, app.cursor, inner_width);

    let (text, style) = if app.input.is_empty() && !editing {
        ("Type your message...".to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (visible_text, Style::default().fg(Color::Cyan))
    };

    let input = Paragraph::new(text).style(style).block(input_block);
    frame.render_widget(input, area);

    if editing {
        frame.set_cursor_position((area.x + cursor_x as u16 + 1, area.y + 1));
    }
}

/// Visible slice of the input and the cursor column within it.
/// Scrolls horizontally so the cursor stays inside `width` columns.
fn input_viewport(input: &str, cursor: usize, width: usize) -> (String, usize) {
    let chars: Vec<char> = input.chars().collect();
    let widths: Vec<usize> = chars.iter().map(|c| c.width().unwrap_or(0)).collect();
    let cursor = cursor.min(chars.len());

    let mut start = 0;
    while start < cursor && widths[start..cursor].iter().sum::<usize>() >= width {
        start += 1;
    }

    let mut visible = String::new();
    let mut used = 0;
    for (c, w) in chars[start..].iter().zip(&widths[start..]) {
        if used + w > width {
            break;
        }
        visible.push(*c);
        used += w;
    }

    (visible, widths[start..cursor].iter().sum())
}

fn render_profile_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Profile Options ");

    let items: Vec<ListItem> = PROFILE_OPTIONS
        .iter()
        .map(|option| {
            ListItem::new(vec![
                Line::from(format!(" {}  {}", option.icon, option.title)),
                Line::default(),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.profile_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn draw(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        buffer_to_string(terminal.backend().buffer())
    }

    fn buffer_to_string(buf: &Buffer) -> String {
        let mut out = String::new();
        for (i, cell) in buf.content.iter().enumerate() {
            if i > 0 && i % buf.area.width as usize == 0 {
                out.push('\n');
            }
            out.push_str(cell.symbol());
        }
        out
    }

    fn row_texts(rows: &[Line]) -> Vec<String> {
        rows.iter()
            .map(|row| row.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_wrap_line_to_width() {
        let rows = wrap_line_to_width(&Line::from("one two three four"), 9);
        assert_eq!(row_texts(&rows), vec!["one two", "three", "four"]);

        let rows = wrap_line_to_width(&Line::default(), 10);
        assert_eq!(row_texts(&rows), vec![""]);

        let rows = wrap_line_to_width(&Line::from("abcdefgh"), 3);
        assert_eq!(row_texts(&rows), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_wrap_counts_wide_characters_as_two_columns() {
        let rows = wrap_line_to_width(&Line::from("你好你好你"), 4);
        assert_eq!(row_texts(&rows), vec!["你好", "你好", "你"]);

        let rows = wrap_line_to_width(&Line::from("hi 🚨🚨"), 5);
        assert_eq!(row_texts(&rows), vec!["hi", "🚨🚨"]);
    }

    #[test]
    fn test_wrap_keeps_bold_across_rows() {
        let line = parse_markdown_line("please **stay calm and safe**, okay");
        let rows = wrap_line_to_width(&line, 12);
        assert_eq!(row_texts(&rows), vec!["please stay", "calm and", "safe, okay"]);

        let bold = |row: &Line, text: &str| {
            row.spans
                .iter()
                .find(|s| s.content == text)
                .is_some_and(|s| s.style.add_modifier.contains(Modifier::BOLD))
        };
        assert!(bold(&rows[1], "calm"));
        assert!(bold(&rows[2], "safe"));
        assert!(!bold(&rows[2], ", okay") && !bold(&rows[2], ","));
    }

    #[test]
    fn test_input_viewport_follows_cursor() {
        assert_eq!(input_viewport("hello", 5, 10), ("hello".to_string(), 5));
        assert_eq!(input_viewport("abcdefgh", 8, 4), ("fgh".to_string(), 3));
        assert_eq!(input_viewport("你好你好", 4, 5), ("你好".to_string(), 4));
        assert_eq!(input_viewport("你好你好", 0, 5), ("你好".to_string(), 0));
    }

    #[test]
    fn test_parse_markdown_bold() {
        let line = parse_markdown_line("stay **calm** please");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "calm");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));

        let unclosed = parse_markdown_line("a **b");
        let text: String = unclosed.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "a **b");
    }

    #[tokio::test]
    async fn test_empty_chat_shows_placeholder() {
        let mut app = test_app();
        let screen = draw(&mut app, 100, 20);
        assert!(screen.contains("Report anonymously and stay safe!"));
        assert!(screen.contains("context 0/2000"));
    }

    #[tokio::test]
    async fn test_pending_chat_shows_turn_and_typing() {
        let mut app = test_app();
        app.input = "a senior is harassing me".to_string();
        app.submit_input();

        let screen = draw(&mut app, 100, 20);
        assert!(screen.contains("You:"));
        assert!(screen.contains("a senior is harassing me"));
        assert!(screen.contains("Bot is typing."));
        assert!(screen.contains("waiting for reply"));
        assert!(!screen.contains("Report anonymously"));
    }

    #[tokio::test]
    async fn test_profile_tab_lists_options() {
        let mut app = test_app();
        app.switch_tab();
        let screen = draw(&mut app, 80, 24);
        assert!(screen.contains("Profile Options"));
        assert!(screen.contains("Counselor / Help Connect"));
        assert!(screen.contains("Logout / Exit"));
    }

    #[tokio::test]
    async fn test_wide_text_keeps_newest_reply_visible() {
        let mut app = test_app();
        for text in ["你好".repeat(30), "last".to_string()] {
            app.input = text;
            app.submit_input();
            app.chat.wait_for_response().await;
        }

        let screen = draw(&mut app, 24, 14);
        assert_eq!(app.chat_scroll, app.max_chat_scroll());
        assert!(screen.contains("echo: last"));
    }

    #[tokio::test]
    async fn test_long_transcript_follows_bottom() {
        let mut app = test_app();
        for i in 0..15 {
            app.input = format!("message number {}", i);
            app.submit_input();
            app.chat.wait_for_response().await;
        }

        let screen = draw(&mut app, 60, 16);
        assert!(app.chat_total_lines > app.chat_height);
        assert_eq!(app.chat_scroll, app.max_chat_scroll());
        assert!(screen.contains("echo: message number 14"));
        assert!(!screen.contains("message number 0"));
    }
}
