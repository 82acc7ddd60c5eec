use crate::session::quality_line;
use crate::tui::app::{
    App, EditorField, FlowerEditorState, Overlay, SourcePromptState, Toast, ToastLevel,
};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

#[derive(Debug, Clone, Copy)]
struct Theme {
    base: Style,
    accent: Color,
    muted: Color,
}

impl Theme {
    fn for_app(app: &App) -> Theme {
        if app.dark {
            Theme {
                base: Style::default().bg(Color::Black).fg(Color::White),
                accent: Color::LightMagenta,
                muted: Color::DarkGray,
            }
        } else {
            Theme {
                base: Style::default().bg(Color::White).fg(Color::Black),
                accent: Color::Magenta,
                muted: Color::Gray,
            }
        }
    }
}

pub fn render(frame: &mut Frame, app: &mut App) {
    let theme = Theme::for_app(app);
    frame.render_widget(Block::default().style(theme.base), frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, theme, chunks[0]);
    render_body(frame, app, theme, chunks[1]);
    render_status_bar(frame, app, theme, chunks[2]);

    if let Some(overlay) = &app.overlay {
        render_overlay(frame, theme, overlay);
    }

    if let Some(toast) = &app.toast {
        render_toast(frame, theme, toast);
    }
}

fn render_header(frame: &mut Frame, app: &App, theme: Theme, area: Rect) {
    let source = app
        .source_label
        .clone()
        .unwrap_or_else(|| "no image source".to_string());
    let line = Line::from(vec![
        Span::styled(
            "Flower Recognition",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  |  {}", source)),
    ]);
    let header = Paragraph::new(Text::from(line))
        .style(theme.base)
        .block(Block::default().title("petal").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(header, area);
}

fn render_body(frame: &mut Frame, app: &mut App, theme: Theme, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_detection(frame, app, theme, columns[0]);
    render_search(frame, app, theme, columns[1]);
}

fn render_detection(frame: &mut Frame, app: &App, theme: Theme, area: Rect) {
    let label_style = Style::default().add_modifier(Modifier::BOLD);
    let (detected, care) = match &app.current {
        Some(current) => (current.detected_line(), current.care_line()),
        None => ("Detected: None".to_string(), "Care Tips: ...".to_string()),
    };
    let quality = app
        .quality
        .map(quality_line)
        .unwrap_or_else(|| "Image Quality: -".to_string());
    let quality_style = match app.quality {
        Some(true) => Style::default().fg(Color::Red),
        Some(false) => Style::default().fg(Color::Green),
        None => Style::default().fg(theme.muted),
    };

    let mut lines = vec![
        Line::from(Span::styled(detected, label_style)),
        Line::from(""),
        Line::from(care),
        Line::from(""),
        Line::from(Span::styled(quality, quality_style)),
    ];
    if !app.classifier_ready {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "No classifier configured: pick flowers from search.",
            Style::default().fg(theme.muted),
        )));
    }

    let panel = Paragraph::new(Text::from(lines))
        .style(theme.base)
        .block(Block::default().title("Care guide").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(panel, area);
}

fn render_search(frame: &mut Frame, app: &mut App, theme: Theme, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let input = if app.query.is_empty() && app.overlay.is_none() {
        Line::from(Span::styled(
            "Search flower...",
            Style::default().fg(theme.muted),
        ))
    } else {
        render_input_with_cursor(&app.query)
    };
    let search = Paragraph::new(input)
        .style(theme.base)
        .block(Block::default().title("Search").borders(Borders::ALL));
    frame.render_widget(search, rows[0]);

    let items: Vec<ListItem> = app
        .results
        .iter()
        .map(|name| ListItem::new(Line::from(name.clone())))
        .collect();
    let title = if app.query.trim().is_empty() {
        "Matches".to_string()
    } else {
        format!("Matches ({})", app.results.len())
    };
    let list = List::new(items)
        .style(theme.base)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(theme.muted)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(list, rows[1], &mut app.results_state);
}

fn render_status_bar(frame: &mut Frame, app: &App, theme: Theme, area: Rect) {
    let classifier = if app.classifier_ready { "ready" } else { "none" };
    let status = format!(
        "{} flowers | classifier: {} | ^S speak  ^W wiki  ^N add  ^E edit  ^O source  ^T theme  ? help",
        app.flower_count, classifier
    );
    let bar = Paragraph::new(status)
        .style(Style::default().bg(theme.muted).fg(Color::White))
        .alignment(Alignment::Left);
    frame.render_widget(bar, area);
}

fn render_overlay(frame: &mut Frame, theme: Theme, overlay: &Overlay) {
    match overlay {
        Overlay::Help => render_help_overlay(frame, theme),
        Overlay::AddFlower(state) => render_editor_overlay(frame, theme, state),
        Overlay::Source(state) => render_source_overlay(frame, theme, state),
    }
}

fn render_help_overlay(frame: &mut Frame, theme: Theme) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let bindings = [
        ("Type", "search the care guide"),
        ("Up/Down", "move selection"),
        ("Enter", "show care tips for selection"),
        ("Ctrl-S", "read detection aloud"),
        ("Ctrl-W", "open Wikipedia page"),
        ("Ctrl-N", "add a flower"),
        ("Ctrl-E", "edit care tips of current flower"),
        ("Ctrl-O", "change image source (stills only, no video)"),
        ("Ctrl-T", "toggle theme"),
        ("Ctrl-U", "clear search"),
        ("Esc", "quit"),
    ];
    let rows: Vec<Row> = bindings
        .iter()
        .map(|(key, action)| {
            Row::new(vec![
                Span::styled(key.to_string(), key_style),
                Span::raw(action.to_string()),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(10), Constraint::Min(0)])
        .style(theme.base)
        .block(
            Block::default()
                .title("Help (Esc to close)")
                .borders(Borders::ALL),
        )
        .column_spacing(2);
    frame.render_widget(table, area);
}

fn render_editor_overlay(frame: &mut Frame, theme: Theme, state: &FlowerEditorState) {
    let area = centered_rect(70, 50, frame.area());
    frame.render_widget(Clear, area);

    let field_line = |label: &str, value: &str, active: bool| -> Line<'static> {
        let mut line = if active {
            render_input_with_cursor(value)
        } else {
            Line::from(value.to_string())
        };
        line.spans
            .insert(0, Span::styled(format!("{label}: "), field_style(active)));
        line
    };

    let mut lines = vec![
        Line::from("Tab switches field, Enter saves, Esc cancels"),
        Line::from(""),
        field_line("Name", &state.name, state.active == EditorField::Name),
        Line::from(""),
        field_line("Care", &state.care, state.active == EditorField::Care),
    ];
    if let Some(error) = &state.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let editor = Paragraph::new(Text::from(lines))
        .style(theme.base)
        .block(Block::default().title("Add flower").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(editor, area);
}

fn render_source_overlay(frame: &mut Frame, theme: Theme, state: &SourcePromptState) {
    let area = centered_rect(60, 40, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from("Still image or folder of images (png, jpg, bmp, webp)."),
        Line::from("Video files are not supported."),
        Line::from("Enter to open, Esc to cancel"),
        Line::from(""),
        render_input_with_cursor(&state.path),
    ];
    if let Some(error) = &state.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let prompt = Paragraph::new(Text::from(lines))
        .style(theme.base)
        .block(Block::default().title("Image source").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(prompt, area);
}

fn field_style(active: bool) -> Style {
    if active {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn render_toast(frame: &mut Frame, theme: Theme, toast: &Toast) {
    let area = frame.area();
    if area.width < 10 || area.height < 3 {
        return;
    }

    let message = toast.message.clone();
    let max_width = area.width.saturating_sub(2) as usize;
    let width = (message.chars().count() + 4).min(max_width).max(10) as u16;
    let height = 3u16;
    let rect = Rect::new(
        area.x + area.width.saturating_sub(width),
        area.y + area.height.saturating_sub(height),
        width,
        height,
    );

    let (border_style, text_style) = match toast.level {
        ToastLevel::Info => (Style::default().fg(Color::Cyan), theme.base),
        ToastLevel::Error => (
            Style::default().fg(Color::Red),
            Style::default().fg(Color::Red),
        ),
    };

    let paragraph = Paragraph::new(message)
        .block(
            Block::default()
                .title("status")
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .style(text_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, rect);
    frame.render_widget(paragraph, rect);
}

fn render_input_with_cursor(input: &str) -> Line<'static> {
    Line::from(vec![
        Span::raw(input.to_string()),
        Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)),
    ])
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1]);

    horizontal[1]
}
