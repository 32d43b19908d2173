use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, DownloadStatus, FormField, View};
use crate::models::{DetailLevel, FlowMode, GenerationOutcome};

/// Single entry point mapping app state to what is on screen.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(0),    // Current view
            Constraint::Length(1), // Status line
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match &app.view {
        View::Form => render_form(frame, app, chunks[1]),
        View::InProgress { progress } => render_progress(frame, app, *progress, chunks[1]),
        View::Done(outcome) => render_result(frame, app, outcome, chunks[1]),
    }

    render_status(frame, app, chunks[2]);

    if app.show_help {
        render_help(frame);
    }

    // Alerts sit above everything, including help
    if let Some(message) = &app.alert {
        render_alert(frame, message);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let flow = match app.flow {
        FlowMode::Chained => "content + video",
        FlowMode::Single => "single call",
    };

    let block = Block::default()
        .title(" AI Video Generator ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = format!(" Backend: {} ({flow})", app.backend_url);
    let paragraph = Paragraph::new(text).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" New Video ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Topic
            Constraint::Length(3), // Duration
            Constraint::Length(3), // Detail level
            Constraint::Min(0),
        ])
        .split(inner);

    render_text_input(frame, "Topic", &app.form.topic, app.form.focus == FormField::Topic, rows[0]);
    render_text_input(
        frame,
        "Duration (minutes)",
        &app.form.duration,
        app.form.focus == FormField::Duration,
        rows[1],
    );
    render_level_choice(frame, app.form.detail_level, app.form.focus == FormField::DetailLevel, rows[2]);
}

fn field_block(title: &str, focused: bool) -> Block<'_> {
    let color = if focused { Color::Yellow } else { Color::DarkGray };
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

fn render_text_input(frame: &mut Frame, title: &str, value: &str, focused: bool, area: Rect) {
    let cursor = if focused { "_" } else { "" };
    let paragraph = Paragraph::new(format!("{value}{cursor}"))
        .block(field_block(title, focused))
        .style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, area);
}

fn render_level_choice(frame: &mut Frame, selected: DetailLevel, focused: bool, area: Rect) {
    let mut spans = Vec::new();
    for level in DetailLevel::ALL {
        let (marker, style) = if level == selected {
            (
                "(•) ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )
        } else {
            ("( ) ", Style::default().fg(Color::White))
        };
        spans.push(Span::styled(format!("{marker}{}   ", level.label()), style));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(field_block("Detail level", focused));
    frame.render_widget(paragraph, area);
}

fn render_progress(frame: &mut Frame, app: &App, progress: u16, area: Rect) {
    let block = Block::default()
        .title(" Generating ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Stage label
            Constraint::Length(1), // Gauge
            Constraint::Min(0),
        ])
        .split(inner);

    let stage = match (app.flow, progress) {
        (FlowMode::Single, _) => "Generating video...",
        (FlowMode::Chained, p) if p < 60 => "Generating content...",
        (FlowMode::Chained, p) if p < 100 => "Generating video...",
        (FlowMode::Chained, _) => "Finishing up...",
    };

    let label = Paragraph::new(format!("{} {stage}", app.spinner()))
        .style(Style::default().fg(Color::White));
    frame.render_widget(label, rows[0]);

    if app.flow == FlowMode::Chained {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
            .percent(progress.min(100));
        frame.render_widget(gauge, rows[1]);
    }
}

fn render_result(frame: &mut Frame, app: &App, outcome: &GenerationOutcome, area: Rect) {
    let block = Block::default()
        .title(" Your Video ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let mut lines = Vec::new();
    if let Some(message) = &outcome.message {
        lines.push(Line::from(message.as_str()));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(vec![
        Span::styled("Video: ", Style::default().fg(Color::Blue)),
        Span::styled(
            outcome.video_url.as_str(),
            Style::default().add_modifier(Modifier::UNDERLINED),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        format!(
            "Generated at {}",
            outcome.completed_at.with_timezone(&chrono::Local).format("%H:%M:%S")
        ),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    let download = match &app.download_status {
        DownloadStatus::Idle => String::new(),
        DownloadStatus::Downloading => format!("{} Downloading...", app.spinner()),
        DownloadStatus::Saved(path) => format!("Saved to {}", path.display()),
        DownloadStatus::Failed => "Download failed".to_string(),
    };
    if !download.is_empty() {
        lines.push(Line::from(download));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = match app.view {
        View::Form => "tab:next field  ←/→:level  enter:generate  F1:help  esc:quit",
        View::InProgress { .. } => "Generation in progress...  q:quit",
        View::Done(_) => "o:open  d:download  n:new video  ?:help  q:quit",
    };

    let paragraph = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn render_alert(frame: &mut Frame, message: &str) {
    let area = centered_rect(60, 25, frame.area());

    let block = Block::default()
        .title(" Alert ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let text = format!("{message}\n\nPress Enter to continue");
    let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true });

    frame.render_widget(ratatui::widgets::Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 60, frame.area());

    let help_text = vec![
        "",
        " Form:",
        "   Tab / ↓      Next field",
        "   Shift-Tab/↑  Previous field",
        "   ← / →        Change detail level",
        "   Enter        Generate video",
        "",
        " Result:",
        "   o / Enter    Open video",
        "   d            Download video",
        "   n            Start a new video",
        "",
        " General:",
        "   F1 / ?       Toggle this help",
        "   Esc / q      Quit",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(ratatui::widgets::Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
