use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tree::TreeNode;

use super::app::App;
use super::input::TextInput;
use super::mode::Mode;
use super::nav::{Navigation, FOOTER_LINES};
use super::sessions::SessionsView;
use super::windows::WindowsView;

const SESSIONS_HELP: &str = " ⏎ switch  ␣ fold  l win  q quit";
const WINDOWS_HELP: &str = " ⏎ select  h back  q quit";

/// Main render function
pub fn draw(f: &mut Frame, app: &App) {
    let lines = match app.windows_view() {
        Some(view) => windows_lines(view, app.flash()),
        None => session_lines(app.sessions_view(), app.flash()),
    };
    f.render_widget(Paragraph::new(lines), f.area());
}

fn selected_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

fn header_style() -> Style {
    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
}

fn meta_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn connector_style() -> Style {
    Style::default().fg(Color::Blue)
}

fn badge_style() -> Style {
    Style::default().fg(Color::Green)
}

/// The session tree: visible rows, separators, padding, footer.
pub fn session_lines(view: &SessionsView, flash: Option<&str>) -> Vec<Line<'static>> {
    let nav = view.navigation();
    let width = usize::from(nav.width());
    let window = nav.window(view.visible_len());

    let rows: Vec<Line<'static>> = if view.visible_len() == 0 {
        vec![Line::styled(" No sessions found", meta_style())]
    } else {
        view.rows()
            .enumerate()
            .skip(window.start)
            .take(window.len())
            .map(|(i, node)| node_line(node, i == nav.cursor(), width))
            .collect()
    };

    let status = match view.mode() {
        Mode::ConfirmingKill => kill_prompt(view.selected_session_name()),
        mode => status_line(mode, flash, SESSIONS_HELP),
    };
    frame_lines(nav, rows, status)
}

/// The windows of one session, same layout as the tree.
pub fn windows_lines(view: &WindowsView, flash: Option<&str>) -> Vec<Line<'static>> {
    let nav = view.navigation();
    let width = usize::from(nav.width());
    let window = nav.window(view.windows().len());

    let rows: Vec<Line<'static>> = if view.windows().is_empty() {
        vec![Line::styled(
            format!(" No windows in {}", view.session()),
            meta_style(),
        )]
    } else {
        view.windows()[window.clone()]
            .iter()
            .zip(window)
            .map(|(w, i)| {
                let meta = format!("{}p", w.panes);
                let label = format!("{}: ", w.index);
                let budget = width.saturating_sub(1 + label.width() + 2 + meta.width() + 2);
                let name_style = if i == nav.cursor() {
                    selected_style()
                } else {
                    Style::default()
                };
                let mut spans = vec![
                    Span::raw(" "),
                    Span::styled(label, meta_style()),
                    Span::styled(truncate(&w.name, budget), name_style),
                    Span::raw("  "),
                    Span::styled(meta, meta_style()),
                ];
                if w.active {
                    spans.push(Span::raw(" "));
                    spans.push(Span::styled("●", badge_style()));
                }
                Line::from(spans)
            })
            .collect()
    };

    frame_lines(nav, rows, status_line(&Mode::Normal, flash, WINDOWS_HELP))
}

/// Interleave separators, pad to the list area, then add the footer.
fn frame_lines(nav: &Navigation, rows: Vec<Line<'static>>, status: Line<'static>) -> Vec<Line<'static>> {
    let rule = "─".repeat(usize::from(nav.width()).saturating_sub(2).max(1));
    let avail = nav.available_lines();
    let count = rows.len();

    let mut lines = Vec::with_capacity(avail + FOOTER_LINES);
    for (i, row) in rows.into_iter().enumerate() {
        lines.push(row);
        if i + 1 < count {
            lines.push(Line::from(vec![
                Span::raw(" "),
                Span::styled(rule.clone(), meta_style()),
            ]));
        }
    }
    while lines.len() < avail {
        lines.push(Line::default());
    }

    lines.push(Line::from(vec![
        Span::raw(" "),
        Span::styled(rule, connector_style()),
    ]));
    lines.push(status);
    lines
}

fn node_line(node: &TreeNode, selected: bool, width: usize) -> Line<'static> {
    if node.is_group_header() {
        let icon = if node.expanded { "▾" } else { "▸" };
        let style = if selected { selected_style() } else { header_style() };
        let name = truncate(&node.display_name, width.saturating_sub(3));
        return Line::from(vec![
            Span::raw(" "),
            Span::styled(format!("{icon} {name}"), style),
        ]);
    }

    let mut meta = format!("{}w", node.windows());
    if node.has_children() && !node.expanded {
        meta.push_str(&format!(" +{}", node.children.len()));
    }
    let connector = if node.depth > 0 { "┊ " } else { "" };
    let badge = if node.attached() { 2 } else { 0 };
    let budget = width.saturating_sub(1 + connector.width() + 2 + meta.width() + badge);

    let name_style = if selected {
        selected_style()
    } else {
        Style::default()
    };

    let mut spans = vec![Span::raw(" ")];
    if !connector.is_empty() {
        spans.push(Span::styled(connector, connector_style()));
    }
    spans.push(Span::styled(truncate(&node.display_name, budget), name_style));
    spans.push(Span::raw("  "));
    spans.push(Span::styled(meta, meta_style()));
    if node.attached() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled("●", badge_style()));
    }
    Line::from(spans)
}

fn status_line(mode: &Mode, flash: Option<&str>, help: &'static str) -> Line<'static> {
    if let Some((label, input)) = mode.prompt() {
        return prompt_line(label, input);
    }
    match flash {
        Some(msg) => Line::styled(format!(" {msg}"), Style::default().fg(Color::Red)),
        None => Line::styled(help, meta_style()),
    }
}

fn kill_prompt(target: Option<&str>) -> Line<'static> {
    let text = match target {
        Some(name) => format!(" kill {name}? y/n"),
        None => " kill? y/n".to_string(),
    };
    Line::styled(text, badge_style())
}

/// Prompt label, buffer and a block cursor.
fn prompt_line(label: &'static str, input: &TextInput) -> Line<'static> {
    let text = input.text();
    let (before, rest) = text.split_at(input.cursor());
    let mut rest = rest.chars();
    let under = rest.next().map(String::from).unwrap_or_else(|| " ".to_string());

    Line::from(vec![
        Span::raw(" "),
        Span::styled(label, selected_style()),
        Span::raw(before.to_string()),
        Span::styled(under, Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(rest.as_str().to_string()),
    ])
}

/// Cut `s` to `max` display columns, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}
