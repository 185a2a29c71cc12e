//! Text rendering of the lesson page and its overlays
//!
//! Rendering is pure: it turns the current page and overlays into lines,
//! and the terminal layer decides how to paint them. Widths are measured in
//! terminal columns so emoji and wide characters line up inside boxes.

use super::{Overlay, OverlayKind, Overlays, Phase};
use crate::lesson::words::progress;
use crate::lesson::{Item, ItemKind, Page, WordStatus};
use crate::speech::pronouncer::POPUP_CAPTION;
use unicode_width::UnicodeWidthStr;

/// Text shown by the end-of-lesson celebration
pub const CELEBRATION_TEXT: &str = "🎉 Great Job! 🌟";

/// Key help shown under every page
pub const KEY_HELP: &str =
    "←/→ page  ↑/↓ select  Enter say  1-9 say item  l learned  x hush  C F M R print  q quit";

/// A rendered screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub lines: Vec<String>,
}

impl Frame {
    /// Does any line contain `needle`?
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

/// Everything the page view needs from the application state
pub struct PageView<'a> {
    pub lesson_title: &'a str,
    pub page: &'a Page,
    pub number: usize,
    pub total: usize,
    pub items: &'a [Item],
    pub selected: usize,
}

/// Render the page followed by its overlays
pub fn render_screen(view: &PageView<'_>, overlays: &Overlays, width: u16) -> Frame {
    let width = usize::from(width.max(20));
    let mut lines = render_page(view);

    for overlay in overlays.iter() {
        lines.push(String::new());
        lines.extend(render_overlay(overlay, width));
    }

    Frame { lines }
}

fn render_page(view: &PageView<'_>) -> Vec<String> {
    let mut lines = vec![
        format!("{}  (page {}/{})", view.lesson_title, view.number, view.total),
        format!("== {} ==", view.page.title),
        String::new(),
    ];

    if !view.page.words.is_empty() {
        let tags: Vec<String> = view
            .page
            .words
            .iter()
            .map(|tag| match tag.status {
                WordStatus::New => format!("[{} ✚]", tag.text),
                WordStatus::Known => format!("[{} ✓]", tag.text),
            })
            .collect();
        let (known, total) = progress(&view.page.words);
        lines.push(format!("Words: {}  ({}/{} learned)", tags.join(" "), known, total));
        lines.push(String::new());
    }

    for (i, item) in view.items.iter().enumerate() {
        let marker = if i == view.selected { '>' } else { ' ' };
        let label = match item.kind {
            ItemKind::Word(_) => "word",
            ItemKind::Sentence => "say",
            ItemKind::MarkedWord => "extra",
        };
        lines.push(format!("{} {}. {} 🔊  ({})", marker, i + 1, item.text, label));
    }

    lines.push(String::new());
    lines.push(KEY_HELP.to_string());
    lines
}

fn render_overlay(overlay: &Overlay, width: usize) -> Vec<String> {
    let mut lines = match &overlay.kind {
        OverlayKind::Pronunciation(text) => {
            centered(boxed(&[format!("🔊 \"{}\"", text), POPUP_CAPTION.to_string()]), width)
        }
        OverlayKind::Celebration => right_aligned(boxed(&[CELEBRATION_TEXT.to_string()]), width),
        OverlayKind::SuccessFlash => vec![banner("★ Well done! ★", width)],
        OverlayKind::Alert(message) => centered(boxed(&[message.clone()]), width),
        OverlayKind::Prompt(question) => centered(boxed(&[question.clone()]), width),
    };

    if overlay.phase == Phase::Closing {
        for line in &mut lines {
            *line = format!("\x1b[2m{}\x1b[0m", line);
        }
    }
    lines
}

/// Draw a rounded box around lines, padding each to the widest
pub fn boxed(content: &[String]) -> Vec<String> {
    let inner = content.iter().map(|l| l.width()).max().unwrap_or(0) + 2;
    let mut lines = Vec::with_capacity(content.len() + 2);

    lines.push(format!("╭{}╮", "─".repeat(inner)));
    for line in content {
        let pad = inner - 1 - line.width();
        lines.push(format!("│ {}{}│", line, " ".repeat(pad)));
    }
    lines.push(format!("╰{}╯", "─".repeat(inner)));
    lines
}

fn centered(lines: Vec<String>, width: usize) -> Vec<String> {
    lines
        .into_iter()
        .map(|l| {
            let indent = width.saturating_sub(l.width()) / 2;
            format!("{}{}", " ".repeat(indent), l)
        })
        .collect()
}

fn right_aligned(lines: Vec<String>, width: usize) -> Vec<String> {
    lines
        .into_iter()
        .map(|l| {
            let indent = width.saturating_sub(l.width());
            format!("{}{}", " ".repeat(indent), l)
        })
        .collect()
}

fn banner(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    let left = fill / 2;
    format!("{}{}{}", "░".repeat(left), text, "░".repeat(fill - left))
}
