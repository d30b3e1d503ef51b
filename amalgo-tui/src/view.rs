//! Draw the document state to the terminal.
//!
//! Everything shown is read back from the document's attributes, the way a
//! browser would style the widget from its DOM.

use std::io::{self, Write};

use amalgo::{Combobox, Document, NodeId};
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{Clear, ClearType},
};

const TITLE_ROW: u16 = 0;
const HELP_ROW: u16 = 1;
const TRIGGER_ROW: u16 = 3;
const INDENT: u16 = 2;

/// Which element each drawn row belongs to, for pointer hit testing.
#[derive(Debug, Default)]
pub struct HitMap {
    rows: Vec<(u16, NodeId)>,
}

impl HitMap {
    pub fn node_at(&self, row: u16) -> Option<NodeId> {
        self.rows
            .iter()
            .find(|(r, _)| *r == row)
            .map(|(_, node)| *node)
    }

    fn push(&mut self, row: u16, node: NodeId) {
        self.rows.push((row, node));
    }
}

fn line(out: &mut impl Write, row: u16, text: &str, attribute: Option<Attribute>) -> io::Result<()> {
    queue!(out, MoveTo(INDENT, row))?;
    if let Some(attribute) = attribute {
        queue!(out, SetAttribute(attribute), Print(text), SetAttribute(Attribute::Reset))?;
    } else {
        queue!(out, Print(text))?;
    }
    Ok(())
}

pub fn render(
    out: &mut impl Write,
    doc: &Document,
    combobox: &Combobox,
    status: &str,
) -> io::Result<HitMap> {
    let parts = combobox.parts();
    let mut hits = HitMap::default();

    queue!(out, Clear(ClearType::All))?;
    line(out, TITLE_ROW, "amalgo-tui", Some(Attribute::Bold))?;
    line(
        out,
        HELP_ROW,
        "Enter opens, arrows move, Enter selects, Esc closes, q quits",
        Some(Attribute::Dim),
    )?;

    let focused = doc.active_element();
    let is_open = doc.has_attribute(parts.root, "open");
    let arrow = if is_open { "^" } else { "v" };
    let trigger = format!("[ {} {} ]", doc.text_content(parts.trigger), arrow);
    let style = (focused == Some(parts.trigger)).then_some(Attribute::Reverse);
    line(out, TRIGGER_ROW, &trigger, style)?;
    hits.push(TRIGGER_ROW, parts.trigger);

    let mut row = TRIGGER_ROW + 1;
    if is_open {
        let query = doc.value(parts.input);
        let prompt = match doc.attribute(parts.input, "placeholder") {
            Some(placeholder) if query.is_empty() => format!("> {placeholder}"),
            _ => format!("> {query}_"),
        };
        line(out, row, &prompt, Some(Attribute::Underlined))?;
        hits.push(row, parts.input);
        row += 1;

        let mut shown = 0;
        for option in doc.children(parts.menu) {
            if doc.has_attribute(option, "hidden") {
                continue;
            }
            let highlighted = doc.has_attribute(option, "highlight");
            let marker = if highlighted { ">" } else { " " };
            let text = format!("{marker} {}", doc.text_content(option));
            line(out, row, &text, highlighted.then_some(Attribute::Reverse))?;
            hits.push(row, option);
            row += 1;
            shown += 1;
        }
        if shown == 0 {
            line(out, row, "  (no matches)", Some(Attribute::Dim))?;
            row += 1;
        }
    }

    let scroll = if doc.is_scroll_locked() { "locked" } else { "free" };
    line(out, row + 1, &format!("Selected: {status}"), None)?;
    line(out, row + 2, &format!("Page scroll: {scroll}"), Some(Attribute::Dim))?;

    out.flush()?;
    Ok(hits)
}
