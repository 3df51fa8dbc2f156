use std::{borrow::Cow, fmt::Write};

const COLUMN_SEPARATOR: &str = " | ";
const RULE_SEPARATOR: &str = "-+-";

#[derive(Default)]
pub struct TextTableBuilder<'a, Seq> {
    headers: &'a [Cow<'a, str>],
    rows: Vec<Seq>,
    alignments: Cow<'a, [Alignment]>,
}

#[derive(Clone, Copy, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl<'a, Seq> TextTableBuilder<'a, Seq>
where
    Seq: AsRef<[Cow<'a, str>]> + Default,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alignments(mut self, alignments: &'a [Alignment]) -> Self {
        self.alignments = Cow::Borrowed(alignments);
        self
    }

    pub fn headers(mut self, headers: &'a [Cow<'a, str>]) -> Self {
        self.headers = headers;
        if self.alignments.is_empty() {
            self.alignments = Cow::Owned(vec![Alignment::default(); self.headers.len()]);
        }
        self
    }

    pub fn row(mut self, row: Seq) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Seq>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Header, rule and one line per row. Cells past the header count are
    /// dropped; missing cells render blank.
    pub fn build(self) -> String {
        let col_count = self.headers.len();
        if col_count == 0 {
            return String::new();
        }

        let mut col_widths: Vec<usize> = self.headers.iter().map(|h| display_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.as_ref().iter().enumerate().take(col_count) {
                col_widths[i] = col_widths[i].max(display_width(cell));
            }
        }

        let mut table = String::with_capacity(256);
        self.write_line(&mut table, self.headers, &col_widths);

        let rule: Vec<String> = col_widths.iter().map(|width| "-".repeat(*width)).collect();
        let _ = writeln!(&mut table, "{}", rule.join(RULE_SEPARATOR));

        for row in &self.rows {
            self.write_line(&mut table, row.as_ref(), &col_widths);
        }

        // No trailing newline, callers decide how tables are joined.
        table.pop();
        table
    }

    fn write_line(&self, out: &mut String, cells: &[Cow<'_, str>], col_widths: &[usize]) {
        let line: Vec<String> = col_widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let cell: &str = cells.get(i).map_or("", |cell| &**cell);
                let alignment = self.alignments.get(i).copied().unwrap_or_default();
                pad(cell, *width, alignment)
            })
            .collect();
        let _ = writeln!(out, "{}", line.join(COLUMN_SEPARATOR).trim_end());
    }
}

fn display_width(text: &str) -> usize {
    text.chars().map(|c| if is_wide(c) { 2 } else { 1 }).sum()
}

// East Asian wide and fullwidth blocks: Hangul, CJK, kana, fullwidth forms.
fn is_wide(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xA960..=0xA97F
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x20000..=0x2FFFD
            | 0x30000..=0x3FFFD
    )
}

fn pad(text: &str, width: usize, alignment: Alignment) -> String {
    let fill = width.saturating_sub(display_width(text));
    match alignment {
        Alignment::Left => format!("{text}{}", " ".repeat(fill)),
        Alignment::Right => format!("{}{text}", " ".repeat(fill)),
        Alignment::Center => {
            let left = fill / 2;
            format!("{}{text}{}", " ".repeat(left), " ".repeat(fill - left))
        }
    }
}

pub fn combine_sections_vertically(sections: &[&str]) -> Option<String> {
    let sections: Vec<&str> = sections
        .iter()
        .copied()
        .filter(|section| !section.is_empty())
        .collect();
    if sections.is_empty() {
        return None;
    }
    Some(sections.join("\n\n"))
}
