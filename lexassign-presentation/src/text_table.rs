use std::{borrow::Cow, fmt::Write};

const COLUMN_GAP: &str = "  ";

#[derive(Default)]
pub struct TextTableBuilder<'a> {
    headers: Vec<Cow<'a, str>>,
    rows: Vec<Vec<Cow<'a, str>>>,
    alignments: Cow<'a, [Alignment]>,
}

#[derive(Clone, Copy, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl<'a> TextTableBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alignments(mut self, alignments: &'a [Alignment]) -> Self {
        self.alignments = Cow::Borrowed(alignments);
        self
    }

    pub fn headers(mut self, headers: impl IntoIterator<Item = Cow<'a, str>>) -> Self {
        self.headers = headers.into_iter().collect();
        if self.alignments.is_empty() {
            self.alignments = Cow::Owned(vec![Alignment::default(); self.headers.len()]);
        }
        self
    }

    pub fn row(mut self, row: impl IntoIterator<Item = Cow<'a, str>>) -> Self {
        self.rows.push(row.into_iter().collect());
        self
    }

    pub fn build(self) -> String {
        let col_count = self.headers.len();
        if col_count == 0 {
            return String::new();
        }

        let mut col_widths: Vec<usize> = self.headers.iter().map(|h| text_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(col_count) {
                col_widths[i] = col_widths[i].max(text_width(cell));
            }
        }

        let mut out = String::with_capacity(256);
        self.write_line(&mut out, &self.headers, &col_widths);
        let rule_width = col_widths.iter().sum::<usize>() + COLUMN_GAP.len() * (col_count - 1);
        let _ = writeln!(&mut out, "{}", "-".repeat(rule_width));
        for row in &self.rows {
            self.write_line(&mut out, row, &col_widths);
        }
        out
    }

    fn write_line(&self, out: &mut String, cells: &[Cow<'_, str>], widths: &[usize]) {
        let mut line = String::new();
        for (i, width) in widths.iter().enumerate() {
            if i > 0 {
                line.push_str(COLUMN_GAP);
            }
            let cell = cells.get(i).map_or("", |c| c.as_ref());
            let alignment = self.alignments.get(i).copied().unwrap_or_default();
            pad(&mut line, cell, *width, alignment);
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }
}

fn text_width(text: &str) -> usize {
    text.chars().count()
}

fn pad(line: &mut String, text: &str, width: usize, alignment: Alignment) {
    let gap = width.saturating_sub(text_width(text));
    let (left, right) = match alignment {
        Alignment::Left => (0, gap),
        Alignment::Center => (gap / 2, gap - gap / 2),
        Alignment::Right => (gap, 0),
    };
    line.extend(std::iter::repeat_n(' ', left));
    line.push_str(text);
    line.extend(std::iter::repeat_n(' ', right));
}
