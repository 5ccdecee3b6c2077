//! Lays out a document story onto PDF pages.
//!
//! Text uses the standard Helvetica faces with WinAnsi encoding, so no font
//! files are embedded. Widths are approximated per glyph class, which is
//! close enough for line wrapping.

use anyhow::Result;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use crate::document::Block;
use crate::settings::PageSize;

const MARGIN: f32 = 72.0;
const LEADING: f32 = 1.2;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

#[derive(Debug, Clone, Copy)]
struct Style {
    size: f32,
    color: (f32, f32, f32),
    space_after: f32,
    centered: bool,
}

const TITLE: Style = Style {
    size: 18.0,
    color: (0.0, 0.0, 0.545),
    space_after: 20.0,
    centered: true,
};
const HEADING: Style = Style {
    size: 14.0,
    color: (0.0, 0.392, 0.0),
    space_after: 10.0,
    centered: false,
};
const BODY: Style = Style {
    size: 12.0,
    color: (0.0, 0.0, 0.0),
    space_after: 10.0,
    centered: false,
};
const FOOTER: Style = Style {
    size: 10.0,
    color: (0.5, 0.5, 0.5),
    space_after: 0.0,
    centered: true,
};

/// A piece of a line in one face.
#[derive(Debug, Clone, PartialEq)]
struct Run {
    bold: bool,
    text: String,
}

struct Pages {
    width: f32,
    height: f32,
    cursor: f32,
    current: Vec<Operation>,
    finished: Vec<Vec<Operation>>,
}

impl Pages {
    fn new(page_size: PageSize) -> Self {
        let (width, height) = page_size.dimensions();
        Self {
            width,
            height,
            cursor: height - MARGIN,
            current: Vec::new(),
            finished: Vec::new(),
        }
    }

    fn text_width(&self) -> f32 {
        self.width - 2.0 * MARGIN
    }

    fn reserve(&mut self, height: f32) {
        if self.cursor - height < MARGIN && !self.current.is_empty() {
            self.break_page();
        }
        self.cursor -= height;
    }

    fn break_page(&mut self) {
        self.finished.push(std::mem::take(&mut self.current));
        self.cursor = self.height - MARGIN;
    }

    fn space(&mut self, amount: f32) {
        // Gaps never start a new page on their own.
        self.cursor = (self.cursor - amount).max(MARGIN);
    }

    fn paragraph(&mut self, runs: Vec<Run>, style: Style) {
        let lines = wrap(runs, style.size, self.text_width());
        for line in lines {
            self.reserve(style.size * LEADING);
            let width: f32 = line
                .iter()
                .map(|run| measure(&run.text, run.bold, style.size))
                .sum();
            let x = if style.centered {
                MARGIN + (self.text_width() - width).max(0.0) / 2.0
            } else {
                MARGIN
            };
            self.emit_line(&line, x, style);
        }
        self.space(style.space_after);
    }

    fn emit_line(&mut self, line: &[Run], x: f32, style: Style) {
        let (r, g, b) = style.color;
        self.current.push(Operation::new("BT", vec![]));
        self.current
            .push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
        self.current
            .push(Operation::new("Td", vec![x.into(), self.cursor.into()]));
        for run in line {
            let face = if run.bold { BOLD } else { REGULAR };
            self.current.push(Operation::new(
                "Tf",
                vec![Object::Name(face.as_bytes().to_vec()), style.size.into()],
            ));
            self.current.push(Operation::new(
                "Tj",
                vec![Object::String(win_ansi(&run.text), StringFormat::Literal)],
            ));
        }
        self.current.push(Operation::new("ET", vec![]));
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.current.is_empty() || self.finished.is_empty() {
            self.finished.push(self.current);
        }
        self.finished
    }
}

/// Renders `story` to PDF bytes.
pub fn encode(story: &[Block], page_size: PageSize) -> Result<Vec<u8>> {
    let mut pages = Pages::new(page_size);
    for block in story {
        match block {
            Block::Title(text) => pages.paragraph(plain(text, false), TITLE),
            Block::Heading(text) => pages.paragraph(plain(text, false), HEADING),
            Block::Field { label, value } => {
                let runs = vec![
                    Run {
                        bold: true,
                        text: format!("{label}: "),
                    },
                    Run {
                        bold: false,
                        text: value.clone(),
                    },
                ];
                pages.paragraph(runs, BODY);
            }
            Block::Spacer(amount) => pages.space(*amount),
            Block::Footer(text) => pages.paragraph(plain(text, false), FOOTER),
        }
    }
    let (width, height) = (pages.width, pages.height);
    assemble(pages.finish(), width, height)
}

fn assemble(page_operations: Vec<Vec<Operation>>, width: f32, height: f32) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR => regular_id,
            BOLD => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in page_operations {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![Object::Integer(0), Object::Integer(0), width.into(), height.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn font(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn plain(text: &str, bold: bool) -> Vec<Run> {
    vec![Run {
        bold,
        text: text.to_string(),
    }]
}

/// Greedy word wrap that keeps each word in the face of the run it came from.
fn wrap(runs: Vec<Run>, size: f32, max_width: f32) -> Vec<Vec<Run>> {
    let mut lines: Vec<Vec<Run>> = Vec::new();
    let mut line: Vec<Run> = Vec::new();
    let mut used = 0.0_f32;

    for run in runs {
        for word in split_keep_spaces(&run.text) {
            for piece in break_long_word(&word, run.bold, size, max_width) {
                let width = measure(&piece, run.bold, size);
                if used + width > max_width && used > 0.0 {
                    lines.push(std::mem::take(&mut line));
                    used = 0.0;
                    if piece.trim().is_empty() {
                        continue;
                    }
                }
                push_text(&mut line, run.bold, &piece);
                used += width;
            }
        }
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

fn push_text(line: &mut Vec<Run>, bold: bool, text: &str) {
    match line.last_mut() {
        Some(last) if last.bold == bold => last.text.push_str(text),
        _ => line.push(Run {
            bold,
            text: text.to_string(),
        }),
    }
}

/// Splits after each space so that joining the pieces restores the input.
fn split_keep_spaces(text: &str) -> Vec<String> {
    text.split_inclusive(' ').map(str::to_string).collect()
}

fn break_long_word(word: &str, bold: bool, size: f32, max_width: f32) -> Vec<String> {
    if measure(word, bold, size) <= max_width {
        return vec![word.to_string()];
    }
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for ch in word.chars() {
        let candidate_width = measure(&piece, bold, size) + glyph_width(ch, bold) * size;
        if candidate_width > max_width && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
        }
        piece.push(ch);
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

fn measure(text: &str, bold: bool, size: f32) -> f32 {
    text.chars().map(|ch| glyph_width(ch, bold)).sum::<f32>() * size
}

/// Approximate Helvetica advance widths, in ems.
fn glyph_width(ch: char, bold: bool) -> f32 {
    let width = match ch {
        ' ' => 0.278,
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.25,
        'f' | 't' | 'r' | '(' | ')' | '-' | '/' => 0.333,
        'm' | 'w' | 'M' | 'W' => 0.85,
        '0'..='9' => 0.556,
        'A'..='Z' => 0.68,
        'a'..='z' => 0.54,
        _ => 0.6,
    };
    if bold { width * 1.06 } else { width }
}

/// Latin-1 subset of WinAnsi; anything else becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match u32::from(ch) {
            code @ 0x20..=0x7e | code @ 0xa0..=0xff => code as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(line: &[Run]) -> String {
        line.iter().map(|run| run.text.as_str()).collect()
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap(plain("Publication Year: 2020", false), 12.0, 468.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(joined(&lines[0]), "Publication Year: 2020");
    }

    #[test]
    fn long_text_wraps_and_keeps_faces() {
        let runs = vec![
            Run {
                bold: true,
                text: "Title: ".into(),
            },
            Run {
                bold: false,
                text: "word ".repeat(60),
            },
        ];
        let lines = wrap(runs, 12.0, 468.0);
        assert!(lines.len() > 1);
        assert!(lines[0][0].bold);
        assert_eq!(lines[0][0].text, "Title: ");
        assert!(lines[1].iter().all(|run| !run.bold));
        for line in &lines {
            let width: f32 = line.iter().map(|run| measure(&run.text, run.bold, 12.0)).sum();
            assert!(width <= 468.0 + 0.01);
        }
    }

    #[test]
    fn unbroken_tokens_are_split() {
        let url = format!("https://doi.org/{}", "x".repeat(200));
        let lines = wrap(plain(&url, false), 12.0, 200.0);
        assert!(lines.len() > 1);
        let rejoined: String = lines.iter().map(|line| joined(line)).collect();
        assert_eq!(rejoined, url);
    }

    #[test]
    fn non_latin_text_is_replaced() {
        assert_eq!(win_ansi("Café"), b"Caf\xe9".to_vec());
        assert_eq!(win_ansi("数"), b"?".to_vec());
    }

    #[test]
    fn long_story_spans_pages() {
        let mut story = vec![Block::Title("Report".into())];
        for index in 0..200 {
            story.push(Block::Field {
                label: "Line".into(),
                value: index.to_string(),
            });
        }
        let bytes = encode(&story, PageSize::Letter).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn empty_story_still_has_a_page() {
        let bytes = encode(&[], PageSize::A4).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
