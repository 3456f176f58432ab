use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, instrument};

use crate::adapters::{AdapterError, DocumentRenderer, RenderRequest, RenderedDocument};
use crate::render::filename::meaningful_filename;
use crate::sanitize::redact_path;
use crate::storage::FileStorage;

// US Letter, 0.75in margins
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: f32 = 54.0;

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 11.0;
const META_SIZE: f32 = 9.0;

// Average Helvetica glyph width is close to half the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    text: String,
    font: Font,
    size: f32,
    /// Vertical space taken by the line, including spacing before the next.
    advance: f32,
}

/// Renders documents as PDF files through [`FileStorage`].
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentRenderer for PdfRenderer {
    #[instrument(skip_all, fields(output_dir = %redact_path(&request.output_dir)))]
    fn render(&self, request: &RenderRequest) -> Result<RenderedDocument, AdapterError> {
        let now = chrono::Local::now();
        let filename = meaningful_filename(
            &request.title,
            request.keyword.as_deref(),
            request.url.as_deref(),
            now.date_naive(),
        );

        let bytes = build_pdf(request, &now.format("%Y-%m-%d %H:%M:%S").to_string())?;

        let storage = FileStorage::new(&request.output_dir);
        let file_path = storage
            .store(&bytes, &filename)
            .map_err(|e| AdapterError::Render(e.to_string()))?;

        let filename = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or(filename);

        debug!(file = %filename, size = bytes.len(), "Rendered PDF");

        Ok(RenderedDocument {
            file_path,
            filename,
        })
    }
}

/// Builds the PDF bytes for a request. `generated_at` is printed verbatim in
/// the header block.
pub fn build_pdf(request: &RenderRequest, generated_at: &str) -> Result<Vec<u8>, AdapterError> {
    let lines = layout(request, generated_at);
    let pages = paginate(&lines);

    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page_lines in &pages {
        let content = page_content(page_lines);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| AdapterError::Render(e.to_string()))?;

    Ok(buffer)
}

fn layout(request: &RenderRequest, generated_at: &str) -> Vec<Line> {
    let mut lines = Vec::new();

    push_wrapped(&mut lines, &request.title, Font::Bold, TITLE_SIZE, 1.4);
    add_space(&mut lines, 8.0);

    if let Some(url) = request.url.as_deref().filter(|u| !u.is_empty()) {
        push_wrapped(&mut lines, &format!("Source: {}", url), Font::Regular, META_SIZE, 1.5);
    }
    push_wrapped(
        &mut lines,
        &format!("Generated: {}", generated_at),
        Font::Regular,
        META_SIZE,
        1.5,
    );
    if let Some(keyword) = request.keyword.as_deref().filter(|k| !k.is_empty()) {
        push_wrapped(
            &mut lines,
            &format!("Keywords: {}", keyword),
            Font::Regular,
            META_SIZE,
            1.5,
        );
    }
    add_space(&mut lines, 18.0);

    for paragraph in request.content.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        for raw in paragraph.lines() {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let heading = raw.trim_start_matches('#');
            if heading.len() < raw.len() {
                add_space(&mut lines, 4.0);
                push_wrapped(&mut lines, heading.trim(), Font::Bold, HEADING_SIZE, 1.4);
            } else if let Some(item) = raw.strip_prefix("- ").or_else(|| raw.strip_prefix("* ")) {
                push_wrapped(&mut lines, &format!("- {}", item.trim()), Font::Regular, BODY_SIZE, 1.3);
            } else {
                push_wrapped(&mut lines, raw, Font::Regular, BODY_SIZE, 1.3);
            }
        }
        add_space(&mut lines, 8.0);
    }

    lines
}

fn push_wrapped(lines: &mut Vec<Line>, text: &str, font: Font, size: f32, leading: f32) {
    let usable = PAGE_WIDTH as f32 - 2.0 * MARGIN;
    let columns = (usable / (size * AVG_GLYPH_WIDTH)).floor().max(10.0) as usize;

    for wrapped in wrap(text, columns) {
        lines.push(Line {
            text: wrapped,
            font,
            size,
            advance: size * leading,
        });
    }
}

fn add_space(lines: &mut Vec<Line>, points: f32) {
    if let Some(last) = lines.last_mut() {
        last.advance += points;
    }
}

/// Greedy word wrap on character counts; words longer than a line are split.
fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > columns {
            if current_len > 0 {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(columns);
            out.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 { word.len() } else { word.len() + 1 };
        if current_len + needed > columns {
            out.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 {
        out.push(current);
    }
    out
}

fn paginate(lines: &[Line]) -> Vec<Vec<Line>> {
    let usable = PAGE_HEIGHT as f32 - 2.0 * MARGIN;
    let mut pages: Vec<Vec<Line>> = vec![Vec::new()];
    let mut used = 0.0;

    for line in lines {
        if used + line.size > usable && used > 0.0 {
            pages.push(Vec::new());
            used = 0.0;
        }
        if let Some(page) = pages.last_mut() {
            page.push(line.clone());
        }
        used += line.advance;
    }

    pages
}

fn page_content(lines: &[Line]) -> String {
    let mut content = String::from("BT\n");
    let mut y = PAGE_HEIGHT as f32 - MARGIN;

    for line in lines {
        let baseline = y - line.size;
        content.push_str(&format!(
            "/{} {} Tf\n1 0 0 1 {} {:.1} Tm\n({}) Tj\n",
            line.font.resource(),
            line.size,
            MARGIN,
            baseline,
            escape_pdf_string(&line.text)
        ));
        y -= line.advance;
    }

    content.push_str("ET\n");
    content
}

/// Escapes PDF string delimiters. The standard fonts only cover ASCII, so
/// everything else becomes `?`.
fn escape_pdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() && !c.is_control() => out.push(c),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            _ => out.push('?'),
        }
    }
    out
}
