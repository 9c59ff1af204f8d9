use super::{ExportError, ExportSettings};
use genpdf::elements::{Break, Paragraph};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Style, StyledString};
use genpdf::{Document, Mm, SimplePageDecorator};
use std::path::{Path, PathBuf};

const MARGIN_MM: i32 = 30;
/// A4 width less both margins, rounded down
const TEXT_WIDTH_MM: i32 = 210 - 2 * MARGIN_MM - 2;
const TITLE_FONT_SIZE: u8 = 18;
const BODY_FONT_SIZE: u8 = 12;

/// Lay out the title and one paragraph per line
pub(super) fn render(settings: &ExportSettings, text: &str) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::new(load_font_family(settings)?);
    doc.set_title(settings.document_title.clone());
    doc.set_font_size(BODY_FONT_SIZE);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(MARGIN_MM);
    doc.set_page_decorator(decorator);

    let title_style = Style::new().with_font_size(TITLE_FONT_SIZE);
    doc.push(Paragraph::new(StyledString::new(
        settings.document_title.clone(),
        title_style,
    )));
    doc.push(Break::new(1));

    let body_style = Style::new().with_font_size(BODY_FONT_SIZE);
    let max_width = Mm::from(TEXT_WIDTH_MM);
    for line in text.lines() {
        if line.trim().is_empty() {
            doc.push(Break::new(1));
            continue;
        }
        let pieces = fit_line(line, max_width, |s| body_style.str_width(doc.font_cache(), s));
        for piece in pieces {
            doc.push(Paragraph::new(StyledString::new(piece, body_style)));
        }
    }

    let mut bytes = Vec::new();
    doc.render(&mut bytes)
        .map_err(|e| ExportError::Render(format!("Failed to render PDF: {e}")))?;
    Ok(bytes)
}

fn font_path(settings: &ExportSettings) -> Option<PathBuf> {
    let dir = Path::new(&settings.font_dir);
    [
        format!("{}-Regular.ttf", settings.font_family),
        format!("{}.ttf", settings.font_family),
    ]
    .into_iter()
    .map(|name| dir.join(name))
    .find(|path| path.is_file())
}

/// Load a single TrueType file and use it for every text style
///
/// CJK fonts usually ship one weight only, so no bold or italic files are
/// required.
pub(super) fn load_font_family(
    settings: &ExportSettings,
) -> Result<FontFamily<FontData>, ExportError> {
    let path = font_path(settings).ok_or_else(|| {
        ExportError::Render(format!(
            "No font file for {} in {}",
            settings.font_family, settings.font_dir
        ))
    })?;
    let data = FontData::load(&path, None).map_err(|e| {
        ExportError::Render(format!("Failed to load font {}: {e}", path.display()))
    })?;

    // TODO: genpdf embeds each style's font data separately and unsubsetted;
    // switch to a renderer with font subsetting to shrink CJK documents.
    Ok(FontFamily {
        regular: data.clone(),
        bold: data.clone(),
        italic: data.clone(),
        bold_italic: data,
    })
}

/// Split a line so that no word is wider than `max_width`
///
/// genpdf silently drops a word that does not fit on an empty line, and a
/// run of text without spaces (Chinese, long URLs) is a single word to it.
/// Overlong words are cut into pieces that each become their own paragraph;
/// everything else is left to genpdf's own wrapping.
fn fit_line(line: &str, max_width: Mm, width: impl Fn(&str) -> Mm) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for word in line.split_inclusive(' ') {
        let bare = word.trim_end_matches(' ');
        if width(bare) <= max_width {
            current.push_str(word);
            continue;
        }

        if !current.trim().is_empty() {
            pieces.push(std::mem::take(&mut current));
        }
        current.clear();

        for c in bare.chars() {
            current.push(c);
            // A single glyph wider than the page is kept rather than lost
            if width(&current) > max_width && current.chars().count() > 1 {
                current.pop();
                pieces.push(std::mem::take(&mut current));
                current.push(c);
            }
        }
        current.push_str(&word[bare.len()..]);
    }

    if !current.trim().is_empty() {
        pieces.push(current);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use genpdf::fonts::FontCache;
    use lopdf::Object;
    use std::collections::HashMap;

    fn char_width(s: &str) -> Mm {
        Mm::from(s.chars().count() as u32)
    }

    #[test]
    fn test_fit_line_leaves_short_lines_alone() {
        assert_eq!(
            fit_line("a short line", Mm::from(10), char_width),
            vec!["a short line"]
        );
    }

    #[test]
    fn test_fit_line_cuts_unbroken_text() {
        let line = "中文改写文本".repeat(4);
        let pieces = fit_line(&line, Mm::from(10), char_width);

        assert_eq!(pieces.len(), 3);
        assert!(pieces.iter().all(|p| p.chars().count() <= 10));
        assert_eq!(pieces.concat(), line);
    }

    #[test]
    fn test_fit_line_keeps_words_around_a_long_one() {
        let line = format!("before {} after", "y".repeat(25));
        let pieces = fit_line(&line, Mm::from(10), char_width);

        assert_eq!(pieces[0], "before ");
        assert_eq!(pieces.last().unwrap(), "yyyyy after");
        assert_eq!(pieces.concat(), line);
        for piece in &pieces {
            for word in piece.split(' ') {
                assert!(word.chars().count() <= 10, "{word:?} is too wide");
            }
        }
    }

    #[test]
    fn test_fit_line_keeps_single_wide_glyph() {
        let pieces = fit_line("ab", Mm::from(0), char_width);
        assert_eq!(pieces, vec!["a", "b"]);
    }

    /// Settings for a font present on this machine, if any
    fn available_font() -> Option<ExportSettings> {
        let candidates = [
            ExportSettings::default(),
            ExportSettings {
                font_dir: "/usr/share/fonts/truetype/dejavu".to_string(),
                font_family: "DejaVuSans".to_string(),
                ..Default::default()
            },
            ExportSettings {
                font_dir: "/usr/share/fonts/truetype/liberation".to_string(),
                font_family: "LiberationSans".to_string(),
                ..Default::default()
            },
        ];
        candidates.into_iter().find(|s| font_path(s).is_some())
    }

    /// Glyph IDs drawn by `TJ` operators across all pages
    fn drawn_glyphs(pdf: &[u8]) -> HashMap<u16, usize> {
        let doc = lopdf::Document::load_mem(pdf).expect("output should parse as PDF");
        let mut glyphs = HashMap::new();

        for page_id in doc.get_pages().into_values() {
            let content = doc.get_and_decode_page_content(page_id).unwrap();
            for op in content.operations.iter().filter(|op| op.operator == "TJ") {
                let Some(Object::Array(items)) = op.operands.first() else {
                    continue;
                };
                for item in items {
                    if let Object::String(bytes, _) = item {
                        for pair in bytes.chunks_exact(2) {
                            *glyphs.entry(u16::from_be_bytes([pair[0], pair[1]])).or_default() +=
                                1;
                        }
                    }
                }
            }
        }
        glyphs
    }

    /// Every non-blank character of the title and body must be drawn
    fn assert_text_drawn(settings: &ExportSettings, text: &str) {
        let pdf = render(settings, text).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        let drawn = drawn_glyphs(&pdf);

        let cache = FontCache::new(load_font_family(settings).unwrap());
        let font = cache.default_font_family().regular;
        let expected_chars = settings
            .document_title
            .chars()
            .chain(text.chars())
            .filter(|c| !c.is_whitespace());

        let mut expected: HashMap<u16, usize> = HashMap::new();
        for glyph in font.glyph_ids(&cache, expected_chars) {
            *expected.entry(glyph).or_default() += 1;
        }

        for (glyph, count) in expected {
            let found = drawn.get(&glyph).copied().unwrap_or(0);
            assert!(
                found >= count,
                "glyph {glyph:#06x} drawn {found} times, expected at least {count}"
            );
        }
    }

    #[test]
    fn test_body_text_is_drawn() {
        let Some(settings) = available_font() else {
            eprintln!("skipping test_body_text_is_drawn: no TrueType font installed");
            return;
        };

        assert_text_drawn(&settings, "Sample");
        assert_text_drawn(&settings, "First line\nSecond line\n\nFourth line");
        assert_text_drawn(&settings, &"x".repeat(300));
        assert_text_drawn(&settings, &format!("before {} after", "y".repeat(300)));
        assert_text_drawn(&settings, &"中文改写文本".repeat(20));
    }

    #[test]
    fn test_missing_font_is_render_error() {
        let settings = ExportSettings {
            font_dir: "/nonexistent/fonts".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            render(&settings, "Sample"),
            Err(ExportError::Render(_))
        ));
    }
}
