//! Line-break-preserving conversion between editor markup and plain text
//!
//! The page store only ever holds canonical plain text: `\n` for a line
//! break inside a paragraph, `\n\n` for a paragraph boundary. The editing
//! surface only ever speaks HTML. These two functions are the sole bridge
//! and are total over arbitrary input: malformed markup degrades to text,
//! it never produces an error.

use std::borrow::Cow;

/// What a scanned tag means for text extraction
enum Tag {
    LineBreak,
    ParagraphOpen,
    ParagraphClose,
    Other,
}

fn classify_tag(raw: &str) -> Tag {
    let raw = raw.trim();
    let (closing, rest) = match raw.strip_prefix('/') {
        Some(r) => (true, r),
        None => (false, raw),
    };
    let name: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    match name.as_str() {
        "br" => Tag::LineBreak,
        "p" | "div" => {
            if closing {
                Tag::ParagraphClose
            } else {
                Tag::ParagraphOpen
            }
        }
        _ => Tag::Other,
    }
}

/// Convert editor HTML to canonical plain text.
///
/// Paragraph containers (`<p>`, `<div>`) become `\n\n` boundaries, `<br>`
/// variants become `\n`, every other tag is stripped, and standard named
/// and numeric entities are decoded. Tag names are matched independent of
/// case and attributes.
pub fn html_to_text(html: &str) -> String {
    let mut paras: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < html.len() {
        if html.as_bytes()[i] == b'<' {
            match html[i..].find('>') {
                Some(end) => {
                    match classify_tag(&html[i + 1..i + end]) {
                        Tag::LineBreak => current.push('\n'),
                        Tag::ParagraphClose => paras.push(std::mem::take(&mut current)),
                        Tag::ParagraphOpen => {
                            // Stray text between containers: keep real text,
                            // drop formatting whitespace emitted between tags.
                            if !current.is_empty() {
                                if current.trim().is_empty() {
                                    current.clear();
                                } else {
                                    paras.push(std::mem::take(&mut current));
                                }
                            }
                        }
                        Tag::Other => {}
                    }
                    i += end + 1;
                }
                None => {
                    // '<' with no closing '>': treat as literal text
                    current.push('<');
                    i += 1;
                }
            }
        } else {
            let next = html[i..].find('<').map(|n| i + n).unwrap_or(html.len());
            let decoded = html_escape::decode_html_entities(&html[i..next]);
            current.extend(decoded.chars().filter(|&c| c != '\r'));
            i = next;
        }
    }

    if !current.is_empty() && (paras.is_empty() || !current.trim().is_empty()) {
        paras.push(current);
    }

    paras.join("\n\n")
}

/// Convert canonical plain text to editor HTML.
///
/// Splits on `\n\n` into `<p>` containers; a remaining `\n` inside a
/// paragraph becomes `<br>`. Text is entity-encoded. Empty input maps to a
/// single empty paragraph so the editing surface always mounts a
/// well-formed document.
pub fn text_to_html(text: &str) -> String {
    if text.is_empty() {
        return "<p></p>".to_string();
    }

    let mut html = String::with_capacity(text.len() + 16);
    for para in text.split("\n\n") {
        html.push_str("<p>");
        let encoded: Cow<str> = html_escape::encode_text(para);
        for (i, line) in encoded.split('\n').enumerate() {
            if i > 0 {
                html.push_str("<br>");
            }
            html.push_str(line);
        }
        html.push_str("</p>");
    }
    html
}

/// Estimate how many display lines a text occupies.
///
/// Non-authoritative: used only for the line-count readout and the reflow
/// heuristic, never for pagination decisions that could lose content.
pub fn estimate_line_count(text: &str, avg_chars_per_line: usize) -> usize {
    if text.is_empty() {
        return 1;
    }
    let avg = avg_chars_per_line.max(1);
    text.split('\n')
        .map(|line| {
            let chars = line.chars().count();
            if chars == 0 {
                1
            } else {
                chars.div_ceil(avg)
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_paragraph_round_trip() {
        let text = "Hello, World!";
        assert_eq!(html_to_text(&text_to_html(text)), text);
    }

    #[test]
    fn test_paragraph_break_round_trip() {
        let text = "Paragraph 1\n\nParagraph 2";
        assert_eq!(text_to_html(text), "<p>Paragraph 1</p><p>Paragraph 2</p>");
        assert_eq!(html_to_text(&text_to_html(text)), text);
    }

    #[test]
    fn test_line_break_round_trip() {
        let text = "Line 1\nLine 2";
        assert_eq!(text_to_html(text), "<p>Line 1<br>Line 2</p>");
        assert_eq!(html_to_text(&text_to_html(text)), text);
    }

    #[test]
    fn test_trailing_break_round_trip() {
        let text = "Line 1\n";
        assert_eq!(html_to_text(&text_to_html(text)), text);
    }

    #[test]
    fn test_triple_newline_round_trip() {
        // Runs of 3+ newlines survive as paragraph boundary + embedded break
        let text = "A\n\n\nB";
        assert_eq!(html_to_text(&text_to_html(text)), text);
        let text = "A\n\n\n\nB";
        assert_eq!(html_to_text(&text_to_html(text)), text);
    }

    #[test]
    fn test_empty_text_gives_well_formed_document() {
        assert_eq!(text_to_html(""), "<p></p>");
        assert_eq!(html_to_text("<p></p>"), "");
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(html_to_text("<p>a &amp; b &lt;c&gt; &quot;d&quot; &#39;e&#39;</p>"), "a & b <c> \"d\" 'e'");
        assert_eq!(html_to_text("<p>a&nbsp;b</p>"), "a\u{a0}b");
    }

    #[test]
    fn test_entities_encoded() {
        assert_eq!(text_to_html("a & b <c>"), "<p>a &amp; b &lt;c&gt;</p>");
    }

    #[test]
    fn test_encode_decode_round_trip_with_specials() {
        let text = "5 < 6 & 7 > 2\n\n\"quoted\"";
        assert_eq!(html_to_text(&text_to_html(text)), text);
    }

    #[test]
    fn test_inline_formatting_stripped() {
        assert_eq!(
            html_to_text("<p><b>bold</b> and <i>italic</i></p>"),
            "bold and italic"
        );
    }

    #[test]
    fn test_attributes_and_case_ignored() {
        assert_eq!(
            html_to_text("<P CLASS=\"x\">one<BR/>two</P><div style=\"a\">three</div>"),
            "one\ntwo\n\nthree"
        );
    }

    #[test]
    fn test_divs_as_paragraphs() {
        assert_eq!(html_to_text("<div>A</div><div>B</div>"), "A\n\nB");
    }

    #[test]
    fn test_unclosed_containers() {
        assert_eq!(html_to_text("<div>A<div>B"), "A\n\nB");
    }

    #[test]
    fn test_unicode_passes_through() {
        let text = "emoji 🎈🎈\ncafé\u{301}\n\nзима";
        assert_eq!(html_to_text(&text_to_html(text)), text);
    }

    #[test]
    fn test_stray_angle_bracket_is_literal() {
        // A '<' that never closes degrades to literal text
        assert_eq!(html_to_text("unclosed < tag"), "unclosed < tag");
    }

    #[test]
    fn test_whitespace_between_containers_dropped() {
        assert_eq!(html_to_text("<p>A</p>\n  <p>B</p>"), "A\n\nB");
    }

    #[test]
    fn test_estimate_line_count() {
        assert_eq!(estimate_line_count("", 40), 1);
        assert_eq!(estimate_line_count("short", 40), 1);
        assert_eq!(estimate_line_count(&"x".repeat(90), 40), 3);
        assert_eq!(estimate_line_count("a\nb\nc", 40), 3);
        assert_eq!(estimate_line_count("a\n\nb", 40), 3);
    }
}
