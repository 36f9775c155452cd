use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::lesson::classifier::{BlockKind, LessonBlock};

pub const WORKSHEET_TITLE: &str = "Lesson Worksheet";

const PRINT_CSS: &str = "\
@page { size: A4; margin: 20mm; }
body { -webkit-print-color-adjust: exact; color-adjust: exact; }
.print-content { font-family: 'Times New Roman', serif; font-size: 12pt; line-height: 1.6; color: black; }
.print-title { font-size: 18pt; font-weight: bold; text-align: center; margin-bottom: 20pt; border-bottom: 2pt solid black; padding-bottom: 10pt; }
.bold-header { font-weight: bold; font-size: 14pt; margin: 12pt 0 6pt; }
.section-break { font-weight: bold; page-break-before: auto; margin-top: 20pt; margin-bottom: 9pt; }
.avoid-break { page-break-inside: avoid; }
.question-item { margin-bottom: 12pt; }
.answer-rule { border-bottom: 1px solid #9ca3af; height: 2em; margin-bottom: 6pt; }
.blank { height: 6pt; }
.line { margin-bottom: 6pt; }
";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Text,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Text => "txt",
        }
    }
}

/// Print-ready A4 document. Pagination hints live in CSS only; the block
/// sequence is exactly what the screen shows.
pub fn render_html(title: &str, blocks: &[LessonBlock]) -> String {
    let body: String = blocks.iter().map(html_line).collect();

    let title = escape_html(title);
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{PRINT_CSS}</style>\n</head>\n<body>\n<div class=\"print-content\">\n<div class=\"print-title\">{title}</div>\n{body}</div>\n</body>\n</html>\n"
    )
}

fn html_line(block: &LessonBlock) -> String {
    match &block.kind {
        BlockKind::BoldHeader(text) => format!(
            "<div class=\"bold-header avoid-break\">{}</div>\n",
            escape_html(text)
        ),
        BlockKind::SectionHeader(text) => {
            format!("<div class=\"section-break\">{}</div>\n", escape_html(text))
        }
        BlockKind::NumberedQuestion(text) => format!(
            "<div class=\"question-item avoid-break\"><div>{}</div><div class=\"answer-rule\"></div></div>\n",
            escape_html(text)
        ),
        BlockKind::BlankLine => "<div class=\"blank\"></div>\n".to_string(),
        BlockKind::PlainText(text) => format!("<div class=\"line\">{}</div>\n", escape_html(text)),
    }
}

/// Plain-text worksheet. Answer rules are drawn with underscores `width` wide.
pub fn render_plain(blocks: &[LessonBlock], width: usize) -> Vec<String> {
    let rule = "_".repeat(width.max(10));
    let mut lines = Vec::with_capacity(blocks.len() + 4);
    lines.push(WORKSHEET_TITLE.to_uppercase());
    lines.push("=".repeat(WORKSHEET_TITLE.len()));
    lines.push(String::new());

    for block in blocks {
        match &block.kind {
            BlockKind::BoldHeader(text) => lines.push(text.to_uppercase()),
            BlockKind::SectionHeader(text) => {
                if lines.last().is_some_and(|l| !l.is_empty()) {
                    lines.push(String::new());
                }
                lines.push(text.trim().to_string());
            }
            BlockKind::NumberedQuestion(text) => {
                lines.push(text.clone());
                lines.push(String::new());
                lines.push(rule.clone());
            }
            BlockKind::BlankLine => lines.push(String::new()),
            BlockKind::PlainText(text) => lines.push(text.clone()),
        }
    }
    lines
}

pub fn worksheet_file_name(lesson_id: Option<i64>, format: ExportFormat) -> String {
    match lesson_id {
        Some(id) => format!("Lesson_{id}.{}", format.extension()),
        None => format!("Lesson_draft.{}", format.extension()),
    }
}

/// Write the worksheet into `dir`, replacing any earlier export atomically.
pub fn export_worksheet(
    dir: &Path,
    lesson_id: Option<i64>,
    blocks: &[LessonBlock],
    format: ExportFormat,
) -> Result<PathBuf> {
    let content = match format {
        ExportFormat::Html => render_html(WORKSHEET_TITLE, blocks),
        ExportFormat::Text => {
            let mut text = render_plain(blocks, 60).join("\n");
            text.push('\n');
            text
        }
    };
    let path = dir.join(worksheet_file_name(lesson_id, format));
    write_atomic(&path, content.as_bytes())?;
    log::info!("exported worksheet to {}", path.display());
    Ok(path)
}

pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::classifier::classify;

    const SAMPLE: &str = "**Header**\nSection 1\n1. What is a noun?\n\nDone.";

    #[test]
    fn html_has_print_css_and_answer_rule() {
        let html = render_html(WORKSHEET_TITLE, &classify(SAMPLE));
        assert!(html.contains("@page { size: A4; margin: 20mm; }"));
        assert!(html.contains("<div class=\"bold-header avoid-break\">Header</div>"));
        assert!(html.contains("<div class=\"section-break\">Section 1</div>"));
        assert!(html.contains(
            "<div>1. What is a noun?</div><div class=\"answer-rule\"></div>"
        ));
        assert_eq!(html.matches("answer-rule\"").count(), 1);
    }

    #[test]
    fn html_body_has_one_line_per_block() {
        let blocks = classify(SAMPLE);
        let body: Vec<String> = blocks.iter().map(html_line).collect();
        assert_eq!(body.len(), 5);
        assert!(body.iter().all(|l| l.ends_with("</div>\n") && l.matches('\n').count() == 1));
        assert_eq!(body[3], "<div class=\"blank\"></div>\n");
        assert_eq!(body[4], "<div class=\"line\">Done.</div>\n");
    }

    #[test]
    fn html_escapes_lesson_text() {
        let html = render_html("A & B", &classify("1. Is 3 < 4?\n<script>"));
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("1. Is 3 &lt; 4?"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn plain_rendering_adds_rule_after_questions() {
        let lines = render_plain(&classify("1. First\n2. Second"), 20);
        let rule = "_".repeat(20);
        let first = lines.iter().position(|l| l == "1. First").unwrap();
        assert_eq!(lines[first + 2], rule);
        let second = lines.iter().position(|l| l == "2. Second").unwrap();
        assert_eq!(lines[second + 2], rule);
    }

    #[test]
    fn plain_rendering_separates_sections() {
        let lines = render_plain(&classify("Intro\nActivity 1"), 20);
        let idx = lines.iter().position(|l| l == "Activity 1").unwrap();
        assert_eq!(lines[idx - 1], "");
        assert_eq!(lines[idx - 2], "Intro");
    }

    #[test]
    fn file_names_follow_lesson_id() {
        assert_eq!(worksheet_file_name(Some(12), ExportFormat::Html), "Lesson_12.html");
        assert_eq!(worksheet_file_name(None, ExportFormat::Text), "Lesson_draft.txt");
    }

    #[test]
    fn export_writes_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path =
            export_worksheet(dir.path(), Some(3), &classify(SAMPLE), ExportFormat::Text).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("LESSON WORKSHEET\n"));
        assert!(content.contains("HEADER\n"));

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn export_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("worksheets").join("grade2");
        let path = export_worksheet(&nested, None, &classify(SAMPLE), ExportFormat::Html).unwrap();
        assert!(path.ends_with("Lesson_draft.html"));
        assert!(path.exists());
    }
}
