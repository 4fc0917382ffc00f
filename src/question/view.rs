//! Question view HTML.
//!
//! The view is fail-soft: any error while building it is logged and the
//! fixed [`RENDER_ERROR_BANNER`] is returned instead.

use super::{doc_label, Question};
use crate::error::Result;
use crate::format::{escape_attr, escape_text, render_copyable, ContentFormatter, CopyKind};
use log::error;
use std::fmt::Write;

/// Shown in place of a question that could not be rendered.
pub const RENDER_ERROR_BANNER: &str = r#"<div class="alert alert-danger">Error displaying question content. Please try refreshing the page.</div>"#;

const MISSING_VALUE: &str = "N/A";

const FLAG_ICON_PATH: &str = "M14.778.085A.5.5 0 0 1 15 .5V8a.5.5 0 0 1-.314.464L14.5 8l.186.464-.003.001-.006.003-.023.009a12.435 12.435 0 0 1-.397.15c-.264.095-.631.223-1.047.35-.816.252-1.879.523-2.71.523-.847 0-1.548-.28-2.158-.525l-.028-.01C7.68 8.71 7.14 8.5 6.5 8.5c-.7 0-1.638.23-2.437.477A19.626 19.626 0 0 0 3 9.342V15.5a.5.5 0 0 1-1 0V.5a.5.5 0 0 1 1 0v.282c.226-.079.496-.17.79-.26C4.606.272 5.67 0 6.5 0c.84 0 1.524.277 2.121.519l.043.018C9.286.788 9.828 1 10.5 1c.7 0 1.638-.23 2.437-.477a19.587 19.587 0 0 0 1.349-.476l.019-.007.004-.002h.001";

const ARROW_ICON_PATH: &str = "M1 8a.5.5 0 0 1 .5-.5h11.793l-3.147-3.146a.5.5 0 0 1 .708-.708l4 4a.5.5 0 0 1 0 .708l-4 4a.5.5 0 0 1-.708-.708L13.293 8.5H1.5A.5.5 0 0 1 1 8z";

/// Render a question with the default formatter.
pub fn render_question(question: &Question) -> String {
    render_question_with(question, &ContentFormatter::default())
}

/// Render a question's view HTML, formatting its body with `formatter`.
pub fn render_question_with(question: &Question, formatter: &ContentFormatter) -> String {
    let mut html = String::new();
    fail_soft(write_question(&mut html, question, formatter).map(|()| html))
}

fn fail_soft(rendered: Result<String>) -> String {
    rendered.unwrap_or_else(|e| {
        error!("Error generating question content: {}", e);
        RENDER_ERROR_BANNER.to_string()
    })
}

fn non_empty(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(MISSING_VALUE)
}

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

fn write_question(out: &mut String, question: &Question, formatter: &ContentFormatter) -> Result<()> {
    writeln!(out, r#"<div class="d-flex flex-column" style="height: 100%;">"#)?;
    write_header(out, question)?;

    writeln!(out, r#"<div class="question-body">"#)?;
    writeln!(out, "{}", formatter.format(&question.content))?;
    writeln!(out, "</div>")?;

    write_actions(out, question.flagged)?;
    writeln!(out, "</div>")?;
    Ok(())
}

fn write_header(out: &mut String, question: &Question) -> Result<()> {
    let record = &question.original_data;
    let host = non_empty(record.machine_hostname.as_deref());
    let namespace = non_empty(record.namespace.as_deref());

    writeln!(out, r#"<div class="question-header">"#)?;

    out.push_str(r#"<div class="mb-3"><strong>Solve this question on instance:</strong> "#);
    render_copyable(CopyKind::Code, &format!("ssh {}", host), out);
    writeln!(out, "</div>")?;

    writeln!(
        out,
        r#"<div class="mb-3"><strong>Namespace:</strong> <span class="text-primary">{}</span></div>"#,
        escape_text(namespace)
    )?;
    writeln!(
        out,
        r#"<div class="mb-3"><strong>Concepts:</strong> <span class="text-primary">{}</span></div>"#,
        escape_text(&record.concepts.join(", "))
    )?;

    if !record.documentation.is_empty() {
        writeln!(out, r#"<div class="mb-3">"#)?;
        writeln!(out, "<strong>Kubernetes Documentation:</strong>")?;
        out.push_str(r#"<div class="mt-2">"#);
        for url in &record.documentation {
            write!(
                out,
                r#"<a href="{}" target="_blank" rel="noopener noreferrer" class="text-decoration-none me-2 mb-1 d-inline-block"><span class="badge bg-info">{}</span></a>"#,
                escape_attr(url),
                escape_text(&doc_label(url))
            )?;
        }
        writeln!(out, "</div>")?;
        writeln!(out, "</div>")?;
    }

    writeln!(out, r#"<hr class="my-3">"#)?;
    writeln!(out, "</div>")?;
    Ok(())
}

fn write_actions(out: &mut String, flagged: bool) -> Result<()> {
    let (button_class, icon_class, label) = if flagged {
        ("btn-warning", "bi-flag-fill", "Flagged")
    } else {
        ("btn-outline-warning", "bi-flag", "Flag for review")
    };

    writeln!(out, r#"<div class="action-buttons-container mt-auto">"#)?;
    writeln!(out, r#"<div class="d-flex justify-content-between py-2">"#)?;
    writeln!(
        out,
        r#"<button class="btn {button_class}" id="flagQuestionBtn"><svg xmlns="http://www.w3.org/2000/svg" width="16" height="16" fill="currentColor" class="bi {icon_class} me-2" viewBox="0 0 16 16"><path d="{FLAG_ICON_PATH}"/></svg>{label}</button>"#
    )?;
    writeln!(
        out,
        r#"<button class="btn btn-success" id="nextQuestionBtn">Satisfied with answer<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16" fill="currentColor" class="bi bi-arrow-right ms-2" viewBox="0 0 16 16"><path fill-rule="evenodd" d="{ARROW_ICON_PATH}"/></svg></button>"#
    )?;
    writeln!(out, "</div>")?;
    writeln!(out, "</div>")?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
