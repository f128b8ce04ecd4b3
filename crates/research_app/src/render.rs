use std::fmt::Write;

use research_core::{AppViewModel, AnswerView, Notice, QueryGate, Severity};

pub const PAGE_TITLE: &str = "Real Estate Research Tool";

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
aside{width:22rem;padding:1rem;background:#f3f4f6;min-height:100vh}\
main{flex:1;padding:1rem 2rem}\
label{display:block;margin-top:.75rem}\
input[type=text],select{width:100%;box-sizing:border-box}\
.notice{padding:.5rem;border-radius:4px}\
.notice.error{background:#fde2e2}.notice.info{background:#e2f0fd}\
#status p{margin:.2rem 0;font-family:monospace}";

/// Renders the whole page for one session view.
pub fn render_page(view: &AppViewModel) -> String {
    let mut html = String::with_capacity(4096);
    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{PAGE_TITLE}</title><style>{STYLE}</style></head><body>"
    );
    render_sidebar(&mut html, view);

    let _ = write!(html, "<main><h1>{PAGE_TITLE}</h1>");
    render_help(&mut html);
    render_status(&mut html, &view.status_lines);
    if let Some(notice) = &view.notice {
        render_notice(&mut html, notice);
    }
    render_question(&mut html, view);
    if let Some(answer) = &view.answer {
        render_answer(&mut html, answer);
    }
    html.push_str("</main></body></html>");
    html
}

fn render_sidebar(html: &mut String, view: &AppViewModel) {
    html.push_str("<aside><form method=\"post\" action=\"/process\">");
    let _ = write!(
        html,
        "<label for=\"preset\">Predefined URLs</label>\
         <select id=\"preset\" name=\"preset\" multiple size=\"{}\">",
        view.presets.len().max(1)
    );
    for preset in &view.presets {
        let _ = write!(
            html,
            "<option value=\"{}\" title=\"{}\"{}>{}</option>",
            escape(&preset.label),
            escape(&preset.url),
            if preset.selected { " selected" } else { "" },
            escape(&preset.label)
        );
    }
    html.push_str("</select>");

    for (slot, value) in view.custom_urls.iter().enumerate() {
        let n = slot + 1;
        let _ = write!(
            html,
            "<label for=\"url{n}\">URL {n}</label>\
             <input type=\"text\" id=\"url{n}\" name=\"url{n}\" value=\"{}\">",
            escape(value)
        );
    }
    html.push_str("<p><button type=\"submit\">Process URLs</button></p></form></aside>");
}

fn render_help(html: &mut String) {
    html.push_str(
        "<details><summary>How this tool supports you</summary>\
         <p>Answers real estate questions using the websites you provide.</p>\
         <p>It works well when the page contains the answer as text, for example \
         current or historical mortgage rates.</p>\
         <p>It may not work when the data is only in images or tables, needs a \
         login, or the site blocks automated access.</p></details>",
    );
}

fn render_status(html: &mut String, lines: &[String]) {
    html.push_str("<section id=\"status\">");
    for line in lines {
        let _ = write!(html, "<p>{}</p>", escape(line));
    }
    html.push_str("</section>");
}

fn render_notice(html: &mut String, notice: &Notice) {
    let class = match notice.severity {
        Severity::Info => "info",
        Severity::Error => "error",
    };
    let _ = write!(
        html,
        "<div class=\"notice {class}\" role=\"alert\">{}</div>",
        escape(&notice.text)
    );
}

fn render_question(html: &mut String, view: &AppViewModel) {
    let disabled = match view.query_gate {
        QueryGate::Enabled => "",
        QueryGate::Disabled => " disabled",
    };
    let _ = write!(
        html,
        "<form method=\"post\" action=\"/ask\"><label for=\"question\">Question</label>\
         <input type=\"text\" id=\"question\" name=\"question\" value=\"{}\"{disabled}>\
         <button type=\"submit\"{disabled}>Ask</button></form>",
        escape(&view.question)
    );
}

fn render_answer(html: &mut String, answer: &AnswerView) {
    let _ = write!(
        html,
        "<section id=\"answer\"><h2>Answer:</h2><p>{}</p>",
        escape(&answer.answer)
    );
    if !answer.citations.is_empty() {
        html.push_str("<h3>Sources:</h3><ul>");
        for citation in &answer.citations {
            let _ = write!(html, "<li>{}</li>", escape(citation));
        }
        html.push_str("</ul>");
    }
    html.push_str("</section>");
}

/// Escapes text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
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
    use research_core::{update, AppState, Msg};

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn fresh_session_has_disabled_question() {
        let html = render_page(&AppState::default().view());
        assert!(html.contains("name=\"question\" value=\"\" disabled"));
        assert!(html.contains("URL 1"));
        assert!(html.contains("URL 3"));
        assert!(!html.contains("id=\"answer\""));
    }

    #[test]
    fn answer_and_citations_are_rendered_separately() {
        let (state, _) = update(
            AppState::default(),
            Msg::AnswerReceived {
                answer: "7.1%".to_string(),
                sources: "site-a.com\nsite-b.com".to_string(),
            },
        );
        let html = render_page(&state.view());
        assert!(html.contains("<h2>Answer:</h2><p>7.1%</p>"));
        assert!(html.contains("<li>site-a.com</li><li>site-b.com</li>"));
    }

    #[test]
    fn user_text_is_escaped() {
        let (state, _) = update(
            AppState::default(),
            Msg::CustomUrlEdited {
                slot: 0,
                text: "\"><script>".to_string(),
            },
        );
        let html = render_page(&state.view());
        assert!(!html.contains("<script>"));
        assert!(html.contains("value=\"&quot;&gt;&lt;script&gt;\""));
    }
}
