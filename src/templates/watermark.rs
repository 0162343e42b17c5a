//! Watermark Module
//!
//! Stamps a faint diagonal text overlay onto certificate HTML.

const WATERMARK_STYLE: &str = "<style>
.watermark {
    position: fixed;
    top: 50%;
    left: 50%;
    transform: translate(-50%, -50%) rotate(-45deg);
    font-size: 60px;
    color: rgba(0, 0, 0, 0.1);
    z-index: 1000;
    pointer-events: none;
    white-space: nowrap;
    font-weight: bold;
}
</style>
";

/// Inserts the watermark before `</body>`, or appends it when there is none.
pub fn add_watermark(html: &str, text: &str) -> String {
    let overlay = format!(
        "{}<div class=\"watermark\">{}</div>\n",
        WATERMARK_STYLE,
        escape_html(text)
    );

    match html.rfind("</body>") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + overlay.len());
            out.push_str(&html[..pos]);
            out.push_str(&overlay);
            out.push_str(&html[pos..]);
            out
        }
        None => format!("{html}{overlay}"),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
