use crate::log::{LogEntry, LogType};

pub const DEFAULT_ERROR_CLASS: &str = "NormalRed";
pub const DEFAULT_HIGHLIGHT_CLASS: &str = "NormalBold";
pub const DEFAULT_NORMAL_CLASS: &str = "Normal";

/// Resolves a resource key such as `LOG.PALogger.Info` to display text.
pub trait Localizer {
    fn localize(&self, key: &str) -> Option<String>;
}

/// Falls back to the log type name.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeNameLocalizer;

impl Localizer for TypeNameLocalizer {
    fn localize(&self, _key: &str) -> Option<String> {
        None
    }
}

impl<F> Localizer for F
where
    F: Fn(&str) -> Option<String>,
{
    fn localize(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// Read-only HTML projection of installer log entries.
#[derive(Debug, Clone, Default)]
pub struct LogTable {
    error_class: Option<String>,
    highlight_class: Option<String>,
    normal_class: Option<String>,
}

impl LogTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error_class(mut self, class: impl Into<String>) -> Self {
        self.error_class = Some(class.into());
        self
    }

    pub fn with_highlight_class(mut self, class: impl Into<String>) -> Self {
        self.highlight_class = Some(class.into());
        self
    }

    pub fn with_normal_class(mut self, class: impl Into<String>) -> Self {
        self.normal_class = Some(class.into());
        self
    }

    pub fn error_class(&self) -> &str {
        non_empty(&self.error_class, DEFAULT_ERROR_CLASS)
    }

    pub fn highlight_class(&self) -> &str {
        non_empty(&self.highlight_class, DEFAULT_HIGHLIGHT_CLASS)
    }

    pub fn normal_class(&self) -> &str {
        non_empty(&self.normal_class, DEFAULT_NORMAL_CLASS)
    }

    fn class_for(&self, kind: LogType) -> &str {
        match kind {
            LogType::Failure | LogType::Warning => self.error_class(),
            LogType::StartJob | LogType::EndJob => self.highlight_class(),
            LogType::Info => self.normal_class(),
        }
    }

    pub fn render(&self, entries: &[LogEntry], localizer: &dyn Localizer) -> String {
        let mut html = String::from("<table>");
        for entry in entries {
            let label = localizer
                .localize(&entry.kind.resource_key())
                .unwrap_or_else(|| entry.kind.as_str().to_string());
            let class = escape(self.class_for(entry.kind));

            html.push_str("<tr>");
            html.push_str(&format!("<td class=\"{}\">{}</td>", class, escape(&label)));
            html.push_str(&format!(
                "<td class=\"{}\">{}</td>",
                class,
                escape(&entry.description)
            ));
            html.push_str("</tr>");

            if entry.kind == LogType::EndJob {
                html.push_str("<tr><td colspan=\"2\">&nbsp;</td></tr>");
            }
        }
        html.push_str("</table>");
        html
    }
}

fn non_empty<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => fallback,
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
