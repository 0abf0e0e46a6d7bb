use crate::{models::Trend, Error, Result};
use askama::Template;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Dashboard output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    #[serde(alias = "markdown")]
    Md,
    Html,
}

impl ReportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "md" | "markdown" => Some(ReportFormat::Md),
            "html" | "htm" => Some(ReportFormat::Html),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Md => "md",
            ReportFormat::Html => "html",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_extension(s)
            .ok_or_else(|| format!("unknown dashboard format '{}', expected md or html", s))
    }
}

/// Turns ranked trends into report text
pub trait Renderer {
    fn render(&self, trends: &[Trend]) -> Result<String>;
}

/// Pick the renderer for a format
pub fn renderer_for(
    format: ReportFormat,
    title: &str,
    generated_at: DateTime<Utc>,
) -> Box<dyn Renderer> {
    match format {
        ReportFormat::Md => Box::new(MarkdownRenderer::new(title)),
        ReportFormat::Html => Box::new(HtmlRenderer::new(title, generated_at)),
    }
}

/// Write a rendered report, creating parent directories as needed
pub fn write_report<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
        .map_err(|e| Error::RenderError(format!("Failed to write {}: {}", path.display(), e)))
}

/// Markdown table, GitHub-flavoured
pub struct MarkdownRenderer {
    title: String,
}

impl MarkdownRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, trends: &[Trend]) -> Result<String> {
        let Some(first) = trends.first() else {
            return Ok(format!("# {}\n\nNo trending data available.\n", self.title));
        };
        let period = first.period();

        let mut output = String::new();
        output.push_str(&format!("# {} ({})\n\n", self.title, period));
        output.push_str(&format!(
            "| Rank | Repository | Stars | Trend ({}) |\n",
            period.window_label()
        ));
        output.push_str("|:----:|:-----------|:------|:-----------|\n");

        for (i, trend) in trends.iter().enumerate() {
            let repo = trend.repository();
            output.push_str(&format!(
                "| {} | [{}]({}) | {} | {} ★ |\n",
                i + 1,
                escape_markdown(repo.full_name()),
                repo.url(),
                repo.stars(),
                format_diff(trend.diff()),
            ));
        }

        Ok(output)
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardPage<'a> {
    title: &'a str,
    period: String,
    window: &'static str,
    generated_at: String,
    rows: Vec<DashboardRow>,
}

struct DashboardRow {
    rank: usize,
    full_name: String,
    url: String,
    stars: u64,
    diff: String,
    direction: &'static str,
}

/// Standalone HTML page rendered from `templates/dashboard.html`
pub struct HtmlRenderer {
    title: String,
    generated_at: DateTime<Utc>,
}

impl HtmlRenderer {
    pub fn new(title: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            generated_at,
        }
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, trends: &[Trend]) -> Result<String> {
        let period = trends.first().map(Trend::period).unwrap_or_default();

        let rows = trends
            .iter()
            .enumerate()
            .map(|(i, trend)| {
                let repo = trend.repository();
                DashboardRow {
                    rank: i + 1,
                    full_name: repo.full_name().to_string(),
                    url: repo.url(),
                    stars: repo.stars(),
                    diff: format_diff(trend.diff()),
                    direction: match trend.diff() {
                        d if d > 0 => "up",
                        d if d < 0 => "down",
                        _ => "flat",
                    },
                }
            })
            .collect();

        let page = DashboardPage {
            title: &self.title,
            period: period.to_string(),
            window: period.window_label(),
            generated_at: self.generated_at.to_rfc2822(),
            rows,
        };

        Ok(page.render()?)
    }
}

/// Signed diff, `+80` / `-5` / `0`
fn format_diff(diff: i64) -> String {
    if diff > 0 {
        format!("+{}", diff)
    } else {
        diff.to_string()
    }
}

/// Keep repository names from breaking the table or the link text
fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '|' | '[' | ']' | '\\' | '*' | '_' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
