use serde::Deserialize;
use std::process::{Command, Stdio};

pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org/wiki";
pub const DEFAULT_SUMMARY_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";

#[derive(Debug, thiserror::Error)]
pub enum WikiError {
    #[error("flower name must not be empty")]
    EmptyName,
    #[error("failed to launch browser with {0}: {1}")]
    Browser(String, std::io::Error),
    #[error("failed to parse wikipedia summary: {0}")]
    Summary(serde_json::Error),
}

pub fn article_title(name: &str) -> Result<String, WikiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(WikiError::EmptyName);
    }
    Ok(name.replace(' ', "_"))
}

pub fn article_url(base: &str, name: &str) -> Result<String, WikiError> {
    Ok(format!(
        "{}/{}",
        base.trim_end_matches('/'),
        article_title(name)?
    ))
}

#[derive(Debug, Deserialize)]
struct PageSummary {
    #[serde(default)]
    extract: String,
}

/// The plain-text extract of a page summary response.
pub fn parse_summary(body: &str) -> Result<Option<String>, WikiError> {
    let summary: PageSummary = serde_json::from_str(body).map_err(WikiError::Summary)?;
    let extract = summary.extract.trim();
    if extract.is_empty() {
        Ok(None)
    } else {
        Ok(Some(extract.to_string()))
    }
}

fn opener() -> (&'static str, Vec<&'static str>) {
    if cfg!(target_os = "macos") {
        ("open", Vec::new())
    } else if cfg!(target_os = "windows") {
        ("cmd", vec!["/C", "start", ""])
    } else {
        ("xdg-open", Vec::new())
    }
}

pub fn open_in_browser(url: &str) -> Result<(), WikiError> {
    let (program, args) = opener();
    Command::new(program)
        .args(args)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| WikiError::Browser(program.to_string(), err))?;
    Ok(())
}
