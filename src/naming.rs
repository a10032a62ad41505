//! 自动递增文档命名：扫描通用 JSON 目录中的数字文件名。

use std::io::{self, ErrorKind};
use std::path::Path;
use tokio::fs;

use crate::config::AutoNameStyle;

#[derive(Clone, Copy, Debug)]
pub struct NamingConfig {
    pub style: AutoNameStyle,
    pub width: usize,
}

impl NamingConfig {
    /// Formats the index that follows `largest` (index 0 when nothing is numbered yet).
    pub fn next_name(&self, largest: Option<u64>) -> String {
        let next = largest.map_or(0, |value| value.saturating_add(1));
        match self.style {
            AutoNameStyle::Padded => format!("{next:0width$}", width = self.width),
            AutoNameStyle::Legacy => format!("0{next}"),
        }
    }
}

/// Largest integer among `*.json` basenames in `dir`. A missing directory
/// counts as empty; any other read failure is returned.
pub async fn largest_numbered(dir: &Path) -> io::Result<Option<u64>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };

    let mut largest = None;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Some(number) = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(parse_index)
        else {
            continue;
        };
        largest = largest.max(Some(number));
    }
    Ok(largest)
}

fn parse_index(stem: &str) -> Option<u64> {
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}
