//! Keyword search over flattened rows.

use serde_json::Value;

use crate::flatten::{row_index_of, Row};
use crate::path::NodePath;

/// Renders a value the way the row text is matched: strings verbatim,
/// numbers in shortest form, arrays comma-joined, objects as
/// `[object Object]`.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => number_text(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Shortest round-trip digits laid out like JavaScript's `Number#toString`:
/// plain decimals for exponents in `-7..21`, otherwise `d.ddde+x`.
fn number_text(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    let sci = format!("{:e}", f.abs());
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return f.to_string();
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return f.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exp + 1;
    let body = if k <= n && n <= 21 {
        digits + &"0".repeat((n - k) as usize)
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat(-n as usize))
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        let (head, tail) = digits.split_at(1);
        if tail.is_empty() {
            format!("{head}e{sign}{}", exp.abs())
        } else {
            format!("{head}.{tail}e{sign}{}", exp.abs())
        }
    };
    if f < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}

/// Lowercased `key + value` text a row is matched against.
pub fn row_text(row: &Row<'_>) -> String {
    format!("{}{}", row.label(), display_text(row.value())).to_lowercase()
}

/// Paths of rows matching any keyword or the live text, in row order.
pub fn compute_matches(rows: &[Row<'_>], keywords: &[String], live_text: &str) -> Vec<NodePath> {
    let mut terms: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    if !live_text.is_empty() {
        terms.push(live_text.to_lowercase());
    }
    if terms.is_empty() {
        return Vec::new();
    }
    rows.iter()
        .filter(|row| {
            let text = row_text(row);
            terms.iter().any(|term| text.contains(term.as_str()))
        })
        .map(|row| row.path().clone())
        .collect()
}

/// Scroll offset that centres `row_index`, clamped to the scrollable range.
pub fn scroll_offset_for_match(
    row_index: usize,
    total_rows: usize,
    row_height: f64,
    viewport_height: f64,
) -> f64 {
    let target = row_index as f64 * row_height - viewport_height / 2.0 + row_height / 2.0;
    let max_scroll = (total_rows as f64 * row_height - viewport_height).max(0.0);
    target.max(0.0).min(max_scroll)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    keywords: Vec<String>,
    live_text: String,
    matches: Vec<NodePath>,
    current: usize,
}

impl SearchState {
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn live_text(&self) -> &str {
        &self.live_text
    }

    pub fn matches(&self) -> &[NodePath] {
        &self.matches
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_match(&self) -> Option<&NodePath> {
        self.matches.get(self.current)
    }

    pub fn is_current(&self, path: &NodePath) -> bool {
        self.current_match() == Some(path)
    }

    pub fn has_terms(&self) -> bool {
        !self.keywords.is_empty() || !self.live_text.is_empty()
    }

    pub fn set_live_text(&mut self, text: impl Into<String>) {
        self.live_text = text.into();
    }

    /// Turns the trimmed live text into a keyword chip. Returns false when
    /// there was nothing to commit.
    pub fn commit_live_text(&mut self) -> bool {
        let term = self.live_text.trim();
        if term.is_empty() {
            return false;
        }
        self.keywords.push(term.to_string());
        self.live_text.clear();
        true
    }

    pub fn remove_keyword(&mut self, keyword: &str) {
        self.keywords.retain(|k| k != keyword);
    }

    pub fn clear(&mut self) {
        self.keywords.clear();
        self.live_text.clear();
        self.matches.clear();
        self.current = 0;
    }

    /// Recomputes the match set. The pointer survives when it is still in
    /// range and resets to the first match otherwise.
    pub fn refresh(&mut self, rows: &[Row<'_>]) {
        self.matches = compute_matches(rows, &self.keywords, &self.live_text);
        if self.current >= self.matches.len() {
            self.current = 0;
        }
    }

    /// Advances to the next match, wrapping. `None` when nothing matches.
    pub fn next(&mut self) -> Option<&NodePath> {
        if self.matches.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.matches.len();
        self.matches.get(self.current)
    }

    pub fn previous(&mut self) -> Option<&NodePath> {
        if self.matches.is_empty() {
            return None;
        }
        let len = self.matches.len();
        self.current = (self.current + len - 1) % len;
        self.matches.get(self.current)
    }

    /// Scroll offset for the current match within `rows`.
    pub fn current_offset(
        &self,
        rows: &[Row<'_>],
        row_height: f64,
        viewport_height: f64,
    ) -> Option<f64> {
        let path = self.current_match()?;
        let index = row_index_of(rows, path)?;
        Some(scroll_offset_for_match(index, rows.len(), row_height, viewport_height))
    }
}
