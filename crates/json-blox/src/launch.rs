//! Query-string contract of a launch URL: `?share=<id>&tab=<0|1|2>`.

use std::fmt;

use url::Url;

/// Top-level views, numbered as they appear in the `tab` parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewTab {
    #[default]
    Blocks = 0,
    Editor = 1,
    Diff = 2,
}

impl ViewTab {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(ViewTab::Blocks),
            1 => Some(ViewTab::Editor),
            2 => Some(ViewTab::Diff),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ViewTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewTab::Blocks => "blocks",
            ViewTab::Editor => "editor",
            ViewTab::Diff => "diff",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchParams {
    pub share: Option<String>,
    pub tab: Option<ViewTab>,
}

impl LaunchParams {
    pub fn from_url(raw: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(raw)?;
        let pairs = url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned()));
        Ok(Self::from_pairs(pairs))
    }

    /// Accepts the query part with or without its leading `?`.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()));
        Self::from_pairs(pairs)
    }

    fn from_pairs(pairs: impl Iterator<Item = (String, String)>) -> Self {
        let mut params = LaunchParams::default();
        for (key, value) in pairs {
            match key.as_str() {
                "share" if !value.is_empty() => params.share = Some(value),
                "tab" => {
                    if let Some(tab) = value.parse::<u8>().ok().and_then(ViewTab::from_index) {
                        params.tab = Some(tab);
                    }
                }
                _ => {}
            }
        }
        params
    }
}

/// Link that reopens share `id` on `tab`.
pub fn share_url(origin: &str, id: &str, tab: ViewTab) -> Result<String, url::ParseError> {
    let mut url = Url::parse(origin)?;
    url.query_pairs_mut()
        .clear()
        .append_pair("share", id)
        .append_pair("tab", &tab.index().to_string());
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_share_and_tab() {
        let params = LaunchParams::from_url("https://blox.example/?share=abc123&tab=2").unwrap();
        assert_eq!(params.share.as_deref(), Some("abc123"));
        assert_eq!(params.tab, Some(ViewTab::Diff));
    }

    #[test]
    fn bad_tab_is_ignored() {
        assert_eq!(LaunchParams::from_query("?tab=7").tab, None);
        assert_eq!(LaunchParams::from_query("tab=-1").tab, None);
        assert_eq!(LaunchParams::from_query("tab=editor").tab, None);
        assert_eq!(LaunchParams::from_query("tab=1").tab, Some(ViewTab::Editor));
    }

    #[test]
    fn empty_query() {
        assert_eq!(LaunchParams::from_query(""), LaunchParams::default());
        assert_eq!(LaunchParams::from_query("share=").share, None);
    }

    #[test]
    fn builds_share_link() {
        let link = share_url("https://blox.example", "beef", ViewTab::Editor).unwrap();
        assert_eq!(link, "https://blox.example/?share=beef&tab=1");
        let back = LaunchParams::from_url(&link).unwrap();
        assert_eq!(back.share.as_deref(), Some("beef"));
        assert_eq!(back.tab, Some(ViewTab::Editor));
    }

    #[test]
    fn rejects_relative_origin() {
        assert!(share_url("not a url", "beef", ViewTab::Blocks).is_err());
    }
}
