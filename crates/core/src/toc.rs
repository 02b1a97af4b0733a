use serde::{Deserialize, Serialize};

/// One entry of a document's embedded outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Outline depth, 1 for top-level entries.
    pub level: usize,
    pub title: String,
    /// 1-based target page, when the outline entry resolves to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
}

/// Outline titles used to corroborate heading candidates.
///
/// Membership is a plain substring test: a heading number is "in the TOC"
/// when any title contains it. This is loose (`"1.1"` is found inside
/// `"11.1 Scope"`), which is accepted in exchange for tolerating outline
/// titles that carry extra decoration around the number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TocHint {
    titles: Vec<String>,
}

impl TocHint {
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_entries(entries: &[TocEntry]) -> Self {
        Self::from_titles(entries.iter().map(|e| e.title.clone()))
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// Whether some outline title contains `number` verbatim.
    pub fn mentions(&self, number: &str) -> bool {
        self.titles.iter().any(|title| title.contains(number))
    }
}
