use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub headline: String,
    pub commentary: String,
    pub article_url: Option<String>,
    pub image_url: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub slug: Option<String>,
    pub meta_description: Option<String>,
    pub image_alt_text: Option<String>,
}

impl Article {
    /// Commentary paragraphs, split on embedded line breaks.
    pub fn commentary_paragraphs(&self) -> Vec<&str> {
        self.commentary
            .split('\n')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }
}

/// Insert payload. `id` is always store-assigned; `timestamp` is assigned
/// at insertion time when not supplied. Supplying an out-of-order timestamp
/// breaks prev/next navigation, so callers should leave it unset.
#[derive(Debug, Clone, Default)]
pub struct NewArticle {
    pub headline: String,
    pub commentary: String,
    pub article_url: Option<String>,
    pub image_url: Option<String>,
    pub slug: Option<String>,
    pub meta_description: Option<String>,
    pub image_alt_text: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// An article together with its neighbors in the canonical
/// most-recent-first ordering.
#[derive(Debug, Clone)]
pub struct ArticleNavigation {
    pub current: Article,
    /// The newer adjacent article (smallest id greater than current's).
    pub previous: Option<Article>,
    /// The older adjacent article (largest id smaller than current's).
    pub next: Option<Article>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_with_commentary(commentary: &str) -> Article {
        Article {
            id: 1,
            headline: "Headline".to_string(),
            commentary: commentary.to_string(),
            article_url: None,
            image_url: None,
            timestamp: Utc::now(),
            slug: None,
            meta_description: None,
            image_alt_text: None,
        }
    }

    #[test]
    fn commentary_splits_into_paragraphs() {
        let article = article_with_commentary("First paragraph.\n\nSecond paragraph.");
        assert_eq!(
            article.commentary_paragraphs(),
            vec!["First paragraph.", "Second paragraph."]
        );
    }

    #[test]
    fn single_paragraph_commentary() {
        let article = article_with_commentary("Just the one.");
        assert_eq!(article.commentary_paragraphs(), vec!["Just the one."]);
    }
}
