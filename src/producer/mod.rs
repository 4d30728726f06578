mod commentary;
mod news;

pub use commentary::CommentaryClient;
pub use news::{Headline, NewsClient};

use crate::config::Config;
use crate::error::Result;
use crate::models::{Article, NewArticle};
use crate::store::ArticleStore;

/// The content producer: picks a fresh headline, asks the completion API
/// for commentary, and appends the result to the store.
pub struct Journalist {
    news: NewsClient,
    commentary: CommentaryClient,
}

impl Journalist {
    /// Requires both API keys; `None` when either is not configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let news = NewsClient::new(config.news_api_key.clone()?);
        let commentary = CommentaryClient::new(config.completion_api_key.clone()?);
        Some(Self { news, commentary })
    }

    /// One fetch/generate/append cycle.
    pub async fn produce(&self, store: &ArticleStore) -> Result<Article> {
        let headline = self.news.pick_recent_headline().await?;
        tracing::info!("Selected headline: {}", headline.title);

        let commentary = self.commentary.write_commentary(&headline.title).await?;
        tracing::info!("Generated commentary ({} chars)", commentary.len());

        let article = store
            .append(NewArticle {
                headline: headline.title,
                commentary,
                article_url: Some(headline.url),
                image_url: Some(headline.image_url),
                ..NewArticle::default()
            })
            .await?;
        tracing::info!("Stored article {}", article.id);
        Ok(article)
    }
}
