use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};

const NEWS_API_URL: &str = "https://newsapi.org/v2/everything";
const KEYWORDS: &str = "tech OR gadget OR smartphone OR AI OR startup OR geopolitics";
const SOURCES: &str = "the-times-of-india,the-hindu,google-news-in";

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    title: Option<String>,
    url: Option<String>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Headline {
    pub title: String,
    pub url: String,
    pub image_url: String,
}

pub struct NewsClient {
    client: Client,
    api_key: String,
}

impl NewsClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self { client, api_key }
    }

    /// Fetch yesterday-or-newer headlines and pick one at random.
    /// Candidates missing a title, url, or image are skipped.
    pub async fn pick_recent_headline(&self) -> Result<Headline> {
        let since = (Utc::now() - chrono::Duration::days(1))
            .format("%Y-%m-%d")
            .to_string();

        let response = self
            .client
            .get(NEWS_API_URL)
            .query(&[
                ("q", KEYWORDS),
                ("sources", SOURCES),
                ("language", "en"),
                ("from", since.as_str()),
                ("sortBy", "relevancy"),
                ("pageSize", "50"),
            ])
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AppError::NewsApi(format!("API error: {}", error_text)));
        }

        let everything: EverythingResponse = response.json().await?;
        let mut candidates = complete_headlines(everything.articles);
        if candidates.is_empty() {
            return Err(AppError::NewsApi(
                "no recent articles with title, url, and image".to_string(),
            ));
        }

        let pick = rand::thread_rng().gen_range(0..candidates.len());
        Ok(candidates.swap_remove(pick))
    }
}

fn complete_headlines(articles: Vec<RawArticle>) -> Vec<Headline> {
    articles
        .into_iter()
        .filter_map(|article| {
            let url = article.url?;
            url::Url::parse(&url).ok()?;
            Some(Headline {
                title: article.title?,
                url,
                image_url: article.url_to_image?,
            })
        })
        .collect()
}
