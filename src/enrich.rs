//! Side-tool: batch-enrich a CSV of seed products with AI-written listing
//! copy. Runs from the `--enrich` flag, independent of the web server.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_MODEL: &str = "gemini-pro-latest";

/// Pause between calls to stay inside the free-tier rate limit.
const PAUSE_BETWEEN_CALLS: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub product_name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub amazon_url: String,
}

#[derive(Debug, Serialize)]
pub struct EnrichedProduct {
    pub slug: String,
    pub title: String,
    pub price: String,
    pub image_url: String,
    pub affiliate_link: String,
    pub category: String,
    pub keywords: String,
    pub pros: String,
    pub cons: String,
    pub description: String,
}

/// The strict-JSON package the model is asked to produce.
#[derive(Debug, Deserialize)]
struct ProductCopy {
    slug: String,
    title: String,
    description: String,
    #[serde(default)]
    pros: Vec<String>,
    #[serde(default)]
    cons: Vec<String>,
    keywords: String,
    category: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

pub struct ProductEnricher {
    client: Client,
    api_key: String,
}

impl ProductEnricher {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");
        Self { client, api_key }
    }

    /// Read seed rows, enrich each, write the output CSV. A row that fails
    /// is logged and skipped; the run carries on. Returns the number of
    /// rows written. Nothing is written when every row fails.
    pub async fn run(&self, input: &Path, output: &Path) -> Result<usize> {
        let mut reader = csv::Reader::from_path(input)?;
        let seeds = reader
            .deserialize()
            .collect::<std::result::Result<Vec<SeedProduct>, _>>()?;
        tracing::info!(
            "Found {} products to process in {}",
            seeds.len(),
            input.display()
        );

        let total = seeds.len();
        let mut enriched = Vec::new();
        for (index, seed) in seeds.into_iter().enumerate() {
            if seed.product_name.is_empty() {
                continue;
            }
            tracing::info!("Processing '{}'", seed.product_name);
            match self.enrich_one(&seed).await {
                Ok(product) => enriched.push(product),
                Err(e) => {
                    tracing::error!("Failed to enrich '{}': {}", seed.product_name, e)
                }
            }
            if index + 1 < total {
                tokio::time::sleep(PAUSE_BETWEEN_CALLS).await;
            }
        }

        if enriched.is_empty() {
            tracing::warn!("No products were successfully enriched");
            return Ok(0);
        }

        let mut writer = csv::Writer::from_path(output)?;
        for product in &enriched {
            writer.serialize(product)?;
        }
        writer.flush()?;
        tracing::info!(
            "Wrote {} enriched products to {}",
            enriched.len(),
            output.display()
        );
        Ok(enriched.len())
    }

    async fn enrich_one(&self, seed: &SeedProduct) -> Result<EnrichedProduct> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(&seed.product_name),
                }],
            }],
        };

        let response = self
            .client
            .post(format!(
                "{}/{}:generateContent",
                GEMINI_API_URL, GEMINI_MODEL
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AppError::GeminiApi(format!("API error: {}", error_text)));
        }

        let generated: GenerateResponse = response.json().await?;
        let text = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| AppError::GeminiApi("no candidates returned".to_string()))?;

        let copy: ProductCopy = serde_json::from_str(strip_code_fences(&text))?;
        Ok(assemble(seed, copy))
    }
}

fn build_prompt(product_name: &str) -> String {
    format!(
        r#"You are an expert affiliate marketer and SEO content writer for an Indian e-commerce audience.
Your task is to generate a complete data package for the product: "{product_name}".

Your entire response MUST be a single, valid JSON object with no other text.
The JSON object must have these exact keys:
- "slug": A lowercase, hyphen-separated URL slug (e.g., 'amazon-echo-dot-4th-gen').
- "title": A catchy, SEO-friendly title. It can be the same as the product name or slightly improved.
- "description": A 2-paragraph, engaging summary highlighting key benefits.
- "pros": A JSON array of 3-4 strings, each being a key benefit.
- "cons": A JSON array of 2-3 strings, each being a potential drawback.
- "keywords": A comma-separated string of 5-7 relevant SEO keywords.
- "category": Classify the product into ONE of the following categories: "Tech", "Kitchen", "Home Appliances", or "Other".

Now, generate the JSON for: "{product_name}""#
    )
}

/// Models wrap their JSON in markdown fences often enough to plan for it.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}

fn assemble(seed: &SeedProduct, copy: ProductCopy) -> EnrichedProduct {
    EnrichedProduct {
        slug: copy.slug,
        title: copy.title,
        price: seed.price.clone(),
        image_url: seed.image_url.clone(),
        affiliate_link: seed.amazon_url.clone(),
        category: copy.category,
        keywords: copy.keywords,
        pros: copy.pros.join("; "),
        cons: copy.cons.join("; "),
        description: copy.description,
    }
}
