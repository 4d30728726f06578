//! Minimal string-built HTML. Deliberately small: the site is a list page,
//! a detail page, and a sitemap.

use crate::models::{Article, ArticleNavigation};

const DATE_FORMAT: &str = "%B %d, %Y";

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn page(title: &str, meta_description: Option<&str>, body: &str) -> String {
    let meta = meta_description
        .map(|d| format!("<meta name=\"description\" content=\"{}\">\n", escape(d)))
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         {meta}<title>{}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape(title)
    )
}

fn article_image(article: &Article) -> String {
    match &article.image_url {
        Some(url) => {
            let alt = article.image_alt_text.as_deref().unwrap_or(&article.headline);
            format!(
                "<img src=\"{}\" alt=\"{}\">\n",
                escape(url),
                escape(alt)
            )
        }
        None => String::new(),
    }
}

fn commentary_html(article: &Article) -> String {
    let paragraphs = article.commentary_paragraphs();
    if paragraphs.is_empty() {
        return "<p>(No commentary available)</p>\n".to_string();
    }
    paragraphs
        .iter()
        .map(|p| format!("<p>{}</p>\n", escape(p)))
        .collect()
}

pub fn render_index(articles: &[Article]) -> String {
    let mut body = String::from("<h1>Newsstand</h1>\n");
    if articles.is_empty() {
        body.push_str("<p>No articles yet. Check back soon.</p>\n");
    }
    for article in articles {
        body.push_str(&format!(
            "<article>\n<h2><a href=\"/article/{}\">{}</a></h2>\n<time>{}</time>\n",
            article.id,
            escape(&article.headline),
            article.timestamp.format(DATE_FORMAT)
        ));
        body.push_str(&article_image(article));
        body.push_str(&commentary_html(article));
        if let Some(url) = &article.article_url {
            body.push_str(&format!(
                "<p><a href=\"{}\" rel=\"noopener\">Read the original story</a></p>\n",
                escape(url)
            ));
        }
        body.push_str("</article>\n");
    }
    page("Newsstand", None, &body)
}

pub fn render_article(navigation: &ArticleNavigation) -> String {
    let article = &navigation.current;
    let mut body = format!(
        "<article>\n<h1>{}</h1>\n<time>{}</time>\n",
        escape(&article.headline),
        article.timestamp.format(DATE_FORMAT)
    );
    body.push_str(&article_image(article));
    body.push_str(&commentary_html(article));
    if let Some(url) = &article.article_url {
        body.push_str(&format!(
            "<p><a href=\"{}\" rel=\"noopener\">Read the original story</a></p>\n",
            escape(url)
        ));
    }
    body.push_str("</article>\n<nav>\n");
    if let Some(previous) = &navigation.previous {
        body.push_str(&format!(
            "<a href=\"/article/{}\">&larr; {}</a>\n",
            previous.id,
            escape(&previous.headline)
        ));
    }
    if let Some(next) = &navigation.next {
        body.push_str(&format!(
            "<a href=\"/article/{}\">{} &rarr;</a>\n",
            next.id,
            escape(&next.headline)
        ));
    }
    body.push_str("<a href=\"/\">All articles</a>\n</nav>\n");
    page(
        &article.headline,
        article.meta_description.as_deref(),
        &body,
    )
}

pub fn render_sitemap(articles: &[Article], site_url: &str) -> String {
    let site_url = site_url.trim_end_matches('/');
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    xml.push_str(&format!("<url><loc>{}/</loc></url>\n", escape(site_url)));
    for article in articles {
        xml.push_str(&format!(
            "<url><loc>{}/article/{}</loc><lastmod>{}</lastmod></url>\n",
            escape(site_url),
            article.id,
            article.timestamp.format("%Y-%m-%d")
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}
