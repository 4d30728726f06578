pub const SCHEMA: &str = r#"
-- articles table
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    headline TEXT NOT NULL,
    commentary TEXT NOT NULL,
    article_url TEXT,
    image_url TEXT,
    timestamp TEXT NOT NULL DEFAULT (datetime('now')),
    slug TEXT UNIQUE,
    meta_description TEXT,
    image_alt_text TEXT
);

CREATE INDEX IF NOT EXISTS idx_articles_timestamp ON articles(timestamp DESC, id DESC);
"#;
