mod article;

pub use article::{Article, ArticleNavigation, NewArticle};
