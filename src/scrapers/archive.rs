//! Baseball Prospectus print-page scraper.
//!
//! The archive serves a print-formatted variant of each article whose header
//! looks like:
//!
//! ```html
//! <div class="article">
//!   <div class="tools">...</div>
//!   <p class="date">August 25, 2010</p>
//!   <h1 class="title">Manufactured Runs</h1>
//!   <h2 class="subtitle">Support Group</h2>
//!   <p class="author">by <a class="author" href="/author/colin_wyers/">Colin Wyers</a></p>
//!   <table width="700" class="freeweek">...</table>
//!   <p>...</p>
//! </div>
//! ```
//!
//! Regions are matched on the exact `class` attribute value.

use super::{DocumentSource, FetchError};
use crate::config::SelectorScope;
use crate::models::{ArticleId, ArticleMetadata};
use crate::utils::{clean, CLEAN_SUBSTITUTIONS, DECODED_SUBSTITUTIONS};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

fn region(class: &str) -> Selector {
    Selector::parse(&format!("[class=\"{class}\"]")).unwrap()
}

static ARTICLE: Lazy<Selector> = Lazy::new(|| region("article"));
static TOOLS: Lazy<Selector> = Lazy::new(|| region("tools"));
static SUBTITLE: Lazy<Selector> = Lazy::new(|| region("subtitle"));
static FREEWEEK: Lazy<Selector> = Lazy::new(|| region("freeweek"));
static DATE: Lazy<Selector> = Lazy::new(|| region("date"));
static TITLE: Lazy<Selector> = Lazy::new(|| region("title"));
static AUTHOR: Lazy<Selector> = Lazy::new(|| region("author"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Fetches print pages over HTTP.
#[derive(Debug, Clone)]
pub struct PrintArchive {
    client: reqwest::Client,
    url_template: String,
}

impl PrintArchive {
    /// Create a source from a URL template containing `{id}`.
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url_template: url_template.into(),
        }
    }

    /// The print-page URL for `id`.
    pub fn article_url(&self, id: ArticleId) -> Result<Url, FetchError> {
        Ok(Url::parse(&self.url_template.replace("{id}", &id.to_string()))?)
    }
}

impl DocumentSource for PrintArchive {
    #[instrument(level = "info", skip_all, fields(%id))]
    async fn fetch(&self, id: ArticleId) -> Result<String, FetchError> {
        let url = self.article_url(id)?;
        let body = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        info!(bytes = body.len(), %url, "Fetched print page");
        Ok(body)
    }
}

/// Header fields and body text pulled from one print page.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Extraction {
    pub metadata: ArticleMetadata,
    /// Cleaned paragraph text, `None` when the article region was not found.
    pub body: Option<String>,
}

/// Extract metadata and body text from a raw print page.
///
/// Requires exactly one article region; otherwise nothing is extracted. The
/// tools, subtitle and free-preview regions are detached, then the first date,
/// title and author regions are read and detached in turn. Whatever paragraphs
/// remain under the article region form the body.
///
/// Header fields keep the parser's decoded text and are not cleaned; only the
/// body goes through the substitution tables.
///
/// With [`SelectorScope::Document`] every region lookup runs from the document
/// root, so a matching region outside the article can win and gets detached.
#[instrument(level = "debug", skip(raw), fields(bytes = raw.len()))]
pub fn extract(raw: &str, scope: SelectorScope) -> Extraction {
    let mut document = Html::parse_document(raw);

    let articles: Vec<_> = document
        .root_element()
        .select(&ARTICLE)
        .map(|el| el.id())
        .collect();
    if articles.len() != 1 {
        warn!(count = articles.len(), "Unexpected article region count");
        return Extraction::default();
    }
    let article = articles[0];

    let select_ids = |document: &Html, selector: &Selector| -> Vec<_> {
        match scope {
            // Walk from the root element; `Html::select` also visits detached nodes.
            SelectorScope::Document => document
                .root_element()
                .select(selector)
                .map(|el| el.id())
                .collect(),
            SelectorScope::Article => document
                .tree
                .get(article)
                .and_then(ElementRef::wrap)
                .map(|root| root.select(selector).map(|el| el.id()).collect())
                .unwrap_or_default(),
        }
    };

    for selector in [&*TOOLS, &*SUBTITLE, &*FREEWEEK] {
        for id in select_ids(&document, selector) {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }

    let take_first = |document: &mut Html, selector: &Selector, region: &str| -> Option<String> {
        let Some(id) = select_ids(&*document, selector).into_iter().next() else {
            warn!(region, count = 0, "Unexpected region count");
            return None;
        };
        let text = document
            .tree
            .get(id)
            .and_then(ElementRef::wrap)
            .map(|el| el.text().collect::<String>())?;
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
        Some(text)
    };

    let date = take_first(&mut document, &*DATE, "date").map(|date| date.replace(',', ""));
    let title = take_first(&mut document, &*TITLE, "title");
    let author = take_first(&mut document, &*AUTHOR, "author").map(|author| match author.strip_prefix("by ") {
        Some(name) => name.to_string(),
        None => author,
    });

    let body = document
        .tree
        .get(article)
        .and_then(ElementRef::wrap)
        .map(|root| {
            let joined: String = root
                .select(&PARAGRAPH)
                .map(|p| p.text().collect::<String>())
                .collect();
            // Entities arrive decoded; literal entity text left over is cleaned too.
            clean(&clean(&joined, DECODED_SUBSTITUTIONS), CLEAN_SUBSTITUTIONS)
        });

    debug!(
        has_date = date.is_some(),
        has_title = title.is_some(),
        has_author = author.is_some(),
        body_chars = body.as_deref().map(|b| b.chars().count()),
        "Extracted article"
    );

    Extraction {
        metadata: ArticleMetadata {
            date,
            title,
            author,
        },
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
<div class="article">
<div class="tools"><p>Print this article</p></div>
<p class="date">August 25, 2010</p>
<h1 class="title">Manufactured Runs</h1>
<h2 class="subtitle">Support Group</h2>
<p class="author">by <a class="author" href="/author/colin_wyers/">Colin Wyers</a></p>
<table width="700" class="freeweek"><tr><td><p>Archives are free this week</p></td></tr></table>
<p>First paragraph.</p>
<p>Second &amp; last.</p>
</div>
</body></html>"#;

    #[test]
    fn test_extracts_header_fields() {
        let extraction = extract(PAGE, SelectorScope::Document);
        assert_eq!(extraction.metadata.date.as_deref(), Some("August 25 2010"));
        assert_eq!(extraction.metadata.title.as_deref(), Some("Manufactured Runs"));
        assert_eq!(extraction.metadata.author.as_deref(), Some("Colin Wyers"));
    }

    #[test]
    fn test_body_excludes_removed_regions() {
        let extraction = extract(PAGE, SelectorScope::Document);
        assert_eq!(
            extraction.body.as_deref(),
            Some("First paragraph.Second & last.")
        );
    }

    #[test]
    fn test_body_is_cleaned() {
        let page = r#"<div class="article"><p>Bob&rsquo;s hit&mdash;a home run&hellip;&nbsp;2&frac12;</p><p>&ldquo;Yes&rdquo;</p></div>"#;
        let extraction = extract(page, SelectorScope::Document);
        assert_eq!(
            extraction.body.as_deref(),
            Some("Bob's hit, a home run... 2.5\"Yes\"")
        );
    }

    #[test]
    fn test_literal_entity_text_in_body_is_cleaned() {
        let page = r#"<div class="article"><p>Bob&amp;rsquo;s hit&amp;mdash;a home run</p></div>"#;
        let extraction = extract(page, SelectorScope::Document);
        assert_eq!(extraction.body.as_deref(), Some("Bob's hit, a home run"));
    }

    #[test]
    fn test_header_fields_are_decoded_not_cleaned() {
        let page = r#"<div class="article">
<p class="date">July 4, 2010</p>
<h1 class="title">Runs &amp; Hits&mdash;Part&nbsp;2</h1>
<p class="author">by Jos&eacute; O&rsquo;Neil</p>
<p>Body.</p>
</div>"#;
        let extraction = extract(page, SelectorScope::Document);
        assert_eq!(
            extraction.metadata.title.as_deref(),
            Some("Runs & Hits\u{2014}Part\u{A0}2")
        );
        assert_eq!(extraction.metadata.author.as_deref(), Some("Jos\u{E9} O\u{2019}Neil"));
        assert_eq!(extraction.body.as_deref(), Some("Body."));
    }

    #[test]
    fn test_missing_or_duplicate_article_region() {
        let none = extract("<html><body><p>nothing</p></body></html>", SelectorScope::Document);
        assert_eq!(none, Extraction::default());
        assert!(none.metadata.is_empty());

        let two = r#"<div class="article"><p class="date">May 1, 2010</p></div>
<div class="article"><p>x</p></div>"#;
        assert_eq!(extract(two, SelectorScope::Document), Extraction::default());
    }

    #[test]
    fn test_class_match_is_exact() {
        let page = r#"<div class="article wide"><p>x</p></div>"#;
        assert_eq!(extract(page, SelectorScope::Document), Extraction::default());
    }

    #[test]
    fn test_missing_regions_are_skipped() {
        let page = r#"<div class="article"><h1 class="title">Only a Title</h1><p>Body.</p></div>"#;
        let extraction = extract(page, SelectorScope::Document);
        assert_eq!(extraction.metadata.date, None);
        assert_eq!(extraction.metadata.title.as_deref(), Some("Only a Title"));
        assert_eq!(extraction.metadata.author, None);
        assert_eq!(extraction.body.as_deref(), Some("Body."));
    }

    #[test]
    fn test_author_without_prefix_is_verbatim() {
        let page = r#"<div class="article"><p class="author">Staff</p></div>"#;
        let extraction = extract(page, SelectorScope::Document);
        assert_eq!(extraction.metadata.author.as_deref(), Some("Staff"));
        assert_eq!(extraction.body.as_deref(), Some(""));
    }

    #[test]
    fn test_document_scope_prefers_first_match_anywhere() {
        let page = r#"<div class="sidebar"><p class="date">Sidebar, 2009</p></div>
<div class="article"><p class="date">June 2, 2010</p><p>Body.</p></div>"#;

        let document_scope = extract(page, SelectorScope::Document);
        assert_eq!(document_scope.metadata.date.as_deref(), Some("Sidebar 2009"));
        assert_eq!(document_scope.body.as_deref(), Some("June 2, 2010Body."));

        let article_scope = extract(page, SelectorScope::Article);
        assert_eq!(article_scope.metadata.date.as_deref(), Some("June 2 2010"));
        assert_eq!(article_scope.body.as_deref(), Some("Body."));
    }

    #[test]
    fn test_article_url_from_template() {
        let archive = PrintArchive::new("http://example.com/article.php?articleid={id}&mode=print");
        assert_eq!(
            archive.article_url(ArticleId(11839)).unwrap().as_str(),
            "http://example.com/article.php?articleid=11839&mode=print"
        );
    }

    #[test]
    fn test_article_url_rejects_garbage() {
        let archive = PrintArchive::new("not a url {id}");
        assert!(matches!(
            archive.article_url(ArticleId(1)),
            Err(FetchError::Url(_))
        ));
    }
}
