use std::time::Duration;

use async_trait::async_trait;
use novelscout_extension::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://www.uaa001.com";

const HEADERS: &[(&str, &str)] = &[
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    ),
    ("Accept", "application/json, text/plain, */*"),
    ("Accept-Language", "zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7"),
];

const SEARCH_TIMEOUT: Duration = Duration::from_secs(20);
const DETAILS_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REVIEWS: usize = 5;

static AUTHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"作者：\s*<a[^>]*>(.*?)</a>").unwrap());
static SCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"评分：<span>(.*?)</span>").unwrap());
static INTRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="txt ellipsis">小说简介：(.*?)(?:</div>|<div class="arrow")"#)
        .unwrap()
});
static CATEGORY_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<div class="item">\s*题材：\s*(.*?)</div>"#).unwrap());
static ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<a[^>]*>(.*?)</a>").unwrap());
static LATEST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<div class="item">\s*最新：(.*?)\s*</div>"#).unwrap());
static UPDATED: Lazy<Regex> = Lazy::new(|| Regex::new(r"最后更新：\s*(.*?)\s*</div>").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UaaConfig {
    pub base_url: String,
}

impl Default for UaaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    result: Option<String>,
    msg: Option<String>,
    model: Option<SearchModel>,
}

#[derive(Debug, Deserialize)]
struct SearchModel {
    #[serde(default)]
    data: Vec<Value>,
    #[serde(rename = "totalPage")]
    total_page: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CommentsEnvelope {
    result: Option<String>,
    #[serde(default)]
    data: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Comment {
    nick_name: Option<String>,
    content: Option<String>,
    score: Option<Value>,
    create_time_format: Option<String>,
}

impl Comment {
    fn into_review(self) -> Option<Review> {
        let rating = match &self.score {
            Some(Value::Object(score)) => json_text(score.get("source")),
            Some(Value::Number(score)) => score.as_f64().map(|score| format!("{score:.1}")),
            _ => None,
        };

        Some(Review {
            content: self.content.as_deref().and_then(present)?,
            author: self.nick_name.as_deref().and_then(present),
            rating: rating.as_deref().and_then(present_count),
            time: self.create_time_format.as_deref().and_then(present),
        })
    }
}

/// The "hs" search domain.
pub struct UaaSource {
    client: Client,
    base_url: String,
}

impl UaaSource {
    pub fn new(client: Client, config: &UaaConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Reviews come from a separate API that is often unavailable without a
    /// login. Any failure there leaves the book without reviews.
    async fn reviews(&self, id: &str) -> Vec<Review> {
        let response = Request::get(self.url("/api/novel/app/novel/comments"))
            .param("novelId", id)
            .param("sortType", 1)
            .param("page", 1)
            .param("rows", MAX_REVIEWS)
            .headers(HEADERS)
            .timeout(DETAILS_TIMEOUT)
            .json::<CommentsEnvelope>(&self.client)
            .await;

        match response {
            Ok(envelope) if envelope.result.as_deref() == Some("success") => envelope
                .data
                .into_iter()
                .filter_map(Comment::into_review)
                .take(MAX_REVIEWS)
                .collect(),
            Ok(_) => {
                tracing::warn!("Comments for book {id} were rejected by the API");
                Vec::new()
            }
            Err(err) => {
                tracing::warn!("Failed to fetch comments for book {id}: {err}");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl Source for UaaSource {
    fn search_type(&self) -> SearchType {
        SearchType::Uaa
    }

    async fn search(&self, query: &str, page: u32) -> Result<SearchResult> {
        let envelope: SearchEnvelope = Request::get(self.url("/api/novel/app/novel/search"))
            .param("keyword", query)
            .param("page", page)
            .param("searchType", 1)
            .param("size", PAGE_SIZE)
            .param("orderType", 0)
            .headers(HEADERS)
            .timeout(SEARCH_TIMEOUT)
            .json(&self.client)
            .await?;

        let model = match (envelope.result.as_deref(), envelope.model) {
            (Some("success"), Some(model)) => model,
            _ => {
                return Err(SourceError::Upstream(
                    envelope.msg.unwrap_or_else(|| "search failed".to_string()),
                ));
            }
        };

        let books = model.data.iter().filter_map(parse_hit).collect::<Vec<_>>();
        let total_pages = if books.is_empty() && page <= 1 {
            0
        } else {
            json_u32(model.total_page.as_ref()).unwrap_or(1)
        };

        tracing::info!(
            "UAA search '{query}' page {page}: {} books, {total_pages} pages",
            books.len()
        );
        Ok(SearchResult::new(books, total_pages, page))
    }

    async fn get_book_details(&self, id: &str) -> Result<Book> {
        let text = Request::get(self.url("/novel/intro"))
            .param("id", id)
            .headers(HEADERS)
            .timeout(DETAILS_TIMEOUT)
            .send(&self.client)
            .await?
            .error_for_status()?
            .text();

        let mut book = parse_details(id, &text)?;
        book.reviews = self.reviews(id).await;
        Ok(book)
    }
}

fn parse_hit(value: &Value) -> Option<Book> {
    let id = json_text(value.get("id")).as_deref().and_then(non_blank)?;
    let title = json_text(value.get("title")).as_deref().and_then(non_blank)?;

    let mut book = Book::new(id, title);
    book.author = json_text(value.get("authors")).as_deref().and_then(present);
    book.score = json_text(value.get("score")).as_deref().and_then(present_count);
    Some(book)
}

fn parse_details(id: &str, text: &str) -> Result<Book> {
    let doc = Html::new(text);

    let title = doc
        .select_first_opt("h1")?
        .and_then(|h1| h1.text_opt())
        .ok_or(SourceError::MissingIdentity)?;
    let mut book = Book::new(id, title);

    book.author = capture(&AUTHOR, text).and_then(|author| clean_fragment(&author));
    book.status = doc
        .select_first_opt("span.update_state")?
        .and_then(|span| span.text_opt())
        .and_then(|status| present(status.trim_start_matches("状态：")));
    book.score = capture(&SCORE, text).as_deref().and_then(present_count);
    book.synopsis = capture(&INTRO, text).as_deref().and_then(present);
    book.last_chapter = capture(&LATEST, text).and_then(|chapter| clean_fragment(&chapter));
    book.update_time = capture(&UPDATED, text).as_deref().and_then(present);

    book.tags = present_tags(
        doc.select(r#"li a[href^="/novel/list?tag="]"#)?
            .into_iter()
            .map(|a| a.text_or_empty().trim_start_matches('#').to_string()),
    );

    book.categories = capture(&CATEGORY_BLOCK, text)
        .map(|block| {
            capture_all(&ANCHOR, &block)
                .into_iter()
                .filter_map(|groups| groups.first().and_then(|category| clean_fragment(category)))
                .collect()
        })
        .unwrap_or_default();
    book.category = book.categories.first().cloned();

    for item in doc.select("div.props_box ul li")? {
        let Some(icon) = item.select_first_opt("img")?.and_then(|img| img.attr_opt("src")) else {
            continue;
        };
        let value = item.text_opt().as_deref().and_then(present);
        match icon.as_str() {
            "/image/rou.svg" => book.meat_ratio = value,
            "/image/word_count.svg" => book.word_count = value.map(WordCount::Formatted),
            "/image/collect.svg" => book.popularity = value.map(|n| format!("{n}人收藏")),
            _ => {}
        }
    }

    Ok(book)
}
