//! JSON search API and server-rendered detail pages of ypshuo.com.

use std::time::Duration;

use novelscout_extension::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::raw::{RawBook, RawListing, RawReview};

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
const MAX_REVIEWS: usize = 3;

static AUTHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"作者：<span class="text-red-500"[^>]*>(.*?)</span>"#).unwrap());
static WORD_COUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"字数：(.*?)万字").unwrap());
static STATUS: Lazy<Regex> = Lazy::new(|| Regex::new(r"状态：\s*(.*?)\s*<").unwrap());
static UPDATE_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"更新时间：\s*(.*?)\s*</div>").unwrap());
static REVIEW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?s)<div class="author-info"[^>]*>(.*?)</div>"#,
        r#".*?aria-valuenow="([^"]+)""#,
        r#".*?<span class="content-inner-details"[^>]*>(.*?)</span>"#,
    ))
    .unwrap()
});
static SYNOPSIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<div style="white-space:pre-wrap;"[^>]*>(.*?)</div>"#).unwrap());
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<a href="(http[^"]*)"[^>]*rel="nofollow""#).unwrap());

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    code: Option<String>,
    msg: Option<String>,
    data: Option<SearchPage>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    data: Vec<Value>,
    #[serde(rename = "pageAll")]
    page_all: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct Ypshuo {
    base_url: String,
}

impl Ypshuo {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn request(&self, url: String) -> Request {
        Request::get(url).headers(HEADERS)
    }

    pub(crate) async fn search(&self, client: &Client, keyword: &str, page: u32) -> Result<RawListing> {
        let envelope: SearchEnvelope =
            self.request(make_absolute_url("api/novel/search", &self.base_url))
                .param("keyword", keyword)
                .param("page", page)
                .timeout(SEARCH_TIMEOUT)
                .json(client)
                .await?;

        if envelope.code.as_deref() != Some("00") {
            return Err(SourceError::Upstream(
                envelope
                    .msg
                    .unwrap_or_else(|| format!("code {}", envelope.code.unwrap_or_default())),
            ));
        }

        let Some(data) = envelope.data else {
            return Err(SourceError::Upstream(
                "search response carries no data".to_string(),
            ));
        };

        tracing::debug!("Search '{keyword}' page {page} returned {} hits", data.data.len());

        Ok(RawListing {
            books: data.data.iter().map(parse_hit).collect(),
            total_pages: json_u32(data.page_all.as_ref()).unwrap_or(1),
        })
    }

    pub(crate) async fn details(&self, client: &Client, id: &str) -> Result<RawBook> {
        let url = make_absolute_url(&format!("/novel/{id}.html"), &self.base_url);
        let text = self
            .request(url)
            .timeout(DETAILS_TIMEOUT)
            .send(client)
            .await?
            .error_for_status()?
            .text();

        self.parse_details(&text)
    }

    pub(crate) fn parse_details(&self, text: &str) -> Result<RawBook> {
        let doc = Html::new(text);

        let image_url = doc
            .select_first_opt(r#"meta[name="og:image"]"#)?
            .and_then(|meta| meta.attr_opt("content"))
            .or(doc
                .select_first_opt("img.book-img")?
                .and_then(|img| img.attr_opt("src")))
            .map(|src| make_absolute_url(&src, &self.base_url));

        let tags = doc
            .select("div.tag-list span")?
            .into_iter()
            .filter_map(|span| span.text_opt())
            .collect();

        let mut score = None;
        let mut scorer = None;
        for item in doc.select("div.item")? {
            let Some(value) = item.select_first_opt("p.score")?.and_then(|p| p.text_opt()) else {
                continue;
            };
            let label = item
                .select_first_opt("p:not(.score)")?
                .map(|p| p.text_or_empty());
            match label.as_deref() {
                Some("评分") => score = Some(value),
                Some("评分人数") => scorer = Some(value),
                _ => {}
            }
        }

        let word_count = capture(&WORD_COUNT, text)
            .and_then(|count| count.replace(',', "").parse::<f64>().ok())
            .map(|count| count * 10_000.0);

        let reviews = capture_all(&REVIEW, text)
            .into_iter()
            .take(MAX_REVIEWS)
            .map(|groups| RawReview {
                author: groups.first().and_then(|author| clean_fragment(author)),
                rating: groups.get(1).cloned(),
                content: groups.get(2).and_then(|content| clean_fragment(content)),
            })
            .collect();

        Ok(RawBook {
            title: doc
                .select_first_opt("h1.book-name")?
                .and_then(|h1| h1.text_opt()),
            author: capture(&AUTHOR, text).and_then(|author| clean_fragment(&author)),
            score,
            scorer,
            status: capture(&STATUS, text),
            tags,
            word_count,
            update_time: capture(&UPDATE_TIME, text),
            synopsis: capture(&SYNOPSIS, text),
            link: capture(&LINK, text),
            image_url,
            reviews,
            ..Default::default()
        })
    }
}

fn parse_hit(value: &Value) -> RawBook {
    let first = |keys: &[&str]| keys.iter().find_map(|key| json_text(value.get(*key)));
    RawBook {
        id: first(&["id"]),
        title: first(&["novel_name", "title"]),
        author: first(&["author_name", "authors"]),
        score: first(&["score"]),
        scorer: first(&["scorer"]),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use novelscout_extension::testing::MockHttpExecutor;

    const BASE: &str = "https://www.ypshuo.com/";

    const DETAIL_PAGE: &str = r#"<html><head>
        <meta name="og:image" content="//img.ypshuo.com/cover/42.jpg">
        </head><body>
        <h1 class="book-name" data-v-1> 诡秘之主 </h1>
        <div>作者：<span class="text-red-500" data-v-2>爱潜水的乌贼</span></div>
        <div class="tag-list"><span>克苏鲁</span><span> </span><span>蒸汽朋克</span></div>
        <div>字数：446.5万字</div>
        <div class="item"><p class="score">9.1</p><p>评分</p></div>
        <div class="item"><p class="score">12034</p><p>评分人数</p></div>
        <div>状态： 已完结 <span></span></div>
        <div>更新时间： 2020-05-01 </div>
        <div style="white-space:pre-wrap;">蒸汽与机械的浪潮中<br>谁能触及非凡？</div>
        <a href="https://book.qidian.com/info/1010868264" target="_blank" rel="nofollow">起点</a>
        <div class="author-info"><b>读者甲</b></div><div aria-valuenow="5"></div>
        <span class="content-inner-details">神作......全文</span>
        <div class="author-info">读者乙</div><div aria-valuenow="0"></div>
        <span class="content-inner-details"> </span>
        </body></html>"#;

    #[tokio::test]
    async fn test_search_decodes_hits() {
        let body = r#"{"code":"00","data":{"pageAll":3,"data":[
            {"id":42,"novel_name":"诡秘之主","author_name":"爱潜水的乌贼","score":"9.1","scorer":12034},
            {"id":"43","title":"宿命之环","authors":"爱潜水的乌贼","score":0,"scorer":"0"},
            {"novel_name":"no id"}
        ]}}"#;
        let (mock, client) = MockHttpExecutor::new()
            .route("api/novel/search", 200, body)
            .into_client();

        let listing = Ypshuo::new(BASE).search(&client, "诡秘", 2).await.unwrap();
        let result = listing.into_result(2);

        assert_eq!(result.total_pages, 3);
        assert_eq!(result.current_page, 2);
        assert_eq!(result.books.len(), 2);
        assert_eq!(result.books[0].id, "42");
        assert_eq!(result.books[0].scorer.as_deref(), Some("12034"));
        assert_eq!(result.books[1].title, "宿命之环");
        assert_eq!(result.books[1].author.as_deref(), Some("爱潜水的乌贼"));
        assert_eq!(result.books[1].score, None);
        assert_eq!(result.books[1].scorer, None);

        let url = &mock.urls()[0];
        assert!(url.starts_with("https://www.ypshuo.com/api/novel/search?"));
        assert!(url.contains("page=2"));
        let request = &mock.requests()[0];
        assert_eq!(request.timeout, Some(SEARCH_TIMEOUT));
    }

    #[tokio::test]
    async fn test_search_rejected_by_api() {
        let (_, client) = MockHttpExecutor::new()
            .route("api/novel/search", 200, r#"{"code":"99","msg":"busy"}"#)
            .into_client();
        let err = Ypshuo::new(BASE).search(&client, "x", 1).await.unwrap_err();
        assert!(matches!(err, SourceError::Upstream(msg) if msg == "busy"));
    }

    #[tokio::test]
    async fn test_search_accepted_without_data_is_upstream_error() {
        let (_, client) = MockHttpExecutor::new()
            .route("api/novel/search", 200, r#"{"code":"00"}"#)
            .into_client();
        let err = Ypshuo::new(BASE).search(&client, "x", 1).await.unwrap_err();
        assert!(matches!(err, SourceError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_search_without_hits() {
        let (_, client) = MockHttpExecutor::new()
            .route("api/novel/search", 200, r#"{"code":"00","data":{"data":[],"pageAll":1}}"#)
            .into_client();
        let result = Ypshuo::new(BASE)
            .search(&client, "nothing", 1)
            .await
            .unwrap()
            .into_result(1);
        assert!(result.is_empty());
        assert_eq!(result.total_pages, 0);
    }

    #[tokio::test]
    async fn test_search_garbage_body_is_decode_error() {
        let (_, client) = MockHttpExecutor::new()
            .route("api/novel/search", 200, "<html>")
            .into_client();
        let err = Ypshuo::new(BASE).search(&client, "x", 1).await.unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[test]
    fn test_parse_details() {
        let raw = Ypshuo::new(BASE).parse_details(DETAIL_PAGE).unwrap();
        let book = raw.into_details("42").unwrap();

        assert_eq!(book.title, "诡秘之主");
        assert_eq!(book.author.as_deref(), Some("爱潜水的乌贼"));
        assert_eq!(book.image_url.as_deref(), Some("https://img.ypshuo.com/cover/42.jpg"));
        assert_eq!(book.tags, vec!["克苏鲁", "蒸汽朋克"]);
        assert_eq!(book.word_count, Some(WordCount::Characters(4_465_000.0)));
        assert_eq!(book.score.as_deref(), Some("9.1"));
        assert_eq!(book.scorer.as_deref(), Some("12034"));
        assert_eq!(book.status.as_deref(), Some("已完结"));
        assert_eq!(book.update_time.as_deref(), Some("2020-05-01"));
        assert_eq!(
            book.link.as_deref(),
            Some("https://book.qidian.com/info/1010868264")
        );
        assert!(book.synopsis.unwrap().contains("<br>"));

        assert_eq!(book.reviews.len(), 1);
        assert_eq!(book.reviews[0].author.as_deref(), Some("读者甲"));
        assert_eq!(book.reviews[0].rating.as_deref(), Some("5"));
        assert_eq!(book.reviews[0].content, "神作...");
    }

    #[test]
    fn test_parse_details_missing_fields() {
        let page = r#"<html><body><h1 class="book-name">只有书名</h1>
            <img class="book-img" src="/static/cover.png"></body></html>"#;
        let raw = Ypshuo::new(BASE).parse_details(page).unwrap();
        let book = raw.into_details("7").unwrap();

        assert_eq!(book.title, "只有书名");
        assert_eq!(
            book.image_url.as_deref(),
            Some("https://www.ypshuo.com/static/cover.png")
        );
        assert_eq!(book.author, None);
        assert_eq!(book.word_count, None);
        assert!(book.tags.is_empty());
        assert!(book.reviews.is_empty());
    }

    #[test]
    fn test_page_without_title_is_rejected() {
        let raw = Ypshuo::new(BASE)
            .parse_details("<html><body>请登录</body></html>")
            .unwrap();
        assert!(matches!(
            raw.into_details("1"),
            Err(SourceError::MissingIdentity)
        ));
    }

    #[tokio::test]
    async fn test_details_http_failure() {
        let (_, client) = MockHttpExecutor::new()
            .route("/novel/42.html", 404, "")
            .into_client();
        let err = Ypshuo::new(BASE).details(&client, "42").await.unwrap_err();
        assert!(matches!(err, SourceError::Status(404)));
    }
}
