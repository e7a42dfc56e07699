//! HTML search and detail pages of youshu.me.
//!
//! The site answers a search either with a result list or, when the query
//! matches exactly one book, by serving that book's page directly.

use std::time::Duration;

use novelscout_extension::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::raw::{RawBook, RawListing, RawReview};

const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "User-Agent",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:143.0) Gecko/20100101 Firefox/143.0",
    ),
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
    ),
    (
        "Accept-Language",
        "zh-CN,zh;q=0.8,zh-TW;q=0.7,zh-HK;q=0.5,en-US;q=0.3,en;q=0.2",
    ),
];

const SEARCH_TIMEOUT: Duration = Duration::from_secs(20);
const DETAILS_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REVIEWS: usize = 5;

/// Origin sites as they appear in a book's info line.
pub const PLATFORMS: &[&str] = &[
    "他站", "本站", "起点", "晋江", "番茄", "刺猬猫", "纵横", "飞卢", "17K", "有毒", "息壤", "铁血",
    "逐浪", "掌阅", "塔读", "独阅读", "少年梦", "SF", "豆瓣", "知乎", "公众号",
];

pub const CATEGORIES: &[&str] = &[
    "玄幻", "奇幻", "武侠", "仙侠", "都市", "现实", "军事", "历史", "悬疑", "游戏", "竞技", "科幻",
    "灵异", "二次元", "同人", "其他", "穿越时空", "架空历史", "总裁豪门", "都市言情", "仙侠奇缘",
    "幻想言情", "悬疑推理", "耽美纯爱", "衍生同人", "轻小说", "综合其他",
];

pub const STATUSES: &[&str] = &["连载中", "已完结", "已太监"];

const LIST_MARKER: &str = r#"共有<b class="hot">"#;

static TOTAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"共有<b class="hot">\s*(\d+)\s*</b>条结果"#).unwrap());
static ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<div class="c_row">.*?<div class="cb"></div>"#).unwrap());
static ROW_SUBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<span class="c_subject"><a href="/book/(\d+)">(.*?)</a></span>"#).unwrap()
});
static ROW_AUTHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<span class="c_label">作者：</span><span class="c_value">(.*?)</span>"#)
        .unwrap()
});
static ROW_SCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<span class="c_rr">([\d.]+)</span>"#).unwrap());
static ROW_SCORER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<span class="stard">\((\d+)人评分\)</span>"#).unwrap());

static TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<title>(.*?)-.*?-优书网</title>").unwrap());
static PAGE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"uservote\.php\?id=(\d+)|rating\('\d+',\s*'(\d+)'\)|addbookcase\.php\?bid=(\d+)")
        .unwrap()
});
static AUTHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"作者：<a[^>]*>(.*?)</a>").unwrap());
static SCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<span class="ratenum">(.*?)</span>"#).unwrap());
static SCORER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((.*?)人已评\)").unwrap());
static UPDATED: Lazy<Regex> = Lazy::new(|| Regex::new(r"最后更新：(.*?)</td>").unwrap());
static SYNOPSIS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="tabvalue"[^>]*>\s*<div[^>]*>(.*?)</div>"#).unwrap()
});
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<a class="btnlink b_hot mbs" href="(.*?)""#).unwrap());
static COVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<a[^>]*class="book-detail-img"[^>]*><img src="(.*?)""#).unwrap()
});
static INFO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<div class="author-item-exp">(.*?)</div>"#).unwrap());
static INFO_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<i class="author-item-line">\s*</i>"#).unwrap());
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").unwrap());
static TAG_SECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<b>标签：</b>(.*?)</div>").unwrap());
static ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<a[^>]*>(.*?)</a>").unwrap());
static REVIEW_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="c_row cf[^"]*">.*?<div class="c_tag">"#).unwrap()
});
static REVIEW_AUTHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<p>(.*?)</p></a>\s*<p><div class="user-level">"#).unwrap()
});
static REVIEW_RATING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<span title="(\d+)\s*颗星""#).unwrap());
static REVIEW_CONTENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<div class="c_description">(.*?)</div>"#).unwrap());

#[derive(Debug, Clone)]
pub struct YoushuMe {
    base_url: String,
    cookie: Option<String>,
}

impl YoushuMe {
    pub fn new(base_url: impl Into<String>, cookie: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            cookie: cookie.filter(|cookie| !cookie.trim().is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Browser profile plus the configured session cookie and a referer
    /// pointing at the site itself.
    pub(crate) fn request(&self, url: String) -> Request {
        let mut request = Request::get(url)
            .headers(BROWSER_HEADERS)
            .header("Referer", self.base_url.as_str());
        if let Some(cookie) = &self.cookie {
            request = request.header("Cookie", cookie.as_str());
        }
        request
    }

    pub(crate) async fn search(&self, client: &Client, keyword: &str, page: u32) -> Result<RawListing> {
        let path = format!("/search/all/{}/{page}.html", urlencoding::encode(keyword));
        let text = self
            .request(make_absolute_url(&path, &self.base_url))
            .timeout(SEARCH_TIMEOUT)
            .send(client)
            .await?
            .error_for_status()?
            .text();

        Ok(parse_search_page(&text))
    }

    pub(crate) async fn details(&self, client: &Client, id: &str) -> Result<RawBook> {
        let text = self
            .request(make_absolute_url(&format!("/book/{id}"), &self.base_url))
            .timeout(DETAILS_TIMEOUT)
            .send(client)
            .await?
            .error_for_status()?
            .text();

        Ok(self.parse_details(&text))
    }

    pub(crate) fn parse_details(&self, text: &str) -> RawBook {
        let fragment = |re: &Regex| capture(re, text).and_then(|value| clean_fragment(&value));

        let mut book = RawBook {
            title: capture(&TITLE, text).and_then(|title| fragment_text(&title)),
            author: fragment(&AUTHOR),
            score: fragment(&SCORE),
            scorer: fragment(&SCORER),
            update_time: fragment(&UPDATED),
            synopsis: fragment(&SYNOPSIS),
            link: fragment(&LINK),
            image_url: capture(&COVER, text).map(|src| make_absolute_url(&src, &self.base_url)),
            tags: capture(&TAG_SECTION, text)
                .map(|section| {
                    capture_all(&ANCHOR, &section)
                        .into_iter()
                        .filter_map(|groups| groups.first().and_then(|tag| clean_fragment(tag)))
                        .collect()
                })
                .unwrap_or_default(),
            reviews: parse_reviews(text),
            ..Default::default()
        };

        if let Some(info) = capture(&INFO, text) {
            classify_info(&info, &mut book);
        }
        book
    }
}

fn parse_search_page(text: &str) -> RawListing {
    if text.contains(LIST_MARKER) {
        let total_hits = capture(&TOTAL, text)
            .and_then(|total| total.parse::<u32>().ok())
            .unwrap_or(0);

        let books = ROW
            .find_iter(text)
            .map(|row| parse_row(row.as_str()))
            .collect::<Vec<_>>();

        tracing::debug!("Parsed {} rows from list page, {total_hits} hits total", books.len());
        return RawListing {
            books,
            total_pages: SearchResult::pages_for(total_hits).max(1),
        };
    }

    // Exact matches redirect to the book page.
    let title = capture(&TITLE, text).and_then(|title| fragment_text(&title));
    let id = capture(&PAGE_ID, text);
    match (id, title) {
        (Some(id), Some(title)) => {
            tracing::debug!("Search redirected to book {id} ({title})");
            RawListing {
                books: vec![RawBook {
                    id: Some(id),
                    title: Some(title),
                    ..Default::default()
                }],
                total_pages: 1,
            }
        }
        _ => {
            tracing::debug!("Search page is neither a list nor a book page");
            RawListing::empty()
        }
    }
}

fn parse_row(row: &str) -> RawBook {
    let subject = capture_all(&ROW_SUBJECT, row).into_iter().next();
    let (id, title) = match subject.as_deref() {
        Some([id, title, ..]) => (Some(id.clone()), fragment_text(title)),
        _ => (None, None),
    };

    RawBook {
        id,
        title,
        author: capture(&ROW_AUTHOR, row).and_then(|author| clean_fragment(&author)),
        score: capture(&ROW_SCORE, row),
        scorer: capture(&ROW_SCORER, row),
        ..Default::default()
    }
}

/// Sorts the `|` separated parts of the info line into platform, category,
/// status and word count.
fn classify_info(info: &str, book: &mut RawBook) {
    let info = strip_tags(&INFO_SEPARATOR.replace_all(info, "|"));
    for part in info.split('|').map(str::trim).filter(|part| !part.is_empty()) {
        if PLATFORMS.contains(&part) {
            book.platform = Some(part.to_string());
        } else if CATEGORIES.contains(&part) {
            book.category = Some(part.to_string());
        } else if STATUSES.contains(&part) {
            book.status = Some(part.to_string());
        } else if part.contains('字') {
            book.word_count = capture(&DIGITS, part).and_then(|digits| digits.parse().ok());
        }
    }
}

fn parse_reviews(text: &str) -> Vec<RawReview> {
    REVIEW_BLOCK
        .find_iter(text)
        .take(MAX_REVIEWS)
        .filter_map(|block| {
            let block = block.as_str();
            let author = capture(&REVIEW_AUTHOR, block)?;
            let rating = capture(&REVIEW_RATING, block)?;
            let content = capture(&REVIEW_CONTENT, block)?;
            Some(RawReview {
                author: clean_fragment(&author),
                rating: Some(rating),
                content: clean_fragment(&content),
            })
        })
        .collect()
}
