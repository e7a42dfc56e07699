//! Qidian mobile site, used as the canonical catalog for enrichment.
//!
//! Both the search and the book pages embed their data as a JSON blob in the
//! `vite-plugin-ssr_pageContext` script, so nothing here walks the markup.

use std::time::Duration;

use async_trait::async_trait;
use novelscout_extension::prelude::*;
use serde_json::Value;

const BASE_URL: &str = "https://m.qidian.com";
const COVER_URL: &str = "https://bookcover.yuewen.com/qdbimg/349573";
const PAGE_CONTEXT: &str = "script#vite-plugin-ssr_pageContext";
const TIMEOUT: Duration = Duration::from_secs(10);

const HEADERS: &[(&str, &str)] = &[
    (
        "User-Agent",
        "Mozilla/5.0 (Linux; Android 10; Mobile) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Mobile Safari/537.36",
    ),
    ("Referer", "https://m.qidian.com/"),
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ),
];

pub struct QidianCatalog {
    client: Client,
}

impl QidianCatalog {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn page_data(&self, url: String) -> Result<Value> {
        let doc = Request::get(url)
            .headers(HEADERS)
            .timeout(TIMEOUT)
            .html(&self.client)
            .await?;

        let script = doc
            .select_first_opt(PAGE_CONTEXT)?
            .and_then(|script| script.text_opt())
            .ok_or_else(|| SourceError::Parse("Page context script not found".to_string()))?;

        let mut context: Value = serde_json::from_str(&script)?;
        context
            .pointer_mut("/pageContext/pageProps/pageData")
            .map(Value::take)
            .ok_or_else(|| SourceError::Parse("Page context has no page data".to_string()))
    }
}

#[async_trait]
impl Catalog for QidianCatalog {
    async fn search(&self, title: &str) -> Result<Vec<CatalogEntry>> {
        let url = format!("{BASE_URL}/so/{}.html?pageNum=1", urlencoding::encode(title));
        let data = self.page_data(url).await?;

        let entries = data
            .pointer("/bookInfo/records")
            .and_then(Value::as_array)
            .map(|records| records.iter().filter_map(parse_record).collect::<Vec<_>>())
            .unwrap_or_default();

        tracing::debug!("Catalog search '{title}' returned {} entries", entries.len());
        Ok(entries)
    }

    async fn details(&self, entry: &CatalogEntry) -> Result<CatalogDetails> {
        let url = entry.url.replace("www.qidian.com", "m.qidian.com");
        let data = self.page_data(url).await?;
        parse_details(&data)
    }
}

fn parse_record(record: &Value) -> Option<CatalogEntry> {
    let id = json_text(record.get("bid")).as_deref().and_then(non_blank)?;
    let title = json_text(record.get("bName")).as_deref().and_then(non_blank)?;
    Some(CatalogEntry {
        url: format!("{BASE_URL}/book/{id}/"),
        author: json_text(record.get("bAuth")).as_deref().and_then(present),
        id,
        title,
    })
}

fn parse_details(data: &Value) -> Result<CatalogDetails> {
    let info = data
        .get("bookInfo")
        .ok_or_else(|| SourceError::Parse("Book page has no book info".to_string()))?;
    let field = |key: &str| json_text(info.get(key)).as_deref().and_then(present);
    let count = |key: &str| json_text(info.get(key)).as_deref().and_then(present_count);

    let tags = data
        .pointer("/bookExtra/ugcTagInfos")
        .and_then(Value::as_array)
        .map(|tags| {
            present_tags(
                tags.iter()
                    .filter_map(|tag| json_text(tag.get("TagName"))),
            )
        })
        .unwrap_or_default();

    let category = match (field("chanName"), field("subCateName")) {
        (Some(channel), Some(sub)) => Some(format!("{channel}·{sub}")),
        (channel, sub) => channel.or(sub),
    };

    Ok(CatalogDetails {
        title: json_text(info.get("bookName")).as_deref().and_then(non_blank),
        author: field("authorName"),
        status: field("bookStatus"),
        category,
        tags,
        word_count: field("showWordsCnt"),
        last_update: field("updTime"),
        last_chapter: field("updChapterName"),
        intro: field("desc"),
        cover: field("bookId").map(|id| format!("{COVER_URL}/{id}/600")),
        rank: json_text(data.pointer("/monthTicketInfo/rank"))
            .as_deref()
            .and_then(present),
        collection: count("collect"),
        recommendations: count("recomAll"),
    })
}
