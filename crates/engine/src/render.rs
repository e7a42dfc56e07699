//! Text layout of listings and book pages.

use std::fmt::Write;

use novelscout_extension::reflow_synopsis;
use novelscout_types::{Book, Review, SearchResult, SearchType};

use crate::pagination::first_number;

/// Reviews shown on a book page.
pub const MAX_REVIEWS: usize = 5;

const COVER_FAILED: &str = "🖼️ Cover failed to load";

/// Scores are shown with two decimals when they are numeric.
fn decimal(value: &str) -> String {
    value
        .trim()
        .parse::<f64>()
        .map(|n| format!("{n:.2}"))
        .unwrap_or_else(|_| value.to_string())
}

pub fn listing(search_type: SearchType, keyword: &str, result: &SearchResult) -> String {
    let mut text = format!(
        "Results for [{keyword}], page {}/{}:\n",
        result.current_page, result.total_pages
    );

    let start = first_number(result.current_page);
    for (number, book) in (start..).zip(&result.books) {
        let score = book.score.as_deref().map_or_else(|| "N/A".to_string(), decimal);
        let scorer = book
            .scorer
            .as_deref()
            .map(|n| format!(" ({n} ratings)"))
            .unwrap_or_default();
        let _ = writeln!(
            text,
            "{number}. {}\n    Author: {} | Score: {score}{scorer}",
            book.title,
            book.author.as_deref().unwrap_or("unknown"),
        );
    }

    let _ = write!(text, "\n💡 Use `/{search_type} <number>` to see details");
    if result.total_pages > 1 {
        let _ = write!(
            text,
            "\n💡 Use `/{search_type} next` and `/{search_type} prev` to change page"
        );
    }
    text
}

pub fn details(book: &Book, cover_failed: bool) -> String {
    let mut text = String::new();
    if cover_failed {
        let _ = write!(text, "{COVER_FAILED}\n\n");
    }
    let _ = writeln!(text, "---[{}]---", book.title);

    let mut line = |label: &str, value: Option<&str>| {
        if let Some(value) = value {
            let _ = writeln!(text, "{label}: {value}");
        }
    };

    line("👤 Author", book.author.as_deref());
    if let Some(score) = &book.score {
        let scorer = book
            .scorer
            .as_deref()
            .map(|n| format!(" ({n} ratings)"))
            .unwrap_or_default();
        line("⭐ Score", Some(format!("{}{scorer}", decimal(score)).as_str()));
    }
    line("🌐 Platform", book.platform.as_deref());
    if !book.categories.is_empty() {
        line("🏷️ Subjects", Some(book.categories.join(" ").as_str()));
    } else {
        line("📂 Category", book.category.as_deref());
    }
    if !book.tags.is_empty() {
        line("🔖 Tags", Some(book.tags.join(" ").as_str()));
    }
    line(
        "📏 Word count",
        book.word_count.as_ref().map(ToString::to_string).as_deref(),
    );
    line("🔄 Status", book.status.as_deref());
    line("🥩 Meat ratio", book.meat_ratio.as_deref());
    line("🔥 Popularity", book.popularity.as_deref());
    line("🕒 Last update", book.update_time.as_deref());
    line("🆕 Latest chapter", book.last_chapter.as_deref());

    if let Some(synopsis) = book.synopsis.as_deref().map(reflow_synopsis) {
        if !synopsis.is_empty() {
            let _ = writeln!(text, "📝 Synopsis:\n{synopsis}");
        }
    }
    if let Some(link) = &book.link {
        let _ = writeln!(text, "🔗 Link: {link}");
    }

    if !book.reviews.is_empty() {
        text.push_str("\n--- 📝 Latest reviews ---\n");
        for review in book.reviews.iter().take(MAX_REVIEWS) {
            let _ = writeln!(text, "{}", review_line(review));
        }
    }

    text.trim().to_string()
}

fn review_line(review: &Review) -> String {
    let author = review.author.as_deref().unwrap_or("anonymous");
    let rating = review
        .rating
        .as_deref()
        .map_or_else(|| "no rating".to_string(), decimal);
    match &review.time {
        Some(time) => format!("{author} ({rating}, {time}): {}", review.content),
        None => format!("{author} ({rating}): {}", review.content),
    }
}
