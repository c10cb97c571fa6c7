//! Message formatting for Telegram (MarkdownV2).

use crate::application::Aggregation;
use crate::domain::{Offer, OfferKind, WatchEntry};
use crate::port::PriceAlert;

/// Maximum offers listed in a `/search` reply.
const SEARCH_DISPLAY_LIMIT: usize = 10;

/// Format a price alert.
pub fn format_alert(alert: &PriceAlert) -> String {
    format!(
        "🔔 *Price alert*\n\
        \n\
        🔎 {}\n\
        💰 `{}` \\(limit `{}`\\)\n\
        🛒 [{}]({})\n\
        🏪 {}",
        escape_markdown(&alert.query),
        format_price(alert.best.price),
        format_price(alert.limit),
        escape_markdown(&truncate(&alert.best.title, 80)),
        escape_link(&alert.best.url),
        escape_markdown(alert.best.source.as_str()),
    )
}

/// Format the result of a one-shot search, cheapest first.
pub fn format_search(query: &str, aggregation: &Aggregation) -> String {
    let mut lines = vec![format!("🔎 *{}*", escape_markdown(query))];

    let mut offers: Vec<&Offer> = aggregation
        .offers
        .iter()
        .filter(|offer| offer.kind != OfferKind::Diagnostic)
        .collect();
    offers.sort_by_key(|offer| offer.price);

    if offers.is_empty() {
        lines.push(String::new());
        lines.push("Nothing found".to_string());
    } else {
        if aggregation.degraded {
            lines.push("⚠️ _Sources are unavailable, showing sample data_".to_string());
        }
        lines.push(String::new());
        for (i, offer) in offers.iter().take(SEARCH_DISPLAY_LIMIT).enumerate() {
            let marker = if i == 0 { "🏆" } else { "•" };
            lines.push(format!(
                "{marker} `{}` [{}]({})",
                format_price(offer.price),
                escape_markdown(&truncate(&offer.title, 60)),
                escape_link(&offer.url),
            ));
        }
        if offers.len() > SEARCH_DISPLAY_LIMIT {
            lines.push(format!(
                "_\\.\\.\\. and {} more_",
                offers.len() - SEARCH_DISPLAY_LIMIT
            ));
        }
    }

    if !aggregation.failures.is_empty() {
        lines.push(String::new());
        for failure in &aggregation.failures {
            lines.push(format!(
                "❌ {}: {}",
                escape_markdown(failure.source.as_str()),
                escape_markdown(&truncate(&failure.error, 80)),
            ));
        }
    }

    lines.join("\n")
}

/// Format the caller's watch list with 1-based numbers.
pub fn format_watches(watches: &[WatchEntry]) -> String {
    if watches.is_empty() {
        return "📋 No watches yet\\. Try `/watch iphone 15 до 85к`".to_string();
    }

    let mut lines = vec![format!("📋 *Your watches* \\({}\\)", watches.len()), String::new()];
    for (i, watch) in watches.iter().enumerate() {
        lines.push(format!(
            "{}\\. {} ≤ `{}`",
            i + 1,
            escape_markdown(watch.query()),
            format_price(watch.limit()),
        ));
    }
    lines.join("\n")
}

pub fn format_watching(watch: &WatchEntry) -> String {
    format!(
        "👀 Watching *{}* until it costs `{}` or less",
        escape_markdown(watch.query()),
        format_price(watch.limit()),
    )
}

pub fn format_removed(watch: &WatchEntry) -> String {
    format!(
        "🗑️ Stopped watching *{}* \\(`{}`\\)",
        escape_markdown(watch.query()),
        format_price(watch.limit()),
    )
}

/// Format a user-facing error.
pub fn format_error(error: &dyn std::fmt::Display) -> String {
    format!("❌ {}", escape_markdown(&error.to_string()))
}

/// Group thousands with spaces: `79990` becomes `79 990`.
pub fn format_price(price: u64) -> String {
    let digits = price.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    grouped
}

/// Truncate a string to max chars, adding "..." if truncated.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

/// Escape special characters for Telegram MarkdownV2.
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '='
            | '|' | '{' | '}' | '.' | '!' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

/// Escape a URL for the `(...)` part of an inline link.
fn escape_link(url: &str) -> String {
    url.replace('\\', "\\\\").replace(')', "\\)")
}
