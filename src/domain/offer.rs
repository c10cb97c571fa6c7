//! Offers returned by sources and their normalization.

use serde::{Deserialize, Serialize};
use url::Url;

use super::id::SourceId;

/// Price carried by diagnostic placeholders. No limit can reach it.
pub const UNREACHABLE_PRICE: u64 = 1_000_000_000_000_000_000;

/// Where an offer came from, so degraded data is never mistaken for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferKind {
    /// A real offer reported by a source.
    Listing,
    /// Produced by the degraded-mode fallback when no source yielded anything.
    Fallback,
    /// Placeholder standing in for a failed source.
    Diagnostic,
}

/// A single candidate listing for a query. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Offer {
    pub title: String,
    pub price: u64,
    pub url: String,
    pub source: SourceId,
    pub kind: OfferKind,
}

impl Offer {
    /// Build a real listing. No validation; see [`RawOffer::normalize`].
    pub fn listing(
        title: impl Into<String>,
        price: u64,
        url: impl Into<String>,
        source: SourceId,
    ) -> Self {
        Self {
            title: title.into(),
            price,
            url: url.into(),
            source,
            kind: OfferKind::Listing,
        }
    }

    /// Placeholder making a source failure visible end-to-end.
    pub fn diagnostic(source: SourceId, reason: &str, url: impl Into<String>) -> Self {
        Self {
            title: format!("[{source}] error: {reason}"),
            price: UNREACHABLE_PRICE,
            url: url.into(),
            source,
            kind: OfferKind::Diagnostic,
        }
    }

    /// Re-tag an offer as degraded-mode fallback data.
    #[must_use]
    pub fn into_fallback(self) -> Self {
        Self {
            source: SourceId::new(SourceId::FALLBACK),
            kind: OfferKind::Fallback,
            ..self
        }
    }

    #[must_use]
    pub fn is_listing(&self) -> bool {
        self.kind == OfferKind::Listing
    }
}

/// Price as sources report it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawPrice {
    /// Coerce to a positive integer price, or `None` if that is impossible.
    #[must_use]
    pub fn coerce(&self) -> Option<u64> {
        let price = match self {
            Self::Integer(value) => u64::try_from(*value).ok()?,
            Self::Float(value) if value.is_finite() && *value > 0.0 => {
                let rounded = value.round();
                if rounded >= u64::MAX as f64 {
                    return None;
                }
                rounded as u64
            }
            Self::Float(_) => return None,
            Self::Text(text) => parse_price_text(text)?,
        };
        (price > 0).then_some(price)
    }
}

/// Parse texts such as `"79 990 ₽"`, `"1,299"` or `"499.90"`.
///
/// A trailing `.`/`,` group of one or two digits is a fractional part and is
/// rounded away; any other separator is treated as digit grouping.
fn parse_price_text(text: &str) -> Option<u64> {
    let compact: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    let (whole, fraction) = match compact.rfind(|c: char| c == '.' || c == ',') {
        Some(pos) if (1..=2).contains(&(compact.len() - pos - 1)) => {
            (&compact[..pos], &compact[pos + 1..])
        }
        _ => (compact.as_str(), ""),
    };

    let digits: String = whole.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let mut value: u64 = digits.parse().ok()?;
    if fraction.starts_with(|c: char| ('5'..='9').contains(&c)) {
        value = value.checked_add(1)?;
    }
    Some(value)
}

/// Offer as returned by a source adapter, before normalization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawOffer {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<RawPrice>,
    #[serde(default)]
    pub url: Option<String>,
}

impl RawOffer {
    pub fn new(title: impl Into<String>, price: RawPrice, url: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            price: Some(price),
            url: Some(url.into()),
        }
    }

    /// Validate and convert into a listing attributed to `source`.
    ///
    /// Returns `None` when the title or url is missing/blank, the url is not
    /// absolute, or the price is missing or not positive.
    #[must_use]
    pub fn normalize(self, source: &SourceId) -> Option<Offer> {
        let title = self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        let url = self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        Url::parse(url).ok()?;
        let price = self.price.as_ref()?.coerce()?;

        Some(Offer::listing(title, price, url, source.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SourceId {
        SourceId::new("shop")
    }

    #[test]
    fn coerce_integer_prices() {
        assert_eq!(RawPrice::Integer(79_990).coerce(), Some(79_990));
        assert_eq!(RawPrice::Integer(0).coerce(), None);
        assert_eq!(RawPrice::Integer(-10).coerce(), None);
    }

    #[test]
    fn coerce_float_prices() {
        assert_eq!(RawPrice::Float(499.6).coerce(), Some(500));
        assert_eq!(RawPrice::Float(0.2).coerce(), None);
        assert_eq!(RawPrice::Float(f64::NAN).coerce(), None);
        assert_eq!(RawPrice::Float(-3.0).coerce(), None);
    }

    #[test]
    fn coerce_text_prices() {
        assert_eq!(RawPrice::Text("79 990 ₽".into()).coerce(), Some(79_990));
        assert_eq!(RawPrice::Text("1,299".into()).coerce(), Some(1_299));
        assert_eq!(RawPrice::Text("499.90".into()).coerce(), Some(500));
        assert_eq!(RawPrice::Text("12 345,40".into()).coerce(), Some(12_345));
        assert_eq!(RawPrice::Text("free".into()).coerce(), None);
        assert_eq!(RawPrice::Text("0".into()).coerce(), None);
    }

    #[test]
    fn raw_price_deserializes_any_shape() {
        let parsed: Vec<RawPrice> = serde_json::from_str(r#"[100, 99.5, "1 000"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                RawPrice::Integer(100),
                RawPrice::Float(99.5),
                RawPrice::Text("1 000".into())
            ]
        );
    }

    #[test]
    fn normalize_trims_fields() {
        let raw = RawOffer::new("  iPhone 15  ", RawPrice::Integer(80_000), " https://shop.test/1 ");
        let offer = raw.normalize(&source()).unwrap();
        assert_eq!(offer.title, "iPhone 15");
        assert_eq!(offer.url, "https://shop.test/1");
        assert_eq!(offer.source, source());
        assert_eq!(offer.kind, OfferKind::Listing);
    }

    #[test]
    fn normalize_drops_incomplete_offers() {
        let missing_title = RawOffer {
            title: None,
            price: Some(RawPrice::Integer(10)),
            url: Some("https://shop.test".into()),
        };
        let blank_url = RawOffer::new("x", RawPrice::Integer(10), "   ");
        let relative_url = RawOffer::new("x", RawPrice::Integer(10), "/item/1");
        let zero_price = RawOffer::new("x", RawPrice::Integer(0), "https://shop.test");
        let missing_price = RawOffer {
            title: Some("x".into()),
            price: None,
            url: Some("https://shop.test".into()),
        };

        for raw in [missing_title, blank_url, relative_url, zero_price, missing_price] {
            assert!(raw.normalize(&source()).is_none());
        }
    }

    #[test]
    fn diagnostic_is_unreachable() {
        let offer = Offer::diagnostic(source(), "timeout", "https://shop.test/?q=x");
        assert_eq!(offer.price, UNREACHABLE_PRICE);
        assert_eq!(offer.kind, OfferKind::Diagnostic);
        assert!(offer.title.contains("[shop]"));
    }

    #[test]
    fn fallback_is_retagged() {
        let offer = Offer::listing("x", 5, "https://e.test", source()).into_fallback();
        assert_eq!(offer.source.as_str(), SourceId::FALLBACK);
        assert!(!offer.is_listing());
    }
}
