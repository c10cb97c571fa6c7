//! Handler for the `search` command.

use tabled::{Table, Tabled};

use crate::application::Aggregation;
use crate::cli::{load_config, output, SearchArgs};
use crate::domain::{Offer, OfferKind};
use crate::error::Result;
use crate::infrastructure::App;

#[derive(Tabled)]
struct OfferRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Price")]
    price: u64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Link")]
    url: String,
}

/// Execute the search command.
pub async fn execute(args: &SearchArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let query = args.query();

    let app = App::build(config);
    let aggregation = app.dispatcher().search(&query).await?;

    output::section(&format!("Offers for \"{}\"", query.trim()));
    print_aggregation(&aggregation);
    Ok(())
}

fn print_aggregation(aggregation: &Aggregation) {
    let rows = offer_rows(&aggregation.offers);
    if rows.is_empty() {
        output::warn("Nothing found");
    } else {
        if aggregation.degraded {
            output::warn("No source returned offers; showing sample data");
        }
        output::table(&Table::new(rows).to_string());
    }

    for failure in &aggregation.failures {
        output::warn(&format!("{} failed: {}", failure.source, failure.error));
    }
    if aggregation.dropped > 0 {
        output::warn(&format!("{} malformed offers skipped", aggregation.dropped));
    }
}

/// Usable offers, cheapest first.
fn offer_rows(offers: &[Offer]) -> Vec<OfferRow> {
    let mut usable: Vec<&Offer> = offers
        .iter()
        .filter(|offer| offer.kind != OfferKind::Diagnostic)
        .collect();
    usable.sort_by_key(|offer| offer.price);

    usable
        .into_iter()
        .enumerate()
        .map(|(i, offer)| OfferRow {
            rank: i + 1,
            price: offer.price,
            title: offer.title.clone(),
            source: offer.source.to_string(),
            url: offer.url.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceId;

    #[test]
    fn rows_are_sorted_and_skip_diagnostics() {
        let shop = SourceId::new("shop");
        let offers = vec![
            Offer::listing("b", 200, "https://shop.test/b", shop.clone()),
            Offer::diagnostic(SourceId::new("avito"), "timeout", "https://avito.test"),
            Offer::listing("a", 100, "https://shop.test/a", shop),
        ];
        let rows = offer_rows(&offers);
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].rank, rows[0].price), (1, 100));
        assert_eq!((rows[1].rank, rows[1].price), (2, 200));
    }
}
