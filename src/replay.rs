//! CSV replay loader: an external-collaborator-style module that turns a
//! historical quote file into a time-ordered `Vec<Quote>` for `run()` to
//! drain. Carries no matching logic of its own.

use crate::errors::BookError;
use crate::order::{OrderId, Quote, Side};
use crate::scale::scale_price;

/// Parses the six-column `timestamp, uid, price, quantity, side, type`
/// format into quotes, scaling `price` to `decimal_places` fractional
/// digits. A first line that doesn't parse as a well-formed data row is
/// treated as an optional header and skipped. Rows without exactly six
/// columns are rejected. Returns quotes sorted by timestamp (stable on
/// ties, preserving file order).
pub fn load_csv(contents: &str, decimal_places: u32) -> Result<Vec<Quote>, BookError> {
    let mut quotes = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_row(line, decimal_places) {
            Ok(quote) => quotes.push(quote),
            Err(_) if line_no == 0 => continue, // tolerate an optional header
            Err(err) => return Err(err),
        }
    }
    quotes.sort_by_key(|q| q.timestamp());
    Ok(quotes)
}

fn parse_row(line: &str, decimal_places: u32) -> Result<Quote, BookError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 6 {
        return Err(BookError::io(format!(
            "expected 6 columns, got {}: {line}",
            fields.len()
        )));
    }
    let parse_u64 = |s: &str, name: &str| {
        s.parse::<u64>()
            .map_err(|_| BookError::io(format!("bad {name} field: {s}")))
    };

    let timestamp = parse_u64(fields[0], "timestamp")?;
    let uid = parse_u64(fields[1], "uid")?;
    let quantity = parse_u64(fields[3], "quantity")?;
    let side = match fields[4] {
        "0" => Side::Bid,
        "1" => Side::Ask,
        other => return Err(BookError::io(format!("bad side field: {other}"))),
    };
    let kind = parse_u64(fields[5], "type")?;

    let id = OrderId(uid);
    let price = scale_price(fields[2], decimal_places)?;
    let quote = match kind {
        0 => Quote::LimitOrder {
            id,
            price,
            quantity,
            timestamp,
            side,
        },
        1 => Quote::MarketOrder {
            id,
            quantity,
            timestamp,
            side,
        },
        2 => Quote::BestPriceOrder {
            id,
            quantity,
            timestamp,
            side,
        },
        3 => Quote::CancelOrder {
            id,
            quantity,
            timestamp,
            side,
        },
        other => {
            return Err(BookError::io(format!(
                "type {other} is not a quote an external source may submit"
            )))
        }
    };
    Ok(quote)
}
