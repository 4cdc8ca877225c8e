//! Field resolution by dotted path and the stable ordering used by the token tables.
//!
//! A value that is present but not a finite number sorts below every number, in
//! either direction of travel that means it ends up first ascending and last
//! descending. Absent values count as zero.

use crate::models::{Timeframe, TokenSummary};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved {
    Number(f64),
    /// A segment was absent, null, or not an object.
    Missing,
    /// The path ends on something that is not a finite number.
    Invalid,
}

impl Resolved {
    pub fn or(self, default: f64) -> f64 {
        match self {
            Resolved::Number(n) if n.is_finite() => n,
            _ => default,
        }
    }

    fn sort_key(self) -> Option<f64> {
        match self {
            Resolved::Number(n) if n.is_finite() => Some(n),
            Resolved::Number(_) | Resolved::Invalid => None,
            Resolved::Missing => Some(0.0),
        }
    }
}

fn number(n: f64) -> Resolved {
    if n.is_finite() {
        Resolved::Number(n)
    } else {
        Resolved::Invalid
    }
}

pub trait FieldLookup {
    fn lookup(&self, path: &str) -> Resolved;
}

impl FieldLookup for Value {
    fn lookup(&self, path: &str) -> Resolved {
        let mut current = self;
        for segment in path.split('.') {
            match current {
                Value::Object(map) => match map.get(segment) {
                    Some(next) => current = next,
                    None => return Resolved::Missing,
                },
                _ => return Resolved::Missing,
            }
        }
        match current {
            Value::Null => Resolved::Missing,
            Value::Number(n) => n.as_f64().map(number).unwrap_or(Resolved::Invalid),
            Value::String(s) => s.trim().parse::<f64>().map(number).unwrap_or(Resolved::Invalid),
            _ => Resolved::Invalid,
        }
    }
}

impl FieldLookup for TokenSummary {
    fn lookup(&self, path: &str) -> Resolved {
        let (head, tail) = match path.split_once('.') {
            Some((head, tail)) => (head, Some(tail)),
            None => (path, None),
        };

        let per_timeframe = |tail: Option<&str>, read: &dyn Fn(Timeframe) -> f64| match tail
            .and_then(Timeframe::from_label)
        {
            Some(tf) => number(read(tf)),
            None => Resolved::Missing,
        };

        match (head, tail) {
            ("usdPrice", None) => number(self.usd_price),
            ("marketCap", None) => number(self.market_cap),
            ("fullyDilutedValuation", None) => number(self.fully_diluted_valuation),
            ("liquidityUsd", None) => number(self.liquidity_usd),
            ("holders", None) => number(self.holders as f64),
            ("createdAt", None) => number(self.created_at as f64),
            ("decimals", None) => number(self.decimals as f64),
            ("pricePercentChange", _) => {
                per_timeframe(tail, &|tf| self.price_percent_change.get(tf))
            }
            ("totalVolume", _) => per_timeframe(tail, &|tf| self.total_volume.get(tf)),
            ("transactions", _) => per_timeframe(tail, &|tf| self.transactions.get(tf)),
            ("buyTransactions", _) => per_timeframe(tail, &|tf| self.buy_transactions.get(tf)),
            ("sellTransactions", _) => {
                per_timeframe(tail, &|tf| self.sell_transactions.get(tf))
            }
            ("buyers", _) => per_timeframe(tail, &|tf| self.buyers.get(tf)),
            ("sellers", _) => per_timeframe(tail, &|tf| self.sellers.get(tf)),
            ("makers", _) => per_timeframe(tail, &|tf| self.makers(tf)),
            _ => Resolved::Missing,
        }
    }
}

/// Reads `path` as a number, falling back to `default` for anything unusable.
pub fn resolve_number<T: FieldLookup + ?Sized>(record: &T, path: &str, default: f64) -> f64 {
    record.lookup(path).or(default)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub path: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(path: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            path: path.into(),
            direction,
        }
    }
}

fn compare_ascending(a: Resolved, b: Resolved) -> Ordering {
    match (a.sort_key(), b.sort_key()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

/// Stable sort by the resolved value of `spec.path`. Without a spec the input order is kept.
pub fn sort_records<T: FieldLookup>(records: &mut [T], spec: Option<&SortSpec>) {
    let Some(spec) = spec else {
        return;
    };
    records.sort_by(|a, b| {
        let (x, y) = (a.lookup(&spec.path), b.lookup(&spec.path));
        match spec.direction {
            SortDirection::Ascending => compare_ascending(x, y),
            SortDirection::Descending => compare_ascending(y, x),
        }
    });
}

/// Sortable columns of the trending table, in header order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Price,
    Age,
    Transactions,
    Volume,
    Makers,
    Change1h,
    Change4h,
    Change24h,
    Liquidity,
    MarketCap,
}

impl SortColumn {
    pub const ALL: [SortColumn; 10] = [
        SortColumn::Price,
        SortColumn::Age,
        SortColumn::Transactions,
        SortColumn::Volume,
        SortColumn::Makers,
        SortColumn::Change1h,
        SortColumn::Change4h,
        SortColumn::Change24h,
        SortColumn::Liquidity,
        SortColumn::MarketCap,
    ];

    pub fn path(self) -> &'static str {
        match self {
            SortColumn::Price => "usdPrice",
            SortColumn::Age => "createdAt",
            SortColumn::Transactions => "transactions.24h",
            SortColumn::Volume => "totalVolume.24h",
            SortColumn::Makers => "makers.24h",
            SortColumn::Change1h => "pricePercentChange.1h",
            SortColumn::Change4h => "pricePercentChange.4h",
            SortColumn::Change24h => "pricePercentChange.24h",
            SortColumn::Liquidity => "liquidityUsd",
            SortColumn::MarketCap => "marketCap",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SortColumn::Price => "Price",
            SortColumn::Age => "Age",
            SortColumn::Transactions => "Txns",
            SortColumn::Volume => "Volume",
            SortColumn::Makers => "Makers",
            SortColumn::Change1h => "1h",
            SortColumn::Change4h => "4h",
            SortColumn::Change24h => "24h",
            SortColumn::Liquidity => "Liquidity",
            SortColumn::MarketCap => "MCap",
        }
    }

    /// Header hotkeys: `1`-`9` then `0` for the tenth column.
    pub fn from_key(key: char) -> Option<Self> {
        let index = match key {
            '1'..='9' => key as usize - '1' as usize,
            '0' => 9,
            _ => return None,
        };
        Self::ALL.get(index).copied()
    }
}

/// Header click state. Starts unsorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSort {
    active: Option<(SortColumn, SortDirection)>,
}

impl TableSort {
    pub fn toggle(&mut self, column: SortColumn) {
        self.active = match self.active {
            Some((current, direction)) if current == column => Some((column, direction.flip())),
            _ => Some((column, SortDirection::Descending)),
        };
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<(SortColumn, SortDirection)> {
        self.active
    }

    pub fn spec(&self) -> Option<SortSpec> {
        self.active
            .map(|(column, direction)| SortSpec::new(column.path(), direction))
    }
}
