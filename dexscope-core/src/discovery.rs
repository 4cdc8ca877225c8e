//! Compound token discovery queries and the reshaping of their results into
//! [`TokenSummary`] rows.

use crate::models::{Lenient, PerTimeframe, Timeframe, TokenSummary};
use crate::sort::resolve_number;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use serde_with::serde_as;

/// Liquidity is not part of a discovery result; rows carry this share of FDV instead
/// and are marked as estimated.
pub const LIQUIDITY_FDV_RATIO: f64 = 0.1;

pub const RESULT_LIMITS: [u32; 4] = [10, 20, 50, 100];

/// Chains the discovery endpoint accepts, as (chain id, label).
pub const DISCOVERY_CHAINS: &[(&str, &str)] = &[
    ("0x1", "Ethereum"),
    ("solana", "Solana"),
    ("0x38", "BSC"),
    ("0x89", "Polygon"),
    ("0x2105", "Base"),
    ("0xa4b1", "Arbitrum"),
    ("0xa", "Optimism"),
    ("0xa86a", "Avalanche"),
    ("0x171", "Pulse"),
    ("0x7e4", "Ronin"),
];

const TIMEFRAMES_TO_RETURN: [DiscoveryTimeframe; 7] = [
    DiscoveryTimeframe::TenMinutes,
    DiscoveryTimeframe::OneHour,
    DiscoveryTimeframe::FourHours,
    DiscoveryTimeframe::TwelveHours,
    DiscoveryTimeframe::OneDay,
    DiscoveryTimeframe::OneWeek,
    DiscoveryTimeframe::OneMonth,
];

const METRICS_TO_RETURN: [DiscoveryMetric; 11] = [
    DiscoveryMetric::Holders,
    DiscoveryMetric::Buyers,
    DiscoveryMetric::Sellers,
    DiscoveryMetric::NetBuyers,
    DiscoveryMetric::VolumeUsd,
    DiscoveryMetric::BuyVolumeUsd,
    DiscoveryMetric::SellVolumeUsd,
    DiscoveryMetric::MarketCap,
    DiscoveryMetric::FullyDilutedValuation,
    DiscoveryMetric::UsdPricePercentChange,
    DiscoveryMetric::LiquidityChangeUsd,
];

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let Some(index) = all.iter().position(|v| *v == current) else {
        return current;
    };
    let len = all.len();
    let next = if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    };
    all[next]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Gt,
    Lt,
    Eq,
}

impl Operator {
    pub const ALL: [Operator; 3] = [Operator::Gt, Operator::Lt, Operator::Eq];

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Eq => "eq",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Operator::Gt => "Greater Than",
            Operator::Lt => "Less Than",
            Operator::Eq => "Equal To",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMetric {
    TokenAge,
    Holders,
    Buyers,
    Sellers,
    NetBuyers,
    ExperiencedBuyers,
    ExperiencedSellers,
    NetExperiencedBuyers,
    FullyDilutedValuation,
    MarketCap,
    UsdPricePercentChange,
    LiquidityChange,
    LiquidityChangeUsd,
    VolumeUsd,
    BuyVolumeUsd,
    SellVolumeUsd,
    NetVolumeUsd,
    SecurityScore,
}

impl DiscoveryMetric {
    pub const ALL: [DiscoveryMetric; 18] = [
        DiscoveryMetric::TokenAge,
        DiscoveryMetric::Holders,
        DiscoveryMetric::Buyers,
        DiscoveryMetric::Sellers,
        DiscoveryMetric::NetBuyers,
        DiscoveryMetric::ExperiencedBuyers,
        DiscoveryMetric::ExperiencedSellers,
        DiscoveryMetric::NetExperiencedBuyers,
        DiscoveryMetric::FullyDilutedValuation,
        DiscoveryMetric::MarketCap,
        DiscoveryMetric::UsdPricePercentChange,
        DiscoveryMetric::LiquidityChange,
        DiscoveryMetric::LiquidityChangeUsd,
        DiscoveryMetric::VolumeUsd,
        DiscoveryMetric::BuyVolumeUsd,
        DiscoveryMetric::SellVolumeUsd,
        DiscoveryMetric::NetVolumeUsd,
        DiscoveryMetric::SecurityScore,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DiscoveryMetric::TokenAge => "tokenAge",
            DiscoveryMetric::Holders => "holders",
            DiscoveryMetric::Buyers => "buyers",
            DiscoveryMetric::Sellers => "sellers",
            DiscoveryMetric::NetBuyers => "netBuyers",
            DiscoveryMetric::ExperiencedBuyers => "experiencedBuyers",
            DiscoveryMetric::ExperiencedSellers => "experiencedSellers",
            DiscoveryMetric::NetExperiencedBuyers => "netExperiencedBuyers",
            DiscoveryMetric::FullyDilutedValuation => "fullyDilutedValuation",
            DiscoveryMetric::MarketCap => "marketCap",
            DiscoveryMetric::UsdPricePercentChange => "usdPricePercentChange",
            DiscoveryMetric::LiquidityChange => "liquidityChange",
            DiscoveryMetric::LiquidityChangeUsd => "liquidityChangeUSD",
            DiscoveryMetric::VolumeUsd => "volumeUsd",
            DiscoveryMetric::BuyVolumeUsd => "buyVolumeUsd",
            DiscoveryMetric::SellVolumeUsd => "sellVolumeUsd",
            DiscoveryMetric::NetVolumeUsd => "netVolumeUsd",
            DiscoveryMetric::SecurityScore => "securityScore",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DiscoveryMetric::TokenAge => "Token Age",
            DiscoveryMetric::Holders => "Holders",
            DiscoveryMetric::Buyers => "Buyers",
            DiscoveryMetric::Sellers => "Sellers",
            DiscoveryMetric::NetBuyers => "Net Buyers",
            DiscoveryMetric::ExperiencedBuyers => "Experienced Buyers",
            DiscoveryMetric::ExperiencedSellers => "Experienced Sellers",
            DiscoveryMetric::NetExperiencedBuyers => "Net Experienced Buyers",
            DiscoveryMetric::FullyDilutedValuation => "Fully Diluted Valuation",
            DiscoveryMetric::MarketCap => "Market Cap",
            DiscoveryMetric::UsdPricePercentChange => "Price Change %",
            DiscoveryMetric::LiquidityChange => "Liquidity Change",
            DiscoveryMetric::LiquidityChangeUsd => "Liquidity Change USD",
            DiscoveryMetric::VolumeUsd => "Volume USD",
            DiscoveryMetric::BuyVolumeUsd => "Buy Volume USD",
            DiscoveryMetric::SellVolumeUsd => "Sell Volume USD",
            DiscoveryMetric::NetVolumeUsd => "Net Volume USD",
            DiscoveryMetric::SecurityScore => "Security Score",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, true)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryTimeframe {
    TenMinutes,
    ThirtyMinutes,
    OneHour,
    FourHours,
    TwelveHours,
    OneDay,
    OneWeek,
    OneMonth,
}

impl DiscoveryTimeframe {
    pub const ALL: [DiscoveryTimeframe; 8] = [
        DiscoveryTimeframe::TenMinutes,
        DiscoveryTimeframe::ThirtyMinutes,
        DiscoveryTimeframe::OneHour,
        DiscoveryTimeframe::FourHours,
        DiscoveryTimeframe::TwelveHours,
        DiscoveryTimeframe::OneDay,
        DiscoveryTimeframe::OneWeek,
        DiscoveryTimeframe::OneMonth,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DiscoveryTimeframe::TenMinutes => "tenMinutes",
            DiscoveryTimeframe::ThirtyMinutes => "thirtyMinutes",
            DiscoveryTimeframe::OneHour => "oneHour",
            DiscoveryTimeframe::FourHours => "fourHours",
            DiscoveryTimeframe::TwelveHours => "twelveHours",
            DiscoveryTimeframe::OneDay => "oneDay",
            DiscoveryTimeframe::OneWeek => "oneWeek",
            DiscoveryTimeframe::OneMonth => "oneMonth",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DiscoveryTimeframe::TenMinutes => "10 Minutes",
            DiscoveryTimeframe::ThirtyMinutes => "30 Minutes",
            DiscoveryTimeframe::OneHour => "1 Hour",
            DiscoveryTimeframe::FourHours => "4 Hours",
            DiscoveryTimeframe::TwelveHours => "12 Hours",
            DiscoveryTimeframe::OneDay => "1 Day",
            DiscoveryTimeframe::OneWeek => "1 Week",
            DiscoveryTimeframe::OneMonth => "1 Month",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, true)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, false)
    }
}

impl From<Timeframe> for DiscoveryTimeframe {
    fn from(tf: Timeframe) -> Self {
        match tf {
            Timeframe::OneHour => DiscoveryTimeframe::OneHour,
            Timeframe::FourHours => DiscoveryTimeframe::FourHours,
            Timeframe::TwelveHours => DiscoveryTimeframe::TwelveHours,
            Timeframe::OneDay => DiscoveryTimeframe::OneDay,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    pub id: u32,
    pub metric: DiscoveryMetric,
    pub timeframe: DiscoveryTimeframe,
    pub operator: Operator,
    /// Kept as typed; the endpoint accepts numeric strings.
    pub value: String,
}

impl FilterCondition {
    pub fn new(
        id: u32,
        metric: DiscoveryMetric,
        timeframe: DiscoveryTimeframe,
        operator: Operator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id,
            metric,
            timeframe,
            operator,
            value: value.into(),
        }
    }

    fn default_with_id(id: u32) -> Self {
        Self::new(
            id,
            DiscoveryMetric::ExperiencedBuyers,
            DiscoveryTimeframe::OneMonth,
            Operator::Gt,
            "10",
        )
    }

    /// `{metric, timeFrame, <operator>: value}`
    pub fn to_json(&self) -> Value {
        let mut entry = Map::new();
        entry.insert("metric".into(), Value::from(self.metric.as_str()));
        entry.insert("timeFrame".into(), Value::from(self.timeframe.as_str()));
        entry.insert(self.operator.as_str().into(), Value::from(self.value.clone()));
        Value::Object(entry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoverySort {
    pub metric: DiscoveryMetric,
    pub timeframe: DiscoveryTimeframe,
    pub descending: bool,
}

impl Default for DiscoverySort {
    fn default() -> Self {
        Self {
            metric: DiscoveryMetric::ExperiencedBuyers,
            timeframe: DiscoveryTimeframe::OneMonth,
            descending: true,
        }
    }
}

impl DiscoverySort {
    pub fn to_json(&self) -> Value {
        json!({
            "metric": self.metric.as_str(),
            "timeFrame": self.timeframe.as_str(),
            "type": if self.descending { "DESC" } else { "ASC" },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRequest {
    pub chain: String,
    pub filters: Vec<FilterCondition>,
    pub sort: DiscoverySort,
    pub limit: u32,
}

impl DiscoveryRequest {
    pub fn to_payload(&self) -> Value {
        let filters: Vec<Value> = self.filters.iter().map(FilterCondition::to_json).collect();
        let timeframes: Vec<&str> = TIMEFRAMES_TO_RETURN.iter().map(|tf| tf.as_str()).collect();
        let metrics: Vec<&str> = METRICS_TO_RETURN.iter().map(|m| m.as_str()).collect();
        json!({
            "chain": self.chain,
            "filters": filters,
            "sortBy": self.sort.to_json(),
            "timeFramesToReturn": timeframes,
            "metricsToReturn": metrics,
            "limit": self.limit,
        })
    }
}

/// Editable state of the filter dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterForm {
    pub chain: String,
    pub conditions: Vec<FilterCondition>,
    pub sort: DiscoverySort,
    pub limit: u32,
    next_id: u32,
}

impl Default for FilterForm {
    fn default() -> Self {
        Self {
            chain: "0x1".to_string(),
            conditions: vec![FilterCondition::default_with_id(1)],
            sort: DiscoverySort::default(),
            limit: 20,
            next_id: 2,
        }
    }
}

impl FilterForm {
    /// Appends a default condition and returns its id. Ids are never reused.
    pub fn add_condition(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.conditions.push(FilterCondition::default_with_id(id));
        id
    }

    pub fn remove_condition(&mut self, id: u32) -> bool {
        let before = self.conditions.len();
        self.conditions.retain(|c| c.id != id);
        self.conditions.len() != before
    }

    pub fn condition_mut(&mut self, id: u32) -> Option<&mut FilterCondition> {
        self.conditions.iter_mut().find(|c| c.id == id)
    }

    pub fn cycle_limit(&mut self) {
        self.limit = cycle(&RESULT_LIMITS, self.limit, true);
        if !RESULT_LIMITS.contains(&self.limit) {
            self.limit = RESULT_LIMITS[1];
        }
    }

    pub fn cycle_chain(&mut self, forward: bool) {
        let ids: Vec<&str> = DISCOVERY_CHAINS.iter().map(|(id, _)| *id).collect();
        let current = ids
            .iter()
            .copied()
            .find(|id| *id == self.chain)
            .unwrap_or(ids[0]);
        self.chain = cycle(&ids, current, forward).to_string();
    }

    pub fn chain_label(&self) -> &str {
        DISCOVERY_CHAINS
            .iter()
            .find(|(id, _)| *id == self.chain)
            .map(|(_, label)| *label)
            .unwrap_or(self.chain.as_str())
    }

    pub fn to_request(&self) -> DiscoveryRequest {
        DiscoveryRequest {
            chain: self.chain.clone(),
            filters: self.conditions.clone(),
            sort: self.sort,
            limit: self.limit,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryMetadata {
    #[serde(default)]
    pub chain_id: String,
    #[serde(default)]
    pub token_address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub logo: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub decimals: u32,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub usd_price: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub market_cap: f64,
    #[serde(default, alias = "fullyDilutedValuation")]
    #[serde_as(deserialize_as = "Lenient")]
    pub fully_diluted_value: f64,
}

/// One discovery result: typed identity plus the free-form metric table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoveryItem {
    #[serde(default)]
    pub metadata: DiscoveryMetadata,
    #[serde(default)]
    pub metrics: Value,
}

fn metric_by_timeframe(metrics: &Value, metric: DiscoveryMetric) -> PerTimeframe {
    PerTimeframe::from_fn(|tf| {
        let path = format!("{}.{}", metric.as_str(), DiscoveryTimeframe::from(tf).as_str());
        resolve_number(metrics, &path, 0.0)
    })
}

/// Buy plus sell volume per timeframe. Discovery has no transaction counts, so
/// rows carry this instead and are marked as estimated.
fn traded_volume(metrics: &Value) -> PerTimeframe {
    let buys = metric_by_timeframe(metrics, DiscoveryMetric::BuyVolumeUsd);
    let sells = metric_by_timeframe(metrics, DiscoveryMetric::SellVolumeUsd);
    PerTimeframe::from_fn(|tf| buys.get(tf) + sells.get(tf))
}

/// Reshapes a discovery result into a trending-table row.
pub fn summarize(item: DiscoveryItem) -> TokenSummary {
    let DiscoveryItem { metadata, metrics } = item;
    let holders = resolve_number(&metrics, "holders.oneDay", 0.0).max(0.0) as u64;

    TokenSummary {
        chain_id: metadata.chain_id,
        token_address: metadata.token_address,
        name: metadata.name,
        symbol: metadata.symbol,
        logo: metadata.logo,
        decimals: metadata.decimals,
        usd_price: metadata.usd_price,
        created_at: 0,
        market_cap: metadata.market_cap,
        fully_diluted_valuation: metadata.fully_diluted_value,
        liquidity_usd: metadata.fully_diluted_value * LIQUIDITY_FDV_RATIO,
        liquidity_estimated: true,
        holders,
        price_percent_change: metric_by_timeframe(&metrics, DiscoveryMetric::UsdPricePercentChange),
        total_volume: metric_by_timeframe(&metrics, DiscoveryMetric::VolumeUsd),
        transactions: traded_volume(&metrics),
        transactions_estimated: true,
        buy_transactions: PerTimeframe::default(),
        sell_transactions: PerTimeframe::default(),
        buyers: metric_by_timeframe(&metrics, DiscoveryMetric::Buyers),
        sellers: metric_by_timeframe(&metrics, DiscoveryMetric::Sellers),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_keyed_by_operator() {
        let condition = FilterCondition::new(
            1,
            DiscoveryMetric::Holders,
            DiscoveryTimeframe::OneDay,
            Operator::Gt,
            "100",
        );
        assert_eq!(
            condition.to_json(),
            json!({ "metric": "holders", "timeFrame": "oneDay", "gt": "100" })
        );
    }

    #[test]
    fn test_payload_shape() {
        let request = DiscoveryRequest {
            chain: "0x1".to_string(),
            filters: vec![FilterCondition::new(
                1,
                DiscoveryMetric::LiquidityChangeUsd,
                DiscoveryTimeframe::OneHour,
                Operator::Lt,
                "5000",
            )],
            sort: DiscoverySort::default(),
            limit: 50,
        };

        let payload = request.to_payload();
        assert_eq!(payload["chain"], "0x1");
        assert_eq!(payload["limit"], 50);
        assert_eq!(
            payload["filters"][0],
            json!({ "metric": "liquidityChangeUSD", "timeFrame": "oneHour", "lt": "5000" })
        );
        assert_eq!(
            payload["sortBy"],
            json!({ "metric": "experiencedBuyers", "timeFrame": "oneMonth", "type": "DESC" })
        );
        assert_eq!(payload["timeFramesToReturn"].as_array().map(Vec::len), Some(7));
        assert_eq!(payload["metricsToReturn"].as_array().map(Vec::len), Some(11));
    }

    #[test]
    fn test_form_ids_are_monotonic() {
        let mut form = FilterForm::default();
        assert_eq!(form.conditions.len(), 1);

        let second = form.add_condition();
        assert_eq!(second, 2);
        assert!(form.remove_condition(second));
        assert!(!form.remove_condition(second));

        let third = form.add_condition();
        assert_eq!(third, 3);

        if let Some(condition) = form.condition_mut(third) {
            condition.metric = DiscoveryMetric::Holders;
            condition.value = "100".to_string();
        }
        let request = form.to_request();
        assert_eq!(request.filters.len(), 2);
        assert_eq!(request.filters[1].to_json()["gt"], "100");
    }

    #[test]
    fn test_form_cycles() {
        let mut form = FilterForm::default();
        form.cycle_limit();
        assert_eq!(form.limit, 50);
        form.cycle_limit();
        form.cycle_limit();
        assert_eq!(form.limit, 10);

        form.cycle_chain(true);
        assert_eq!(form.chain, "solana");
        assert_eq!(form.chain_label(), "Solana");
        form.cycle_chain(false);
        form.cycle_chain(false);
        assert_eq!(form.chain, "0x7e4");

        assert_eq!(DiscoveryMetric::TokenAge.prev(), DiscoveryMetric::SecurityScore);
        assert_eq!(Operator::Eq.next(), Operator::Gt);
    }

    #[test]
    fn test_summarize_flags_estimated_liquidity() {
        let item: DiscoveryItem = serde_json::from_value(json!({
            "metadata": {
                "chainId": "0x1",
                "tokenAddress": "0xabc",
                "symbol": "PEPE",
                "usdPrice": 0.5,
                "marketCap": "1000000",
                "fullyDilutedValue": "2000000",
                "totalSupply": "999999999"
            },
            "metrics": {
                "holders": { "oneDay": 321 },
                "usdPricePercentChange": { "oneHour": 1.5, "oneDay": -4 },
                "volumeUsd": { "oneDay": "12345.5" },
                "buyVolumeUsd": { "oneHour": 40, "oneDay": "700.25" },
                "sellVolumeUsd": { "oneDay": 299.75 },
                "buyers": { "fourHours": 10 },
                "sellers": { "fourHours": 4 }
            }
        }))
        .unwrap();

        let row = summarize(item);
        assert_eq!(row.token_address, "0xabc");
        assert_eq!(row.market_cap, 1_000_000.0);
        assert!((row.liquidity_usd - 200_000.0).abs() < 1e-6);
        assert!(row.liquidity_estimated);
        assert_eq!(row.holders, 321);
        assert_eq!(row.price_percent_change.get(Timeframe::OneHour), 1.5);
        assert_eq!(row.price_percent_change.get(Timeframe::OneDay), -4.0);
        assert_eq!(row.total_volume.get(Timeframe::OneDay), 12345.5);
        assert_eq!(row.makers(Timeframe::FourHours), 14.0);
        assert_eq!(row.transactions.get(Timeframe::OneDay), 1000.0);
        assert_eq!(row.transactions.get(Timeframe::OneHour), 40.0);
        assert_eq!(row.transactions.get(Timeframe::FourHours), 0.0);
        assert!(row.transactions_estimated);
        assert!(row.created().is_none());
    }

    #[test]
    fn test_summarize_tolerates_missing_metrics() {
        let row = summarize(serde_json::from_value(json!({ "metadata": {} })).unwrap());
        assert_eq!(row.liquidity_usd, 0.0);
        assert_eq!(row.holders, 0);
    }
}
