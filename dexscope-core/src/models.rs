use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError, DisplayFromStr, PickFirst, Same};
use std::collections::BTreeMap;

/// Accepts a JSON number or a numeric string. Anything else, `null` included, becomes the default.
pub type Lenient = DefaultOnError<PickFirst<(Same, DisplayFromStr)>>;

/// Fixed timeframe keys of the trending / discovery summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Timeframe {
    OneHour,
    FourHours,
    TwelveHours,
    OneDay,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::OneHour,
        Timeframe::FourHours,
        Timeframe::TwelveHours,
        Timeframe::OneDay,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
            Timeframe::TwelveHours => "12h",
            Timeframe::OneDay => "24h",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tf| tf.label() == label)
    }
}

/// One value per [`Timeframe`]; absent timeframes read as zero.
#[serde_as]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerTimeframe {
    #[serde(rename = "1h", default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub one_hour: f64,
    #[serde(rename = "4h", default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub four_hours: f64,
    #[serde(rename = "12h", default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub twelve_hours: f64,
    #[serde(rename = "24h", default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub one_day: f64,
}

impl PerTimeframe {
    pub fn from_fn(mut value: impl FnMut(Timeframe) -> f64) -> Self {
        Self {
            one_hour: value(Timeframe::OneHour),
            four_hours: value(Timeframe::FourHours),
            twelve_hours: value(Timeframe::TwelveHours),
            one_day: value(Timeframe::OneDay),
        }
    }

    pub fn get(&self, timeframe: Timeframe) -> f64 {
        match timeframe {
            Timeframe::OneHour => self.one_hour,
            Timeframe::FourHours => self.four_hours,
            Timeframe::TwelveHours => self.twelve_hours,
            Timeframe::OneDay => self.one_day,
        }
    }
}

/// A row of the trending table. Discovery results are reshaped into the same record.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSummary {
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
    /// Unix seconds; zero when unknown.
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub created_at: i64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub market_cap: f64,
    #[serde(default, alias = "fullyDilutedValue")]
    #[serde_as(deserialize_as = "Lenient")]
    pub fully_diluted_valuation: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub liquidity_usd: f64,
    /// Set when `liquidity_usd` is a stand-in rather than a measured value.
    #[serde(default)]
    pub liquidity_estimated: bool,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub holders: u64,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub price_percent_change: PerTimeframe,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub total_volume: PerTimeframe,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub transactions: PerTimeframe,
    /// Set when `transactions` is traded volume standing in for a count.
    #[serde(default)]
    pub transactions_estimated: bool,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub buy_transactions: PerTimeframe,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub sell_transactions: PerTimeframe,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub buyers: PerTimeframe,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub sellers: PerTimeframe,
}

impl TokenSummary {
    pub fn display_symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or("???")
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }

    pub fn makers(&self, timeframe: Timeframe) -> f64 {
        self.buyers.get(timeframe) + self.sellers.get(timeframe)
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        if self.created_at <= 0 {
            return None;
        }
        DateTime::from_timestamp(self.created_at, 0)
    }
}

#[serde_as]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayChange {
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub one_day: f64,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub token_address: String,
    #[serde(default)]
    pub chain_id: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub logo: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub usd_price: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub market_cap: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub usd_price_percent_change: Option<DayChange>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrice {
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub usd_price: f64,
    #[serde(default, rename = "24hrPercentChange")]
    #[serde_as(deserialize_as = "Lenient")]
    pub percent_change_24h: f64,
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
    pub exchange_name: Option<String>,
    pub pair_address: Option<String>,
}

/// Token metadata; EVM and Solana responses differ in casing and are folded together here.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(default, alias = "mint")]
    pub address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub logo: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub decimals: u32,
    #[serde(default, alias = "marketCap")]
    #[serde_as(deserialize_as = "Lenient")]
    pub market_cap: f64,
    #[serde(default, alias = "fullyDilutedValue")]
    #[serde_as(deserialize_as = "Lenient")]
    pub fully_diluted_valuation: f64,
    #[serde(default, alias = "totalSupplyFormatted")]
    pub total_supply_formatted: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub links: BTreeMap<String, Option<String>>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub categories: Vec<String>,
}

impl TokenMetadata {
    /// FDV when known, market cap otherwise.
    pub fn valuation(&self) -> f64 {
        if self.fully_diluted_valuation > 0.0 {
            self.fully_diluted_valuation
        } else {
            self.market_cap
        }
    }

    pub fn links(&self) -> impl Iterator<Item = (&str, &str)> {
        self.links
            .iter()
            .filter_map(|(name, url)| url.as_deref().map(|u| (name.as_str(), u)))
            .filter(|(_, url)| !url.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairRole {
    Base,
    Quote,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairToken {
    #[serde(default, alias = "token_address")]
    pub token_address: String,
    #[serde(alias = "token_name")]
    pub token_name: Option<String>,
    #[serde(alias = "token_symbol")]
    pub token_symbol: Option<String>,
    #[serde(alias = "token_logo")]
    pub token_logo: Option<String>,
    #[serde(default, alias = "token_decimals")]
    #[serde_as(deserialize_as = "Lenient")]
    pub token_decimals: u32,
    #[serde(alias = "pair_token_type")]
    pub pair_token_type: Option<String>,
    #[serde(default, alias = "liquidity_usd")]
    #[serde_as(deserialize_as = "Lenient")]
    pub liquidity_usd: f64,
}

impl PairToken {
    pub fn role(&self) -> Option<PairRole> {
        match self.pair_token_type.as_deref() {
            Some("token0") => Some(PairRole::Base),
            Some("token1") => Some(PairRole::Quote),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &str {
        self.token_symbol.as_deref().unwrap_or("TOKEN")
    }
}

/// A trading venue for two tokens, normalised from either snake_case or camelCase payloads.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    #[serde(default)]
    pub chain_id: String,
    #[serde(default, alias = "pair_address")]
    pub pair_address: String,
    #[serde(alias = "exchange_name")]
    pub exchange_name: Option<String>,
    #[serde(alias = "exchange_logo")]
    pub exchange_logo: Option<String>,
    #[serde(alias = "pair_label")]
    pub pair_label: Option<String>,
    #[serde(default, alias = "liquidity_usd")]
    #[serde_as(deserialize_as = "Lenient")]
    pub liquidity_usd: f64,
    #[serde(default, alias = "usd_price")]
    #[serde_as(deserialize_as = "Lenient")]
    pub usd_price: f64,
    #[serde(default, alias = "usd_price_24hr_percent_change")]
    #[serde_as(deserialize_as = "Lenient")]
    pub usd_price24hr_percent_change: f64,
    #[serde(default, alias = "volume_24h_usd")]
    #[serde_as(deserialize_as = "Lenient")]
    pub volume24hr_usd: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub pair: Vec<PairToken>,
}

impl Pair {
    fn token_with_role(&self, role: PairRole) -> Option<&PairToken> {
        self.pair.iter().find(|t| t.role() == Some(role))
    }

    pub fn base_token(&self) -> Option<&PairToken> {
        self.token_with_role(PairRole::Base).or_else(|| self.pair.first())
    }

    pub fn quote_token(&self) -> Option<&PairToken> {
        self.token_with_role(PairRole::Quote).or_else(|| self.pair.get(1))
    }

    pub fn label(&self) -> String {
        if let Some(label) = self.pair_label.as_deref().filter(|l| !l.is_empty()) {
            return label.to_string();
        }
        match (self.base_token(), self.quote_token()) {
            (Some(base), Some(quote)) => format!("{}/{}", base.symbol(), quote.symbol()),
            _ => self.pair_address.clone(),
        }
    }

    /// Token in this pair matching `address`, falling back to the first listed token.
    pub fn token_for(&self, address: &str) -> Option<&PairToken> {
        self.pair
            .iter()
            .find(|t| t.token_address.eq_ignore_ascii_case(address))
            .or_else(|| self.pair.first())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PairsResponse {
    #[serde(default)]
    pub pairs: Vec<Pair>,
}

/// Periods reported by the pair statistics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsPeriod {
    FiveMinutes,
    OneHour,
    FourHours,
    OneDay,
}

impl StatsPeriod {
    pub const ALL: [StatsPeriod; 4] = [
        StatsPeriod::FiveMinutes,
        StatsPeriod::OneHour,
        StatsPeriod::FourHours,
        StatsPeriod::OneDay,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatsPeriod::FiveMinutes => "5m",
            StatsPeriod::OneHour => "1h",
            StatsPeriod::FourHours => "4h",
            StatsPeriod::OneDay => "24h",
        }
    }

    pub fn next(self) -> Self {
        match self {
            StatsPeriod::FiveMinutes => StatsPeriod::OneHour,
            StatsPeriod::OneHour => StatsPeriod::FourHours,
            StatsPeriod::FourHours => StatsPeriod::OneDay,
            StatsPeriod::OneDay => StatsPeriod::FiveMinutes,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodValues {
    #[serde(rename = "5min", default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub five_minutes: f64,
    #[serde(rename = "1h", default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub one_hour: f64,
    #[serde(rename = "4h", default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub four_hours: f64,
    #[serde(rename = "24h", default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub one_day: f64,
}

impl PeriodValues {
    pub fn get(&self, period: StatsPeriod) -> f64 {
        match period {
            StatsPeriod::FiveMinutes => self.five_minutes,
            StatsPeriod::OneHour => self.one_hour,
            StatsPeriod::FourHours => self.four_hours,
            StatsPeriod::OneDay => self.one_day,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairStats {
    pub pair_label: Option<String>,
    pub exchange: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub current_usd_price: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub total_liquidity_usd: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub price_percent_change: PeriodValues,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub buys: PeriodValues,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub sells: PeriodValues,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub total_volume: PeriodValues,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub buy_volume: PeriodValues,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub sell_volume: PeriodValues,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub buyers: PeriodValues,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub sellers: PeriodValues,
}

/// Activity of a pair over one period.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodSnapshot {
    pub price_change: f64,
    pub buys: f64,
    pub sells: f64,
    pub buy_volume: f64,
    pub sell_volume: f64,
    pub buyers: f64,
    pub sellers: f64,
    pub total_volume: f64,
}

impl PairStats {
    pub fn period(&self, period: StatsPeriod) -> PeriodSnapshot {
        PeriodSnapshot {
            price_change: self.price_percent_change.get(period),
            buys: self.buys.get(period),
            sells: self.sells.get(period),
            buy_volume: self.buy_volume.get(period),
            sell_volume: self.sell_volume.get(period),
            buyers: self.buyers.get(period),
            sellers: self.sellers.get(period),
            total_volume: self.total_volume.get(period),
        }
    }
}

/// Share of `a` in `a + b`, or an even split when there is nothing to compare.
pub fn buy_ratio(a: f64, b: f64) -> f64 {
    let total = a + b;
    if total <= 0.0 || !total.is_finite() {
        return 0.5;
    }
    a / total
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Buy,
    Sell,
    AddLiquidity,
    RemoveLiquidity,
    Other,
}

impl TransactionType {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "buy" => TransactionType::Buy,
            "sell" => TransactionType::Sell,
            "addliquidity" => TransactionType::AddLiquidity,
            "removeliquidity" => TransactionType::RemoveLiquidity,
            _ => TransactionType::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionType::Buy => "Buy",
            TransactionType::Sell => "Sell",
            TransactionType::AddLiquidity => "Add Liquidity",
            TransactionType::RemoveLiquidity => "Remove Liquidity",
            TransactionType::Other => "Unknown",
        }
    }

    pub fn is_inflow(self) -> bool {
        matches!(self, TransactionType::Buy | TransactionType::AddLiquidity)
    }
}

/// One swap on a pair. Identity is the transaction hash.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swap {
    #[serde(default)]
    pub transaction_hash: String,
    #[serde(default)]
    pub transaction_type: String,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub block_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub wallet_address: String,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub base_token_amount: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub quote_token_amount: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub base_token_price_usd: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub total_value_usd: f64,
}

impl Swap {
    pub fn kind(&self) -> TransactionType {
        TransactionType::parse(&self.transaction_type)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwapToken {
    #[serde(default)]
    pub address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapPage {
    pub cursor: Option<String>,
    pub pair_label: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub base_token: Option<SwapToken>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub quote_token: Option<SwapToken>,
    #[serde(default)]
    pub result: Vec<Swap>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Holder {
    #[serde(default)]
    pub owner_address: String,
    pub owner_address_label: Option<String>,
    pub entity: Option<String>,
    #[serde(default)]
    pub is_contract: bool,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub balance_formatted: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub usd_value: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub percentage_relative_to_total_supply: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HolderPage {
    pub cursor: Option<String>,
    #[serde(default)]
    pub result: Vec<Holder>,
}

#[serde_as]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HoldersByAcquisition {
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub swap: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub transfer: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub airdrop: f64,
}

#[serde_as]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderChange {
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub change: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub change_percent: f64,
}

#[serde_as]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyTier {
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub supply: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub supply_percent: f64,
}

const HOLDER_CHANGE_ORDER: [&str; 7] = ["5min", "1h", "6h", "24h", "3d", "7d", "30d"];

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderInsights {
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub total_holders: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub holders_by_acquisition: HoldersByAcquisition,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub holder_change: BTreeMap<String, HolderChange>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub holder_supply: BTreeMap<String, SupplyTier>,
}

/// Percentages of holders that acquired the token by swap, transfer and airdrop.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AcquisitionShares {
    pub swap: f64,
    pub transfer: f64,
    pub airdrop: f64,
}

impl HolderInsights {
    pub fn acquisition_shares(&self) -> AcquisitionShares {
        if self.total_holders <= 0.0 {
            return AcquisitionShares::default();
        }
        let share = |n: f64| n * 100.0 / self.total_holders;
        let by = &self.holders_by_acquisition;
        AcquisitionShares {
            swap: share(by.swap),
            transfer: share(by.transfer),
            airdrop: share(by.airdrop),
        }
    }

    /// Holder change entries ordered from the shortest period to the longest.
    pub fn ordered_changes(&self) -> Vec<(&str, HolderChange)> {
        let rank = |key: &str| {
            HOLDER_CHANGE_ORDER
                .iter()
                .position(|k| *k == key)
                .unwrap_or(HOLDER_CHANGE_ORDER.len())
        };
        let mut entries: Vec<_> = self
            .holder_change
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        entries.sort_by_key(|(k, _)| rank(k));
        entries
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnipedTransaction {
    #[serde(default)]
    pub transaction_hash: String,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub blocks_after_creation: u64,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sniper {
    #[serde(default)]
    pub wallet_address: String,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub total_sniped_usd: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub total_sniped_transactions: u64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub total_sell_transactions: u64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub total_sold_usd: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub realized_profit_usd: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub realized_profit_percentage: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub current_balance_usd_value: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub sniped_transactions: Vec<SnipedTransaction>,
}

impl Sniper {
    pub fn first_entry_blocks(&self) -> Option<u64> {
        self.sniped_transactions
            .first()
            .map(|tx| tx.blocks_after_creation)
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainNetWorth {
    #[serde(default)]
    pub chain: String,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub native_balance_formatted: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub native_balance_usd: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub token_balance_usd: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub networth_usd: f64,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetWorth {
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub total_networth_usd: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub chains: Vec<ChainNetWorth>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletToken {
    /// Filled in by the client; the endpoint is queried per chain.
    #[serde(default)]
    pub chain: String,
    #[serde(default)]
    pub token_address: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub logo: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub decimals: u32,
    #[serde(default)]
    pub balance: String,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub usd_price: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub usd_price_24hr_percent_change: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub usd_value: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub portfolio_percentage: f64,
    #[serde(default)]
    pub native_token: bool,
    #[serde(default)]
    pub possible_spam: bool,
}

/// Lifecycle stage of a launch-platform token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PumpStage {
    New,
    Bonding,
    Graduated,
}

impl PumpStage {
    pub const ALL: [PumpStage; 3] = [PumpStage::New, PumpStage::Bonding, PumpStage::Graduated];

    pub fn endpoint(self) -> &'static str {
        match self {
            PumpStage::New => "new",
            PumpStage::Bonding => "bonding",
            PumpStage::Graduated => "graduated",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PumpStage::New => "New Tokens",
            PumpStage::Bonding => "Bonding",
            PumpStage::Graduated => "Graduated",
        }
    }

    pub fn index(self) -> usize {
        match self {
            PumpStage::New => 0,
            PumpStage::Bonding => 1,
            PumpStage::Graduated => 2,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpToken {
    #[serde(default)]
    pub token_address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub logo: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub price_usd: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub liquidity: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub fully_diluted_valuation: f64,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub graduated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[serde_as(deserialize_as = "Lenient")]
    pub bonding_curve_progress: f64,
}

impl PumpToken {
    pub fn display_symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or("???")
    }
}

/// `{ "result": [...] }` envelope used by most list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub result: Vec<T>,
}

/// Some list endpoints answer with a bare array, others with a `result` envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Wrapped(ResultEnvelope<T>),
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) => items,
            Listing::Wrapped(envelope) => envelope.result,
        }
    }
}
