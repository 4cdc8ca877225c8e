use std::time::{Duration, Instant};

use dexscope_core::chain::{chain_id_from_path, chain_name, SIDEBAR_CHAINS, SOLANA};
use dexscope_core::config::PollingConfig;
use dexscope_core::feed::{FeedState, Keyed, PollHandle, PollUpdate};
use dexscope_core::generation::{Generation, Ticket};
use dexscope_core::models::{
    Holder, HolderInsights, NetWorth, Pair, PairStats, PumpStage, PumpToken, SearchResult,
    Sniper, StatsPeriod, Swap, TokenMetadata, TokenSummary, WalletToken,
};
use dexscope_core::panel::ResizablePanel;
use dexscope_core::portfolio::{resolve_chain, ChainFilter};
use dexscope_core::search::{Debouncer, SearchAction};
use dexscope_core::sort::{sort_records, SortColumn, TableSort};
use dexscope_core::wallets::WalletStore;
use dexscope_core::ApiError;
use tracing::{debug, info};

use crate::event::{AppEvent, Command};
use crate::filter::FilterModal;

const MAX_LOGS: usize = 50;
const PANEL_HEIGHT: u16 = 16;
const PANEL_MIN_HEIGHT: u16 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `chain` is an API chain id; `None` lists every chain.
    Trending { chain: Option<String> },
    Token { chain: String, address: String },
    Portfolio,
    PumpFun,
}

/// Foreground fetch state. Failures keep the user-facing message.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Load<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Load<T> {
    pub fn from_result(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Load::Ready(value),
            Err(err) => Load::Failed(err.message()),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Load::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Load::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendingSource {
    Trending,
    Discovery,
}

#[derive(Debug)]
pub struct TrendingView {
    pub chain: Option<String>,
    pub source: TrendingSource,
    /// Rows in API order.
    pub tokens: Load<Vec<TokenSummary>>,
    /// Rows in display order.
    pub rows: Vec<TokenSummary>,
    pub sort: TableSort,
    pub selected: usize,
}

impl TrendingView {
    fn new(chain: Option<String>) -> Self {
        Self {
            chain,
            source: TrendingSource::Trending,
            tokens: Load::Loading,
            rows: Vec::new(),
            sort: TableSort::default(),
            selected: 0,
        }
    }

    fn resort(&mut self) {
        self.rows = self.tokens.ready().cloned().unwrap_or_default();
        sort_records(&mut self.rows, self.sort.spec().as_ref());
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTab {
    Transactions,
    Holders,
    Insights,
    Snipers,
}

impl TokenTab {
    pub const ALL: [TokenTab; 4] = [
        TokenTab::Transactions,
        TokenTab::Holders,
        TokenTab::Insights,
        TokenTab::Snipers,
    ];

    pub fn title(self) -> &'static str {
        match self {
            TokenTab::Transactions => "Transactions",
            TokenTab::Holders => "Holders",
            TokenTab::Insights => "Holder Insights",
            TokenTab::Snipers => "Snipers",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn step(self, forward: bool) -> Self {
        let len = Self::ALL.len();
        let index = self.index();
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        Self::ALL[next]
    }
}

#[derive(Debug)]
pub struct TokenView {
    pub chain: String,
    pub address: String,
    pub metadata: Load<Option<TokenMetadata>>,
    pub pairs: Load<Vec<Pair>>,
    pub pair_index: usize,
    pub stats: Load<PairStats>,
    pub period: StatsPeriod,
    pub tab: TokenTab,
    pub swaps: FeedState<Swap>,
    pub swaps_status: Load<()>,
    swap_poller: Option<PollHandle>,
    pub holders: Load<Vec<Holder>>,
    pub holders_cursor: Option<String>,
    pub loading_more: bool,
    pub insights: Load<HolderInsights>,
    pub snipers: Load<Vec<Sniper>>,
    pub panel: ResizablePanel,
    pub selected_row: usize,
    /// Screen row of the panel's drag handle, recorded while rendering.
    pub handle_row: Option<u16>,
}

impl TokenView {
    fn new(chain: String, address: String, polling: &PollingConfig) -> Self {
        Self {
            chain,
            address,
            metadata: Load::Loading,
            pairs: Load::Loading,
            pair_index: 0,
            stats: Load::Idle,
            period: StatsPeriod::OneDay,
            tab: TokenTab::Transactions,
            swaps: new_feed(polling),
            swaps_status: Load::Idle,
            swap_poller: None,
            holders: Load::Idle,
            holders_cursor: None,
            loading_more: false,
            insights: Load::Idle,
            snipers: Load::Idle,
            panel: ResizablePanel::new(PANEL_HEIGHT, PANEL_MIN_HEIGHT),
            selected_row: 0,
            handle_row: None,
        }
    }

    pub fn pair(&self) -> Option<&Pair> {
        self.pairs.ready().and_then(|pairs| pairs.get(self.pair_index))
    }

    pub fn is_polling(&self) -> bool {
        self.swap_poller.as_ref().is_some_and(|p| !p.is_finished())
    }

    /// Rows in the active tab's table.
    pub fn row_count(&self) -> usize {
        match self.tab {
            TokenTab::Transactions => self.swaps.len(),
            TokenTab::Holders => self.holders.ready().map_or(0, Vec::len),
            TokenTab::Insights => 0,
            TokenTab::Snipers => self.snipers.ready().map_or(0, Vec::len),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Address,
}

#[derive(Debug, Clone)]
pub struct WalletForm {
    pub name: String,
    pub address: String,
    pub focus: FormField,
    pub error: Option<String>,
}

impl WalletForm {
    fn new() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            focus: FormField::Name,
            error: None,
        }
    }

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Name => &mut self.name,
            FormField::Address => &mut self.address,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FormField::Name => FormField::Address,
            FormField::Address => FormField::Name,
        };
    }
}

#[derive(Debug, Default)]
pub struct PortfolioView {
    pub form: Option<WalletForm>,
    pub chain_filter: ChainFilter,
    pub net_worth: Load<NetWorth>,
    pub holdings: Load<Vec<WalletToken>>,
    /// Chain the holdings table is showing.
    pub holdings_chain: Option<String>,
}

#[derive(Debug)]
pub struct Board {
    pub stage: PumpStage,
    pub feed: FeedState<PumpToken>,
    pub status: Load<()>,
    pub selected: usize,
}

#[derive(Debug)]
pub struct PumpView {
    pub boards: Vec<Board>,
    pub focus: usize,
    pollers: Vec<PollHandle>,
}

impl PumpView {
    fn new(polling: &PollingConfig) -> Self {
        Self {
            boards: PumpStage::ALL
                .iter()
                .map(|stage| Board {
                    stage: *stage,
                    feed: new_feed(polling),
                    status: Load::Loading,
                    selected: 0,
                })
                .collect(),
            focus: 0,
            pollers: Vec::new(),
        }
    }

    pub fn is_polling(&self) -> bool {
        self.pollers.iter().any(|p| !p.is_finished())
    }
}

#[derive(Debug)]
pub enum View {
    Trending(TrendingView),
    Token(TokenView),
    Portfolio(PortfolioView),
    PumpFun(PumpView),
}

#[derive(Debug)]
pub struct SearchModal {
    pub open: bool,
    pub debouncer: Debouncer,
    pub results: Load<Vec<SearchResult>>,
    pub suggestions: Load<Vec<TokenSummary>>,
    pub selected: usize,
}

/// A row of the search modal, from either results or suggestions.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchEntry {
    pub chain: String,
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: Option<f64>,
}

impl SearchModal {
    pub fn showing_suggestions(&self) -> bool {
        self.debouncer.query().trim().is_empty()
    }

    pub fn entries(&self) -> Vec<SearchEntry> {
        if self.showing_suggestions() {
            return self
                .suggestions
                .ready()
                .map(|tokens| {
                    tokens
                        .iter()
                        .map(|t| SearchEntry {
                            chain: t.chain_id.clone(),
                            address: t.token_address.clone(),
                            symbol: t.display_symbol().to_string(),
                            name: t.display_name().to_string(),
                            price: t.usd_price,
                            change: Some(t.price_percent_change.one_day),
                        })
                        .collect()
                })
                .unwrap_or_default();
        }
        self.results
            .ready()
            .map(|results| {
                results
                    .iter()
                    .map(|r| SearchEntry {
                        chain: r.chain_id.clone(),
                        address: r.token_address.clone(),
                        symbol: r.symbol.clone().unwrap_or_else(|| "???".to_string()),
                        name: r.name.clone().unwrap_or_default(),
                        price: r.usd_price,
                        change: r.usd_price_percent_change.map(|c| c.one_day),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One counter per independently refreshed resource.
#[derive(Debug, Default)]
struct Generations {
    trending: Generation,
    search: Generation,
    suggestions: Generation,
    token: Generation,
    pair: Generation,
    holders: Generation,
    insights: Generation,
    net_worth: Generation,
    wallet_tokens: Generation,
    pump: Generation,
}

pub struct App {
    pub should_quit: bool,
    pub logs: Vec<String>,
    pub theme: Theme,
    pub view: View,
    /// 0 is "all chains", then one entry per sidebar chain.
    pub sidebar: usize,
    pub wallets: WalletStore,
    pub search: SearchModal,
    pub filter: FilterModal,
    pub polling: PollingConfig,
    generations: Generations,
}

fn new_feed<T: Keyed>(polling: &PollingConfig) -> FeedState<T> {
    FeedState::new(
        Duration::from_secs(polling.highlight_secs),
        polling.feed_capacity,
    )
}

fn sidebar_chain(index: usize) -> Option<String> {
    index
        .checked_sub(1)
        .and_then(|i| SIDEBAR_CHAINS.get(i))
        .map(|(segment, _)| chain_id_from_path(segment))
}

/// How a feed takes a later poll once it has been seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedMode {
    /// Append-only history: unseen rows are prepended.
    Merge,
    /// Live boards: the latest fetch replaces every row.
    Refresh,
}

/// Applies a polled update to a feed: the first successful result seeds it,
/// later ones merge or refresh according to `mode`.
fn apply_poll<T: Keyed>(
    feed: &mut FeedState<T>,
    status: &mut Load<()>,
    update: PollUpdate<T>,
    mode: FeedMode,
    now: Instant,
) {
    match update {
        PollUpdate::Initial(Ok(items)) | PollUpdate::Tick(items)
            if !matches!(status, Load::Ready(())) =>
        {
            feed.seed(items);
            *status = Load::Ready(());
        }
        PollUpdate::Initial(Ok(items)) | PollUpdate::Tick(items) => {
            let now = tokio::time::Instant::from_std(now);
            let added = match mode {
                FeedMode::Merge => feed.merge(items, now),
                FeedMode::Refresh => feed.refresh(items, now),
            };
            if added > 0 {
                debug!(added, ?mode, "new feed rows");
            }
        }
        PollUpdate::Initial(Err(err)) => *status = Load::Failed(err.message()),
    }
}

impl App {
    pub fn new(wallets: WalletStore, polling: PollingConfig) -> Self {
        Self {
            should_quit: false,
            logs: vec!["Welcome to dexscope".to_string()],
            theme: Theme::Dark,
            view: View::Trending(TrendingView::new(None)),
            sidebar: 0,
            wallets,
            search: SearchModal {
                open: false,
                debouncer: Debouncer::new(Duration::from_millis(polling.search_debounce_ms)),
                results: Load::Idle,
                suggestions: Load::Idle,
                selected: 0,
            },
            filter: FilterModal::default(),
            polling,
            generations: Generations::default(),
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn toggle_theme(&mut self) {
        self.theme = match self.theme {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        };
    }

    pub fn add_log(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.logs.push(message);
        if self.logs.len() > MAX_LOGS {
            self.logs.remove(0);
        }
    }

    pub fn route(&self) -> Route {
        match &self.view {
            View::Trending(view) => Route::Trending {
                chain: view.chain.clone(),
            },
            View::Token(view) => Route::Token {
                chain: view.chain.clone(),
                address: view.address.clone(),
            },
            View::Portfolio(_) => Route::Portfolio,
            View::PumpFun(_) => Route::PumpFun,
        }
    }

    pub fn sidebar_chain(&self) -> Option<String> {
        sidebar_chain(self.sidebar)
    }

    /// Replaces the current view. The old view's pollers stop when it is dropped.
    pub fn navigate(&mut self, route: Route) -> Vec<Command> {
        debug!(?route, "navigate");
        match route {
            Route::Trending { chain } => {
                let ticket = self.generations.trending.begin();
                self.show_trending(chain.clone());
                vec![Command::FetchTrending { ticket, chain }]
            }
            Route::Token { chain, address } => {
                self.generations.pair.invalidate();
                self.generations.holders.invalidate();
                self.generations.insights.invalidate();
                let ticket = self.generations.token.begin();
                self.view = View::Token(TokenView::new(
                    chain.clone(),
                    address.clone(),
                    &self.polling,
                ));
                vec![Command::LoadToken {
                    ticket,
                    chain,
                    address,
                }]
            }
            Route::Portfolio => {
                self.view = View::Portfolio(PortfolioView::default());
                self.reload_portfolio()
            }
            Route::PumpFun => {
                let ticket = self.generations.pump.begin();
                self.view = View::PumpFun(PumpView::new(&self.polling));
                vec![Command::WatchPumpBoards { ticket }]
            }
        }
    }

    /// Swaps in an empty trending view and syncs the sidebar. Fetching is up to the caller.
    fn show_trending(&mut self, chain: Option<String>) {
        self.sidebar = match chain.as_deref() {
            None => 0,
            Some(id) => SIDEBAR_CHAINS
                .iter()
                .position(|(segment, _)| chain_id_from_path(segment) == id)
                .map_or(0, |i| i + 1),
        };
        self.view = View::Trending(TrendingView::new(chain));
    }

    /// Moves the sidebar selection and opens that chain's trending list.
    pub fn step_sidebar(&mut self, forward: bool) -> Vec<Command> {
        let len = SIDEBAR_CHAINS.len() + 1;
        let next = if forward {
            (self.sidebar + 1) % len
        } else {
            (self.sidebar + len - 1) % len
        };
        self.navigate(Route::Trending {
            chain: sidebar_chain(next),
        })
    }

    pub fn trending_title(&self) -> String {
        match self.sidebar_chain() {
            Some(chain) => chain_name(&chain),
            None => "All chains".to_string(),
        }
    }

    // Trending

    pub fn toggle_sort(&mut self, column: SortColumn) {
        if let View::Trending(view) = &mut self.view {
            view.sort.toggle(column);
            view.resort();
        }
    }

    /// Back to the plain trending list with no sort and no filters.
    pub fn reset_filters(&mut self) -> Vec<Command> {
        self.filter.form = Default::default();
        let chain = match &self.view {
            View::Trending(view) => view.chain.clone(),
            _ => self.sidebar_chain(),
        };
        self.navigate(Route::Trending { chain })
    }

    pub fn apply_filters(&mut self) -> Vec<Command> {
        self.filter.open = false;
        let request = self.filter.request();
        if !matches!(self.view, View::Trending(_)) {
            let chain = self.sidebar_chain();
            self.show_trending(chain);
        }
        let ticket = self.generations.trending.begin();
        if let View::Trending(view) = &mut self.view {
            view.source = TrendingSource::Discovery;
            view.tokens = Load::Loading;
            view.rows.clear();
            view.selected = 0;
        }
        self.add_log(format!(
            "Filtering {} with {} condition(s)",
            self.filter.form.chain_label(),
            request.filters.len()
        ));
        vec![Command::Discover { ticket, request }]
    }

    // Search

    pub fn open_search(&mut self) -> Vec<Command> {
        self.search.open = true;
        self.search.selected = 0;
        if self.search.suggestions.is_idle() {
            self.search.suggestions = Load::Loading;
            let ticket = self.generations.suggestions.begin();
            return vec![Command::FetchSuggestions { ticket }];
        }
        Vec::new()
    }

    pub fn close_search(&mut self) {
        self.search.open = false;
        self.search.debouncer.clear();
        self.search.results = Load::Idle;
        self.search.selected = 0;
        self.generations.search.invalidate();
    }

    pub fn edit_search(&mut self, edit: impl FnOnce(&mut String), now: Instant) {
        let mut query = self.search.debouncer.query().to_string();
        edit(&mut query);
        self.search.debouncer.input(query, now);
        self.search.selected = 0;
    }

    pub fn open_search_selection(&mut self) -> Vec<Command> {
        let entry = self.search.entries().into_iter().nth(self.search.selected);
        match entry {
            Some(entry) => {
                self.close_search();
                self.navigate(Route::Token {
                    chain: entry.chain,
                    address: entry.address,
                })
            }
            None => Vec::new(),
        }
    }

    // Token

    fn load_pair(&mut self) -> Vec<Command> {
        let ticket = self.generations.pair.begin();
        let View::Token(view) = &mut self.view else {
            return Vec::new();
        };
        view.swap_poller = None;
        view.swaps.clear();
        view.selected_row = 0;
        let Some(pair) = view.pair().map(|p| p.pair_address.clone()) else {
            view.stats = Load::Idle;
            view.swaps_status = Load::Idle;
            view.snipers = Load::Idle;
            return Vec::new();
        };
        view.stats = Load::Loading;
        view.swaps_status = Load::Loading;
        view.snipers = Load::Loading;
        vec![Command::LoadPair {
            ticket,
            chain: view.chain.clone(),
            pair,
        }]
    }

    pub fn step_pair(&mut self, forward: bool) -> Vec<Command> {
        let View::Token(view) = &mut self.view else {
            return Vec::new();
        };
        let count = view.pairs.ready().map_or(0, Vec::len);
        if count < 2 {
            return Vec::new();
        }
        view.pair_index = if forward {
            (view.pair_index + 1) % count
        } else {
            (view.pair_index + count - 1) % count
        };
        self.load_pair()
    }

    /// Switches tab, fetching holder data the first time its tab is shown.
    pub fn step_tab(&mut self, forward: bool) -> Vec<Command> {
        let View::Token(view) = &mut self.view else {
            return Vec::new();
        };
        view.tab = view.tab.step(forward);
        view.selected_row = 0;
        match view.tab {
            TokenTab::Holders if view.holders.is_idle() => {
                view.holders = Load::Loading;
                let ticket = self.generations.holders.begin();
                vec![Command::LoadHolders {
                    ticket,
                    chain: view.chain.clone(),
                    address: view.address.clone(),
                    cursor: None,
                }]
            }
            TokenTab::Insights if view.insights.is_idle() => {
                view.insights = Load::Loading;
                let ticket = self.generations.insights.begin();
                vec![Command::LoadInsights {
                    ticket,
                    chain: view.chain.clone(),
                    address: view.address.clone(),
                }]
            }
            _ => Vec::new(),
        }
    }

    pub fn load_more_holders(&mut self) -> Vec<Command> {
        let View::Token(view) = &mut self.view else {
            return Vec::new();
        };
        if view.tab != TokenTab::Holders || view.loading_more {
            return Vec::new();
        }
        let Some(cursor) = view.holders_cursor.clone() else {
            return Vec::new();
        };
        view.loading_more = true;
        let ticket = self.generations.holders.begin();
        vec![Command::LoadHolders {
            ticket,
            chain: view.chain.clone(),
            address: view.address.clone(),
            cursor: Some(cursor),
        }]
    }

    /// Keeps a freshly spawned swap poller if it still belongs to the shown pair.
    pub fn attach_swap_poller(&mut self, ticket: Ticket, handle: PollHandle) {
        if !self.generations.pair.is_current(ticket) {
            return;
        }
        if let View::Token(view) = &mut self.view {
            view.swap_poller = Some(handle);
        }
    }

    pub fn attach_pump_pollers(&mut self, ticket: Ticket, handles: Vec<PollHandle>) {
        if !self.generations.pump.is_current(ticket) {
            return;
        }
        if let View::PumpFun(view) = &mut self.view {
            view.pollers = handles;
        }
    }

    // Portfolio

    /// Refetches net worth and, where the chain is already known, holdings of the
    /// selected wallet.
    pub fn reload_portfolio(&mut self) -> Vec<Command> {
        let address = self.wallets.selected().map(|w| w.address.clone());
        let View::Portfolio(view) = &mut self.view else {
            return Vec::new();
        };
        let Some(address) = address else {
            self.generations.net_worth.invalidate();
            self.generations.wallet_tokens.invalidate();
            view.net_worth = Load::Idle;
            view.holdings = Load::Idle;
            view.holdings_chain = None;
            return Vec::new();
        };

        let mut commands = vec![Command::LoadNetWorth {
            ticket: self.generations.net_worth.begin(),
            address: address.clone(),
        }];
        view.net_worth = Load::Loading;
        view.holdings = Load::Loading;
        match &view.chain_filter {
            ChainFilter::Chain(chain) => {
                view.holdings_chain = Some(chain.clone());
                commands.push(Command::LoadWalletTokens {
                    ticket: self.generations.wallet_tokens.begin(),
                    address,
                    chain: chain.clone(),
                });
            }
            ChainFilter::All => {
                self.generations.wallet_tokens.invalidate();
                view.holdings_chain = None;
            }
        }
        commands
    }

    fn load_holdings(&mut self) -> Vec<Command> {
        let address = self.wallets.selected().map(|w| w.address.clone());
        let View::Portfolio(view) = &mut self.view else {
            return Vec::new();
        };
        let Some(address) = address else {
            return Vec::new();
        };
        match resolve_chain(&view.chain_filter, view.net_worth.ready()) {
            Some(chain) => {
                view.holdings = Load::Loading;
                view.holdings_chain = Some(chain.clone());
                vec![Command::LoadWalletTokens {
                    ticket: self.generations.wallet_tokens.begin(),
                    address,
                    chain,
                }]
            }
            None => {
                self.generations.wallet_tokens.invalidate();
                view.holdings_chain = None;
                view.holdings = match view.net_worth {
                    Load::Ready(_) => Load::Ready(Vec::new()),
                    Load::Failed(ref message) => Load::Failed(message.clone()),
                    _ => Load::Loading,
                };
                Vec::new()
            }
        }
    }

    pub fn step_chain_filter(&mut self, forward: bool) -> Vec<Command> {
        let View::Portfolio(view) = &mut self.view else {
            return Vec::new();
        };
        view.chain_filter = view.chain_filter.cycle(forward);
        self.load_holdings()
    }

    pub fn select_wallet(&mut self, offset: isize) -> Vec<Command> {
        let before = self.wallets.selected().map(|w| w.address.clone());
        self.wallets.select_relative(offset);
        if self.wallets.selected().map(|w| w.address.clone()) == before {
            return Vec::new();
        }
        self.reload_portfolio()
    }

    pub fn open_wallet_form(&mut self) {
        if let View::Portfolio(view) = &mut self.view {
            view.form = Some(WalletForm::new());
        }
    }

    /// Adds the wallet typed into the form. Validation errors stay in the form.
    pub fn submit_wallet_form(&mut self) -> Vec<Command> {
        let View::Portfolio(view) = &mut self.view else {
            return Vec::new();
        };
        let Some(form) = view.form.as_mut() else {
            return Vec::new();
        };
        match self.wallets.add(&form.name, &form.address) {
            Ok(wallet) => {
                let message = format!("Added wallet {}", wallet.name);
                view.form = None;
                self.add_log(message);
                self.reload_portfolio()
            }
            Err(err) => {
                form.error = Some(err.to_string());
                Vec::new()
            }
        }
    }

    pub fn remove_selected_wallet(&mut self) -> Vec<Command> {
        let Some(address) = self.wallets.selected().map(|w| w.address.clone()) else {
            return Vec::new();
        };
        match self.wallets.remove(&address) {
            Ok(true) => {
                self.add_log(format!("Removed wallet {address}"));
                self.reload_portfolio()
            }
            Ok(false) => Vec::new(),
            Err(err) => {
                self.add_log(format!("Could not remove wallet: {err}"));
                Vec::new()
            }
        }
    }

    // Pump.fun

    pub fn pump_selection(&self) -> Option<&PumpToken> {
        let View::PumpFun(view) = &self.view else {
            return None;
        };
        let board = view.boards.get(view.focus)?;
        board.feed.items().get(board.selected)
    }

    pub fn open_pump_selection(&mut self) -> Vec<Command> {
        match self.pump_selection().map(|t| t.token_address.clone()) {
            Some(address) => self.navigate(Route::Token {
                chain: SOLANA.to_string(),
                address,
            }),
            None => Vec::new(),
        }
    }

    // Events

    /// Periodic housekeeping: debounced search and highlight expiry.
    pub fn on_tick(&mut self, now: Instant) -> Vec<Command> {
        let tokio_now = tokio::time::Instant::from_std(now);
        match &mut self.view {
            View::Token(view) => {
                view.swaps.expire_highlights(tokio_now);
            }
            View::PumpFun(view) => {
                for board in &mut view.boards {
                    board.feed.expire_highlights(tokio_now);
                }
            }
            _ => {}
        }

        match self.search.debouncer.poll_due(now) {
            Some(SearchAction::Search(query)) => {
                self.search.results = Load::Loading;
                let ticket = self.generations.search.begin();
                vec![Command::Search { ticket, query }]
            }
            Some(SearchAction::Clear) => {
                self.generations.search.invalidate();
                self.search.results = Load::Idle;
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Applies a background result. Results with a stale ticket are dropped.
    pub fn handle_event(&mut self, event: AppEvent, now: Instant) -> Vec<Command> {
        match event {
            AppEvent::TokenList(ticket, result) => {
                if !self.generations.trending.is_current(ticket) {
                    return Vec::new();
                }
                if let View::Trending(view) = &mut self.view {
                    view.tokens = Load::from_result(result);
                    view.resort();
                }
            }
            AppEvent::SearchResults(ticket, result) => {
                if self.generations.search.is_current(ticket) {
                    self.search.results = Load::from_result(result);
                    self.search.selected = 0;
                }
            }
            AppEvent::Suggestions(ticket, result) => {
                if self.generations.suggestions.is_current(ticket) {
                    self.search.suggestions = Load::from_result(result);
                }
            }
            AppEvent::Metadata(ticket, result) => {
                if !self.generations.token.is_current(ticket) {
                    return Vec::new();
                }
                if let View::Token(view) = &mut self.view {
                    view.metadata = Load::from_result(result);
                }
            }
            AppEvent::Pairs(ticket, result) => {
                if !self.generations.token.is_current(ticket) {
                    return Vec::new();
                }
                if let View::Token(view) = &mut self.view {
                    view.pairs = Load::from_result(result);
                    view.pair_index = 0;
                    return self.load_pair();
                }
            }
            AppEvent::Stats(ticket, result) => {
                if !self.generations.pair.is_current(ticket) {
                    return Vec::new();
                }
                if let View::Token(view) = &mut self.view {
                    view.stats = Load::from_result(result);
                }
            }
            AppEvent::Swaps(ticket, update) => {
                if !self.generations.pair.is_current(ticket) {
                    return Vec::new();
                }
                if let View::Token(view) = &mut self.view {
                    apply_poll(
                        &mut view.swaps,
                        &mut view.swaps_status,
                        update,
                        FeedMode::Merge,
                        now,
                    );
                }
            }
            AppEvent::Holders {
                ticket,
                append,
                result,
            } => {
                if !self.generations.holders.is_current(ticket) {
                    return Vec::new();
                }
                let View::Token(view) = &mut self.view else {
                    return Vec::new();
                };
                view.loading_more = false;
                match result {
                    Ok(page) => {
                        view.holders_cursor = page.cursor.filter(|c| !c.is_empty());
                        if !append {
                            view.holders = Load::Ready(page.result);
                        } else if let Load::Ready(holders) = &mut view.holders {
                            holders.extend(page.result);
                        }
                    }
                    Err(err) if append => {
                        self.add_log(format!("Could not load more holders: {}", err.message()));
                    }
                    Err(err) => view.holders = Load::Failed(err.message()),
                }
            }
            AppEvent::Insights(ticket, result) => {
                if !self.generations.insights.is_current(ticket) {
                    return Vec::new();
                }
                if let View::Token(view) = &mut self.view {
                    view.insights = Load::from_result(result);
                }
            }
            AppEvent::Snipers(ticket, result) => {
                if !self.generations.pair.is_current(ticket) {
                    return Vec::new();
                }
                if let View::Token(view) = &mut self.view {
                    view.snipers = Load::from_result(result);
                }
            }
            AppEvent::NetWorth(ticket, result) => {
                if !self.generations.net_worth.is_current(ticket) {
                    return Vec::new();
                }
                if let View::Portfolio(view) = &mut self.view {
                    view.net_worth = Load::from_result(result);
                    if view.chain_filter == ChainFilter::All {
                        return self.load_holdings();
                    }
                }
            }
            AppEvent::WalletTokens(ticket, result) => {
                if !self.generations.wallet_tokens.is_current(ticket) {
                    return Vec::new();
                }
                if let View::Portfolio(view) = &mut self.view {
                    view.holdings = Load::from_result(result);
                }
            }
            AppEvent::Pump(ticket, stage, update) => {
                if !self.generations.pump.is_current(ticket) {
                    return Vec::new();
                }
                if let View::PumpFun(view) = &mut self.view {
                    if let Some(board) = view.boards.get_mut(stage.index()) {
                        apply_poll(
                            &mut board.feed,
                            &mut board.status,
                            update,
                            FeedMode::Refresh,
                            now,
                        );
                        board.selected = board.selected.min(board.feed.len().saturating_sub(1));
                    }
                }
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexscope_core::models::{ChainNetWorth, HolderPage, PerTimeframe};
    use tempfile::TempDir;

    const WALLET: &str = "0x1111111111111111111111111111111111111111";

    fn app() -> (App, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let wallets = WalletStore::load(dir.path().join("wallets.json")).unwrap();
        (App::new(wallets, PollingConfig::default()), dir)
    }

    fn token(symbol: &str, price: f64) -> TokenSummary {
        TokenSummary {
            chain_id: "0x1".to_string(),
            token_address: format!("0x{symbol}"),
            symbol: Some(symbol.to_string()),
            usd_price: price,
            price_percent_change: PerTimeframe::default(),
            ..Default::default()
        }
    }

    fn swap(hash: &str) -> Swap {
        Swap {
            transaction_hash: hash.to_string(),
            transaction_type: "buy".to_string(),
            ..Default::default()
        }
    }

    fn pair(address: &str) -> Pair {
        Pair {
            pair_address: address.to_string(),
            ..Default::default()
        }
    }

    fn ticket_of(command: &Command) -> Ticket {
        match command {
            Command::FetchTrending { ticket, .. }
            | Command::Discover { ticket, .. }
            | Command::Search { ticket, .. }
            | Command::FetchSuggestions { ticket }
            | Command::LoadToken { ticket, .. }
            | Command::LoadPair { ticket, .. }
            | Command::LoadHolders { ticket, .. }
            | Command::LoadInsights { ticket, .. }
            | Command::LoadNetWorth { ticket, .. }
            | Command::LoadWalletTokens { ticket, .. }
            | Command::WatchPumpBoards { ticket } => *ticket,
        }
    }

    #[test]
    fn test_stale_trending_response_is_dropped() {
        let (mut app, _dir) = app();
        let now = Instant::now();
        let first = ticket_of(&app.navigate(Route::Trending { chain: None })[0]);
        let second = ticket_of(&app.step_sidebar(true)[0]);

        app.handle_event(AppEvent::TokenList(second, Ok(vec![token("NEW", 1.0)])), now);
        app.handle_event(AppEvent::TokenList(first, Ok(vec![token("OLD", 1.0)])), now);

        let View::Trending(view) = &app.view else {
            panic!("expected trending view");
        };
        assert_eq!(view.chain.as_deref(), Some("solana"));
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].display_symbol(), "NEW");
    }

    #[test]
    fn test_sorting_keeps_api_order_for_reset() {
        let (mut app, _dir) = app();
        let ticket = ticket_of(&app.navigate(Route::Trending { chain: None })[0]);
        let rows = vec![token("A", 1.0), token("B", 3.0), token("C", 2.0)];
        app.handle_event(AppEvent::TokenList(ticket, Ok(rows)), Instant::now());

        app.toggle_sort(SortColumn::Price);
        let symbols = |app: &App| match &app.view {
            View::Trending(view) => view
                .rows
                .iter()
                .map(|t| t.display_symbol().to_string())
                .collect::<Vec<_>>(),
            _ => Vec::new(),
        };
        assert_eq!(symbols(&app), vec!["B", "C", "A"]);
        app.toggle_sort(SortColumn::Price);
        assert_eq!(symbols(&app), vec!["A", "C", "B"]);
    }

    #[test]
    fn test_failed_fetch_shows_message() {
        let (mut app, _dir) = app();
        let ticket = ticket_of(&app.navigate(Route::Trending { chain: None })[0]);
        app.handle_event(
            AppEvent::TokenList(
                ticket,
                Err(ApiError::Status {
                    status: 429,
                    endpoint: "tokens/trending".into(),
                }),
            ),
            Instant::now(),
        );
        let View::Trending(view) = &app.view else {
            panic!("expected trending view");
        };
        assert_eq!(
            view.tokens,
            Load::Failed("Rate limit exceeded, please try again later".to_string())
        );
    }

    #[test]
    fn test_filters_switch_source_to_discovery() {
        let (mut app, _dir) = app();
        app.navigate(Route::Trending { chain: None });
        let commands = app.apply_filters();
        assert!(matches!(commands[0], Command::Discover { .. }));
        let View::Trending(view) = &app.view else {
            panic!("expected trending view");
        };
        assert_eq!(view.source, TrendingSource::Discovery);

        let commands = app.reset_filters();
        assert!(matches!(commands[0], Command::FetchTrending { .. }));
    }

    #[test]
    fn test_filters_from_other_view_issue_one_discovery() {
        let (mut app, _dir) = app();
        app.navigate(Route::Trending {
            chain: Some("solana".into()),
        });
        app.navigate(Route::Portfolio);

        let commands = app.apply_filters();
        assert_eq!(commands.len(), 1);
        let ticket = ticket_of(&commands[0]);
        assert!(matches!(commands[0], Command::Discover { .. }));
        assert_eq!(app.sidebar_chain().as_deref(), Some("solana"));

        app.handle_event(AppEvent::TokenList(ticket, Ok(vec![token("HIT", 1.0)])), Instant::now());
        let View::Trending(view) = &app.view else {
            panic!("expected trending view");
        };
        assert_eq!(view.source, TrendingSource::Discovery);
        assert_eq!(view.rows.len(), 1);
    }

    #[test]
    fn test_pairs_start_pair_load_and_swaps_seed_then_merge() {
        let (mut app, _dir) = app();
        let now = Instant::now();
        let load = app.navigate(Route::Token {
            chain: "0x1".into(),
            address: "0xtoken".into(),
        });
        let token_ticket = ticket_of(&load[0]);

        let commands = app.handle_event(
            AppEvent::Pairs(token_ticket, Ok(vec![pair("0xpair"), pair("0xother")])),
            now,
        );
        let Command::LoadPair { ticket, pair, .. } = &commands[0] else {
            panic!("expected pair load");
        };
        assert_eq!(pair, "0xpair");
        let pair_ticket = *ticket;

        app.handle_event(
            AppEvent::Swaps(pair_ticket, PollUpdate::Initial(Ok(vec![swap("a"), swap("b")]))),
            now,
        );
        app.handle_event(
            AppEvent::Swaps(pair_ticket, PollUpdate::Tick(vec![swap("c"), swap("a")])),
            now,
        );

        let View::Token(view) = &app.view else {
            panic!("expected token view");
        };
        let hashes: Vec<&str> = view
            .swaps
            .items()
            .iter()
            .map(|s| s.transaction_hash.as_str())
            .collect();
        assert_eq!(hashes, vec!["c", "a", "b"]);
        assert!(view.swaps.is_fresh("c"));
        assert!(!view.swaps.is_fresh("a"));
    }

    #[test]
    fn test_switching_pair_drops_old_feed() {
        let (mut app, _dir) = app();
        let now = Instant::now();
        let token_ticket = ticket_of(
            &app.navigate(Route::Token {
                chain: "0x1".into(),
                address: "0xtoken".into(),
            })[0],
        );
        let first = app.handle_event(
            AppEvent::Pairs(token_ticket, Ok(vec![pair("0xpair"), pair("0xother")])),
            now,
        );
        let old_ticket = ticket_of(&first[0]);

        let second = app.step_pair(true);
        let Command::LoadPair { pair, .. } = &second[0] else {
            panic!("expected pair load");
        };
        assert_eq!(pair, "0xother");

        app.handle_event(
            AppEvent::Swaps(old_ticket, PollUpdate::Initial(Ok(vec![swap("stale")]))),
            now,
        );
        let View::Token(view) = &app.view else {
            panic!("expected token view");
        };
        assert!(view.swaps.is_empty());
        assert_eq!(view.swaps_status, Load::Loading);
    }

    #[test]
    fn test_failed_initial_swaps_then_tick_recovers() {
        let (mut app, _dir) = app();
        let now = Instant::now();
        let token_ticket = ticket_of(
            &app.navigate(Route::Token {
                chain: "0x1".into(),
                address: "0xtoken".into(),
            })[0],
        );
        let commands = app.handle_event(AppEvent::Pairs(token_ticket, Ok(vec![pair("0xp")])), now);
        let pair_ticket = ticket_of(&commands[0]);

        app.handle_event(
            AppEvent::Swaps(pair_ticket, PollUpdate::Initial(Err(ApiError::MissingApiKey))),
            now,
        );
        {
            let View::Token(view) = &app.view else {
                panic!("expected token view");
            };
            assert!(matches!(view.swaps_status, Load::Failed(_)));
        }

        app.handle_event(AppEvent::Swaps(pair_ticket, PollUpdate::Tick(vec![swap("x")])), now);
        let View::Token(view) = &app.view else {
            panic!("expected token view");
        };
        assert_eq!(view.swaps_status, Load::Ready(()));
        assert!(!view.swaps.is_fresh("x"));
    }

    #[test]
    fn test_holders_tab_loads_once_and_pages() {
        let (mut app, _dir) = app();
        let now = Instant::now();
        app.navigate(Route::Token {
            chain: "0x1".into(),
            address: "0xtoken".into(),
        });

        let commands = app.step_tab(true);
        let Command::LoadHolders { ticket, cursor, .. } = &commands[0] else {
            panic!("expected holders load");
        };
        assert!(cursor.is_none());
        let holder = |addr: &str| Holder {
            owner_address: addr.to_string(),
            ..Default::default()
        };
        app.handle_event(
            AppEvent::Holders {
                ticket: *ticket,
                append: false,
                result: Ok(HolderPage {
                    cursor: Some("next".into()),
                    result: vec![holder("a")],
                }),
            },
            now,
        );

        let more = app.load_more_holders();
        let Command::LoadHolders { ticket, cursor, .. } = &more[0] else {
            panic!("expected next page");
        };
        assert_eq!(cursor.as_deref(), Some("next"));
        assert!(app.load_more_holders().is_empty());

        app.handle_event(
            AppEvent::Holders {
                ticket: *ticket,
                append: true,
                result: Ok(HolderPage {
                    cursor: Some(String::new()),
                    result: vec![holder("b")],
                }),
            },
            now,
        );
        let View::Token(view) = &app.view else {
            panic!("expected token view");
        };
        assert_eq!(view.holders.ready().map(Vec::len), Some(2));
        assert!(view.holders_cursor.is_none());

        // back and forth does not refetch
        assert!(app.step_tab(false).is_empty());
        assert!(app.step_tab(true).is_empty());
    }

    #[test]
    fn test_portfolio_all_chains_waits_for_net_worth() {
        let (mut app, _dir) = app();
        app.wallets.add("Main", WALLET).unwrap();

        let commands = app.navigate(Route::Portfolio);
        assert_eq!(commands.len(), 1);
        let worth_ticket = ticket_of(&commands[0]);

        let worth = NetWorth {
            total_networth_usd: 300.0,
            chains: vec![
                ChainNetWorth {
                    chain: "eth".into(),
                    networth_usd: 100.0,
                    ..Default::default()
                },
                ChainNetWorth {
                    chain: "base".into(),
                    networth_usd: 200.0,
                    ..Default::default()
                },
            ],
        };
        let commands = app.handle_event(AppEvent::NetWorth(worth_ticket, Ok(worth)), Instant::now());
        let Command::LoadWalletTokens { chain, address, .. } = &commands[0] else {
            panic!("expected holdings load");
        };
        assert_eq!(chain, "base");
        assert_eq!(address, WALLET);

        let commands = app.step_chain_filter(true);
        let Command::LoadWalletTokens { chain, .. } = &commands[0] else {
            panic!("expected holdings load");
        };
        assert_eq!(chain, "eth");
    }

    #[test]
    fn test_wallet_form_reports_validation_inline() {
        let (mut app, _dir) = app();
        app.navigate(Route::Portfolio);
        app.open_wallet_form();
        if let View::Portfolio(view) = &mut app.view {
            let form = view.form.as_mut().unwrap();
            form.name = "Main".into();
            form.address = "0x123".into();
        }
        assert!(app.submit_wallet_form().is_empty());
        let View::Portfolio(view) = &app.view else {
            panic!("expected portfolio view");
        };
        assert_eq!(
            view.form.as_ref().and_then(|f| f.error.as_deref()),
            Some("Please enter a valid EVM wallet address")
        );
        assert!(app.wallets.wallets().is_empty());
    }

    #[test]
    fn test_wallet_form_submit_and_remove() {
        let (mut app, _dir) = app();
        app.navigate(Route::Portfolio);
        app.open_wallet_form();
        if let View::Portfolio(view) = &mut app.view {
            let form = view.form.as_mut().unwrap();
            form.name = "Main".into();
            form.address = WALLET.into();
        }
        let commands = app.submit_wallet_form();
        assert!(matches!(commands[0], Command::LoadNetWorth { .. }));
        assert_eq!(app.wallets.wallets().len(), 1);

        assert!(app.remove_selected_wallet().is_empty());
        assert!(app.wallets.wallets().is_empty());
        let View::Portfolio(view) = &app.view else {
            panic!("expected portfolio view");
        };
        assert_eq!(view.net_worth, Load::Idle);
    }

    #[test]
    fn test_search_debounce_and_stale_results() {
        let (mut app, _dir) = app();
        let start = Instant::now();
        let commands = app.open_search();
        assert!(matches!(commands[0], Command::FetchSuggestions { .. }));

        app.edit_search(|q| q.push_str("pe"), start);
        assert!(app.on_tick(start + Duration::from_millis(100)).is_empty());
        app.edit_search(|q| q.push('p'), start + Duration::from_millis(200));
        assert!(app.on_tick(start + Duration::from_millis(400)).is_empty());
        let commands = app.on_tick(start + Duration::from_millis(600));
        let Command::Search { ticket, query } = &commands[0] else {
            panic!("expected search");
        };
        assert_eq!(query, "pep");

        app.close_search();
        app.handle_event(AppEvent::SearchResults(*ticket, Ok(Vec::new())), start);
        assert_eq!(app.search.results, Load::Idle);
    }

    #[test]
    fn test_pump_boards_update_per_stage() {
        let (mut app, _dir) = app();
        let now = Instant::now();
        let ticket = ticket_of(&app.navigate(Route::PumpFun)[0]);
        let pump = |addr: &str| PumpToken {
            token_address: addr.to_string(),
            ..Default::default()
        };

        app.handle_event(
            AppEvent::Pump(ticket, PumpStage::Bonding, PollUpdate::Initial(Ok(vec![pump("a")]))),
            now,
        );
        app.handle_event(
            AppEvent::Pump(ticket, PumpStage::Bonding, PollUpdate::Tick(vec![pump("b"), pump("a")])),
            now,
        );

        let View::PumpFun(view) = &app.view else {
            panic!("expected pump view");
        };
        assert_eq!(view.boards[1].feed.len(), 2);
        assert!(view.boards[1].feed.is_fresh("b"));
        assert_eq!(view.boards[0].status, Load::Loading);

        let later = now + Duration::from_secs(6);
        app.on_tick(later);
        let View::PumpFun(view) = &app.view else {
            panic!("expected pump view");
        };
        assert!(!view.boards[1].feed.has_fresh());
    }

    #[test]
    fn test_pump_board_tick_replaces_rows() {
        let (mut app, _dir) = app();
        let now = Instant::now();
        let ticket = ticket_of(&app.navigate(Route::PumpFun)[0]);
        let pump = |addr: &str, progress: f64| PumpToken {
            token_address: addr.to_string(),
            bonding_curve_progress: progress,
            ..Default::default()
        };

        app.handle_event(
            AppEvent::Pump(
                ticket,
                PumpStage::Bonding,
                PollUpdate::Initial(Ok(vec![pump("a", 10.0), pump("gone", 95.0)])),
            ),
            now,
        );
        app.handle_event(
            AppEvent::Pump(ticket, PumpStage::Bonding, PollUpdate::Tick(vec![pump("a", 80.0)])),
            now,
        );

        let View::PumpFun(view) = &app.view else {
            panic!("expected pump view");
        };
        let rows: Vec<(&str, f64)> = view.boards[1]
            .feed
            .items()
            .iter()
            .map(|t| (t.token_address.as_str(), t.bonding_curve_progress))
            .collect();
        assert_eq!(rows, vec![("a", 80.0)]);
        assert!(!view.boards[1].feed.has_fresh());
        assert_eq!(view.boards[1].selected, 0);
    }
}
