use dexscope_core::discovery::DiscoveryRequest;
use dexscope_core::feed::PollUpdate;
use dexscope_core::generation::Ticket;
use dexscope_core::models::{
    HolderInsights, HolderPage, NetWorth, Pair, PairStats, PumpStage, PumpToken, SearchResult,
    Sniper, Swap, TokenMetadata, TokenSummary, WalletToken,
};
use dexscope_core::ApiError;

/// Results delivered from background tasks to the UI loop. Every variant carries the
/// ticket of the request that produced it.
#[derive(Debug)]
pub enum AppEvent {
    TokenList(Ticket, Result<Vec<TokenSummary>, ApiError>),
    SearchResults(Ticket, Result<Vec<SearchResult>, ApiError>),
    Suggestions(Ticket, Result<Vec<TokenSummary>, ApiError>),
    Metadata(Ticket, Result<Option<TokenMetadata>, ApiError>),
    Pairs(Ticket, Result<Vec<Pair>, ApiError>),
    Stats(Ticket, Result<PairStats, ApiError>),
    Swaps(Ticket, PollUpdate<Swap>),
    Holders {
        ticket: Ticket,
        append: bool,
        result: Result<HolderPage, ApiError>,
    },
    Insights(Ticket, Result<HolderInsights, ApiError>),
    Snipers(Ticket, Result<Vec<Sniper>, ApiError>),
    NetWorth(Ticket, Result<NetWorth, ApiError>),
    WalletTokens(Ticket, Result<Vec<WalletToken>, ApiError>),
    Pump(Ticket, PumpStage, PollUpdate<PumpToken>),
}

/// Work the UI asks the task layer to start.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchTrending {
        ticket: Ticket,
        chain: Option<String>,
    },
    Discover {
        ticket: Ticket,
        request: DiscoveryRequest,
    },
    Search {
        ticket: Ticket,
        query: String,
    },
    FetchSuggestions {
        ticket: Ticket,
    },
    LoadToken {
        ticket: Ticket,
        chain: String,
        address: String,
    },
    /// Stats, snipers and the polled swap feed of one pair.
    LoadPair {
        ticket: Ticket,
        chain: String,
        pair: String,
    },
    LoadHolders {
        ticket: Ticket,
        chain: String,
        address: String,
        cursor: Option<String>,
    },
    LoadInsights {
        ticket: Ticket,
        chain: String,
        address: String,
    },
    LoadNetWorth {
        ticket: Ticket,
        address: String,
    },
    LoadWalletTokens {
        ticket: Ticket,
        address: String,
        chain: String,
    },
    WatchPumpBoards {
        ticket: Ticket,
    },
}
