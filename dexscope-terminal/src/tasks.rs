use std::future::Future;
use std::time::Duration;

use dexscope_core::api::{
    DEFAULT_SEARCH_LIMIT, DEFAULT_SNIPER_BLOCKS, DEFAULT_TRENDING_LIMIT, PUMPFUN_LIMIT,
};
use dexscope_core::chain::{DEFAULT_SEARCH_CHAINS, NET_WORTH_CHAINS};
use dexscope_core::config::PollingConfig;
use dexscope_core::feed::{spawn_poller, PollHandle};
use dexscope_core::models::PumpStage;
use dexscope_core::DexApiClient;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::app::App;
use crate::event::{AppEvent, Command};

const SUGGESTION_LIMIT: u32 = 10;

/// Turns UI commands into background fetches and pollers whose results come
/// back as [`AppEvent`]s.
#[derive(Clone)]
pub struct Dispatcher {
    client: DexApiClient,
    tx: UnboundedSender<AppEvent>,
    polling: PollingConfig,
}

impl Dispatcher {
    pub fn new(
        client: DexApiClient,
        tx: UnboundedSender<AppEvent>,
        polling: PollingConfig,
    ) -> Self {
        Self {
            client,
            tx,
            polling,
        }
    }

    fn spawn<F, Fut>(&self, task: F)
    where
        F: FnOnce(DexApiClient) -> Fut,
        Fut: Future<Output = AppEvent> + Send + 'static,
    {
        let fut = task(self.client.clone());
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = fut.await;
            if tx.send(event).is_err() {
                debug!("UI loop gone, dropping result");
            }
        });
    }

    pub fn dispatch_all(&self, app: &mut App, commands: Vec<Command>) {
        for command in commands {
            self.dispatch(app, command);
        }
    }

    pub fn dispatch(&self, app: &mut App, command: Command) {
        debug!(?command, "dispatch");
        match command {
            Command::FetchTrending { ticket, chain } => self.spawn(move |client| async move {
                let result = client
                    .trending_tokens(chain.as_deref(), DEFAULT_TRENDING_LIMIT)
                    .await;
                AppEvent::TokenList(ticket, result)
            }),
            Command::Discover { ticket, request } => self.spawn(move |client| async move {
                AppEvent::TokenList(ticket, client.discover_tokens(&request).await)
            }),
            Command::Search { ticket, query } => self.spawn(move |client| async move {
                let result = client
                    .search_tokens(&query, DEFAULT_SEARCH_CHAINS, DEFAULT_SEARCH_LIMIT)
                    .await;
                AppEvent::SearchResults(ticket, result)
            }),
            Command::FetchSuggestions { ticket } => self.spawn(move |client| async move {
                AppEvent::Suggestions(ticket, client.trending_tokens(None, SUGGESTION_LIMIT).await)
            }),
            Command::LoadToken {
                ticket,
                chain,
                address,
            } => {
                let (meta_chain, meta_address) = (chain.clone(), address.clone());
                self.spawn(move |client| async move {
                    let result = client.token_metadata(&meta_chain, &meta_address).await;
                    AppEvent::Metadata(ticket, result)
                });
                self.spawn(move |client| async move {
                    AppEvent::Pairs(ticket, client.token_pairs(&chain, &address).await)
                });
            }
            Command::LoadPair {
                ticket,
                chain,
                pair,
            } => {
                let (stats_chain, stats_pair) = (chain.clone(), pair.clone());
                self.spawn(move |client| async move {
                    AppEvent::Stats(ticket, client.pair_stats(&stats_chain, &stats_pair).await)
                });
                let (sniper_chain, sniper_pair) = (chain.clone(), pair.clone());
                self.spawn(move |client| async move {
                    let result = client
                        .pair_snipers(&sniper_chain, &sniper_pair, DEFAULT_SNIPER_BLOCKS)
                        .await;
                    AppEvent::Snipers(ticket, result)
                });

                let client = self.client.clone();
                let tx = self.tx.clone();
                let handle = spawn_poller(
                    "swaps",
                    Duration::from_secs(self.polling.transactions_secs),
                    move || {
                        let (client, chain, pair) = (client.clone(), chain.clone(), pair.clone());
                        async move {
                            client
                                .pair_swaps(&chain, &pair, None)
                                .await
                                .map(|page| page.result)
                        }
                    },
                    move |update| tx.send(AppEvent::Swaps(ticket, update)).is_ok(),
                );
                app.attach_swap_poller(ticket, handle);
            }
            Command::LoadHolders {
                ticket,
                chain,
                address,
                cursor,
            } => self.spawn(move |client| async move {
                let append = cursor.is_some();
                let result = client
                    .token_holders(&chain, &address, cursor.as_deref())
                    .await;
                AppEvent::Holders {
                    ticket,
                    append,
                    result,
                }
            }),
            Command::LoadInsights {
                ticket,
                chain,
                address,
            } => self.spawn(move |client| async move {
                AppEvent::Insights(ticket, client.holder_insights(&chain, &address).await)
            }),
            Command::LoadNetWorth { ticket, address } => self.spawn(move |client| async move {
                let result = client.wallet_net_worth(&address, NET_WORTH_CHAINS).await;
                AppEvent::NetWorth(ticket, result)
            }),
            Command::LoadWalletTokens {
                ticket,
                address,
                chain,
            } => self.spawn(move |client| async move {
                AppEvent::WalletTokens(ticket, client.wallet_tokens(&address, &chain).await)
            }),
            Command::WatchPumpBoards { ticket } => {
                let every = Duration::from_secs(self.polling.token_board_secs);
                let handles: Vec<PollHandle> = PumpStage::ALL
                    .iter()
                    .map(|stage| {
                        let stage = *stage;
                        let client = self.client.clone();
                        let tx = self.tx.clone();
                        spawn_poller(
                            "pumpfun",
                            every,
                            move || {
                                let client = client.clone();
                                async move { client.pumpfun_tokens(stage, PUMPFUN_LIMIT).await }
                            },
                            move |update| tx.send(AppEvent::Pump(ticket, stage, update)).is_ok(),
                        )
                    })
                    .collect();
                app.attach_pump_pollers(ticket, handles);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Route, View};
    use dexscope_core::config::ApiConfig;
    use dexscope_core::feed::PollUpdate;
    use dexscope_core::models::PumpToken;
    use dexscope_core::wallets::WalletStore;
    use dexscope_core::ApiError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;
    use tokio::sync::mpsc;

    fn setup() -> (
        Dispatcher,
        mpsc::UnboundedReceiver<AppEvent>,
        App,
        tempfile::TempDir,
    ) {
        let client = DexApiClient::new(&ApiConfig::default()).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let dir = tempfile::tempdir().unwrap();
        let wallets = WalletStore::load(dir.path().join("wallets.json")).unwrap();
        let app = App::new(wallets, PollingConfig::default());
        (
            Dispatcher::new(client, tx, PollingConfig::default()),
            rx,
            app,
            dir,
        )
    }

    #[tokio::test]
    async fn test_fetch_result_comes_back_as_event() {
        let (dispatcher, mut rx, mut app, _dir) = setup();
        let commands = app.navigate(Route::Trending { chain: None });
        dispatcher.dispatch_all(&mut app, commands);

        let Some(AppEvent::TokenList(ticket, result)) = rx.recv().await else {
            panic!("expected token list");
        };
        assert!(matches!(result, Err(ApiError::MissingApiKey)));

        app.handle_event(AppEvent::TokenList(ticket, result), Instant::now());
        let View::Trending(view) = &app.view else {
            panic!("expected trending view");
        };
        assert!(matches!(view.tokens, crate::app::Load::Failed(_)));
    }

    #[tokio::test]
    async fn test_pair_load_attaches_swap_poller() {
        let (dispatcher, mut rx, mut app, _dir) = setup();
        let load = app.navigate(Route::Token {
            chain: "0x1".into(),
            address: "0xtoken".into(),
        });
        let Command::LoadToken { ticket, .. } = load[0].clone() else {
            panic!("expected token load");
        };
        let pair = dexscope_core::models::Pair {
            pair_address: "0xpair".into(),
            ..Default::default()
        };
        let commands = app.handle_event(AppEvent::Pairs(ticket, Ok(vec![pair])), Instant::now());
        dispatcher.dispatch_all(&mut app, commands);

        let View::Token(view) = &app.view else {
            panic!("expected token view");
        };
        assert!(view.is_polling());

        let mut saw_initial_swaps = false;
        for _ in 0..3 {
            if let Some(AppEvent::Swaps(_, PollUpdate::Initial(Err(_)))) = rx.recv().await {
                saw_initial_swaps = true;
            }
        }
        assert!(saw_initial_swaps);
    }

    #[tokio::test]
    async fn test_pump_boards_attach_three_pollers() {
        let (dispatcher, _rx, mut app, _dir) = setup();
        let commands = app.navigate(Route::PumpFun);
        dispatcher.dispatch_all(&mut app, commands);
        let View::PumpFun(view) = &app.view else {
            panic!("expected pump view");
        };
        assert!(view.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pump_pollers_stop_when_view_changes() {
        let (_dispatcher, _rx, mut app, _dir) = setup();
        let commands = app.navigate(Route::PumpFun);
        let Command::WatchPumpBoards { ticket } = commands[0] else {
            panic!("expected pump watch");
        };

        let fetches = Arc::new(AtomicUsize::new(0));
        let handles: Vec<PollHandle> = PumpStage::ALL
            .iter()
            .map(|_| {
                let fetches = fetches.clone();
                spawn_poller(
                    "pumpfun",
                    Duration::from_secs(1),
                    move || {
                        fetches.fetch_add(1, Ordering::SeqCst);
                        async { Ok(Vec::<PumpToken>::new()) }
                    },
                    |_| true,
                )
            })
            .collect();
        app.attach_pump_pollers(ticket, handles);

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        let seen = fetches.load(Ordering::SeqCst);
        assert!(seen >= PumpStage::ALL.len() * 2);

        app.navigate(Route::Portfolio);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fetches.load(Ordering::SeqCst), seen);
    }
}
