use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line as TextLine, Span},
    widgets::{
        canvas::{Canvas, Line},
        Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap,
    },
    Frame,
};

use dexscope_core::chain::{chain_name, SIDEBAR_CHAINS};
use dexscope_core::format::{
    format_age, format_amount, format_compact_usd, format_number, format_percent_change,
    format_percentage, format_price, format_time_ago, format_token_amount, format_usd,
    truncate_address,
};
use dexscope_core::models::{buy_ratio, PumpStage, StatsPeriod, Timeframe};
use dexscope_core::portfolio::ChainFilter;
use dexscope_core::sort::SortColumn;
use dexscope_core::wallets::WalletStore;

use crate::app::{
    App, FormField, Load, PortfolioView, PumpView, SearchModal, Theme, TokenTab, TokenView,
    TrendingSource, TrendingView, View,
};
use crate::filter::{FilterField, FilterModal};

const SIDEBAR_WIDTH: u16 = 20;
const RATIO_BAR_WIDTH: usize = 20;

fn change_color(value: f64) -> Color {
    if value >= 0.0 {
        Color::Green
    } else {
        Color::Red
    }
}

fn fresh_style(theme: Theme) -> Style {
    match theme {
        Theme::Light => Style::default().bg(Color::LightGreen),
        Theme::Dark => Style::default()
            .bg(Color::Rgb(20, 60, 30))
            .add_modifier(Modifier::BOLD),
    }
}

fn panel(title: impl Into<String>, border: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(title.into())
}

/// A rectangle of `percent_x` by `percent_y` centred in `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Renders the loading or error state of a fetch. Returns true if it drew something.
fn render_status<T>(f: &mut Frame, load: &Load<T>, area: Rect, title: &str, border: Color) -> bool {
    let (text, color) = match load {
        Load::Ready(_) => return false,
        Load::Idle => ("Nothing to show yet".to_string(), Color::DarkGray),
        Load::Loading => ("Loading...".to_string(), Color::Yellow),
        Load::Failed(message) => (message.clone(), Color::Red),
    };
    let paragraph = Paragraph::new(TextLine::from(Span::styled(text, Style::default().fg(color))))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(panel(title.to_string(), border));
    f.render_widget(paragraph, area);
    true
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let (bg_color, fg_color, border_color) = match app.theme {
        Theme::Light => (Color::White, Color::Black, Color::Black),
        Theme::Dark => (Color::Rgb(20, 20, 25), Color::White, Color::DarkGray),
    };

    let base_style = Style::default().bg(bg_color).fg(fg_color);

    // Fill background
    let size = f.area();
    f.render_widget(Block::default().style(base_style), size);

    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(size);

    render_sidebar(f, app, main_layout[0], border_color, fg_color);

    let center = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(main_layout[1]);

    render_top_bar(f, app, center[0], border_color, fg_color);

    let now = Utc::now();
    let theme = app.theme;
    let title = app.trending_title();
    match &mut app.view {
        View::Trending(view) => render_trending(f, view, &title, center[1], border_color, now),
        View::Token(view) => render_token(f, view, theme, center[1], border_color, fg_color, now),
        View::Portfolio(view) => {
            render_portfolio(f, view, &app.wallets, center[1], border_color, fg_color)
        }
        View::PumpFun(view) => render_pump(f, view, theme, center[1], border_color, now),
    }

    render_footer(f, app, center[2], fg_color);

    if app.filter.open {
        render_filter_modal(f, &app.filter, size, border_color, base_style);
    }
    if app.search.open {
        render_search_modal(f, &app.search, size, border_color, base_style);
    }
}

fn render_sidebar(f: &mut Frame, app: &App, area: Rect, border: Color, text: Color) {
    let mut lines = vec![
        TextLine::from(Span::styled(
            "dexscope",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
    ];
    let entries = std::iter::once("All chains").chain(SIDEBAR_CHAINS.iter().map(|(_, name)| *name));
    for (index, name) in entries.enumerate() {
        let selected = index == app.sidebar && matches!(app.view, View::Trending(_));
        let style = if selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else if index == app.sidebar {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(text)
        };
        let marker = if index == app.sidebar { "> " } else { "  " };
        lines.push(TextLine::from(Span::styled(format!("{marker}{name}"), style)));
    }
    lines.push(TextLine::from(""));
    lines.push(TextLine::from(Span::styled(
        "[ / ] chain",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::RIGHT)
                .border_style(Style::default().fg(border)),
        ),
        area,
    );
}

fn render_top_bar(f: &mut Frame, app: &App, area: Rect, border: Color, text: Color) {
    let nav = [
        ("h", "Trending", matches!(app.view, View::Trending(_))),
        ("p", "Pump.fun", matches!(app.view, View::PumpFun(_))),
        ("w", "Portfolio", matches!(app.view, View::Portfolio(_))),
    ];
    let mut spans = Vec::new();
    for (key, label, active) in nav {
        let style = if active {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(text)
        };
        spans.push(Span::styled(format!("[{key}] "), Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(label, style));
        spans.push(Span::raw("   "));
    }
    spans.push(Span::styled(
        "[/] Search",
        Style::default().fg(Color::DarkGray),
    ));
    if let View::Token(view) = &app.view {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            format!("{} / {}", chain_name(&view.chain), truncate_address(&view.address, 6, 4)),
            Style::default().fg(Color::Yellow),
        ));
    }

    f.render_widget(
        Paragraph::new(TextLine::from(spans)).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(border)),
        ),
        area,
    );
}

fn render_footer(f: &mut Frame, app: &App, area: Rect, text: Color) {
    let hints = match &app.view {
        View::Trending(_) => "1-9,0 sort  f filter  r reset  Enter open  t theme  q quit",
        View::Token(_) => "Tab tabs  ,/. pair  s period  +/- resize  m more  Esc back",
        View::Portfolio(_) => "a add  d remove  ↑↓ wallet  c chain  r refresh",
        View::PumpFun(_) => "←→ column  ↑↓ select  Enter open",
    };
    let log = app.logs.last().map(String::as_str).unwrap_or_default();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    f.render_widget(
        Paragraph::new(Span::styled(log.to_string(), Style::default().fg(text))),
        chunks[0],
    );
    f.render_widget(
        Paragraph::new(Span::styled(hints, Style::default().fg(Color::DarkGray)))
            .alignment(Alignment::Right),
        chunks[1],
    );
}

fn render_trending(
    f: &mut Frame,
    view: &TrendingView,
    chain_title: &str,
    area: Rect,
    border: Color,
    now: DateTime<Utc>,
) {
    let title = match view.source {
        TrendingSource::Trending => format!("Trending Tokens - {chain_title}"),
        TrendingSource::Discovery => "Filtered Tokens".to_string(),
    };
    if render_status(f, &view.tokens, area, &title, border) {
        return;
    }
    if view.rows.is_empty() {
        f.render_widget(
            Paragraph::new("No tokens found")
                .alignment(Alignment::Center)
                .block(panel(title, border)),
            area,
        );
        return;
    }

    let active = view.sort.active();
    let mut header = vec!["#".to_string(), "Token".to_string()];
    for (index, column) in SortColumn::ALL.iter().enumerate() {
        let key = (index + 1) % 10;
        let arrow = match active {
            Some((current, direction)) if current == *column => direction.arrow(),
            _ => "",
        };
        header.push(format!("{key}:{}{arrow}", column.title()));
    }

    let rows: Vec<Row> = view
        .rows
        .iter()
        .enumerate()
        .map(|(index, token)| {
            let change = |tf: Timeframe| {
                let value = token.price_percent_change.get(tf);
                Cell::from(format_percent_change(Some(value)))
                    .style(Style::default().fg(change_color(value)))
            };
            let liquidity = if token.liquidity_estimated {
                format!("~{}", format_compact_usd(token.liquidity_usd))
            } else {
                format_compact_usd(token.liquidity_usd)
            };
            let transactions = if token.transactions_estimated {
                format!("~{}", format_number(token.transactions.one_day))
            } else {
                format_number(token.transactions.one_day)
            };
            Row::new(vec![
                Cell::from(format!("{}", index + 1)),
                Cell::from(format!(
                    "{} {}",
                    token.display_symbol(),
                    chain_name(&token.chain_id)
                )),
                Cell::from(format_price(token.usd_price)),
                Cell::from(format_age(token.created(), now)),
                Cell::from(transactions),
                Cell::from(format_compact_usd(token.total_volume.one_day)),
                Cell::from(format_number(token.makers(Timeframe::OneDay))),
                change(Timeframe::OneHour),
                change(Timeframe::FourHours),
                change(Timeframe::OneDay),
                Cell::from(liquidity),
                Cell::from(format_compact_usd(token.market_cap)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(14),
        Constraint::Length(14),
        Constraint::Length(7),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(12),
        Constraint::Length(10),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(header).style(Style::default().fg(Color::Yellow)))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .block(panel(format!("{title} ({})", view.rows.len()), border));

    let mut state = TableState::default().with_selected(Some(view.selected));
    f.render_stateful_widget(table, area, &mut state);
}

fn render_token(
    f: &mut Frame,
    view: &mut TokenView,
    theme: Theme,
    area: Rect,
    border: Color,
    text: Color,
    now: DateTime<Utc>,
) {
    // The table keeps its dragged height; the chart takes what is left.
    let table_height = view.panel.height().saturating_add(2);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(6),
            Constraint::Length(1),
            Constraint::Length(table_height),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .split(area);

    render_token_header(f, view, chunks[0], border, text);
    render_pair_stats(f, view, chunks[1], border, text);

    let titles: Vec<&str> = TokenTab::ALL.iter().map(|t| t.title()).collect();
    let selected = TokenTab::ALL
        .iter()
        .position(|t| *t == view.tab)
        .unwrap_or(0);
    f.render_widget(
        Tabs::new(titles)
            .select(selected)
            .style(Style::default().fg(text))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        chunks[2],
    );

    view.handle_row = Some(chunks[4].y);
    let handle_style = if view.panel.is_dragging() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    f.render_widget(
        Paragraph::new(Span::styled(
            "═".repeat(usize::from(chunks[4].width)),
            handle_style,
        )),
        chunks[4],
    );

    render_price_trace(f, view, chunks[5], border);

    match view.tab {
        TokenTab::Transactions => render_transactions(f, view, theme, chunks[3], border, now),
        TokenTab::Holders => render_holders(f, view, chunks[3], border),
        TokenTab::Insights => render_insights(f, view, chunks[3], border, text),
        TokenTab::Snipers => render_snipers(f, view, chunks[3], border),
    }
}

fn render_token_header(f: &mut Frame, view: &TokenView, area: Rect, border: Color, text: Color) {
    let metadata = view.metadata.ready().and_then(Option::as_ref);
    let pair = view.pair();
    let symbol = metadata
        .and_then(|m| m.symbol.as_deref())
        .or_else(|| pair.and_then(|p| p.token_for(&view.address)).map(|t| t.symbol()))
        .unwrap_or("???");
    let name = metadata.and_then(|m| m.name.as_deref()).unwrap_or_default();

    let mut first = vec![
        Span::styled(
            symbol.to_string(),
            Style::default().fg(text).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {name}  ")),
        Span::styled(
            chain_name(&view.chain),
            Style::default().fg(Color::Cyan),
        ),
    ];
    if let Some(metadata) = metadata {
        first.push(Span::raw(format!(
            "  MCap {}",
            format_compact_usd(metadata.valuation())
        )));
    }

    let second = match (&view.pairs, pair) {
        (Load::Ready(pairs), Some(pair)) => TextLine::from(vec![
            Span::raw(format!("Pair {}/{}: ", view.pair_index + 1, pairs.len())),
            Span::styled(pair.label(), Style::default().fg(Color::Yellow)),
            Span::raw(format!(
                " on {}  Price {}  ",
                pair.exchange_name.as_deref().unwrap_or("unknown"),
                format_price(pair.usd_price)
            )),
            Span::styled(
                format_percent_change(Some(pair.usd_price24hr_percent_change)),
                Style::default().fg(change_color(pair.usd_price24hr_percent_change)),
            ),
            Span::raw(format!("  Liq {}", format_compact_usd(pair.liquidity_usd))),
        ]),
        (Load::Ready(_), None) => TextLine::from("No trading pairs found for this token"),
        (Load::Failed(message), _) => TextLine::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )),
        _ => TextLine::from("Loading pairs..."),
    };

    f.render_widget(
        Paragraph::new(vec![TextLine::from(first), second]).block(panel("Token", border)),
        area,
    );
}

fn ratio_bar(a: f64, b: f64) -> Vec<Span<'static>> {
    let ratio = buy_ratio(a, b);
    let filled = (ratio * RATIO_BAR_WIDTH as f64).round() as usize;
    vec![
        Span::styled("█".repeat(filled), Style::default().fg(Color::Green)),
        Span::styled(
            "█".repeat(RATIO_BAR_WIDTH.saturating_sub(filled)),
            Style::default().fg(Color::Red),
        ),
    ]
}

fn render_pair_stats(f: &mut Frame, view: &TokenView, area: Rect, border: Color, text: Color) {
    if render_status(f, &view.stats, area, "Pair Stats", border) {
        return;
    }
    let Some(stats) = view.stats.ready() else {
        return;
    };
    let snapshot = stats.period(view.period);

    let mut periods = Vec::new();
    for period in StatsPeriod::ALL {
        let style = if period == view.period {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        periods.push(Span::styled(format!(" {} ", period.label()), style));
    }
    periods.push(Span::raw(format!(
        "  Price {}  Liq {}  ",
        format_price(stats.current_usd_price),
        format_compact_usd(stats.total_liquidity_usd)
    )));
    periods.push(Span::styled(
        format_percent_change(Some(snapshot.price_change)),
        Style::default().fg(change_color(snapshot.price_change)),
    ));

    let mut txns = vec![Span::raw(format!(
        "Txns {:>7} buys / {:<7} sells ",
        format_number(snapshot.buys),
        format_number(snapshot.sells)
    ))];
    txns.extend(ratio_bar(snapshot.buys, snapshot.sells));
    let mut volume = vec![Span::raw(format!(
        "Vol  {:>7} buy  / {:<7} sell  ",
        format_compact_usd(snapshot.buy_volume),
        format_compact_usd(snapshot.sell_volume)
    ))];
    volume.extend(ratio_bar(snapshot.buy_volume, snapshot.sell_volume));
    let mut makers = vec![Span::raw(format!(
        "Mkrs {:>7} buyers / {:<5} sellers ",
        format_number(snapshot.buyers),
        format_number(snapshot.sellers)
    ))];
    makers.extend(ratio_bar(snapshot.buyers, snapshot.sellers));

    let lines = vec![
        TextLine::from(periods),
        TextLine::from(txns),
        TextLine::from(volume),
        TextLine::from(makers),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .style(Style::default().fg(text))
            .block(panel(
                format!(
                    "Pair Stats - {} (total vol {})",
                    stats.exchange.as_deref().unwrap_or("DEX"),
                    format_compact_usd(snapshot.total_volume)
                ),
                border,
            )),
        area,
    );
}

fn render_price_trace(f: &mut Frame, view: &TokenView, area: Rect, border: Color) {
    // Oldest first, skipping swaps without a price.
    let points: Vec<f64> = view
        .swaps
        .items()
        .iter()
        .rev()
        .map(|s| s.base_token_price_usd)
        .filter(|p| p.is_finite() && *p > 0.0)
        .collect();

    let title = match view.pair() {
        Some(pair) => format!("Price - {}", pair.label()),
        None => "Price".to_string(),
    };
    if points.len() < 2 {
        let message = match &view.swaps_status {
            Load::Failed(message) => message.clone(),
            _ => "Waiting for swaps...".to_string(),
        };
        f.render_widget(
            Paragraph::new(message)
                .alignment(Alignment::Center)
                .block(panel(title, border)),
            area,
        );
        return;
    }

    let low = points.iter().copied().fold(f64::INFINITY, f64::min);
    let high = points.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = ((high - low) * 0.1).max(high * 0.001);
    let color = change_color(points[points.len() - 1] - points[0]);
    let last = (points.len() - 1) as f64;

    let canvas = Canvas::default()
        .block(panel(
            format!("{title}  {} - {}", format_price(low), format_price(high)),
            border,
        ))
        .x_bounds([0.0, last])
        .y_bounds([low - pad, high + pad])
        .paint(|ctx| {
            for (i, window) in points.windows(2).enumerate() {
                ctx.draw(&Line {
                    x1: i as f64,
                    y1: window[0],
                    x2: (i + 1) as f64,
                    y2: window[1],
                    color,
                });
            }
        });
    f.render_widget(canvas, area);
}

fn render_transactions(
    f: &mut Frame,
    view: &TokenView,
    theme: Theme,
    area: Rect,
    border: Color,
    now: DateTime<Utc>,
) {
    let title = if view.is_polling() {
        "Transactions (live)"
    } else {
        "Transactions"
    };
    if !matches!(view.swaps_status, Load::Ready(())) {
        render_status(f, &view.swaps_status, area, title, border);
        return;
    }

    let rows: Vec<Row> = view
        .swaps
        .items()
        .iter()
        .map(|swap| {
            let kind = swap.kind();
            let color = if kind.is_inflow() {
                Color::Green
            } else {
                Color::Red
            };
            let row = Row::new(vec![
                format_time_ago(swap.block_timestamp, now),
                kind.label().to_string(),
                format_price(swap.base_token_price_usd),
                format_amount(swap.base_token_amount.abs()),
                format_usd(swap.total_value_usd),
                truncate_address(&swap.wallet_address, 6, 4),
            ])
            .style(Style::default().fg(color));
            if view.swaps.is_fresh(&swap.transaction_hash) {
                row.style(fresh_style(theme).fg(color))
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Min(14),
        ],
    )
    .header(
        Row::new(vec!["Age", "Type", "Price", "Amount", "Value", "Maker"])
            .style(Style::default().fg(Color::Yellow)),
    )
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .block(panel(format!("{title} ({})", view.swaps.len()), border));

    let mut state = TableState::default().with_selected(Some(view.selected_row));
    f.render_stateful_widget(table, area, &mut state);
}

fn render_holders(f: &mut Frame, view: &TokenView, area: Rect, border: Color) {
    if render_status(f, &view.holders, area, "Holders", border) {
        return;
    }
    let holders = view.holders.ready().map(Vec::as_slice).unwrap_or_default();

    let rows: Vec<Row> = holders
        .iter()
        .enumerate()
        .map(|(index, holder)| {
            let owner = holder
                .owner_address_label
                .clone()
                .or_else(|| holder.entity.clone())
                .unwrap_or_else(|| truncate_address(&holder.owner_address, 6, 4));
            let owner = if holder.is_contract {
                format!("{owner} (contract)")
            } else {
                owner
            };
            Row::new(vec![
                format!("{}", index + 1),
                owner,
                format_amount(holder.balance_formatted),
                format_usd(holder.usd_value),
                format_percentage(holder.percentage_relative_to_total_supply),
            ])
        })
        .collect();

    let more = if view.loading_more {
        " loading..."
    } else if view.holders_cursor.is_some() {
        " m: load more"
    } else {
        ""
    };
    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Min(20),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec!["#", "Holder", "Balance", "Value", "Supply"])
            .style(Style::default().fg(Color::Yellow)),
    )
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .block(panel(format!("Holders ({}){more}", holders.len()), border));

    let mut state = TableState::default().with_selected(Some(view.selected_row));
    f.render_stateful_widget(table, area, &mut state);
}

fn render_insights(f: &mut Frame, view: &TokenView, area: Rect, border: Color, text: Color) {
    if render_status(f, &view.insights, area, "Holder Insights", border) {
        return;
    }
    let Some(insights) = view.insights.ready() else {
        return;
    };
    let shares = insights.acquisition_shares();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    let acquisition = vec![
        TextLine::from(vec![
            Span::raw("Total holders "),
            Span::styled(
                format_number(insights.total_holders),
                Style::default().fg(text).add_modifier(Modifier::BOLD),
            ),
        ]),
        TextLine::from(""),
        TextLine::from(format!("Swap      {}", format_percentage(shares.swap))),
        TextLine::from(format!("Transfer  {}", format_percentage(shares.transfer))),
        TextLine::from(format!("Airdrop   {}", format_percentage(shares.airdrop))),
    ];
    f.render_widget(
        Paragraph::new(acquisition).block(panel("Acquisition", border)),
        columns[0],
    );

    let changes: Vec<TextLine> = insights
        .ordered_changes()
        .into_iter()
        .map(|(period, change)| {
            TextLine::from(vec![
                Span::raw(format!("{period:<6}")),
                Span::styled(
                    format!(
                        "{:>8} {}",
                        format_number(change.change),
                        format_percent_change(Some(change.change_percent))
                    ),
                    Style::default().fg(change_color(change.change)),
                ),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(changes).block(panel("Holder Change", border)),
        columns[1],
    );

    let supply: Vec<TextLine> = insights
        .holder_supply
        .iter()
        .map(|(tier, value)| {
            TextLine::from(format!(
                "{tier:<8} {:>10} {}",
                format_number(value.supply),
                format_percentage(value.supply_percent)
            ))
        })
        .collect();
    f.render_widget(
        Paragraph::new(supply).block(panel("Supply Held", border)),
        columns[2],
    );
}

fn render_snipers(f: &mut Frame, view: &TokenView, area: Rect, border: Color) {
    if render_status(f, &view.snipers, area, "Snipers", border) {
        return;
    }
    let snipers = view.snipers.ready().map(Vec::as_slice).unwrap_or_default();

    let rows: Vec<Row> = snipers
        .iter()
        .map(|sniper| {
            let profit = sniper.realized_profit_usd;
            Row::new(vec![
                truncate_address(&sniper.wallet_address, 6, 4),
                format_usd(sniper.total_sniped_usd),
                format_usd(sniper.total_sold_usd),
                format_usd(profit),
                format_percent_change(Some(sniper.realized_profit_percentage)),
                format_usd(sniper.current_balance_usd_value),
                sniper
                    .first_entry_blocks()
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ])
            .style(Style::default().fg(change_color(profit)))
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(14),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(7),
        ],
    )
    .header(
        Row::new(vec!["Wallet", "Sniped", "Sold", "Profit", "Profit %", "Holding", "Blocks"])
            .style(Style::default().fg(Color::Yellow)),
    )
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .block(panel(format!("Snipers ({})", snipers.len()), border));

    let mut state = TableState::default().with_selected(Some(view.selected_row));
    f.render_stateful_widget(table, area, &mut state);
}

fn render_portfolio(
    f: &mut Frame,
    view: &PortfolioView,
    wallets: &WalletStore,
    area: Rect,
    border: Color,
    text: Color,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(0)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(9)])
        .split(columns[0]);

    let selected = wallets.selected().map(|w| w.address.as_str());
    let mut lines: Vec<TextLine> = wallets
        .wallets()
        .iter()
        .map(|wallet| {
            let active = Some(wallet.address.as_str()) == selected;
            let style = if active {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(text)
            };
            TextLine::from(vec![
                Span::styled(if active { "> " } else { "  " }, style),
                Span::styled(wallet.name.clone(), style),
                Span::styled(
                    format!(" {}", truncate_address(&wallet.address, 6, 4)),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();
    if lines.is_empty() {
        lines.push(TextLine::from("No wallets yet. Press a to add one."));
    }
    f.render_widget(
        Paragraph::new(lines).block(panel(format!("Wallets ({})", wallets.wallets().len()), border)),
        left[0],
    );

    render_net_worth(f, view, left[1], border, text);
    render_holdings(f, view, columns[1], border);

    if let Some(form) = &view.form {
        let popup = centered_rect(60, 40, area);
        f.render_widget(Clear, popup);
        let field = |label: &str, value: &str, focused: bool| {
            let style = if focused {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(text)
            };
            let cursor = if focused { "█" } else { "" };
            TextLine::from(vec![
                Span::styled(format!("{label:<9}"), style),
                Span::raw(format!("{value}{cursor}")),
            ])
        };
        let mut lines = vec![
            field("Name", &form.name, form.focus == FormField::Name),
            TextLine::from(""),
            field("Address", &form.address, form.focus == FormField::Address),
            TextLine::from(""),
        ];
        if let Some(error) = &form.error {
            lines.push(TextLine::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(TextLine::from(Span::styled(
            "Tab switch field  Enter add  Esc cancel",
            Style::default().fg(Color::DarkGray),
        )));
        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(panel("Add Wallet", Color::Yellow)),
            popup,
        );
    }
}

fn render_net_worth(f: &mut Frame, view: &PortfolioView, area: Rect, border: Color, text: Color) {
    if render_status(f, &view.net_worth, area, "Net Worth", border) {
        return;
    }
    let Some(worth) = view.net_worth.ready() else {
        return;
    };
    let mut lines = vec![TextLine::from(Span::styled(
        format_usd(worth.total_networth_usd),
        Style::default().fg(text).add_modifier(Modifier::BOLD),
    ))];
    for chain in worth.ranked_chains().into_iter().take(5) {
        lines.push(TextLine::from(format!(
            "{:<10} {}",
            chain.chain,
            format_usd(chain.networth_usd)
        )));
    }
    f.render_widget(Paragraph::new(lines).block(panel("Net Worth", border)), area);
}

fn render_holdings(f: &mut Frame, view: &PortfolioView, area: Rect, border: Color) {
    let chain = match (&view.chain_filter, &view.holdings_chain) {
        (ChainFilter::All, Some(chain)) => format!("all → {chain}"),
        (filter, _) => filter.label().to_string(),
    };
    let title = format!("Holdings [{chain}]");
    if render_status(f, &view.holdings, area, &title, border) {
        return;
    }
    let tokens = view.holdings.ready().map(Vec::as_slice).unwrap_or_default();

    let rows: Vec<Row> = tokens
        .iter()
        .map(|token| {
            let change = token.usd_price_24hr_percent_change;
            let symbol = token.symbol.clone().unwrap_or_else(|| "???".to_string());
            let symbol = if token.possible_spam {
                format!("{symbol} (spam?)")
            } else {
                symbol
            };
            Row::new(vec![
                Cell::from(symbol),
                Cell::from(format_token_amount(&token.balance, token.decimals)),
                Cell::from(format_price(token.usd_price)),
                Cell::from(format_percent_change(Some(change)))
                    .style(Style::default().fg(change_color(change))),
                Cell::from(format_usd(token.usd_value)),
                Cell::from(format_percentage(token.portfolio_percentage)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(12),
            Constraint::Length(16),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(9),
        ],
    )
    .header(
        Row::new(vec!["Token", "Balance", "Price", "24h", "Value", "Share"])
            .style(Style::default().fg(Color::Yellow)),
    )
    .block(panel(format!("{title} ({})", tokens.len()), border));
    f.render_widget(table, area);
}

fn render_pump(
    f: &mut Frame,
    view: &PumpView,
    theme: Theme,
    area: Rect,
    border: Color,
    now: DateTime<Utc>,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    for (index, board) in view.boards.iter().enumerate() {
        let focused = index == view.focus;
        let board_border = if focused { Color::Cyan } else { border };
        let title = board.stage.title();
        if !matches!(board.status, Load::Ready(())) {
            render_status(f, &board.status, columns[index], title, board_border);
            continue;
        }

        let rows: Vec<Row> = board
            .feed
            .items()
            .iter()
            .map(|token| {
                let progress = if board.stage == PumpStage::Graduated {
                    format_age(token.graduated_at, now)
                } else {
                    format_percentage(token.bonding_curve_progress)
                };
                let row = Row::new(vec![
                    token.display_symbol().to_string(),
                    format_price(token.price_usd),
                    format_compact_usd(token.fully_diluted_valuation),
                    progress,
                    format_age(token.created_at, now),
                ]);
                if board.feed.is_fresh(&token.token_address) {
                    row.style(fresh_style(theme))
                } else {
                    row
                }
            })
            .collect();

        let third = if board.stage == PumpStage::Graduated {
            "Grad"
        } else {
            "Curve"
        };
        let mut table = Table::new(
            rows,
            [
                Constraint::Min(8),
                Constraint::Length(12),
                Constraint::Length(9),
                Constraint::Length(7),
                Constraint::Length(5),
            ],
        )
        .header(
            Row::new(vec!["Token", "Price", "FDV", third, "Age"])
                .style(Style::default().fg(Color::Yellow)),
        )
        .block(panel(format!("{title} ({})", board.feed.len()), board_border));
        if focused {
            table = table.row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        }

        let mut state = TableState::default().with_selected(Some(board.selected));
        f.render_stateful_widget(table, columns[index], &mut state);
    }
}

fn render_search_modal(f: &mut Frame, search: &SearchModal, area: Rect, border: Color, base: Style) {
    let popup = centered_rect(70, 70, area);
    f.render_widget(Clear, popup);
    f.render_widget(Block::default().style(base), popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(popup);

    let pending = if search.debouncer.is_pending() { " …" } else { "" };
    f.render_widget(
        Paragraph::new(TextLine::from(vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::raw(format!("{}█{pending}", search.debouncer.query())),
        ]))
        .block(panel("Search tokens", Color::Cyan)),
        chunks[0],
    );

    let (load_title, loading, failed) = if search.showing_suggestions() {
        (
            "Trending",
            matches!(search.suggestions, Load::Loading),
            match &search.suggestions {
                Load::Failed(message) => Some(message.clone()),
                _ => None,
            },
        )
    } else {
        (
            "Results",
            matches!(search.results, Load::Loading),
            match &search.results {
                Load::Failed(message) => Some(message.clone()),
                _ => None,
            },
        )
    };

    if let Some(message) = failed {
        f.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(Color::Red)))
                .block(panel(load_title, border)),
            chunks[1],
        );
        return;
    }
    if loading {
        f.render_widget(
            Paragraph::new("Searching...").block(panel(load_title, border)),
            chunks[1],
        );
        return;
    }

    let entries = search.entries();
    if entries.is_empty() {
        let message = if search.showing_suggestions() {
            "Type to search by name, symbol or address"
        } else {
            "No tokens found"
        };
        f.render_widget(
            Paragraph::new(message).block(panel(load_title, border)),
            chunks[1],
        );
        return;
    }

    let rows: Vec<Row> = entries
        .iter()
        .map(|entry| {
            let change = entry.change.unwrap_or_default();
            Row::new(vec![
                Cell::from(entry.symbol.clone()),
                Cell::from(entry.name.clone()),
                Cell::from(chain_name(&entry.chain)),
                Cell::from(format_price(entry.price)),
                Cell::from(format_percent_change(entry.change))
                    .style(Style::default().fg(change_color(change))),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Min(16),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(9),
        ],
    )
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .block(panel(
        format!("{load_title} - Enter open, Esc close"),
        border,
    ));
    let mut state = TableState::default().with_selected(Some(search.selected));
    f.render_stateful_widget(table, chunks[1], &mut state);
}

fn filter_field_line(modal: &FilterModal, field: FilterField) -> (String, String) {
    let form = &modal.form;
    let condition = field.condition().and_then(|id| {
        form.conditions
            .iter()
            .enumerate()
            .find(|(_, c)| c.id == id)
            .map(|(index, c)| (index + 1, c))
    });
    match (field, condition) {
        (FilterField::Chain, _) => ("Chain".into(), form.chain_label().to_string()),
        (FilterField::Limit, _) => ("Results".into(), form.limit.to_string()),
        (FilterField::SortMetric, _) => ("Sort by".into(), form.sort.metric.label().to_string()),
        (FilterField::SortTimeframe, _) => (
            "Sort window".into(),
            form.sort.timeframe.label().to_string(),
        ),
        (FilterField::SortOrder, _) => (
            "Order".into(),
            if form.sort.descending {
                "Descending".into()
            } else {
                "Ascending".into()
            },
        ),
        (FilterField::Metric(_), Some((n, c))) => {
            (format!("#{n} Metric"), c.metric.label().to_string())
        }
        (FilterField::Timeframe(_), Some((n, c))) => {
            (format!("#{n} Window"), c.timeframe.label().to_string())
        }
        (FilterField::Operator(_), Some((n, c))) => {
            (format!("#{n} Operator"), c.operator.label().to_string())
        }
        (FilterField::Value(_), Some((n, c))) => (format!("#{n} Value"), c.value.clone()),
        _ => (String::new(), String::new()),
    }
}

fn render_filter_modal(f: &mut Frame, modal: &FilterModal, area: Rect, border: Color, base: Style) {
    let popup = centered_rect(60, 80, area);
    f.render_widget(Clear, popup);

    let focused = modal.focused();
    let mut lines: Vec<TextLine> = modal
        .fields()
        .into_iter()
        .map(|field| {
            let (label, value) = filter_field_line(modal, field);
            let style = if field == focused {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            let mut line = TextLine::from(vec![
                Span::styled(format!("{label:<14}"), Style::default().fg(Color::Cyan)),
                Span::styled(value, style),
            ]);
            if field == focused && matches!(field, FilterField::Value(_)) {
                line.spans.push(Span::raw("█"));
            }
            line
        })
        .collect();
    lines.push(TextLine::from(""));
    lines.push(TextLine::from(Span::styled(
        "↑↓ move  ←→ change  0-9 value  a add  x remove  Enter apply  Esc close",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(
        Paragraph::new(lines)
            .style(base)
            .wrap(Wrap { trim: false })
            .block(panel("Filter Tokens", border)),
        popup,
    );
}
