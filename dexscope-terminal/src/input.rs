use std::time::Instant;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use dexscope_core::sort::SortColumn;

use crate::app::{App, Route, View};
use crate::event::Command;

const PANEL_STEP: u16 = 2;

fn step_index(index: usize, len: usize, down: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if down {
        (index + 1).min(len - 1)
    } else {
        index.saturating_sub(1)
    }
}

impl App {
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Vec<Command> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return Vec::new();
        }
        if self.search.open {
            return self.search_key(key, now);
        }
        if self.filter.open {
            return self.filter_key(key);
        }
        if matches!(&self.view, View::Portfolio(view) if view.form.is_some()) {
            return self.wallet_form_key(key);
        }

        match key.code {
            KeyCode::Char('q') => {
                self.quit();
                Vec::new()
            }
            KeyCode::Char('t') => {
                self.toggle_theme();
                Vec::new()
            }
            KeyCode::Char('/') => self.open_search(),
            KeyCode::Char('h') => self.navigate(Route::Trending {
                chain: self.sidebar_chain(),
            }),
            KeyCode::Char('p') => self.navigate(Route::PumpFun),
            KeyCode::Char('w') => self.navigate(Route::Portfolio),
            KeyCode::Char('[') => self.step_sidebar(false),
            KeyCode::Char(']') => self.step_sidebar(true),
            _ => match self.view {
                View::Trending(_) => self.trending_key(key),
                View::Token(_) => self.token_key(key),
                View::Portfolio(_) => self.portfolio_key(key),
                View::PumpFun(_) => self.pump_key(key),
            },
        }
    }

    fn trending_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let View::Trending(view) = &mut self.view else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                view.selected = step_index(view.selected, view.rows.len(), false);
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                view.selected = step_index(view.selected, view.rows.len(), true);
                Vec::new()
            }
            KeyCode::Enter => match view.rows.get(view.selected) {
                Some(token) => {
                    let route = Route::Token {
                        chain: token.chain_id.clone(),
                        address: token.token_address.clone(),
                    };
                    self.navigate(route)
                }
                None => Vec::new(),
            },
            KeyCode::Char('f') => {
                self.filter.open = true;
                Vec::new()
            }
            KeyCode::Char('r') => self.reset_filters(),
            KeyCode::Char(c) => {
                if let Some(column) = SortColumn::from_key(c) {
                    self.toggle_sort(column);
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn token_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let View::Token(view) = &mut self.view else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => self.navigate(Route::Trending {
                chain: self.sidebar_chain(),
            }),
            KeyCode::Tab => self.step_tab(true),
            KeyCode::BackTab => self.step_tab(false),
            KeyCode::Char('.') => self.step_pair(true),
            KeyCode::Char(',') => self.step_pair(false),
            KeyCode::Char('s') => {
                view.period = view.period.next();
                Vec::new()
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                view.panel.grow(PANEL_STEP);
                Vec::new()
            }
            KeyCode::Char('-') => {
                view.panel.shrink(PANEL_STEP);
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                view.selected_row = step_index(view.selected_row, view.row_count(), false);
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                view.selected_row = step_index(view.selected_row, view.row_count(), true);
                Vec::new()
            }
            KeyCode::Char('m') => self.load_more_holders(),
            _ => Vec::new(),
        }
    }

    fn portfolio_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Char('a') => {
                self.open_wallet_form();
                Vec::new()
            }
            KeyCode::Char('d') | KeyCode::Delete => self.remove_selected_wallet(),
            KeyCode::Up | KeyCode::Char('k') => self.select_wallet(-1),
            KeyCode::Down | KeyCode::Char('j') => self.select_wallet(1),
            KeyCode::Char('c') => self.step_chain_filter(true),
            KeyCode::Char('C') => self.step_chain_filter(false),
            KeyCode::Char('r') => self.reload_portfolio(),
            _ => Vec::new(),
        }
    }

    fn pump_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let View::PumpFun(view) = &mut self.view else {
            return Vec::new();
        };
        let boards = view.boards.len();
        match key.code {
            KeyCode::Left => view.focus = view.focus.saturating_sub(1),
            KeyCode::Right => {
                view.focus = (view.focus + 1).min(boards.saturating_sub(1))
            }
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Down | KeyCode::Char('j') => {
                let down = matches!(key.code, KeyCode::Down | KeyCode::Char('j'));
                if let Some(board) = view.boards.get_mut(view.focus) {
                    board.selected = step_index(board.selected, board.feed.len(), down);
                }
            }
            KeyCode::Enter => return self.open_pump_selection(),
            _ => {}
        }
        Vec::new()
    }

    fn search_key(&mut self, key: KeyEvent, now: Instant) -> Vec<Command> {
        match key.code {
            KeyCode::Esc => self.close_search(),
            KeyCode::Enter => return self.open_search_selection(),
            KeyCode::Up => self.search.selected = self.search.selected.saturating_sub(1),
            KeyCode::Down => {
                let len = self.search.entries().len();
                self.search.selected = step_index(self.search.selected, len, true);
            }
            KeyCode::Backspace => self.edit_search(
                |query| {
                    query.pop();
                },
                now,
            ),
            KeyCode::Char(c) => self.edit_search(|query| query.push(c), now),
            _ => {}
        }
        Vec::new()
    }

    fn filter_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let filter = &mut self.filter;
        match key.code {
            KeyCode::Esc => filter.open = false,
            KeyCode::Enter => return self.apply_filters(),
            KeyCode::Up | KeyCode::BackTab => filter.move_focus(-1),
            KeyCode::Down | KeyCode::Tab => filter.move_focus(1),
            KeyCode::Left => filter.adjust(false),
            KeyCode::Right | KeyCode::Char(' ') => filter.adjust(true),
            KeyCode::Char('a') => filter.add_condition(),
            KeyCode::Char('x') | KeyCode::Delete => {
                filter.remove_focused_condition();
            }
            KeyCode::Backspace => filter.backspace(),
            KeyCode::Char(c) => filter.type_char(c),
            _ => {}
        }
        Vec::new()
    }

    fn wallet_form_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let View::Portfolio(view) = &mut self.view else {
            return Vec::new();
        };
        let Some(form) = view.form.as_mut() else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Esc => view.form = None,
            KeyCode::Enter => return self.submit_wallet_form(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.toggle_focus(),
            KeyCode::Backspace => {
                form.focused_mut().pop();
                form.error = None;
            }
            KeyCode::Char(c) => {
                form.focused_mut().push(c);
                form.error = None;
            }
            _ => {}
        }
        Vec::new()
    }

    /// Mouse drag on the token view's handle row resizes the table panel.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Vec<Command> {
        let View::Token(view) = &mut self.view else {
            return Vec::new();
        };
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if view.handle_row == Some(mouse.row) => {
                view.panel.begin_drag(mouse.row);
            }
            MouseEventKind::Drag(MouseButton::Left) if view.panel.is_dragging() => {
                view.panel.drag_to(mouse.row);
            }
            MouseEventKind::Up(MouseButton::Left) => view.panel.end_drag(),
            MouseEventKind::ScrollDown => {
                view.selected_row = step_index(view.selected_row, view.row_count(), true);
            }
            MouseEventKind::ScrollUp => {
                view.selected_row = step_index(view.selected_row, view.row_count(), false);
            }
            _ => {}
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Load, TokenTab};
    use crate::event::AppEvent;
    use dexscope_core::config::PollingConfig;
    use dexscope_core::models::TokenSummary;
    use dexscope_core::wallets::WalletStore;
    use tempfile::TempDir;

    fn app() -> (App, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let wallets = WalletStore::load(dir.path().join("wallets.json")).unwrap();
        (App::new(wallets, PollingConfig::default()), dir)
    }

    fn press(app: &mut App, code: KeyCode) -> Vec<Command> {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), Instant::now())
    }

    fn mouse(app: &mut App, kind: MouseEventKind, row: u16) {
        app.handle_mouse(MouseEvent {
            kind,
            column: 10,
            row,
            modifiers: KeyModifiers::NONE,
        });
    }

    #[test]
    fn test_quit_and_theme() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.theme, crate::app::Theme::Light);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_typing_in_search_does_not_trigger_shortcuts() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('/'));
        assert!(app.search.open);
        for c in "pq".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert!(!app.should_quit);
        assert_eq!(app.search.debouncer.query(), "pq");
        press(&mut app, KeyCode::Esc);
        assert!(!app.search.open);
        assert_eq!(app.search.debouncer.query(), "");
    }

    #[test]
    fn test_number_keys_sort_and_enter_opens_token() {
        let (mut app, _dir) = app();
        let commands = app.navigate(Route::Trending { chain: None });
        let Command::FetchTrending { ticket, .. } = commands[0].clone() else {
            panic!("expected trending fetch");
        };
        let row = |addr: &str, price: f64| TokenSummary {
            chain_id: "0x1".into(),
            token_address: addr.into(),
            usd_price: price,
            ..Default::default()
        };
        app.handle_event(
            AppEvent::TokenList(ticket, Ok(vec![row("0xa", 1.0), row("0xb", 2.0)])),
            Instant::now(),
        );

        press(&mut app, KeyCode::Char('1'));
        let commands = press(&mut app, KeyCode::Enter);
        let Command::LoadToken { chain, address, .. } = &commands[0] else {
            panic!("expected token load");
        };
        assert_eq!((chain.as_str(), address.as_str()), ("0x1", "0xb"));
        assert!(matches!(app.view, View::Token(_)));

        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.view, View::Trending(_)));
    }

    #[test]
    fn test_filter_modal_captures_keys() {
        let (mut app, _dir) = app();
        app.navigate(Route::Trending { chain: None });
        press(&mut app, KeyCode::Char('f'));
        assert!(app.filter.open);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.filter.form.conditions.len(), 2);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        let commands = press(&mut app, KeyCode::Enter);
        assert!(matches!(commands[0], Command::Discover { .. }));
        assert!(!app.filter.open);
    }

    #[test]
    fn test_panel_drag_and_keys() {
        let (mut app, _dir) = app();
        app.navigate(Route::Token {
            chain: "0x1".into(),
            address: "0xtoken".into(),
        });
        let height = |app: &App| match &app.view {
            View::Token(view) => view.panel.height(),
            _ => 0,
        };
        let start = height(&app);

        // not on the handle
        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 30);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 20);
        assert_eq!(height(&app), start);

        if let View::Token(view) = &mut app.view {
            view.handle_row = Some(30);
        }
        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 30);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 26);
        assert_eq!(height(&app), start + 4);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 60);
        assert_eq!(height(&app), 6);
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 60);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 0);
        assert_eq!(height(&app), 6);

        press(&mut app, KeyCode::Char('+'));
        assert_eq!(height(&app), 8);
        press(&mut app, KeyCode::Char('-'));
        press(&mut app, KeyCode::Char('-'));
        assert_eq!(height(&app), 6);
    }

    #[test]
    fn test_tab_key_cycles_token_tabs() {
        let (mut app, _dir) = app();
        app.navigate(Route::Token {
            chain: "0x1".into(),
            address: "0xtoken".into(),
        });
        let commands = press(&mut app, KeyCode::Tab);
        assert!(matches!(commands[0], Command::LoadHolders { .. }));
        let commands = press(&mut app, KeyCode::Tab);
        assert!(matches!(commands[0], Command::LoadInsights { .. }));
        press(&mut app, KeyCode::Tab);
        let View::Token(view) = &app.view else {
            panic!("expected token view");
        };
        assert_eq!(view.tab, TokenTab::Snipers);
        assert_eq!(view.holders, Load::Loading);
    }

    #[test]
    fn test_wallet_form_typing() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('w'));
        press(&mut app, KeyCode::Char('a'));
        for c in "Main".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Tab);
        for c in "0x1111111111111111111111111111111111111111".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        let commands = press(&mut app, KeyCode::Enter);
        assert!(matches!(commands[0], Command::LoadNetWorth { .. }));
        assert_eq!(app.wallets.wallets()[0].name, "Main");
    }
}
