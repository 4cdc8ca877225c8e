use crate::error::WalletError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub name: String,
    pub address: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct WalletFile {
    version: u32,
    wallets: Vec<Wallet>,
}

/// Accepted on-disk layouts. The bare array is what older builds wrote.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredWallets {
    Versioned(WalletFile),
    Legacy(Vec<Wallet>),
}

/// `0x` followed by exactly 40 hex digits, either case.
pub fn is_valid_evm_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Tracked wallets plus the current selection, written through to a JSON file.
#[derive(Debug)]
pub struct WalletStore {
    path: PathBuf,
    wallets: Vec<Wallet>,
    selected: Option<String>,
}

impl WalletStore {
    /// Reads the wallet file, starting empty if it does not exist.
    /// The first wallet is selected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            info!("No wallet file at {:?}, starting with no wallets", path);
            return Ok(Self {
                path,
                wallets: Vec::new(),
                selected: None,
            });
        }

        let contents = fs::read_to_string(&path)?;
        let wallets = match serde_json::from_str(&contents).map_err(WalletError::Corrupt)? {
            StoredWallets::Versioned(file) if file.version == FORMAT_VERSION => file.wallets,
            StoredWallets::Versioned(file) => {
                return Err(WalletError::UnsupportedVersion(file.version))
            }
            StoredWallets::Legacy(wallets) => {
                info!("Migrating legacy wallet list ({} entries)", wallets.len());
                wallets
            }
        };

        info!("Loaded {} wallets from {:?}", wallets.len(), path);
        let selected = wallets.first().map(|w| w.address.clone());
        Ok(Self {
            path,
            wallets,
            selected,
        })
    }

    fn save(&self) -> Result<(), WalletError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = WalletFile {
            version: FORMAT_VERSION,
            wallets: self.wallets.clone(),
        };
        let contents = serde_json::to_string_pretty(&file).map_err(WalletError::Corrupt)?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, contents)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn selected(&self) -> Option<&Wallet> {
        let address = self.selected.as_deref()?;
        self.wallets.iter().find(|w| w.address == address)
    }

    /// Validates and appends a wallet, selects it and persists the list.
    /// Nothing changes when validation or the write fails.
    pub fn add(&mut self, name: &str, address: &str) -> Result<&Wallet, WalletError> {
        let name = name.trim();
        let address = address.trim();
        if name.is_empty() {
            return Err(WalletError::EmptyName);
        }
        if address.is_empty() {
            return Err(WalletError::EmptyAddress);
        }
        if !is_valid_evm_address(address) {
            return Err(WalletError::InvalidAddress);
        }
        if self
            .wallets
            .iter()
            .any(|w| w.address.eq_ignore_ascii_case(address))
        {
            return Err(WalletError::Duplicate);
        }

        self.wallets.push(Wallet {
            name: name.to_string(),
            address: address.to_string(),
            added_at: Utc::now(),
        });
        if let Err(err) = self.save() {
            warn!("Failed to persist new wallet: {}", err);
            self.wallets.pop();
            return Err(err);
        }

        info!("Tracking wallet {} ({})", name, address);
        self.selected = Some(address.to_string());
        Ok(&self.wallets[self.wallets.len() - 1])
    }

    /// Removes a wallet by address (case-insensitive). Returns false if it was not tracked.
    /// A removed selection falls back to the first remaining wallet.
    pub fn remove(&mut self, address: &str) -> Result<bool, WalletError> {
        let Some(index) = self
            .wallets
            .iter()
            .position(|w| w.address.eq_ignore_ascii_case(address))
        else {
            return Ok(false);
        };

        let removed = self.wallets.remove(index);
        if let Err(err) = self.save() {
            warn!("Failed to persist wallet removal: {}", err);
            self.wallets.insert(index, removed);
            return Err(err);
        }

        info!("Stopped tracking wallet {}", removed.address);
        if self.selected.as_deref() == Some(removed.address.as_str()) {
            self.selected = self.wallets.first().map(|w| w.address.clone());
        }
        Ok(true)
    }

    pub fn select(&mut self, address: &str) -> bool {
        match self
            .wallets
            .iter()
            .find(|w| w.address.eq_ignore_ascii_case(address))
        {
            Some(wallet) => {
                self.selected = Some(wallet.address.clone());
                true
            }
            None => false,
        }
    }

    /// Moves the selection by `offset` positions, wrapping around.
    pub fn select_relative(&mut self, offset: isize) {
        if self.wallets.is_empty() {
            return;
        }
        let len = self.wallets.len() as isize;
        let current = self
            .selected
            .as_deref()
            .and_then(|a| self.wallets.iter().position(|w| w.address == a))
            .unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len) as usize;
        self.selected = Some(self.wallets[next].address.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const ADDR_A: &str = "0xABCDEF0123456789ABCDEF0123456789ABCDEF01";
    const ADDR_B: &str = "0x1111111111111111111111111111111111111111";

    #[test]
    fn test_address_pattern() {
        assert!(is_valid_evm_address(ADDR_A));
        assert!(is_valid_evm_address(&ADDR_A.to_lowercase()));
        assert!(!is_valid_evm_address("0x123"));
        assert!(!is_valid_evm_address("ABCDEF0123456789ABCDEF0123456789ABCDEF0123"));
        assert!(!is_valid_evm_address("0xZZCDEF0123456789ABCDEF0123456789ABCDEF01"));
    }

    #[test]
    fn test_add_validates_and_rejects_duplicates() {
        let dir = tempdir().unwrap();
        let mut store = WalletStore::load(dir.path().join("wallets.json")).unwrap();

        assert!(store.add("Main", ADDR_A).is_ok());
        assert!(matches!(store.add("Test", "0x123"), Err(WalletError::InvalidAddress)));
        assert!(matches!(
            store.add("Again", &ADDR_A.to_lowercase()),
            Err(WalletError::Duplicate)
        ));
        assert!(matches!(store.add("  ", ADDR_B), Err(WalletError::EmptyName)));
        assert!(matches!(store.add("B", ""), Err(WalletError::EmptyAddress)));
        assert_eq!(store.wallets().len(), 1);
    }

    #[test]
    fn test_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("wallets.json");

        let mut store = WalletStore::load(&path).unwrap();
        store.add("Main", ADDR_A).unwrap();
        store.add("Cold", ADDR_B).unwrap();
        assert_eq!(store.selected().map(|w| w.name.as_str()), Some("Cold"));

        let reloaded = WalletStore::load(&path).unwrap();
        assert_eq!(reloaded.wallets().len(), 2);
        assert_eq!(reloaded.wallets()[0].address, ADDR_A);
        assert_eq!(reloaded.selected().map(|w| w.name.as_str()), Some("Main"));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"version\": 1"));
        assert!(raw.contains("addedAt"));
    }

    #[test]
    fn test_remove_selected_falls_back() {
        let dir = tempdir().unwrap();
        let mut store = WalletStore::load(dir.path().join("wallets.json")).unwrap();
        store.add("Main", ADDR_A).unwrap();
        store.add("Cold", ADDR_B).unwrap();

        assert!(store.remove(ADDR_B).unwrap());
        assert_eq!(store.selected().map(|w| w.address.as_str()), Some(ADDR_A));

        assert!(!store.remove(ADDR_B).unwrap());
        assert!(store.remove(&ADDR_A.to_lowercase()).unwrap());
        assert!(store.selected().is_none());
    }

    #[test]
    fn test_legacy_array_is_migrated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        fs::write(
            &path,
            format!(r#"[{{"name":"Old","address":"{ADDR_A}","addedAt":"2024-03-01T10:00:00Z"}}]"#),
        )
        .unwrap();

        let mut store = WalletStore::load(&path).unwrap();
        assert_eq!(store.wallets()[0].name, "Old");

        store.add("New", ADDR_B).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.trim_start().starts_with('{'));
    }

    #[test]
    fn test_unknown_version_and_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wallets.json");

        fs::write(&path, r#"{"version": 7, "wallets": []}"#).unwrap();
        assert!(matches!(
            WalletStore::load(&path),
            Err(WalletError::UnsupportedVersion(7))
        ));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(WalletStore::load(&path), Err(WalletError::Corrupt(_))));
    }

    #[test]
    fn test_select_relative_wraps() {
        let dir = tempdir().unwrap();
        let mut store = WalletStore::load(dir.path().join("wallets.json")).unwrap();
        store.add("Main", ADDR_A).unwrap();
        store.add("Cold", ADDR_B).unwrap();

        store.select_relative(1);
        assert_eq!(store.selected().map(|w| w.name.as_str()), Some("Main"));
        store.select_relative(-1);
        assert_eq!(store.selected().map(|w| w.name.as_str()), Some("Cold"));
        assert!(store.select(&ADDR_A.to_lowercase()));
        assert_eq!(store.selected().map(|w| w.name.as_str()), Some("Main"));
    }
}
