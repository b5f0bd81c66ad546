use pinmint_core::prelude::*;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Rewrites a stored snapshot, e.g. to simulate a ledger that drops a field.
pub type Tamper = fn(&mut OnChainAssetSnapshot);

#[derive(Default)]
struct State {
    assets: HashMap<Address, OnChainAssetSnapshot>,
    minted: Vec<MintRequest>,
    fetch_calls: usize,
    reject_with: Option<String>,
    fail_fetch_with: Option<String>,
    tamper: Option<Tamper>,
}

/// A ledger that keeps minted assets in memory and echoes back exactly what
/// was submitted. Creators that match the signer are marked verified.
///
/// Don't use this outside of tests and demos.
#[derive(Clone, Default)]
pub struct MemoryLedger {
    state: Arc<Mutex<State>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent mint fails with [`LedgerError::Rejected`].
    pub fn rejecting(reason: impl Into<String>) -> Self {
        let ledger = Self::default();
        ledger.state.lock().unwrap().reject_with = Some(reason.into());
        ledger
    }

    /// Mints succeed, but every snapshot fetch fails with [`LedgerError::Generic`].
    pub fn failing_fetch(reason: impl Into<String>) -> Self {
        let ledger = Self::default();
        ledger.state.lock().unwrap().fail_fetch_with = Some(reason.into());
        ledger
    }

    pub fn with_tamper(self, tamper: Tamper) -> Self {
        self.state.lock().unwrap().tamper = Some(tamper);
        self
    }

    pub fn mint_calls(&self) -> usize {
        self.state.lock().unwrap().minted.len()
    }

    pub fn fetch_calls(&self) -> usize {
        self.state.lock().unwrap().fetch_calls
    }

    /// Requests submitted so far, in order.
    pub fn minted(&self) -> Vec<MintRequest> {
        self.state.lock().unwrap().minted.clone()
    }
}

impl Ledger for MemoryLedger {
    async fn mint(
        &self,
        signer: &SigningIdentity,
        request: &MintRequest,
    ) -> Result<Address, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.minted.push(request.clone());

        if let Some(reason) = &state.reject_with {
            return Err(LedgerError::Rejected(reason.clone()));
        }
        if signer.secret_key().is_empty() {
            return Err(LedgerError::Rejected(format!(
                "{} cannot sign: empty secret key",
                signer.address()
            )));
        }

        let address = Address::new(hex::encode(rand::rng().random::<[u8; 32]>()));

        let extensions = request
            .extensions()
            .into_iter()
            .map(|ext| match ext {
                Extension::Creators(creators) => Extension::Creators(
                    creators
                        .into_iter()
                        .map(|creator| Creator {
                            verified: creator.address == *signer.address(),
                            ..creator
                        })
                        .collect(),
                ),
                other => other,
            })
            .collect();

        let mut snapshot = OnChainAssetSnapshot {
            address: address.clone(),
            owner: request.owner.clone(),
            name: request.spec.name().to_string(),
            extensions,
        };

        if let Some(tamper) = state.tamper {
            tamper(&mut snapshot);
        }

        debug!(%address, "Stored minted asset");
        state.assets.insert(address.clone(), snapshot);

        Ok(address)
    }

    async fn fetch_asset(&self, address: &Address) -> Result<OnChainAssetSnapshot, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.fetch_calls += 1;

        if let Some(reason) = &state.fail_fetch_with {
            return Err(LedgerError::Generic(reason.clone()));
        }

        state
            .assets
            .get(address)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(address.to_string()))
    }
}
