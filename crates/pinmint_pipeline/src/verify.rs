use pinmint_core::prelude::*;
use std::fmt::Display;
use tracing::{debug, instrument};

/// What the asset at `address` should look like after minting.
#[derive(Debug, Clone, Copy)]
pub struct ExpectedAsset<'a> {
    pub address: &'a Address,
    pub owner: &'a Address,
    pub spec: &'a AssetMintSpec,
}

/// Result of the verify stage. Diagnostic only, never fails a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Passed,
    Failed(Vec<Mismatch>),
    /// The snapshot could not be fetched.
    Unavailable(String),
}

impl Verification {
    pub fn is_passed(&self) -> bool {
        matches!(self, Verification::Passed)
    }

    pub fn mismatches(&self) -> &[Mismatch] {
        match self {
            Verification::Failed(mismatches) => mismatches,
            Verification::Passed | Verification::Unavailable(_) => &[],
        }
    }
}

impl From<Vec<Mismatch>> for Verification {
    fn from(mismatches: Vec<Mismatch>) -> Self {
        if mismatches.is_empty() {
            Verification::Passed
        } else {
            Verification::Failed(mismatches)
        }
    }
}

#[derive(Default)]
struct Checks(Vec<Mismatch>);

impl Checks {
    fn expect<T: PartialEq + Display + ?Sized>(&mut self, check: &str, expected: &T, actual: &T) {
        if expected != actual {
            self.0.push(Mismatch::field(check, expected, actual));
        }
    }

    fn missing(&mut self, kind: ExtensionKind) {
        self.0.push(Mismatch::ExtensionNotFound(kind));
    }
}

/// Fetches the asset and compares it against `expected`.
#[instrument(skip(ledger, expected), fields(asset = %expected.address))]
pub async fn verify<L: Ledger>(
    ledger: &L,
    expected: &ExpectedAsset<'_>,
) -> Result<Vec<Mismatch>, LedgerError> {
    let snapshot = ledger.fetch_asset(expected.address).await?;
    let mismatches = compare(expected, &snapshot);
    debug!(failed = mismatches.len(), "Compared on-chain asset");
    Ok(mismatches)
}

/// Every check that failed, in a fixed order. Missing extensions are
/// reported rather than skipped.
pub fn compare(expected: &ExpectedAsset<'_>, snapshot: &OnChainAssetSnapshot) -> Vec<Mismatch> {
    let mut checks = Checks::default();
    let spec = expected.spec;

    checks.expect("owner", expected.owner.as_str(), snapshot.owner.as_str());
    checks.expect("asset address", expected.address.as_str(), snapshot.address.as_str());
    checks.expect("name", spec.name(), snapshot.name.as_str());

    match snapshot.creators() {
        Some(creators) => {
            checks.expect("creators length", &spec.creators().len(), &creators.len());
            for (i, (want, got)) in spec.creators().iter().zip(creators).enumerate() {
                checks.expect(
                    &format!("creator[{i}] address"),
                    want.address.as_str(),
                    got.address.as_str(),
                );
                checks.expect(&format!("creator[{i}] share"), &want.share, &got.share);
                checks.expect(&format!("creator[{i}] verified"), &true, &got.verified);
            }
        }
        None => checks.missing(ExtensionKind::Creators),
    }

    match snapshot.metadata() {
        Some(metadata) => {
            checks.expect("symbol", spec.symbol(), metadata.symbol.as_str());
            checks.expect("description", spec.description(), metadata.description.as_str());
            checks.expect("metadata uri", spec.uri(), metadata.uri.as_str());
        }
        None => checks.missing(ExtensionKind::Metadata),
    }

    match snapshot.royalties() {
        // Compared in decimal form, the on-chain value is u64.
        Some(royalties) => checks.expect(
            "royalty basis points",
            spec.royalties().to_string().as_str(),
            royalties.basis_points.to_string().as_str(),
        ),
        None => checks.missing(ExtensionKind::Royalties),
    }

    checks.0
}
