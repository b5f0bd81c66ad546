use crate::asset::Address;
use crate::error::ConfigError;
use std::fmt;
use std::path::Path;

pub const DEFAULT_GATEWAY: &str = "https://gateway.pinata.cloud/ipfs";

/// API key pair sent with every pinning request.
#[derive(Clone, Default)]
pub struct PinningCredentials {
    pub api_key: String,
    pub secret_api_key: String,
}

impl PinningCredentials {
    pub fn new(api_key: impl Into<String>, secret_api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_api_key: secret_api_key.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::EmptyCredential("api_key"));
        }
        if self.secret_api_key.trim().is_empty() {
            return Err(ConfigError::EmptyCredential("secret_api_key"));
        }
        Ok(())
    }
}

impl fmt::Debug for PinningCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinningCredentials")
            .field("api_key", &self.api_key)
            .field("secret_api_key", &"<redacted>")
            .finish()
    }
}

/// The ledger cluster to mint on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cluster {
    Mainnet,
    #[default]
    Testnet,
    Custom(String),
}

impl Cluster {
    pub fn rpc_url(&self) -> &str {
        match self {
            Cluster::Mainnet => "https://mainnetbeta-rpc.eclipse.xyz",
            Cluster::Testnet => "https://testnet.dev2.eclipsenetwork.xyz",
            Cluster::Custom(url) => url,
        }
    }
}

impl std::str::FromStr for Cluster {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Cluster::Mainnet),
            "testnet" => Ok(Cluster::Testnet),
            url if url.starts_with("http://") || url.starts_with("https://") => {
                Ok(Cluster::Custom(url.to_string()))
            }
            other => Err(ConfigError::Invalid(format!(
                "unknown cluster `{other}`, expected mainnet, testnet or an URL"
            ))),
        }
    }
}

const KEYPAIR_LEN: usize = 64;

/// A ready-to-sign identity: the wallet address plus its secret key.
#[derive(Clone)]
pub struct SigningIdentity {
    address: Address,
    secret_key: Vec<u8>,
}

impl SigningIdentity {
    pub fn new(address: Address, secret_key: Vec<u8>) -> Self {
        Self {
            address,
            secret_key,
        }
    }

    /// Parses a keypair file: a JSON array of 64 bytes, secret half first.
    pub fn from_keypair_bytes(bytes: &[u8], path: &Path) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidWallet {
            path: path.to_path_buf(),
            reason,
        };

        let keypair: Vec<u8> =
            serde_json::from_slice(bytes).map_err(|e| invalid(format!("not a byte array: {e}")))?;

        if keypair.len() != KEYPAIR_LEN {
            return Err(invalid(format!(
                "expected {KEYPAIR_LEN} bytes, found {}",
                keypair.len()
            )));
        }

        let (secret, public) = keypair.split_at(KEYPAIR_LEN / 2);
        Ok(Self {
            address: Address::new(hex::encode(public)),
            secret_key: secret.to_vec(),
        })
    }

    pub async fn from_keypair_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_keypair_bytes(&bytes, path)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn secret_key(&self) -> &[u8] {
        &self.secret_key
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("address", &self.address)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypair_address_is_public_half() {
        let mut keypair = vec![0u8; 32];
        keypair.extend(std::iter::repeat_n(0xab, 32));
        let json = serde_json::to_vec(&keypair).unwrap();

        let identity = SigningIdentity::from_keypair_bytes(&json, Path::new("wallet.json")).unwrap();

        assert_eq!(identity.address().as_str(), "ab".repeat(32));
        assert_eq!(identity.secret_key(), &[0u8; 32]);
        assert!(!format!("{identity:?}").contains("0, 0"));
    }

    #[test]
    fn short_keypair_is_rejected() {
        let err = SigningIdentity::from_keypair_bytes(b"[1,2,3]", Path::new("wallet.json"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWallet { .. }));
    }

    #[test]
    fn empty_credentials_fail_validation() {
        assert!(PinningCredentials::new("key", "secret").validate().is_ok());
        assert!(matches!(
            PinningCredentials::new("", "secret").validate(),
            Err(ConfigError::EmptyCredential("api_key"))
        ));
        assert!(!format!("{:?}", PinningCredentials::new("key", "hunter2")).contains("hunter2"));
    }

    #[test]
    fn parses_cluster_names() {
        assert_eq!("mainnet".parse::<Cluster>().unwrap(), Cluster::Mainnet);
        assert_eq!(
            "http://localhost:8899".parse::<Cluster>().unwrap().rpc_url(),
            "http://localhost:8899"
        );
        assert!("devnet".parse::<Cluster>().is_err());
    }
}
