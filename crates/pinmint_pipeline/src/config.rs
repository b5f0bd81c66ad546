use pinmint_core::prelude::*;

/// Everything a [`MintWorkflow`](crate::mint::MintWorkflow) needs, passed
/// once at construction.
#[derive(Clone, Debug)]
pub struct MintConfig {
    pub credentials: PinningCredentials,
    pub cluster: Cluster,
    /// Signs the mint and becomes owner, authority, payer and sole creator.
    pub identity: SigningIdentity,
    /// IPFS gateway the published URIs point at.
    ///
    /// Defaults to [`DEFAULT_GATEWAY`].
    pub gateway: String,
    pub details: AssetDetails,
}

impl MintConfig {
    pub fn new(credentials: PinningCredentials, identity: SigningIdentity) -> Self {
        Self {
            credentials,
            cluster: Cluster::default(),
            identity,
            gateway: DEFAULT_GATEWAY.to_string(),
            details: AssetDetails::default(),
        }
    }

    pub fn with_cluster(mut self, cluster: Cluster) -> Self {
        self.cluster = cluster;
        self
    }

    pub fn with_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.gateway = gateway.into();
        self
    }

    pub fn with_details(mut self, details: AssetDetails) -> Self {
        self.details = details;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.credentials.validate()?;

        if !(self.gateway.starts_with("http://") || self.gateway.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "gateway `{}` is not an http(s) URL",
                self.gateway
            )));
        }

        if self.details.name.trim().is_empty() {
            return Err(ConfigError::Invalid("asset name is empty".into()));
        }

        if self.details.royalties > MAX_BASIS_POINTS {
            return Err(ConfigError::Invalid(format!(
                "royalties of {} basis points exceed {MAX_BASIS_POINTS}",
                self.details.royalties
            )));
        }

        Ok(())
    }
}
