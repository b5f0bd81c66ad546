pub use pinmint_core::*;

#[cfg(feature = "pinata")]
pub mod pinata {
    pub use pinmint_pinata::*;
}

#[cfg(feature = "pipeline")]
pub mod pipeline {
    pub use pinmint_pipeline::*;
}

#[cfg(feature = "ledger_mock")]
pub mod ledger_mock {
    pub use pinmint_ledger_mock::*;
}

pub mod prelude {
    pub use pinmint_core::prelude::*;

    #[cfg(feature = "pinata")]
    pub use pinmint_pinata::{PinataClient, PinataConfig, PinataTransport};

    #[cfg(feature = "pipeline")]
    pub use pinmint_pipeline::prelude::*;

    #[cfg(feature = "ledger_mock")]
    pub use pinmint_ledger_mock::MemoryLedger;
}
