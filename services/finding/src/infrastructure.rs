// Infrastructure layer modules
pub mod config;
pub mod credential_provider;
pub mod finding_client;
pub mod item_sink;
pub mod logging;

// Re-exports
pub use config::{AppIdSource, FindingConfig, FindingConfigError};
pub use credential_provider::{
    CredentialError, CredentialProvider, SsmCredentialProvider, StaticCredentialProvider,
    credential_provider_from_config,
};
pub use finding_client::{FindingTransport, HttpFindingTransport, TransportError};
pub use item_sink::{ItemSink, ItemSinkError, TracingItemSink};
pub use logging::init_logging;

#[cfg(test)]
pub use logging::init_test_logging;
