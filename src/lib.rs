pub mod builtins;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod provider;
pub mod serializer;
pub mod server;
pub mod types;

pub use cli::run_cli;
pub use config::{Config, ServerConfig, SpecConfig, WorkspaceConfig};
pub use dispatcher::Dispatcher;
pub use error::ActionError;
pub use provider::{
    FunctionProvider, FunctionRegistry, ProviderMap, ProviderResolver, RegistryProvider,
};
pub use serializer::SpecSerializer;
pub use server::{build_router, AppState};
pub use types::{ApiSpecDocument, CallResult, Content, FunctionDefinition};
