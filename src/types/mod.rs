mod function;
mod openapi;

pub use function::{CallResult, Content, FunctionDefinition};
pub use openapi::{ApiSpecDocument, Components, Info, Server, OPENAPI_VERSION};
