mod compiler;
mod error;
mod library;
mod metadata;
mod node;
mod output;
mod resolver;
mod schema;
mod slot;

pub use error::ComposeError;
pub use library::{BuildRequest, Composition, GraphReport, NodeLibrary};
pub use metadata::{InterfaceVar, ShaderMetadata};
pub use node::{Node, Stage};
pub use schema::{DeclList, InputBlock, NodeRecord};
pub use slot::Slot;
