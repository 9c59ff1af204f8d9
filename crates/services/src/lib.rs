pub mod export;
pub mod rewrite;

pub use export::{DocumentExporter, DocumentFormat, ExportError, ExportSettings, ExportedDocument};
pub use rewrite::{
    ports::{RewriteError, RewriteRequest, RewriteResult, RewriteServiceTrait, TokenStream},
    RewriteServiceImpl, RewriteSettings, StreamToken,
};
