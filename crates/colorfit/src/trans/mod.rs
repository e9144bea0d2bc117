//! State and algorithms for converting colors to lesser ranks.

mod cache;
mod translator;

pub use cache::ConversionCache;
pub use translator::Translator;
