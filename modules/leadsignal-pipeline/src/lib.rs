pub mod extractor;
pub mod fetcher;
pub mod pipeline;
pub mod store;
