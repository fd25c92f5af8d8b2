pub mod anime;
pub mod document;

pub use anime::AnimeRecord;
pub use document::Document;
