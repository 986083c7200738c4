pub mod url;

pub use url::{CreateUrlRequest, ShortUrl};
