pub mod json;
pub mod net;
pub mod scraping;
pub mod text;
