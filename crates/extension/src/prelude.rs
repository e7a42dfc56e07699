pub use novelscout_types::{
    Book, CatalogDetails, CatalogEntry, PAGE_SIZE, Review, SearchResult, SearchType, WordCount,
};

pub use crate::http::{Client, Request, Response};
pub use crate::{
    Catalog, Element, Html, Result, Source, SourceError, capture, capture_all, clean_fragment,
    fragment_text, json_text, json_u32, make_absolute_url, non_blank, present, present_count,
    present_tags, strip_tags,
};
