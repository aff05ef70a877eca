pub mod csvio;
pub mod feeds;
pub mod fixnodes;
pub mod model;
pub mod relations;
pub mod scrape;
pub mod source;
pub mod tweets;
