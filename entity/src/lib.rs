pub mod prelude;

pub mod content;
pub mod content_tag;
pub mod tag;
