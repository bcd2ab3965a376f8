pub mod episode;
pub mod video;
