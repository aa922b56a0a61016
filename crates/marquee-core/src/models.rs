pub mod genre;
pub mod movie;

pub use genre::{Genre, GENRES, OTHER_GENRE};
pub use movie::{MovieEntry, MovieId, NewMovie};
