pub mod client;
pub mod enrich;
pub mod types;

pub use client::{TmdbClient, TmdbError, TmdbResult};
pub use enrich::{rich_movie, MovieRecord};
pub use types::{CastMember, CrewMember, Genre, MovieCredits, MovieDetails, MovieSummary};
