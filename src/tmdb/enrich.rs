use serde::{Deserialize, Serialize};

use super::client::{TmdbClient, TmdbResult};
use super::types::{MovieCredits, MovieDetails};

/// How many cast members the enriched record keeps.
const TOP_CAST: usize = 5;

/// A movie joined from the details and credits endpoints. This is what
/// the detail API returns and what clients post back when saving to the
/// watchlist, so unknown extra fields are tolerated and most fields
/// default when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    /// Upper-cased, empty when the catalog has none.
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default = "unknown_director")]
    pub director: String,
    /// At most [`TOP_CAST`] names, in billing order.
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub vote_average: f64,
}

fn unknown_director() -> String {
    "Unknown".to_string()
}

/// Fetch details and credits concurrently and join them. Either side
/// failing fails the whole lookup; no partial record is produced.
pub async fn rich_movie(client: &TmdbClient, movie_id: i64) -> TmdbResult<MovieRecord> {
    let (details, credits) = tokio::try_join!(
        client.movie_details(movie_id),
        client.movie_credits(movie_id),
    )?;
    Ok(join_movie(details, credits))
}

fn join_movie(details: MovieDetails, credits: MovieCredits) -> MovieRecord {
    MovieRecord {
        id: details.id,
        title: details.title,
        poster_path: details.poster_path,
        backdrop_path: details.backdrop_path,
        release_date: details.release_date,
        tagline: details
            .tagline
            .map(|t| t.to_uppercase())
            .unwrap_or_default(),
        overview: details.overview,
        genres: details.genres.into_iter().map(|g| g.name).collect(),
        director: director_name(&credits),
        actors: top_cast(&credits),
        vote_average: details.vote_average,
    }
}

/// First crew member credited with the Director job, else "Unknown".
fn director_name(credits: &MovieCredits) -> String {
    credits
        .crew
        .iter()
        .find(|person| person.job == "Director")
        .map(|person| person.name.clone())
        .unwrap_or_else(unknown_director)
}

fn top_cast(credits: &MovieCredits) -> Vec<String> {
    credits
        .cast
        .iter()
        .take(TOP_CAST)
        .map(|actor| actor.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmdb::types::{CastMember, CrewMember, Genre};

    fn details() -> MovieDetails {
        MovieDetails {
            id: 27205,
            title: "Inception".to_string(),
            poster_path: Some("/inception.jpg".to_string()),
            backdrop_path: Some("/inception-wide.jpg".to_string()),
            release_date: Some("2010-07-16".to_string()),
            overview: Some("A thief who steals corporate secrets.".to_string()),
            tagline: Some("Your mind is the scene of the crime.".to_string()),
            genres: vec![
                Genre {
                    id: 28,
                    name: "Action".to_string(),
                },
                Genre {
                    id: 878,
                    name: "Science Fiction".to_string(),
                },
            ],
            vote_average: 8.4,
        }
    }

    fn credits() -> MovieCredits {
        MovieCredits {
            cast: cast(&[
                "Leonardo DiCaprio",
                "Joseph Gordon-Levitt",
                "Elliot Page",
                "Tom Hardy",
                "Ken Watanabe",
                "Cillian Murphy",
            ]),
            crew: vec![
                CrewMember {
                    name: "Emma Thomas".to_string(),
                    job: "Producer".to_string(),
                },
                CrewMember {
                    name: "Christopher Nolan".to_string(),
                    job: "Director".to_string(),
                },
            ],
        }
    }

    fn cast(names: &[&str]) -> Vec<CastMember> {
        names
            .iter()
            .map(|n| CastMember {
                name: n.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_join_inception() {
        let record = join_movie(details(), credits());
        assert_eq!(record.id, 27205);
        assert_eq!(record.title, "Inception");
        assert_eq!(record.director, "Christopher Nolan");
        assert_eq!(record.tagline, "YOUR MIND IS THE SCENE OF THE CRIME.");
        assert_eq!(record.genres, vec!["Action", "Science Fiction"]);
        assert_eq!(record.actors.len(), 5);
        assert_eq!(record.actors[0], "Leonardo DiCaprio");
        assert_eq!(record.actors[4], "Ken Watanabe");
    }

    #[test]
    fn test_director_unknown_without_director_credit() {
        let mut c = credits();
        c.crew.retain(|person| person.job != "Director");
        assert_eq!(join_movie(details(), c).director, "Unknown");
    }

    #[test]
    fn test_first_director_wins() {
        let mut c = credits();
        c.crew.push(CrewMember {
            name: "Second Director".to_string(),
            job: "Director".to_string(),
        });
        assert_eq!(join_movie(details(), c).director, "Christopher Nolan");
    }

    #[test]
    fn test_short_cast_is_kept_whole() {
        let mut c = credits();
        c.cast.truncate(2);
        let record = join_movie(details(), c);
        assert_eq!(
            record.actors,
            vec!["Leonardo DiCaprio", "Joseph Gordon-Levitt"]
        );
    }

    #[test]
    fn test_missing_tagline_becomes_empty() {
        let mut d = details();
        d.tagline = None;
        assert_eq!(join_movie(d, credits()).tagline, "");
    }
}
