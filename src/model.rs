use serde::{Deserialize, Serialize};

/// A search result as returned by OMDb, kept verbatim when added to a watchlist.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
    #[serde(rename = "Type", default)]
    pub kind: String,
}

/// Full record from an id lookup. Only ever displayed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MovieDetail {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Rated", default)]
    pub rated: String,
    #[serde(rename = "Released", default)]
    pub released: String,
    #[serde(rename = "Runtime", default)]
    pub runtime: String,
    #[serde(rename = "Genre", default)]
    pub genre: String,
    #[serde(rename = "Director", default)]
    pub director: String,
    #[serde(rename = "Actors", default)]
    pub actors: String,
    #[serde(rename = "Plot", default)]
    pub plot: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub movies: Vec<Movie>,
}

impl User {
    pub fn new(email: &str) -> Self {
        User {
            email: email.to_owned(),
            movies: Vec::new(),
        }
    }

    pub fn has_movie(&self, imdb_id: &str) -> bool {
        self.movies.iter().any(|movie| movie.imdb_id == imdb_id)
    }
}
