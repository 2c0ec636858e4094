use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::models::{Movie, Showtime, Theatre};

pub const CITIES: [&str; 10] = [
    "Chennai",
    "Mumbai",
    "Delhi",
    "Bangalore",
    "Hyderabad",
    "Kolkata",
    "Pune",
    "Ahmedabad",
    "Jaipur",
    "Coimbatore",
];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Theatre {0} not found")]
    TheatreNotFound(String),
    #[error("Movie {0} not found")]
    MovieNotFound(String),
    #[error("Showtime {0} not found")]
    ShowtimeNotFound(String),
    #[error("Please fill in all required fields")]
    Invalid(#[from] ValidationErrors),
    #[error("Date must be YYYY-MM-DD, got {0}")]
    InvalidDate(String),
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct NewMovie {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(url)]
    pub poster_url: String,
    pub description: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct NewShowtime {
    #[validate(length(min = 1))]
    pub movie_id: String,
    #[validate(length(min = 1))]
    pub theatre_id: String,
    #[validate(length(min = 1))]
    pub screen: String,
    #[validate(length(min = 1))]
    pub time: String,
    pub date: String,
}

/// Read side of theatres, movies and showtimes, plus the two admin writes.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Supported cities, filtered by a case-insensitive substring.
    async fn list_cities(&self, query: Option<&str>) -> Vec<String>;
    async fn list_theatres_by_city(&self, city: &str) -> Vec<Theatre>;
    async fn theatre(&self, id: &str) -> Result<Theatre, CatalogError>;
    /// Movies with at least one showtime at the theatre.
    async fn list_movies_for_theatre(&self, theatre_id: &str) -> Result<Vec<Movie>, CatalogError>;
    async fn movie(&self, id: &str) -> Result<Movie, CatalogError>;
    async fn list_showtimes(&self, movie_id: &str, theatre_id: &str) -> Vec<Showtime>;
    async fn showtime(&self, id: &str) -> Result<Showtime, CatalogError>;
    async fn add_movie(&self, movie: NewMovie) -> Result<Movie, CatalogError>;
    async fn add_showtime(&self, showtime: NewShowtime) -> Result<Showtime, CatalogError>;
}

#[derive(Debug, Default)]
struct Store {
    theatres: Vec<Theatre>,
    movies: Vec<Movie>,
    showtimes: Vec<Showtime>,
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    store: RwLock<Store>,
}

impl InMemoryCatalog {
    pub fn new(theatres: Vec<Theatre>, movies: Vec<Movie>, showtimes: Vec<Showtime>) -> Self {
        Self {
            store: RwLock::new(Store {
                theatres,
                movies,
                showtimes,
            }),
        }
    }

    /// Demo inventory: four Chennai theatres, four movies, six showtimes.
    pub fn seeded() -> Self {
        Self::new(seed_theatres(), seed_movies(), seed_showtimes())
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn list_cities(&self, query: Option<&str>) -> Vec<String> {
        let needle = query.map(|q| q.trim().to_lowercase()).unwrap_or_default();
        CITIES
            .iter()
            .filter(|city| city.to_lowercase().contains(&needle))
            .map(|city| city.to_string())
            .collect()
    }

    async fn list_theatres_by_city(&self, city: &str) -> Vec<Theatre> {
        self.store
            .read()
            .await
            .theatres
            .iter()
            .filter(|t| t.is_active && t.city.eq_ignore_ascii_case(city.trim()))
            .cloned()
            .collect()
    }

    async fn theatre(&self, id: &str) -> Result<Theatre, CatalogError> {
        self.store
            .read()
            .await
            .theatres
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::TheatreNotFound(id.to_string()))
    }

    async fn list_movies_for_theatre(&self, theatre_id: &str) -> Result<Vec<Movie>, CatalogError> {
        let store = self.store.read().await;
        if !store.theatres.iter().any(|t| t.id == theatre_id) {
            return Err(CatalogError::TheatreNotFound(theatre_id.to_string()));
        }
        Ok(store
            .movies
            .iter()
            .filter(|m| {
                store
                    .showtimes
                    .iter()
                    .any(|s| s.theatre_id == theatre_id && s.movie_id == m.id)
            })
            .cloned()
            .collect())
    }

    async fn movie(&self, id: &str) -> Result<Movie, CatalogError> {
        self.store
            .read()
            .await
            .movies
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::MovieNotFound(id.to_string()))
    }

    async fn list_showtimes(&self, movie_id: &str, theatre_id: &str) -> Vec<Showtime> {
        self.store
            .read()
            .await
            .showtimes
            .iter()
            .filter(|s| s.movie_id == movie_id && s.theatre_id == theatre_id)
            .cloned()
            .collect()
    }

    async fn showtime(&self, id: &str) -> Result<Showtime, CatalogError> {
        self.store
            .read()
            .await
            .showtimes
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::ShowtimeNotFound(id.to_string()))
    }

    async fn add_movie(&self, new: NewMovie) -> Result<Movie, CatalogError> {
        let new = NewMovie {
            title: new.title.trim().to_string(),
            poster_url: new.poster_url.trim().to_string(),
            ..new
        };
        new.validate()?;

        let movie = Movie {
            id: format!("movie-{}", Uuid::new_v4().simple()),
            title: new.title,
            poster_url: new.poster_url,
            description: new.description.filter(|d| !d.trim().is_empty()),
            duration: new.duration.filter(|d| !d.trim().is_empty()),
        };
        self.store.write().await.movies.push(movie.clone());
        info!("Added movie {} ({})", movie.title, movie.id);
        Ok(movie)
    }

    async fn add_showtime(&self, new: NewShowtime) -> Result<Showtime, CatalogError> {
        new.validate()?;
        NaiveDate::parse_from_str(&new.date, "%Y-%m-%d")
            .map_err(|_| CatalogError::InvalidDate(new.date.clone()))?;

        let mut store = self.store.write().await;
        if !store.theatres.iter().any(|t| t.id == new.theatre_id) {
            return Err(CatalogError::TheatreNotFound(new.theatre_id));
        }
        if !store.movies.iter().any(|m| m.id == new.movie_id) {
            return Err(CatalogError::MovieNotFound(new.movie_id));
        }

        let showtime = Showtime {
            id: format!("showtime-{}", Uuid::new_v4().simple()),
            movie_id: new.movie_id,
            theatre_id: new.theatre_id,
            screen: new.screen,
            time: new.time,
            date: new.date,
        };
        store.showtimes.push(showtime.clone());
        info!("Added showtime {} for movie {}", showtime.id, showtime.movie_id);
        Ok(showtime)
    }
}

fn theatre(id: &str, name: &str, area: &str, image: &str, has_payment_gateway: bool) -> Theatre {
    Theatre {
        id: id.into(),
        name: name.into(),
        location: format!("{}, Chennai", area),
        city: "Chennai".into(),
        image: image.into(),
        is_active: true,
        has_payment_gateway,
    }
}

fn seed_theatres() -> Vec<Theatre> {
    vec![
        theatre(
            "theatre-1",
            "Light House Cinemas",
            "Anna Nagar",
            "https://whatsupmonterey.com/subscribers/3/uploaded_files/member/profile/f5e208581db49cec4d3e7acb4b86e995.jpg",
            true,
        ),
        theatre(
            "theatre-2",
            "KG Cinemas",
            "T Nagar",
            "https://pbs.twimg.com/media/GCvt7mcbgAAjD4S.jpg",
            false,
        ),
        theatre(
            "theatre-3",
            "APA Cinemas",
            "Velachery",
            "https://www.mappls.com/place/ZY9V6T_1661773879954_0.png",
            false,
        ),
        theatre(
            "theatre-4",
            "Ratnam Talkies",
            "Adyar",
            "https://ecoimbatore.com/wp-content/uploads/2021/06/cinema.jpg",
            false,
        ),
    ]
}

fn movie(id: &str, title: &str, description: &str, duration: &str, poster: &str) -> Movie {
    Movie {
        id: id.into(),
        title: title.into(),
        poster_url: poster.into(),
        description: Some(description.into()),
        duration: Some(duration.into()),
    }
}

fn seed_movies() -> Vec<Movie> {
    vec![
        movie(
            "movie-1",
            "Cosmic Odyssey",
            "A journey beyond the stars",
            "2h 15m",
            "https://images.unsplash.com/photo-1636572481914-a07d36917486?q=80&w=2070",
        ),
        movie(
            "movie-2",
            "Neon Nights",
            "A cyberpunk thriller",
            "1h 55m",
            "https://images.unsplash.com/photo-1594909122845-11baa439b7bf?q=80&w=2070",
        ),
        movie(
            "movie-3",
            "Digital Dreams",
            "Reality is just an illusion",
            "2h 30m",
            "https://images.unsplash.com/photo-1626814026160-2237a95fc5a0?q=80&w=2070",
        ),
        movie(
            "movie-4",
            "Quantum Leap",
            "The future is now",
            "2h 5m",
            "https://images.unsplash.com/photo-1579546929518-9e396f3cc809?q=80&w=2070",
        ),
    ]
}

fn seed_showtimes() -> Vec<Showtime> {
    [
        ("showtime-1", "movie-1", "theatre-1", "Screen 1", "10:00 AM"),
        ("showtime-2", "movie-1", "theatre-1", "Screen 2", "1:30 PM"),
        ("showtime-3", "movie-2", "theatre-1", "Screen 1", "4:00 PM"),
        ("showtime-4", "movie-2", "theatre-1", "Screen 2", "7:30 PM"),
        ("showtime-5", "movie-3", "theatre-2", "Screen 1", "11:00 AM"),
        ("showtime-6", "movie-4", "theatre-3", "Screen 2", "3:00 PM"),
    ]
    .into_iter()
    .map(|(id, movie_id, theatre_id, screen, time)| Showtime {
        id: id.into(),
        movie_id: movie_id.into(),
        theatre_id: theatre_id.into(),
        screen: screen.into(),
        time: time.into(),
        date: "2025-05-10".into(),
    })
    .collect()
}
