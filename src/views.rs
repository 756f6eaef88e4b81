//! Transient view state: the search result slot, pagination and chrome helpers.
//! Nothing here outlives the page that shows it or feeds back into the store.

use crate::model::{Movie, User};
use serde::Serialize;

/// Identifies one submitted search. Only the newest ticket may fill the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct SearchSlot {
    query: String,
    results: Vec<Movie>,
    page: usize,
    notice: Option<String>,
    generation: u64,
}

impl SearchSlot {
    pub fn new() -> Self {
        SearchSlot {
            page: 1,
            ..SearchSlot::default()
        }
    }

    pub fn begin(&mut self, query: &str) -> Ticket {
        self.generation += 1;
        self.query = query.trim().to_owned();
        Ticket(self.generation)
    }

    /// Stores the outcome of a search. Returns false, leaving the slot
    /// untouched, when a newer search was started in the meantime.
    pub fn complete(&mut self, ticket: Ticket, results: Vec<Movie>, notice: Option<String>) -> bool {
        if ticket.0 != self.generation {
            return false;
        }
        self.results = results;
        self.page = 1;
        if notice.is_some() {
            self.notice = notice;
        }
        true
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Movie] {
        &self.results
    }

    pub fn find(&self, imdb_id: &str) -> Option<&Movie> {
        self.results.iter().find(|movie| movie.imdb_id == imdb_id)
    }

    pub fn notify<S: Into<String>>(&mut self, message: S) {
        self.notice = Some(message.into());
    }

    /// Notices are shown once.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn set_page(&mut self, page: usize, per_page: usize) {
        self.page = page.max(1).min(page_count(self.results.len(), per_page));
    }

    pub fn page(&self, per_page: usize) -> Page<'_> {
        Page::of(&self.results, self.page, per_page)
    }

    pub fn reset(&mut self) {
        let generation = self.generation;
        *self = SearchSlot::new();
        // keep in-flight searches from a previous session out of the fresh slot
        self.generation = generation + 1;
    }
}

fn page_count(len: usize, per_page: usize) -> usize {
    let per_page = per_page.max(1);
    len.div_ceil(per_page).max(1)
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Page<'a> {
    pub number: usize,
    pub count: usize,
    pub movies: &'a [Movie],
    pub has_prev: bool,
    pub has_next: bool,
}

impl<'a> Page<'a> {
    pub fn of(movies: &'a [Movie], number: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let count = page_count(movies.len(), per_page);
        let number = number.max(1).min(count);
        let start = ((number - 1) * per_page).min(movies.len());
        let end = (start + per_page).min(movies.len());
        Page {
            number,
            count,
            movies: &movies[start..end],
            has_prev: number > 1,
            has_next: number < count,
        }
    }
}

/// A search result as shown on a card.
#[derive(Serialize, Debug)]
pub struct Card<'a> {
    pub movie: &'a Movie,
    pub in_watchlist: bool,
}

pub fn cards<'a>(movies: &'a [Movie], user: Option<&User>) -> Vec<Card<'a>> {
    movies
        .iter()
        .map(|movie| Card {
            movie,
            in_watchlist: user.map_or(false, |user| user.has_movie(&movie.imdb_id)),
        })
        .collect()
}

/// Email and initial shown in the navigation chrome.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Badge {
    pub email: String,
    pub initial: String,
}

impl Badge {
    pub fn for_user(user: Option<&User>) -> Self {
        let email = user.map_or("User", |user| user.email.as_str()).to_owned();
        let initial: String = email
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default();
        Badge { email, initial }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movies(n: usize) -> Vec<Movie> {
        (1..=n)
            .map(|i| Movie {
                imdb_id: format!("tt{}", i),
                title: format!("Movie {}", i),
                year: "2000".to_owned(),
                poster: "N/A".to_owned(),
                kind: "movie".to_owned(),
            })
            .collect()
    }

    #[test]
    fn page_splits_results() {
        let all = movies(7);
        let first = Page::of(&all, 1, 3);
        assert_eq!(first.count, 3);
        assert_eq!(first.movies.len(), 3);
        assert!(!first.has_prev);
        assert!(first.has_next);

        let last = Page::of(&all, 3, 3);
        assert_eq!(last.movies, &all[6..]);
        assert!(last.has_prev);
        assert!(!last.has_next);
    }

    #[test]
    fn page_is_clamped() {
        let all = movies(4);
        assert_eq!(Page::of(&all, 0, 3).number, 1);
        assert_eq!(Page::of(&all, 9, 3).number, 2);
    }

    #[test]
    fn empty_results_have_one_page() {
        let page = Page::of(&[], 1, 3);
        assert_eq!(page.count, 1);
        assert!(page.movies.is_empty());
        assert!(!page.has_next);
    }

    #[test]
    fn complete_resets_page_cursor() {
        let mut slot = SearchSlot::new();
        let ticket = slot.begin("a");
        assert!(slot.complete(ticket, movies(9), None));
        slot.set_page(3, 3);
        assert_eq!(slot.page(3).number, 3);

        let ticket = slot.begin("b");
        assert!(slot.complete(ticket, movies(9), None));
        assert_eq!(slot.page(3).number, 1);
    }

    #[test]
    fn stale_result_is_discarded() {
        let mut slot = SearchSlot::new();
        let old = slot.begin("old");
        let new = slot.begin("new");
        assert!(slot.complete(new, movies(2), None));
        assert!(!slot.complete(old, movies(5), Some("No movies found.".to_owned())));
        assert_eq!(slot.results().len(), 2);
        assert_eq!(slot.query(), "new");
        assert_eq!(slot.take_notice(), None);
    }

    #[test]
    fn reset_drops_in_flight_searches() {
        let mut slot = SearchSlot::new();
        let ticket = slot.begin("heat");
        slot.reset();
        assert!(!slot.complete(ticket, movies(3), None));
        assert!(slot.results().is_empty());
    }

    #[test]
    fn notice_is_taken_once() {
        let mut slot = SearchSlot::new();
        slot.notify("No movies found.");
        assert_eq!(slot.take_notice().as_deref(), Some("No movies found."));
        assert_eq!(slot.take_notice(), None);
    }

    #[test]
    fn cards_flag_watchlist_members() {
        let all = movies(2);
        let user = User {
            email: "a@x.com".to_owned(),
            movies: vec![all[1].clone()],
        };
        let cards = cards(&all, Some(&user));
        assert!(!cards[0].in_watchlist);
        assert!(cards[1].in_watchlist);
        assert!(super::cards(&all, None).iter().all(|card| !card.in_watchlist));
    }

    #[test]
    fn badge_defaults_to_user() {
        assert_eq!(
            Badge::for_user(None),
            Badge {
                email: "User".to_owned(),
                initial: "U".to_owned()
            }
        );
        let user = User::new("bob@x.com");
        assert_eq!(Badge::for_user(Some(&user)).initial, "B");
    }
}
