//! The user/watchlist store.
//!
//! `Store::apply` is a pure transition: it never mutates in place and returns a
//! value equal to the input whenever an intent has nothing to do. The session
//! only remembers the current user's email, so the active user is always the
//! matching entry of `users`.

use crate::model::{Movie, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Login { email: String },
    AddMovie(Movie),
    RemoveMovie { imdb_id: String },
    Logout,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    users: Vec<User>,
    current: Option<String>,
}

impl Store {
    pub fn new() -> Self {
        Store::default()
    }

    pub fn apply(&self, intent: &Intent) -> Store {
        match intent {
            Intent::Login { email } => self.login(email),
            Intent::AddMovie(movie) => self.add_movie(movie),
            Intent::RemoveMovie { imdb_id } => self.remove_movie(imdb_id),
            Intent::Logout => Store {
                users: self.users.clone(),
                current: None,
            },
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn user(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|user| user.email == email)
    }

    /// Session gate: the logged in user, if any.
    pub fn current_user(&self) -> Option<&User> {
        self.current.as_deref().and_then(|email| self.user(email))
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }

    fn login(&self, email: &str) -> Store {
        let email = email.trim();
        if email.is_empty() {
            return self.clone();
        }
        let mut users = self.users.clone();
        if !users.iter().any(|user| user.email == email) {
            users.push(User::new(email));
        }
        Store {
            users,
            current: Some(email.to_owned()),
        }
    }

    fn add_movie(&self, movie: &Movie) -> Store {
        match self.current_user() {
            Some(user) if !user.has_movie(&movie.imdb_id) => {
                self.update_current(|movies| movies.push(movie.clone()))
            }
            _ => self.clone(),
        }
    }

    fn remove_movie(&self, imdb_id: &str) -> Store {
        match self.current_user() {
            Some(user) if user.has_movie(imdb_id) => {
                self.update_current(|movies| movies.retain(|movie| movie.imdb_id != imdb_id))
            }
            _ => self.clone(),
        }
    }

    fn update_current<F: FnOnce(&mut Vec<Movie>)>(&self, f: F) -> Store {
        let mut next = self.clone();
        let current = next.current.as_deref();
        if let Some(user) = next
            .users
            .iter_mut()
            .find(|user| Some(user.email.as_str()) == current)
        {
            f(&mut user.movies);
        }
        next
    }
}
