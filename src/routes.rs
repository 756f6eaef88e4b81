use crate::database::PrefsDb;
use crate::model::MovieDetail;
use crate::omdb::MovieService;
use crate::store::{Intent, Store};
use crate::views::{cards, Badge, SearchSlot};
use actix_web::{error, http::header, web, HttpResponse};
use log::{debug, info, warn};
use serde::Deserialize;
use std::sync::{Mutex, MutexGuard};

type Tera = web::Data<tera::Tera>;
type Db = web::Data<sled::Db>;
type Movies = web::Data<dyn MovieService>;
type State = web::Data<AppState>;

const NO_MOVIES: &str = "No movies found.";
const NO_DETAILS: &str = "No movie details found.";
const LOGIN_REQUIRED: &str = "You need to log in to access this page.";

/// Everything handlers share. One store and one session per running server.
pub struct AppState {
    store: Mutex<Store>,
    search: Mutex<SearchSlot>,
    movies_per_page: usize,
}

impl AppState {
    pub fn new(movies_per_page: usize) -> Self {
        AppState {
            store: Mutex::new(Store::new()),
            search: Mutex::new(SearchSlot::new()),
            movies_per_page,
        }
    }

    // Lock order is store before search.
    fn store(&self) -> actix_web::Result<MutexGuard<'_, Store>> {
        self.store.lock().map_err(|err| log_error(err, "State error"))
    }

    fn search(&self) -> actix_web::Result<MutexGuard<'_, SearchSlot>> {
        self.search.lock().map_err(|err| log_error(err, "State error"))
    }

    fn dispatch(&self, intent: Intent) -> actix_web::Result<()> {
        let mut store = self.store()?;
        let next = store.apply(&intent);
        if next == *store {
            debug!("{:?} left the store unchanged", intent);
        } else {
            debug!("applied {:?}", intent);
            *store = next;
        }
        Ok(())
    }
}

pub fn log_error<E: std::fmt::Debug>(err: E, message: &'static str) -> error::Error {
    debug!("{:?}", err);
    error::ErrorInternalServerError(message)
}

fn render(tera: &tera::Tera, template: &str, ctx: &tera::Context) -> actix_web::Result<String> {
    tera.render(template, ctx)
        .map_err(|err| log_error(err, "Template error"))
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, location))
        .finish()
}

/// The blocking prompt shown instead of a protected page when nobody is logged in.
fn session_expired(tera: &tera::Tera, message: &str) -> actix_web::Result<HttpResponse> {
    let mut ctx = tera::Context::new();
    ctx.insert("message", message);
    let body = render(tera, "session_expired.html", &ctx)?;
    Ok(HttpResponse::Unauthorized()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

async fn lookup_details(
    movies: &dyn MovieService,
    imdb_id: Option<&str>,
) -> (Option<MovieDetail>, Option<String>) {
    match imdb_id {
        None => (None, None),
        Some(imdb_id) => match movies.fetch_by_id(imdb_id).await {
            Ok(detail) => (Some(detail), None),
            Err(err) => {
                warn!("details for {:?} unavailable: {}", imdb_id, err);
                (None, Some(NO_DETAILS.to_owned()))
            }
        },
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(login))
        .route("/login", web::post().to(login_post))
        .route("/logout", web::get().to(logout))
        .route("/search", web::get().to(search))
        .route("/search", web::post().to(search_post))
        .route("/watchlist/add", web::post().to(watchlist_add))
        .route("/watchlist/remove", web::post().to(watchlist_remove))
        .route("/list", web::get().to(list));
}

async fn login(tera: Tera, db: Db) -> actix_web::Result<HttpResponse> {
    let email = db.last_email().unwrap_or_else(|err| {
        warn!("could not read remembered email: {:?}", err);
        None
    });
    let mut ctx = tera::Context::new();
    ctx.insert("email", &email.unwrap_or_default());
    Ok(html(render(&tera, "login.html", &ctx)?))
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
}

async fn login_post(
    form: web::Form<LoginForm>,
    state: State,
    tera: Tera,
    db: Db,
) -> actix_web::Result<HttpResponse> {
    let email = form.email.trim();
    if email.is_empty() {
        let mut ctx = tera::Context::new();
        ctx.insert("email", "");
        ctx.insert("error", "Please enter an email to log in.");
        let body = render(&tera, "login.html", &ctx)?;
        return Ok(HttpResponse::BadRequest()
            .content_type("text/html; charset=utf-8")
            .body(body));
    }
    state.dispatch(Intent::Login {
        email: email.to_owned(),
    })?;
    state.search()?.reset();
    if let Err(err) = db.remember_email(email) {
        warn!("could not remember {}: {:?}", email, err);
    }
    info!(
        "{} logged in, {} known users",
        email,
        state.store()?.users().len()
    );
    Ok(redirect("/search"))
}

async fn logout(state: State) -> actix_web::Result<HttpResponse> {
    state.dispatch(Intent::Logout)?;
    state.search()?.reset();
    Ok(redirect("/"))
}

#[derive(Deserialize)]
struct ViewParams {
    page: Option<usize>,
    details: Option<String>,
}

async fn search(
    params: web::Query<ViewParams>,
    state: State,
    movies: Movies,
    tera: Tera,
) -> actix_web::Result<HttpResponse> {
    if !state.store()?.is_logged_in() {
        return session_expired(&tera, LOGIN_REQUIRED);
    }
    let (details, details_notice) =
        lookup_details(movies.get_ref(), params.details.as_deref()).await;

    let store = state.store()?;
    let user = match store.current_user() {
        Some(user) => user,
        None => return session_expired(&tera, LOGIN_REQUIRED),
    };
    let mut slot = state.search()?;
    if let Some(page) = params.page {
        slot.set_page(page, state.movies_per_page);
    }
    let notices: Vec<String> = slot.take_notice().into_iter().chain(details_notice).collect();
    let page = slot.page(state.movies_per_page);

    let mut ctx = tera::Context::new();
    ctx.insert("badge", &Badge::for_user(Some(user)));
    ctx.insert("query", slot.query());
    ctx.insert("has_results", &!slot.results().is_empty());
    ctx.insert("cards", &cards(page.movies, Some(user)));
    ctx.insert("page", &page);
    ctx.insert("details", &details);
    ctx.insert("close_url", "/search");
    ctx.insert("notices", &notices);
    Ok(html(render(&tera, "search.html", &ctx)?))
}

#[derive(Deserialize)]
struct SearchForm {
    query: String,
}

async fn search_post(
    form: web::Form<SearchForm>,
    state: State,
    movies: Movies,
    tera: Tera,
) -> actix_web::Result<HttpResponse> {
    if !state.store()?.is_logged_in() {
        return session_expired(&tera, LOGIN_REQUIRED);
    }
    let query = form.query.trim();
    if query.is_empty() {
        state.search()?.notify("Please enter a movie title.");
        return Ok(redirect("/search"));
    }

    let ticket = state.search()?.begin(query);
    let (results, notice) = match movies.search_by_title(query).await {
        Ok(results) => {
            info!("search {:?} returned {} movies", query, results.len());
            (results, None)
        }
        Err(err) => {
            warn!("search {:?} failed: {}", query, err);
            (Vec::new(), Some(NO_MOVIES.to_owned()))
        }
    };
    if !state.search()?.complete(ticket, results, notice) {
        debug!("dropping stale results for {:?}", query);
    }
    Ok(redirect("/search"))
}

#[derive(Deserialize)]
struct MovieForm {
    imdb_id: String,
}

async fn watchlist_add(
    form: web::Form<MovieForm>,
    state: State,
    tera: Tera,
) -> actix_web::Result<HttpResponse> {
    if !state.store()?.is_logged_in() {
        return session_expired(
            &tera,
            "Please log in before adding movies to your watchlist.",
        );
    }
    let movie = state.search()?.find(&form.imdb_id).cloned();
    match movie {
        Some(movie) => state.dispatch(Intent::AddMovie(movie))?,
        None => state
            .search()?
            .notify("That movie is no longer in your search results."),
    }
    Ok(redirect("/search"))
}

async fn watchlist_remove(
    form: web::Form<MovieForm>,
    state: State,
    tera: Tera,
) -> actix_web::Result<HttpResponse> {
    if !state.store()?.is_logged_in() {
        return session_expired(&tera, LOGIN_REQUIRED);
    }
    state.dispatch(Intent::RemoveMovie {
        imdb_id: form.imdb_id.clone(),
    })?;
    Ok(redirect("/list"))
}

async fn list(
    params: web::Query<ViewParams>,
    state: State,
    movies: Movies,
    tera: Tera,
) -> actix_web::Result<HttpResponse> {
    if !state.store()?.is_logged_in() {
        return session_expired(&tera, LOGIN_REQUIRED);
    }
    let (details, details_notice) =
        lookup_details(movies.get_ref(), params.details.as_deref()).await;

    let store = state.store()?;
    let user = match store.current_user() {
        Some(user) => user,
        None => return session_expired(&tera, LOGIN_REQUIRED),
    };
    let notices: Vec<String> = details_notice.into_iter().collect();

    let mut ctx = tera::Context::new();
    ctx.insert("badge", &Badge::for_user(Some(user)));
    ctx.insert("movies", &user.movies);
    ctx.insert("details", &details);
    ctx.insert("close_url", "/list");
    ctx.insert("notices", &notices);
    Ok(html(render(&tera, "list.html", &ctx)?))
}
