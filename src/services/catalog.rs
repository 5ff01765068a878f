//! Catalog management service

use std::cmp::Ordering;
use std::collections::HashSet;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};
use validator::Validate;

use crate::{
    config::CirculationConfig,
    error::{AppError, AppResult},
    models::book::{validate_fee, Book, BookQuery, CreateBook, UpdateBook},
    repository::Repository,
};

/// Lowercase and strip accents so "Émile" matches "emile"
fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold(haystack).contains(&fold(needle))
}

/// Best average first, then title
fn by_rating_desc(a: &Book, b: &Book) -> Ordering {
    b.average_rating()
        .partial_cmp(&a.average_rating())
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.title().cmp(b.title()))
}

#[derive(Debug, Clone)]
pub struct CatalogService {
    rating_min: u8,
    rating_max: u8,
}

impl CatalogService {
    pub fn new(config: &CirculationConfig) -> Self {
        Self {
            rating_min: config.rating_min,
            rating_max: config.rating_max,
        }
    }

    /// Add a new book after validation
    pub fn add_book(&self, repo: &mut Repository, request: CreateBook) -> AppResult<Book> {
        let request = request.trimmed();
        request.validate()?;
        let book = request.into_book();
        repo.books.add(book.clone())?;
        tracing::info!("Catalog: added book isbn={} title={:?}", book.isbn(), book.title());
        Ok(book)
    }

    /// Add a donated book, recording the donor
    pub fn donate_book(&self, repo: &mut Repository, request: CreateBook, donor: &str) -> AppResult<Book> {
        if donor.trim().is_empty() {
            return Err(AppError::Validation("Donor name cannot be empty".to_string()));
        }
        let request = request.trimmed();
        request.validate()?;
        let mut book = request.into_book();
        book.set_donor(Some(donor.trim().to_string()));
        repo.books.add(book.clone())?;
        tracing::info!("Catalog: book isbn={} donated by {}", book.isbn(), donor);
        Ok(book)
    }

    /// Remove a book that is on the shelf. Wishlists and reservation lists
    /// pointing at it are cleared as well.
    pub fn remove_book(&self, repo: &mut Repository, isbn: &str) -> AppResult<Book> {
        if repo.books.get(isbn)?.is_borrowed() {
            return Err(AppError::InvalidState(
                "Cannot remove a book that is currently borrowed".to_string(),
            ));
        }
        let book = repo.books.remove(isbn)?;
        for user in repo.users.iter_mut() {
            user.forget_book(book.isbn());
        }
        tracing::info!("Catalog: removed book isbn={}", isbn);
        Ok(book)
    }

    /// Update an existing book
    pub fn update_book(&self, repo: &mut Repository, isbn: &str, update: UpdateBook) -> AppResult<Book> {
        update.validate()?;
        if let Some(ref fee) = update.rental_fee {
            validate_fee(fee).map_err(|e| AppError::Validation(e.to_string()))?;
        }

        let book = repo.books.get_mut(isbn)?;
        if let Some(ref title) = update.title {
            book.set_title(title);
        }
        if let Some(ref author) = update.author {
            book.set_author(author);
        }
        if let Some(ref category) = update.category {
            book.set_category(category);
        }
        if update.series.is_some() {
            book.set_series(update.series);
        }
        if let Some(fee) = update.rental_fee {
            book.set_rental_fee(fee);
        }
        tracing::debug!("Catalog: updated book isbn={}", isbn);
        Ok(book.clone())
    }

    pub fn search_by_title<'a>(&self, repo: &'a Repository, title: &str) -> Vec<&'a Book> {
        repo.books
            .all()
            .iter()
            .filter(|b| contains_folded(b.title(), title))
            .collect()
    }

    pub fn search_by_author<'a>(&self, repo: &'a Repository, author: &str) -> Vec<&'a Book> {
        repo.books
            .all()
            .iter()
            .filter(|b| contains_folded(b.author(), author))
            .collect()
    }

    /// Match against title, author or ISBN
    pub fn search_partial<'a>(&self, repo: &'a Repository, term: &str) -> Vec<&'a Book> {
        repo.books
            .all()
            .iter()
            .filter(|b| {
                contains_folded(b.title(), term)
                    || contains_folded(b.author(), term)
                    || b.isbn().contains(term.trim())
            })
            .collect()
    }

    /// Apply every filter that is set
    pub fn advanced_search<'a>(&self, repo: &'a Repository, query: &BookQuery) -> Vec<&'a Book> {
        repo.books
            .all()
            .iter()
            .filter(|b| query.title.as_deref().map_or(true, |t| contains_folded(b.title(), t)))
            .filter(|b| query.author.as_deref().map_or(true, |a| contains_folded(b.author(), a)))
            .filter(|b| query.category.as_deref().map_or(true, |c| fold(b.category()) == fold(c)))
            .filter(|b| !query.available_only || !b.is_borrowed())
            .filter(|b| query.min_rating.map_or(true, |min| b.average_rating() >= min))
            .collect()
    }

    pub fn sort_by_title(&self, repo: &mut Repository) {
        repo.books.sort_by_title();
    }

    /// Record a user's score for a book
    pub fn rate(&self, repo: &mut Repository, isbn: &str, user_id: &str, score: u8) -> AppResult<f64> {
        if score < self.rating_min || score > self.rating_max {
            return Err(AppError::Validation(format!(
                "Rating must be between {} and {}",
                self.rating_min, self.rating_max
            )));
        }
        repo.users.get(user_id)?;
        let book = repo.books.get_mut(isbn)?;
        book.add_rating(user_id, score);
        tracing::info!("Catalog: {} rated isbn={} with {}", user_id, isbn, score);
        Ok(book.average_rating())
    }

    pub fn leave_feedback(&self, repo: &mut Repository, isbn: &str, feedback: &str) -> AppResult<()> {
        if feedback.trim().is_empty() {
            return Err(AppError::Validation("Feedback cannot be empty".to_string()));
        }
        repo.books.get_mut(isbn)?.add_feedback(feedback.trim());
        Ok(())
    }

    pub fn set_cover_image(&self, repo: &mut Repository, isbn: &str, path: &str) -> AppResult<()> {
        if path.trim().is_empty() {
            return Err(AppError::Validation("Cover image path cannot be empty".to_string()));
        }
        repo.books
            .get_mut(isbn)?
            .set_cover_image_path(Some(path.trim().to_string()));
        Ok(())
    }

    /// Rated books, best first
    pub fn top_rated<'a>(&self, repo: &'a Repository, limit: usize) -> Vec<&'a Book> {
        let mut rated: Vec<&Book> = repo
            .books
            .all()
            .iter()
            .filter(|b| !b.ratings().is_empty())
            .collect();
        rated.sort_by(|a, b| by_rating_desc(a, b));
        rated.truncate(limit);
        rated
    }

    /// Books from the categories the user borrows or wishes for, excluding
    /// the ones already in hand. Without any history the best rated books
    /// are suggested instead.
    pub fn recommend<'a>(&self, repo: &'a Repository, user_id: &str, limit: usize) -> AppResult<Vec<&'a Book>> {
        let user = repo.users.get(user_id)?;
        let categories: HashSet<String> = user
            .borrowed_books()
            .iter()
            .chain(user.wishlist())
            .filter_map(|isbn| repo.books.find_by_isbn(isbn))
            .map(|b| fold(b.category()))
            .collect();

        if categories.is_empty() {
            return Ok(self.top_rated(repo, limit));
        }

        let mut picks: Vec<&Book> = repo
            .books
            .all()
            .iter()
            .filter(|b| categories.contains(&fold(b.category())))
            .filter(|b| !user.has_borrowed(b.isbn()))
            .filter(|b| !user.wishlist().iter().any(|w| w == b.isbn()))
            .collect();
        picks.sort_by(|a, b| by_rating_desc(a, b));
        picks.truncate(limit);
        Ok(picks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::User;
    use rstest::{fixture, rstest};
    use rust_decimal::Decimal;

    #[fixture]
    fn service() -> CatalogService {
        CatalogService::new(&CirculationConfig::default())
    }

    #[fixture]
    fn repo(service: CatalogService) -> Repository {
        let mut repo = Repository::new();
        service
            .add_book(&mut repo, CreateBook::new("Les Misérables", "Victor Hugo", "9782070409228", "Classic"))
            .expect("add");
        service
            .add_book(&mut repo, CreateBook::new("Dune", "Frank Herbert", "9780441013593", "SF"))
            .expect("add");
        service
            .add_book(&mut repo, CreateBook::new("Hyperion", "Dan Simmons", "9780553283686", "SF"))
            .expect("add");
        repo.users
            .add(User::new("Alice", "U1", "alice@example.org"))
            .expect("add user");
        repo
    }

    #[rstest]
    fn test_add_invalid_isbn(service: CatalogService, mut repo: Repository) {
        let err = service
            .add_book(&mut repo, CreateBook::new("X", "Y", "12", "Z"))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(repo.books.len(), 3);
    }

    #[rstest]
    fn test_add_blank_title_rejected(service: CatalogService, mut repo: Repository) {
        let request = CreateBook {
            title: "   ".to_string(),
            ..CreateBook::new("Emma", "Jane Austen", "9780141439587", "Classic")
        };
        let err = service.add_book(&mut repo, request).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(repo.books.find_by_isbn("9780141439587").is_none());
    }

    #[rstest]
    #[case("miserables", 1)]
    #[case("MISÉRABLES", 1)]
    #[case("e", 3)]
    #[case("zzz", 0)]
    fn test_search_by_title_folds(service: CatalogService, repo: Repository, #[case] term: &str, #[case] hits: usize) {
        assert_eq!(service.search_by_title(&repo, term).len(), hits);
    }

    #[rstest]
    fn test_search_partial_matches_isbn(service: CatalogService, repo: Repository) {
        let hits = service.search_partial(&repo, "0441");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title(), "Dune");
    }

    #[rstest]
    fn test_advanced_search(service: CatalogService, mut repo: Repository) {
        service.rate(&mut repo, "9780441013593", "U1", 5).expect("rate");
        repo.books.get_mut("9780553283686").expect("book").set_is_borrowed(true);

        let query = BookQuery {
            category: Some("sf".to_string()),
            available_only: true,
            ..Default::default()
        };
        let hits = service.advanced_search(&repo, &query);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].isbn(), "9780441013593");

        let query = BookQuery {
            min_rating: Some(4.0),
            ..Default::default()
        };
        assert_eq!(service.advanced_search(&repo, &query).len(), 1);
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    fn test_rate_out_of_range(service: CatalogService, mut repo: Repository, #[case] score: u8) {
        let err = service.rate(&mut repo, "9780441013593", "U1", score).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(repo.books.get("9780441013593").expect("book").ratings().is_empty());
    }

    #[rstest]
    fn test_rate_unknown_user(service: CatalogService, mut repo: Repository) {
        let err = service.rate(&mut repo, "9780441013593", "U9", 3).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[rstest]
    fn test_remove_clears_wishlists(service: CatalogService, mut repo: Repository) {
        repo.users.get_mut("U1").expect("user").add_to_wishlist("9780441013593");
        service.remove_book(&mut repo, "9780441013593").expect("remove");
        assert!(repo.users.get("U1").expect("user").wishlist().is_empty());
        assert!(repo.books.get("9780441013593").is_err());
    }

    #[rstest]
    fn test_remove_borrowed_refused(service: CatalogService, mut repo: Repository) {
        repo.books.get_mut("9780441013593").expect("book").set_is_borrowed(true);
        let err = service.remove_book(&mut repo, "9780441013593").unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(repo.books.len(), 3);
    }

    #[rstest]
    fn test_update_book(service: CatalogService, mut repo: Repository) {
        let update = UpdateBook {
            title: Some("Dune Messiah".to_string()),
            rental_fee: Some(Decimal::new(199, 2)),
            ..Default::default()
        };
        let book = service.update_book(&mut repo, "9780441013593", update).expect("update");
        assert_eq!(book.title(), "Dune Messiah");
        assert_eq!(book.author(), "Frank Herbert");
        assert_eq!(book.rental_fee(), Decimal::new(199, 2));

        let bad = UpdateBook {
            rental_fee: Some(Decimal::new(-5, 0)),
            ..Default::default()
        };
        assert!(service.update_book(&mut repo, "9780441013593", bad).is_err());
    }

    #[rstest]
    fn test_top_rated_and_recommend(service: CatalogService, mut repo: Repository) {
        repo.users
            .add(User::new("Bob", "U2", "bob@example.org"))
            .expect("add user");
        service.rate(&mut repo, "9780553283686", "U1", 5).expect("rate");
        service.rate(&mut repo, "9780441013593", "U1", 3).expect("rate");

        let top = service.top_rated(&repo, 10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].title(), "Hyperion");

        // No history: falls back to top rated
        let picks = service.recommend(&repo, "U2", 1).expect("recommend");
        assert_eq!(picks[0].title(), "Hyperion");

        // Borrowing Dune steers U2 to other SF books
        repo.users.get_mut("U2").expect("user").borrow_book("9780441013593");
        let picks = service.recommend(&repo, "U2", 5).expect("recommend");
        let titles: Vec<&str> = picks.iter().map(|b| b.title()).collect();
        assert_eq!(titles, ["Hyperion"]);
    }

    #[rstest]
    fn test_donate_records_donor(service: CatalogService, mut repo: Repository) {
        let book = service
            .donate_book(&mut repo, CreateBook::new("Emma", "Jane Austen", "9780141439587", "Classic"), "Mr Knightley")
            .expect("donate");
        assert_eq!(book.donor(), Some("Mr Knightley"));
        assert!(service
            .donate_book(&mut repo, CreateBook::new("Emma", "Jane Austen", "9780141439588", "Classic"), "  ")
            .is_err());
    }

    #[rstest]
    fn test_feedback_and_cover(service: CatalogService, mut repo: Repository) {
        service.leave_feedback(&mut repo, "9780441013593", " Loved it ").expect("feedback");
        assert!(service.leave_feedback(&mut repo, "9780441013593", "   ").is_err());
        service.set_cover_image(&mut repo, "9780441013593", "covers/dune.jpg").expect("cover");
        let book = repo.books.get("9780441013593").expect("book");
        assert_eq!(book.feedbacks(), ["Loved it"]);
        assert_eq!(book.cover_image_path(), Some("covers/dune.jpg"));
    }
}
