//! User management service

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    config::CirculationConfig,
    error::{AppError, AppResult},
    models::{
        book::{normalize_isbn, Book},
        loan::add_days,
        user::{CreateUser, MembershipStatus, UpdateProfile, User},
    },
    repository::Repository,
};

/// Everything a user sees about themselves
#[derive(Debug, Clone)]
pub struct Dashboard<'a> {
    pub user: &'a User,
    pub borrowed: Vec<&'a Book>,
    /// Computed from the books' waiting lists, with the queue position
    pub reservations: Vec<(&'a Book, usize)>,
    pub wishlist: Vec<&'a Book>,
    pub membership_active: bool,
}

#[derive(Debug, Clone)]
pub struct UsersService {
    membership_days: i64,
}

impl UsersService {
    pub fn new(config: &CirculationConfig) -> Self {
        Self {
            membership_days: config.membership_days,
        }
    }

    /// Register a new user with a fresh membership
    pub fn add_user(&self, repo: &mut Repository, request: CreateUser, now: DateTime<Utc>) -> AppResult<User> {
        let request = CreateUser::new(&request.name, &request.id, &request.email);
        request.validate()?;
        let expiry = add_days(now, self.membership_days)
            .ok_or_else(|| AppError::Validation("Membership period is out of range".to_string()))?;
        let mut user = User::new(&request.name, &request.id, &request.email);
        user.set_membership_expiry(Some(expiry));
        repo.users.add(user.clone())?;
        tracing::info!("Users: registered user id={}", user.id());
        Ok(user)
    }

    pub fn update_profile(&self, repo: &mut Repository, id: &str, update: UpdateProfile) -> AppResult<User> {
        let update = UpdateProfile {
            name: update.name.map(|n| n.trim().to_string()),
            email: update.email.map(|e| e.trim().to_string()),
        };
        update.validate()?;
        let user = repo.users.get_mut(id)?;
        if let Some(ref name) = update.name {
            user.set_name(name);
        }
        if let Some(ref email) = update.email {
            user.set_email(email);
        }
        tracing::debug!("Users: updated profile of id={}", id);
        Ok(user.clone())
    }

    pub fn add_to_wishlist(&self, repo: &mut Repository, id: &str, isbn: &str) -> AppResult<()> {
        let isbn = repo.books.get(isbn)?.isbn().to_string();
        let user = repo.users.get_mut(id)?;
        if user.wishlist().contains(&isbn) {
            return Err(AppError::NoOp(format!("Book {} is already on the wishlist", isbn)));
        }
        user.add_to_wishlist(&isbn);
        Ok(())
    }

    pub fn remove_from_wishlist(&self, repo: &mut Repository, id: &str, isbn: &str) -> AppResult<()> {
        if !repo.users.get_mut(id)?.remove_from_wishlist(&normalize_isbn(isbn)) {
            return Err(AppError::NoOp(format!("Book {} is not on the wishlist", isbn)));
        }
        Ok(())
    }

    pub fn notify(&self, repo: &mut Repository, id: &str, message: &str) -> AppResult<()> {
        if message.trim().is_empty() {
            return Err(AppError::Validation("Notification cannot be empty".to_string()));
        }
        repo.users.get_mut(id)?.add_notification(message.trim());
        tracing::debug!("Users: notified id={}", id);
        Ok(())
    }

    /// Send a message to every user, returns how many were reached
    pub fn broadcast(&self, repo: &mut Repository, message: &str) -> AppResult<usize> {
        if message.trim().is_empty() {
            return Err(AppError::Validation("Notification cannot be empty".to_string()));
        }
        let mut reached = 0;
        for user in repo.users.iter_mut() {
            user.add_notification(message.trim());
            reached += 1;
        }
        tracing::info!("Users: broadcast reached {} user(s)", reached);
        Ok(reached)
    }

    pub fn membership_status(&self, repo: &Repository, id: &str, now: DateTime<Utc>) -> AppResult<MembershipStatus> {
        let user = repo.users.get(id)?;
        Ok(MembershipStatus {
            user_id: user.id().to_string(),
            expiry: user.membership_expiry(),
            active: user.is_membership_active(now),
        })
    }

    pub fn renew_membership(&self, repo: &mut Repository, id: &str, now: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
        let expiry = repo
            .users
            .get_mut(id)?
            .extend_membership(self.membership_days, now)
            .ok_or_else(|| AppError::Validation("Membership period is out of range".to_string()))?;
        tracing::info!("Users: membership of id={} renewed until {}", id, expiry.format("%Y-%m-%d"));
        Ok(expiry)
    }

    pub fn dashboard<'a>(&self, repo: &'a Repository, id: &str, now: DateTime<Utc>) -> AppResult<Dashboard<'a>> {
        let user = repo.users.get(id)?;
        let lookup = |isbns: &'a [String]| -> Vec<&'a Book> {
            isbns
                .iter()
                .filter_map(|isbn| repo.books.find_by_isbn(isbn))
                .collect()
        };
        let reservations = repo
            .books
            .all()
            .iter()
            .filter_map(|b| {
                b.reservation_queue()
                    .iter()
                    .position(|u| u == id)
                    .map(|pos| (b, pos + 1))
            })
            .collect();

        Ok(Dashboard {
            user,
            borrowed: lookup(user.borrowed_books()),
            reservations,
            wishlist: lookup(user.wishlist()),
            membership_active: user.is_membership_active(now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book::CreateBook;
    use chrono::Duration;
    use rstest::{fixture, rstest};

    #[fixture]
    fn service() -> UsersService {
        UsersService::new(&CirculationConfig::default())
    }

    #[fixture]
    fn repo(service: UsersService) -> Repository {
        let mut repo = Repository::new();
        repo.books
            .add(CreateBook::new("Dune", "Frank Herbert", "111", "SF").into_book())
            .expect("add book");
        service
            .add_user(&mut repo, CreateUser::new("Alice", "U1", "alice@example.org"), Utc::now())
            .expect("add user");
        repo
    }

    #[rstest]
    fn test_add_user_sets_membership(repo: Repository) {
        let user = repo.users.get("U1").expect("user");
        assert!(user.membership_expiry().is_some());
        assert!(user.is_membership_active(Utc::now()));
    }

    #[rstest]
    fn test_add_user_rejects_bad_email(service: UsersService, mut repo: Repository) {
        let err = service
            .add_user(&mut repo, CreateUser::new("Bob", "U2", "bob"), Utc::now())
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(repo.users.len(), 1);
    }

    #[rstest]
    #[case("   ", "U2")]
    #[case("Bob", "   ")]
    fn test_add_user_rejects_blank_fields(
        service: UsersService,
        mut repo: Repository,
        #[case] name: &str,
        #[case] id: &str,
    ) {
        let request = CreateUser {
            name: name.to_string(),
            id: id.to_string(),
            email: "bob@example.org".to_string(),
        };
        let err = service.add_user(&mut repo, request, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(repo.users.len(), 1);
        assert!(repo.users.find_by_id("").is_none());
    }

    #[rstest]
    fn test_add_user_trims_fields(service: UsersService, mut repo: Repository) {
        let request = CreateUser {
            name: " Bob ".to_string(),
            id: " U2 ".to_string(),
            email: " bob@example.org ".to_string(),
        };
        let user = service.add_user(&mut repo, request, Utc::now()).expect("add");
        assert_eq!((user.name(), user.id(), user.email()), ("Bob", "U2", "bob@example.org"));
    }

    #[rstest]
    fn test_blank_profile_name_rejected(service: UsersService, mut repo: Repository) {
        let update = UpdateProfile {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.update_profile(&mut repo, "U1", update),
            Err(AppError::Validation(_))
        ));
        assert_eq!(repo.users.get("U1").expect("user").name(), "Alice");
    }

    #[rstest]
    fn test_wishlist_accepts_hyphenated_isbn(service: UsersService, mut repo: Repository) {
        repo.books
            .add(CreateBook::new("Emma", "Jane Austen", "978-0-14-143958-7", "Classic").into_book())
            .expect("add book");
        service.add_to_wishlist(&mut repo, "U1", "978-0-14-143958-7").expect("add");
        assert_eq!(repo.users.get("U1").expect("user").wishlist(), ["9780141439587"]);
        service.remove_from_wishlist(&mut repo, "U1", "978 0 14 143958 7").expect("remove");
    }

    #[rstest]
    fn test_wishlist(service: UsersService, mut repo: Repository) {
        assert!(matches!(
            service.add_to_wishlist(&mut repo, "U1", "999"),
            Err(AppError::NotFound(_))
        ));
        service.add_to_wishlist(&mut repo, "U1", "111").expect("add");
        assert!(service.add_to_wishlist(&mut repo, "U1", "111").unwrap_err().is_no_op());
        service.remove_from_wishlist(&mut repo, "U1", "111").expect("remove");
        assert!(service.remove_from_wishlist(&mut repo, "U1", "111").unwrap_err().is_no_op());
        assert_eq!(repo.users.get("U1").expect("user").activity_log().len(), 2);
    }

    #[rstest]
    fn test_update_profile(service: UsersService, mut repo: Repository) {
        let update = UpdateProfile {
            email: Some("alice@library.org".to_string()),
            ..Default::default()
        };
        let user = service.update_profile(&mut repo, "U1", update).expect("update");
        assert_eq!(user.email(), "alice@library.org");
        assert_eq!(user.name(), "Alice");

        let bad = UpdateProfile {
            email: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(service.update_profile(&mut repo, "U1", bad).is_err());
    }

    #[rstest]
    fn test_broadcast(service: UsersService, mut repo: Repository) {
        service
            .add_user(&mut repo, CreateUser::new("Bob", "U2", "bob@example.org"), Utc::now())
            .expect("add");
        assert_eq!(service.broadcast(&mut repo, "Closed tomorrow").expect("broadcast"), 2);
        assert!(service.broadcast(&mut repo, " ").is_err());
    }

    #[rstest]
    fn test_membership_period_out_of_range(mut repo: Repository) {
        let config = CirculationConfig {
            membership_days: i64::MAX,
            ..Default::default()
        };
        let service = UsersService::new(&config);
        let err = service
            .add_user(&mut repo, CreateUser::new("Bob", "U2", "bob@example.org"), Utc::now())
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(matches!(
            service.renew_membership(&mut repo, "U1", Utc::now()),
            Err(AppError::Validation(_))
        ));
    }

    #[rstest]
    fn test_membership_renewal(service: UsersService, mut repo: Repository) {
        let now = Utc::now();
        let later = now + Duration::days(400);
        assert!(!service.membership_status(&repo, "U1", later).expect("status").active);
        service.renew_membership(&mut repo, "U1", later).expect("renew");
        assert!(service.membership_status(&repo, "U1", later).expect("status").active);
    }

    #[rstest]
    fn test_dashboard(service: UsersService, mut repo: Repository) {
        repo.books
            .get_mut("111")
            .expect("book")
            .add_to_reservation_queue("U1");
        service.add_to_wishlist(&mut repo, "U1", "111").expect("wish");
        let dashboard = service.dashboard(&repo, "U1", Utc::now()).expect("dashboard");
        assert!(dashboard.borrowed.is_empty());
        assert_eq!(dashboard.reservations.len(), 1);
        assert_eq!(dashboard.reservations[0].1, 1);
        assert_eq!(dashboard.wishlist.len(), 1);
        assert!(dashboard.membership_active);
    }
}
