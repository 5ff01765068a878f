//! User directory

use crate::{
    error::{AppError, AppResult},
    models::user::User,
};

#[derive(Debug, Default, Clone)]
pub struct UsersRepository {
    users: Vec<User>,
}

impl UsersRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id() == id)
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id() == id)
    }

    /// Get user by ID
    pub fn get(&self, id: &str) -> AppResult<&User> {
        self.find_by_id(id)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    pub fn get_mut(&mut self, id: &str) -> AppResult<&mut User> {
        self.find_by_id_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    pub fn all(&self) -> &[User] {
        &self.users
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut User> {
        self.users.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Add a user, rejecting duplicate IDs
    pub fn add(&mut self, user: User) -> AppResult<()> {
        if self.find_by_id(user.id()).is_some() {
            return Err(AppError::Conflict(format!(
                "User with id {} already exists",
                user.id()
            )));
        }
        self.users.push(user);
        Ok(())
    }

    pub fn replace_all(&mut self, users: Vec<User>) {
        self.users = users;
    }
}
