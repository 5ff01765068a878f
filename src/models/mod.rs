//! Data models for Library Desk

pub mod book;
pub mod enums;
pub mod event;
pub mod import_report;
pub mod loan;
pub mod report;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookQuery, CreateBook, UpdateBook};
pub use enums::{CheckoutKind, CirculationStatus};
pub use event::{CreateEvent, LibraryEvent};
pub use import_report::{ImportAction, ImportReport};
pub use loan::{Checkout, Fine, ReturnReceipt};
pub use user::{CreateUser, MembershipStatus, UpdateProfile, User};
