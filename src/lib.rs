pub mod config;
pub mod form;
pub mod free_email;
pub mod integrations;
pub mod landing;
pub mod mail;
pub mod templates;

pub use form::{FormError, FormSubmission};
pub use landing::{LandingPage, LandingPageError};
