//! Back-office content operations.
//!
//! Post and testimonial CRUD for the admin views, with an audit trail:
//! every create, update, and delete appends an activity-log row. Store
//! failures are classified into the operator-facing messages the views
//! render ([`ContentError::user_message`]).

pub mod activity;
pub mod error;
pub mod post;
pub mod service;
pub mod testimonial;

pub use activity::{entities, ActivityAction, ActivityEntry, ActivityLogger};
pub use error::{ContentError, ContentResult};
pub use post::{Post, PostDraft};
pub use service::ContentService;
pub use testimonial::{Testimonial, TestimonialDraft};
