//! Domain entities - the core business objects.

mod category;
mod comment;
mod label;
mod location;
mod post;
mod user;

pub use category::Category;
pub use comment::{Comment, CommentDetails};
pub use label::{short_label, truncate_words};
pub use location::Location;
pub use post::{Authored, Post, PostDetails};
pub use user::User;
