//! Ownership guard for post and comment mutations.

use actix_web::HttpResponse;
use uuid::Uuid;

use blogicum_core::domain::Authored;

use super::{post_url, redirect};
use crate::middleware::auth::{Identity, OptionalIdentity};

/// Let only the author of `record` through.
///
/// Anyone else, anonymous requesters included, gets a redirect to the
/// detail page of `post_id` instead of an error.
pub(crate) fn author_only(
    record: &impl Authored,
    identity: OptionalIdentity,
    post_id: Uuid,
) -> Result<Identity, HttpResponse> {
    match identity.0 {
        Some(identity) if record.is_authored_by(Some(identity.user_id)) => Ok(identity),
        other => {
            tracing::debug!(
                requester = ?other.map(|i| i.user_id),
                author = %record.author_id(),
                "Redirecting non-author to post detail"
            );
            Err(redirect(&post_url(post_id)))
        }
    }
}
