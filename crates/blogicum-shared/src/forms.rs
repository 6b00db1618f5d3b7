//! Data-entry forms and their validation.
//!
//! Forms deserialize with every field defaulted so that a missing field is
//! reported as a field error rather than a malformed body. Unknown fields,
//! such as an `author_id` smuggled into a comment, are ignored. A field of the
//! wrong type is reported against that field by [`parse`].

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use blogicum_core::domain::{Comment, Post, User};

/// Field name to error messages, in field order.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

const REQUIRED: &str = "This field is required.";

/// Key for errors that belong to no single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Deserialize a submitted JSON body into a form.
///
/// Every field that fails to deserialize gets its own entry, so the caller can
/// answer with the same field-error document as a validation failure.
pub fn parse<F: DeserializeOwned>(body: Value) -> Result<F, FieldErrors> {
    let Value::Object(fields) = body else {
        return Err(field_error(NON_FIELD_ERRORS, "Expected a JSON object."));
    };

    match serde_json::from_value(Value::Object(fields.clone())) {
        Ok(form) => Ok(form),
        Err(whole) => {
            let mut errors = FieldErrors::new();
            for (name, value) in fields {
                let single = Value::Object([(name.clone(), value)].into_iter().collect());
                if let Err(err) = serde_json::from_value::<F>(single) {
                    merge(&mut errors, field_error(&name, type_message(&err)));
                }
            }
            if errors.is_empty() {
                errors = field_error(NON_FIELD_ERRORS, whole.to_string());
            }
            Err(errors)
        }
    }
}

fn type_message(err: &serde_json::Error) -> String {
    let text = err.to_string();
    match text.split_once(", expected ") {
        Some((_, expected)) => format!("Enter a valid value: expected {expected}."),
        None => text,
    }
}

/// RFC 3339 timestamp, `YYYY-MM-DDTHH:MM[:SS]` in UTC, or a bare
/// `YYYY-MM-DD` meaning midnight UTC.
fn flexible_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(value.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(value) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(value.and_utc()));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|value| Some(value.and_utc()))
        .ok_or_else(|| serde::de::Error::custom("Enter a valid date/time."))
}

/// Validate a form, flattening the validator report into [`FieldErrors`].
pub fn check<F: Validate>(form: &F) -> Result<(), FieldErrors> {
    form.validate().map_err(|errors| field_errors(&errors))
}

/// Single-field error, for checks that need the database.
pub fn field_error(field: &str, message: impl Into<String>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![message.into()]);
    errors
}

/// Merge `other` into `errors`.
pub fn merge(errors: &mut FieldErrors, other: FieldErrors) {
    for (field, messages) in other {
        errors.entry(field).or_default().extend(messages);
    }
}

fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, list)| {
            let messages = list
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

fn default_true() -> bool {
    true
}

/// Post create/edit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PostForm {
    #[validate(
        custom(function = "not_blank"),
        length(max = 256, message = "Ensure this value has at most 256 characters.")
    )]
    pub title: String,

    #[validate(custom(function = "not_blank"))]
    pub text: String,

    #[validate(length(max = 100, message = "Image path must be at most 100 characters."))]
    pub image: Option<String>,

    pub category_id: Option<Uuid>,

    pub location_id: Option<Uuid>,

    #[validate(required(message = "This field is required."))]
    #[serde(deserialize_with = "flexible_datetime")]
    pub pub_date: Option<DateTime<Utc>>,

    #[serde(default = "default_true")]
    pub is_published: bool,
}

impl PostForm {
    /// Initial values for editing an existing post.
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            text: post.text.clone(),
            image: post.image.clone(),
            category_id: post.category_id,
            location_id: post.location_id,
            pub_date: Some(post.pub_date),
            is_published: post.is_published,
        }
    }

    /// Build a new post owned by `author_id`. Call after validation.
    pub fn into_post(self, author_id: Uuid) -> Post {
        let mut post = Post::new(author_id, String::new(), String::new(), Utc::now());
        self.apply_to(&mut post);
        post
    }

    /// Copy the editable fields onto `post`; author and id are untouched.
    pub fn apply_to(self, post: &mut Post) {
        post.title = self.title.trim().to_string();
        post.text = self.text.trim().to_string();
        post.image = self.image.filter(|image| !image.trim().is_empty());
        post.category_id = self.category_id;
        post.location_id = self.location_id;
        if let Some(pub_date) = self.pub_date {
            post.pub_date = pub_date;
        }
        post.is_published = self.is_published;
    }
}

/// Comment create/edit form. Only the text is accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CommentForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
}

impl CommentForm {
    pub fn from_comment(comment: &Comment) -> Self {
        Self {
            text: comment.text.clone(),
        }
    }

    /// Bind the comment to the given post and author. Call after validation.
    pub fn into_comment(self, post_id: Uuid, author_id: Uuid) -> Comment {
        Comment::new(post_id, author_id, self.text.trim().to_string())
    }
}

/// Profile edit form. Passwords are not editable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct UserUpdateForm {
    #[validate(custom(function = "valid_username"))]
    pub username: String,

    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,

    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,

    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
}

impl UserUpdateForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }

    pub fn apply_to(self, user: &mut User) {
        user.username = self.username;
        user.first_name = self.first_name;
        user.last_name = self.last_name;
        user.email = self.email;
        user.updated_at = Utc::now();
    }
}

/// Request to register a new user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterUserRequest {
    #[validate(custom(function = "valid_username"))]
    pub username: String,

    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
    pub password: String,

    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,

    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", REQUIRED));
    }
    Ok(())
}

/// Letters, digits and `@.+-_`, at most 150 characters.
fn valid_username(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid("required", REQUIRED));
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if value.chars().count() > 150 || !value.chars().all(allowed) {
        return Err(invalid(
            "invalid_username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}
