//! Request input validation.
//!
//! Every check collects all field problems before failing, so a client gets
//! the full list in one response. Strings are trimmed before measuring and
//! lengths are counted in characters.

use crate::domain::{CommentAuthor, CommentDraft, Principal, PostDraft};
use crate::error::{DomainError, FieldError};

pub const TITLE_LEN: (usize, usize) = (2, 150);
pub const CONTENT_LEN: (usize, usize) = (2, 20_000);
pub const GUEST_NAME_LEN: (usize, usize) = (3, 30);
pub const USER_NAME_LEN: (usize, usize) = (2, 50);
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validated registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Validated login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Trim, require, and bound the length of a text field.
    fn text(
        &mut self,
        field: &'static str,
        value: Option<String>,
        (min, max): (usize, usize),
        required: &str,
        bounds: &str,
    ) -> String {
        let value = value.as_deref().map(str::trim).unwrap_or_default();
        if value.is_empty() {
            self.fail(field, required);
        } else {
            let len = value.chars().count();
            if len < min || len > max {
                self.fail(field, bounds);
            }
        }
        value.to_string()
    }

    fn email(&mut self, value: Option<String>) -> String {
        let value = value.as_deref().map(str::trim).unwrap_or_default();
        if value.is_empty() {
            self.fail("email", "Email is empty");
        } else if !looks_like_email(value) {
            self.fail("email", "Incorrect email format");
        }
        value.to_lowercase()
    }

    fn finish<T>(self, value: T) -> Result<T, DomainError> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(DomainError::Validation(self.errors))
        }
    }
}

/// Validate a post body for create or update.
pub fn post_draft(
    title: Option<String>,
    content: Option<String>,
    published: Option<bool>,
) -> Result<PostDraft, DomainError> {
    let mut check = Checker::default();
    let title = check.text(
        "title",
        title,
        TITLE_LEN,
        "Title can't be empty",
        "Title must be from 2 to 150 chars",
    );
    let content = check.text(
        "content",
        content,
        CONTENT_LEN,
        "Content required",
        "Content must be from 2 to 20k characters",
    );

    check.finish(PostDraft {
        title: escape_html(&title),
        content,
        published: published.unwrap_or(false),
    })
}

/// Validate a comment submission.
///
/// A signed-in caller comments under their own identity and any supplied
/// display name is ignored. Guests must give a name.
pub fn comment_draft(
    principal: Option<&Principal>,
    author_name: Option<String>,
    content: Option<String>,
) -> Result<CommentDraft, DomainError> {
    let mut check = Checker::default();
    let author = match principal {
        Some(principal) => CommentAuthor::from(principal),
        None => {
            let name = check.text(
                "authorName",
                author_name,
                GUEST_NAME_LEN,
                "Please specify your name",
                "Name must be from 3 to 30 chars",
            );
            CommentAuthor::Guest {
                name: escape_html(&name),
            }
        }
    };
    let content = comment_text(&mut check, content);

    check.finish(CommentDraft { author, content })
}

/// Validate the replacement content of a comment edit.
pub fn comment_content(content: Option<String>) -> Result<String, DomainError> {
    let mut check = Checker::default();
    let content = comment_text(&mut check, content);
    check.finish(content)
}

fn comment_text(check: &mut Checker, content: Option<String>) -> String {
    check.text(
        "content",
        content,
        CONTENT_LEN,
        "Content required",
        "Content must be from 2 to 20k characters",
    )
}

pub fn registration(
    email: Option<String>,
    name: Option<String>,
    password: Option<String>,
) -> Result<Registration, DomainError> {
    let mut check = Checker::default();
    let email = check.email(email);
    let name = check.text(
        "name",
        name,
        USER_NAME_LEN,
        "Name must contain from 2 to 50 characters",
        "Name must contain from 2 to 50 characters",
    );
    let password = password.unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LEN {
        check.fail("password", "Password must contain at least 6 characters");
    }

    check.finish(Registration {
        email,
        name,
        password,
    })
}

pub fn credentials(
    email: Option<String>,
    password: Option<String>,
) -> Result<Credentials, DomainError> {
    let mut check = Checker::default();
    let email = check.email(email);
    let password = password.unwrap_or_default();
    if password.is_empty() {
        check.fail("password", "Password is empty");
    }

    check.finish(Credentials { email, password })
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && tld.len() >= 2)
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Replace HTML-significant characters with entities.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn fields(err: DomainError) -> Vec<&'static str> {
        match err {
            DomainError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn post_fields_are_trimmed_and_escaped() {
        let draft = post_draft(
            Some("  <b>Rust</b>  ".to_string()),
            Some(" Body text ".to_string()),
            None,
        )
        .unwrap();

        assert_eq!(draft.title, "&lt;b&gt;Rust&lt;&#x2F;b&gt;");
        assert_eq!(draft.content, "Body text");
        assert!(!draft.published);
    }

    #[test]
    fn post_reports_every_bad_field() {
        let err = post_draft(Some("x".to_string()), None, Some(true)).unwrap_err();
        assert_eq!(fields(err), vec!["title", "content"]);
    }

    #[test]
    fn guest_comment_needs_a_name_of_three_to_thirty_chars() {
        let err = comment_draft(None, Some("Al".to_string()), Some("Hi there".to_string()))
            .unwrap_err();
        assert_eq!(fields(err), vec!["authorName"]);

        let err = comment_draft(None, None, Some("Hi there".to_string())).unwrap_err();
        assert_eq!(fields(err), vec!["authorName"]);

        let draft = comment_draft(None, Some("Bob".to_string()), Some("Hi".to_string())).unwrap();
        assert_eq!(
            draft.author,
            CommentAuthor::Guest {
                name: "Bob".to_string()
            }
        );
    }

    #[test]
    fn member_comment_ignores_supplied_name() {
        let principal = Principal {
            id: 5,
            role: Role::User,
            email: "ann@example.com".to_string(),
            name: "Ann".to_string(),
        };
        let draft = comment_draft(Some(&principal), Some("x".to_string()), Some("Nice".to_string()))
            .unwrap();

        assert_eq!(draft.author, CommentAuthor::from(&principal));
    }

    #[test]
    fn content_length_is_counted_in_chars() {
        assert!(comment_content(Some("é".repeat(20_000))).is_ok());
        assert!(comment_content(Some("a".repeat(20_001))).is_err());
        assert!(comment_content(Some("   ".to_string())).is_err());
    }

    #[test]
    fn registration_rules() {
        let ok = registration(
            Some("Ann@Example.com".to_string()),
            Some("Ann".to_string()),
            Some("secret1".to_string()),
        )
        .unwrap();
        assert_eq!(ok.email, "ann@example.com");

        let err = registration(
            Some("not-an-email".to_string()),
            Some("A".to_string()),
            Some("123".to_string()),
        )
        .unwrap_err();
        assert_eq!(fields(err), vec!["email", "name", "password"]);
    }

    #[test]
    fn login_requires_both_fields() {
        let err = credentials(None, None).unwrap_err();
        assert_eq!(fields(err), vec!["email", "password"]);
    }

    #[test]
    fn email_shapes() {
        assert!(looks_like_email("a@b.io"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.io"));
        assert!(!looks_like_email("a b@c.io"));
        assert!(!looks_like_email("a@b@c.io"));
    }
}
