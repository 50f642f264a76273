//! Public profile fields and partner search input.

use crate::error::CoreError;

pub const MAX_DISPLAY_NAME_LENGTH: usize = 50;
pub const MAX_BIO_LENGTH: usize = 500;
pub const MAX_COUNTRY_LENGTH: usize = 56;
pub const MAX_AVATAR_URL_LENGTH: usize = 2_048;

/// Search terms shorter than this match too much to be useful.
pub const MIN_SEARCH_QUERY_LENGTH: usize = 2;

pub fn validate_display_name(name: &str) -> Result<(), CoreError> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err(CoreError::Validation(
            "Display name must not be empty".to_string(),
        ));
    }
    if len > MAX_DISPLAY_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Display name must be at most {MAX_DISPLAY_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate the optional free-text fields of a profile.
pub fn validate_profile_text(bio: Option<&str>, country: Option<&str>) -> Result<(), CoreError> {
    if bio.is_some_and(|b| b.chars().count() > MAX_BIO_LENGTH) {
        return Err(CoreError::Validation(format!(
            "Bio must be at most {MAX_BIO_LENGTH} characters"
        )));
    }
    if country.is_some_and(|c| c.chars().count() > MAX_COUNTRY_LENGTH) {
        return Err(CoreError::Validation(format!(
            "Country must be at most {MAX_COUNTRY_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Avatars are links to images hosted elsewhere; only http(s) URLs are kept.
pub fn validate_avatar_url(url: Option<&str>) -> Result<(), CoreError> {
    let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
        return Ok(());
    };
    if url.len() > MAX_AVATAR_URL_LENGTH {
        return Err(CoreError::Validation(format!(
            "Avatar URL must be at most {MAX_AVATAR_URL_LENGTH} characters"
        )));
    }
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(CoreError::Validation(
            "Avatar URL must start with http:// or https://".to_string(),
        ));
    }
    Ok(())
}

/// Turn a free-text search term into an `ILIKE` pattern matching it anywhere.
///
/// `%`, `_` and `\` in the term are escaped so they match literally.
pub fn search_pattern(query: &str) -> Result<String, CoreError> {
    let query = query.trim();
    if query.chars().count() < MIN_SEARCH_QUERY_LENGTH {
        return Err(CoreError::Validation(format!(
            "Search query must be at least {MIN_SEARCH_QUERY_LENGTH} characters"
        )));
    }

    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Ok(pattern)
}
