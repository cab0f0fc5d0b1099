//! Slug and token helpers for tracer link issuance
//!
//! Tokens look like `{slug}-{xy}`: a company-derived slug plus two random
//! lowercase letters. Drawing is bounded by an attempt counter and never
//! repeats a pair inside one issuance call.

use std::collections::HashSet;

/// Longest slug kept from the seed
pub const MAX_SLUG_LEN: usize = 30;

/// Fallback when the seed normalizes to nothing
pub const FALLBACK_SLUG: &str = "resume";

/// Number of distinct two-letter suffixes
pub const SUFFIX_SPACE: usize = 26 * 26;

/// Normalize a seed (usually the employer name) into `[a-z]+(-[a-z]+)*`
///
/// Every run of non-letters becomes a single `-`, the result is capped at
/// [`MAX_SLUG_LEN`] characters and trimmed of dangling separators.
pub fn slugify(seed: &str, default_slug: &str) -> String {
    let slug = normalize(seed);
    if !slug.is_empty() {
        return slug;
    }

    let fallback = normalize(default_slug);
    if fallback.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        fallback
    }
}

fn normalize(seed: &str) -> String {
    let mut slug = String::with_capacity(seed.len().min(MAX_SLUG_LEN));
    let mut pending_sep = false;

    for c in seed.chars() {
        if c.is_ascii_alphabetic() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }

        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    slug.trim_end_matches('-').to_string()
}

/// Bounded token draw for one get-or-create call
#[derive(Debug)]
pub struct TokenDraw {
    slug: String,
    tried: HashSet<[u8; 2]>,
    attempts: u32,
    max_attempts: u32,
}

impl TokenDraw {
    pub fn new(slug: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            slug: slug.into(),
            tried: HashSet::new(),
            attempts: 0,
            max_attempts,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Next untried token using the thread-local RNG
    pub fn next_token(&mut self) -> Option<String> {
        self.next_token_with(|| rand::random_range(0..26u8))
    }

    /// Next untried token, letters drawn from `draw` (values `0..26`)
    ///
    /// Every draw counts as an attempt, including repeats of a pair already
    /// tried. Returns `None` once the budget or the suffix space is used up.
    pub fn next_token_with<F>(&mut self, mut draw: F) -> Option<String>
    where
        F: FnMut() -> u8,
    {
        while self.attempts < self.max_attempts {
            if self.tried.len() >= SUFFIX_SPACE {
                return None;
            }
            self.attempts += 1;

            let pair = [b'a' + draw() % 26, b'a' + draw() % 26];
            if self.tried.insert(pair) {
                return Some(format!(
                    "{}-{}{}",
                    self.slug, pair[0] as char, pair[1] as char
                ));
            }
        }
        None
    }
}

/// `true` if `token` has the `{slug}-{xy}` shape
pub fn is_well_formed(token: &str) -> bool {
    let Some((slug, suffix)) = token.rsplit_once('-') else {
        return false;
    };
    !slug.is_empty()
        && slug.bytes().all(|b| b.is_ascii_lowercase() || b == b'-')
        && suffix.len() == 2
        && suffix.bytes().all(|b| b.is_ascii_lowercase())
}
