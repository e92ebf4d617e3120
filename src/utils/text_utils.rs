use slug::slugify;

const WORDS_PER_MINUTE: usize = 200;

/// Whole minutes at 200 wpm, never below one.
pub fn reading_time(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

/// Cuts at a char boundary so multi-byte text is never split.
pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Slug for `value`, or `fallback` when nothing sluggable remains.
pub fn slug_or(value: &str, fallback: &str) -> String {
    let slug = slugify(value);
    if slug.is_empty() {
        fallback.to_string()
    } else {
        truncate_chars(&slug, 200)
    }
}

pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
