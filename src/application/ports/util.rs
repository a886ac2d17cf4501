// src/application/ports/util.rs

/// Maps free text to a slug base; uniqueness is handled by the caller.
pub trait SlugGenerator: Send + Sync {
    fn slugify(&self, input: &str) -> String;
}
