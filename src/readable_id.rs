//! Human-readable, collision-checked identifiers (slugs).
//!
//! A slug is derived from an ordered list of name variants. Each variant is
//! normalized and checked against an existence predicate; the first free one
//! wins. When every variant is taken, numeric suffixes are appended to the
//! first one in three escalating phases:
//!
//! | Phase | Candidates | Limit (default) |
//! |---|---|---|
//! | `Sequential` | `name-2`, `name-3`, ... | 50 collisions |
//! | `Random` | `name-<0..=99>` | 1,000,000 lookups |
//! | `Exhaustive` | `name-1000000`, `name-1000001`, ... | unbounded unless capped |
//!
//! The exhaustive phase only terminates when the predicate eventually says
//! "free". Set [`ReadableIdConfig::exhaustive_cap`] to turn that into
//! [`SlugError::Exhausted`].

use crate::config::ReadableIdConfig;
use rand::Rng;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SlugError {
    #[error("No name to derive a readable id from; supply readable_id_variants()")]
    MissingName,
    #[error("No free readable id after {attempts} attempts")]
    Exhausted { attempts: u64 },
}

/// Transliterate to Latin, lowercase, and join alphanumeric runs with `-`.
///
/// ```
/// # use mediadoc::readable_id::normalize;
/// assert_eq!(normalize("Café de l'Été!"), "cafe-de-l-ete");
/// assert_eq!(normalize("  --Hello,   World--  "), "hello-world");
/// ```
pub fn normalize(input: &str) -> String {
    let latin = deunicode::deunicode(input).to_lowercase();
    let mut slug = String::with_capacity(latin.len());
    let mut separator = false;

    for c in latin.chars() {
        if c.is_ascii_alphanumeric() {
            if separator && !slug.is_empty() {
                slug.push('-');
            }
            separator = false;
            slug.push(c);
        } else {
            separator = true;
        }
    }
    slug
}

/// Stage of the search that produced a slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Variant,
    Sequential,
    Random,
    Exhaustive,
}

/// A chosen slug and how hard it was to find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugOutcome {
    pub slug: String,
    pub phase: Phase,
    /// Collisions inside the accepting phase before the slug was found.
    pub attempts: u64,
    /// Existence checks across all phases, the accepting one included.
    pub lookups: u64,
}

/// Existence predicate with a lookup counter.
struct Lookups<F> {
    exists: F,
    count: u64,
}

impl<F: FnMut(&str) -> bool> Lookups<F> {
    fn is_free(&mut self, candidate: &str) -> bool {
        self.count += 1;
        !(self.exists)(candidate)
    }
}

/// Three-phase slug search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlugGenerator {
    config: ReadableIdConfig,
}

impl SlugGenerator {
    pub fn new(config: ReadableIdConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReadableIdConfig {
        &self.config
    }

    /// Find the first free slug for `variants`.
    ///
    /// `exists` is called once per candidate and must not have side effects.
    /// Variants that normalize to an empty string are never accepted as-is.
    pub fn generate<R, F>(
        &self,
        variants: &[String],
        exists: F,
        rng: &mut R,
    ) -> Result<SlugOutcome, SlugError>
    where
        R: Rng + ?Sized,
        F: FnMut(&str) -> bool,
    {
        let first = variants.first().ok_or(SlugError::MissingName)?;
        let mut lookups = Lookups { exists, count: 0 };

        for (i, variant) in variants.iter().enumerate() {
            let slug = normalize(variant);
            if !slug.is_empty() && lookups.is_free(&slug) {
                return Ok(outcome(slug, Phase::Variant, i as u64, &lookups));
            }
        }

        let base = normalize(first);

        for attempt in 0..=self.config.sequential_attempts {
            let slug = normalize(&format!("{base}-{}", attempt + 2));
            if lookups.is_free(&slug) {
                return Ok(outcome(slug, Phase::Sequential, attempt, &lookups));
            }
        }
        tracing::debug!(base = %base, lookups = lookups.count, "Sequential suffixes exhausted, trying random");

        for attempt in 0..self.config.random_attempts {
            let suffix = rng.random_range(0..=self.config.random_suffix_max);
            let slug = normalize(&format!("{base}-{suffix}"));
            if lookups.is_free(&slug) {
                return Ok(outcome(slug, Phase::Random, attempt, &lookups));
            }
        }
        tracing::debug!(base = %base, lookups = lookups.count, "Random suffixes exhausted, counting up");

        let mut attempt = 0u64;
        loop {
            if self.config.exhaustive_cap.is_some_and(|cap| attempt >= cap) {
                return Err(SlugError::Exhausted {
                    attempts: lookups.count,
                });
            }
            let suffix = self.config.exhaustive_start + attempt;
            let slug = normalize(&format!("{base}-{suffix}"));
            if lookups.is_free(&slug) {
                return Ok(outcome(slug, Phase::Exhaustive, attempt, &lookups));
            }
            attempt += 1;
        }
    }
}

fn outcome<F>(slug: String, phase: Phase, attempts: u64, lookups: &Lookups<F>) -> SlugOutcome {
    SlugOutcome {
        slug,
        phase,
        attempts,
        lookups: lookups.count,
    }
}

/// Entities that carry a readable identifier.
///
/// Implementors provide storage for the slug and either a [`name`](Self::name)
/// or a custom [`readable_id_variants`](Self::readable_id_variants). Override
/// [`readable_id_exists`](Self::readable_id_exists) to enforce uniqueness;
/// the default never reports a collision.
pub trait ReadableId {
    fn readable_id(&self) -> Option<&str>;

    fn set_readable_id(&mut self, readable_id: String);

    fn name(&self) -> Option<&str> {
        None
    }

    /// Candidate names, most preferred first.
    fn readable_id_variants(&self) -> Result<Vec<String>, SlugError> {
        self.name()
            .map(|name| vec![name.to_string()])
            .ok_or(SlugError::MissingName)
    }

    fn readable_id_exists(&self, _candidate: &str) -> bool {
        false
    }

    fn slug_generator(&self) -> SlugGenerator {
        SlugGenerator::default()
    }

    /// Generate and store a slug, replacing any existing one.
    fn create_readable_id_with<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<SlugOutcome, SlugError>
    where
        Self: Sized,
    {
        let variants = self.readable_id_variants()?;
        let outcome =
            self.slug_generator()
                .generate(&variants, |candidate| self.readable_id_exists(candidate), rng)?;
        self.set_readable_id(outcome.slug.clone());
        Ok(outcome)
    }

    fn create_readable_id(&mut self) -> Result<SlugOutcome, SlugError>
    where
        Self: Sized,
    {
        self.create_readable_id_with(&mut rand::rng())
    }

    /// Before-save hook: generate only when no slug is set yet.
    fn update_readable_id(&mut self) -> Result<Option<SlugOutcome>, SlugError>
    where
        Self: Sized,
    {
        if self.readable_id().is_some() {
            return Ok(None);
        }
        self.create_readable_id().map(Some)
    }
}
