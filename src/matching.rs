//! fuzzy name matching for "did you mean" hints

use strsim::levenshtein;

/// maximum edit distance for a name to be suggested
pub const SUGGESTION_THRESHOLD: usize = 2;

/// closest candidate to `query` within `threshold` edits (case-insensitive)
///
/// ties are broken alphabetically so the hint is stable.
pub fn closest_match<'a, I>(query: &str, candidates: I, threshold: usize) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let query_lower = query.to_lowercase();

    let mut matches: Vec<_> = candidates
        .into_iter()
        .map(|c| (c, levenshtein(&query_lower, &c.to_lowercase())))
        .filter(|(_, distance)| *distance <= threshold)
        .collect();

    matches.sort_by(|a, b| {
        a.1.cmp(&b.1)
            .then_with(|| a.0.to_lowercase().cmp(&b.0.to_lowercase()))
    });

    matches.first().map(|(c, _)| c.to_string())
}

/// suggestion with the default threshold
pub fn suggest<'a, I>(query: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    closest_match(query, candidates, SUGGESTION_THRESHOLD)
}
