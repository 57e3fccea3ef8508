use std::collections::{HashMap, HashSet};

use crate::domain::MatchScore;

pub const STOPWORDS: [&str; 19] = [
    "the", "and", "a", "an", "to", "of", "in", "on", "for", "with", "is", "are", "as", "by",
    "this", "that", "be", "or", "at",
];
pub const MIN_TOKEN_LEN: usize = 3;
pub const MAX_MISSING: usize = 20;

/// Lower-cases, blanks out everything except ASCII letters, digits and
/// whitespace, then collapses runs of whitespace into single spaces.
pub fn normalize(text: &str) -> String {
    let blanked: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    blanked.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Token multiset that remembers first-occurrence order.
#[derive(Debug, Default)]
struct TokenBag {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl TokenBag {
    fn from_text(text: &str) -> Self {
        let mut bag = Self::default();
        for token in normalize(text).split(' ').filter(|t| !t.is_empty()) {
            match bag.counts.get_mut(token) {
                Some(count) => *count += 1,
                None => {
                    bag.order.push(token.to_string());
                    bag.counts.insert(token.to_string(), 1);
                }
            }
        }
        bag
    }

    fn count(&self, token: &str) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }

    fn contains(&self, token: &str) -> bool {
        self.counts.contains_key(token)
    }

    fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.order
            .iter()
            .map(|token| (token.as_str(), self.count(token)))
    }
}

fn qualifies(token: &str) -> bool {
    token.len() >= MIN_TOKEN_LEN && !STOPWORDS.contains(&token)
}

/// Multiset-weighted overlap between a resume and a job description.
///
/// Every qualifying token in either text contributes `min(resume, job)` to
/// the intersection and `max(resume, job)` to the union; the score is the
/// rounded percentage of the two. `missing` lists the job's qualifying
/// tokens that never appear in the resume, most frequent first.
pub fn score_overlap(resume_text: &str, job_text: &str) -> MatchScore {
    let resume = TokenBag::from_text(resume_text);
    let job = TokenBag::from_text(job_text);

    let keys: HashSet<&str> = resume
        .order
        .iter()
        .chain(job.order.iter())
        .map(String::as_str)
        .collect();

    let mut intersection = 0usize;
    let mut union = 0usize;
    for token in keys.into_iter().filter(|t| qualifies(t)) {
        let r = resume.count(token);
        let j = job.count(token);
        intersection += r.min(j);
        union += r.max(j);
    }

    let score = if union == 0 {
        0
    } else {
        ((intersection as f64 / union as f64) * 100.0).round() as u32
    };

    let mut missing: Vec<(&str, usize)> = job
        .iter()
        .filter(|(token, _)| qualifies(token) && !resume.contains(token))
        .collect();
    // Stable sort keeps first-occurrence order among equal frequencies.
    missing.sort_by(|a, b| b.1.cmp(&a.1));

    MatchScore {
        score,
        missing: missing
            .into_iter()
            .take(MAX_MISSING)
            .map(|(token, _)| token.to_string())
            .collect(),
    }
}
