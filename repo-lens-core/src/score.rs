//! Static importance heuristics for file paths.
//!
//! The rules are an ordered table; the first rule whose matcher accepts the
//! lower-cased path decides the score. Paths no rule accepts get [`DEFAULT_SCORE`].

/// Score of a path that matches no rule.
pub const DEFAULT_SCORE: u32 = 10;

#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Path contains any of the needles.
    Contains(&'static [&'static str]),
    /// Path ends with any of the suffixes.
    EndsWith(&'static [&'static str]),
}

impl Matcher {
    pub fn matches(&self, lower_path: &str) -> bool {
        match self {
            Matcher::Contains(needles) => needles.iter().any(|n| lower_path.contains(n)),
            Matcher::EndsWith(suffixes) => suffixes.iter().any(|s| lower_path.ends_with(s)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub matcher: Matcher,
    pub score: u32,
}

/// Manifests and deployment descriptors first, tests and binary artefacts last.
///
/// Test paths are matched before source suffixes so `foo_test.go` ranks as a test.
pub const RULES: &[Rule] = &[
    Rule {
        matcher: Matcher::Contains(&["readme.md"]),
        score: 100,
    },
    Rule {
        matcher: Matcher::Contains(&["package.json", "pom.xml", "requirements.txt"]),
        score: 90,
    },
    Rule {
        matcher: Matcher::Contains(&["docker", "k8s", "helm"]),
        score: 85,
    },
    Rule {
        matcher: Matcher::Contains(&["config", "settings", "application.y"]),
        score: 80,
    },
    Rule {
        matcher: Matcher::Contains(&["controller", "service", "api"]),
        score: 70,
    },
    Rule {
        matcher: Matcher::Contains(&["test", "spec"]),
        score: 20,
    },
    Rule {
        matcher: Matcher::EndsWith(&[".ts", ".js", ".java", ".py", ".go"]),
        score: 50,
    },
    Rule {
        matcher: Matcher::EndsWith(&[".lock", ".png", ".jpg"]),
        score: 0,
    },
];

/// Scores `path` against [`RULES`], case-insensitively.
pub fn score(path: &str) -> u32 {
    score_with(RULES, path)
}

/// Scores `path` against an arbitrary rule table.
pub fn score_with(rules: &[Rule], path: &str) -> u32 {
    let lower = path.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matcher.matches(&lower))
        .map_or(DEFAULT_SCORE, |rule| rule.score)
}
