//! Budgeted selection of what goes into a repository's context.

use crate::contract::TreeEntry;
use crate::score::score;

/// A blob with its importance score attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredEntry {
    pub entry: TreeEntry,
    pub importance: u32,
}

/// The two independent budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub structure_limit: usize,
    pub content_limit: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            structure_limit: crate::config::DEFAULT_STRUCTURE_LIMIT,
            content_limit: crate::config::DEFAULT_CONTENT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Blob paths in listing order, at most `structure_limit`.
    pub structure: Vec<String>,
    /// Fetchable blobs by descending importance, at most `content_limit`.
    pub content: Vec<ScoredEntry>,
}

/// Applies both budgets to a tree listing.
///
/// Content ranking is a stable sort, so equally scored files keep their
/// listing order.
pub fn select(entries: &[TreeEntry], budget: Budget) -> Selection {
    let structure = entries
        .iter()
        .filter(|e| e.is_blob())
        .take(budget.structure_limit)
        .map(|e| e.path.clone())
        .collect();

    let mut content: Vec<ScoredEntry> = entries
        .iter()
        .filter(|e| e.is_blob() && !e.content_locator.is_empty())
        .map(|e| ScoredEntry {
            importance: score(&e.path),
            entry: e.clone(),
        })
        .collect();
    content.sort_by(|a, b| b.importance.cmp(&a.importance));
    content.truncate(budget.content_limit);

    Selection { structure, content }
}
