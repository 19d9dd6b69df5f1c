use std::collections::HashMap;

/// Result of allocating a base name within a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Sanitized name the allocation was requested for.
    pub base: String,
    /// Name to write: `base` for the first occurrence, `base{N}` afterwards.
    pub name: String,
    /// 1-based occurrence count of `base` within its set.
    pub occurrence: u32,
    /// Set on the second occurrence only: the name the first, unsuffixed
    /// file must be renamed to (`base1`).
    pub previous_collision: Option<String>,
}

impl Allocation {
    pub fn is_first(&self) -> bool {
        self.occurrence == 1
    }

    /// Numeric suffix alone; empty for the first occurrence.
    pub fn suffix(&self) -> String {
        if self.is_first() {
            String::new()
        } else {
            self.occurrence.to_string()
        }
    }
}

/// Hands out unique base names per set.
///
/// The first occurrence of a name keeps it unsuffixed. On the second
/// occurrence the caller is told to rename that first file to `name1`; later
/// occurrences simply carry their own count. Counts only ever grow.
#[derive(Debug, Default)]
pub struct NameAllocator {
    counts: HashMap<(String, String), u32>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, set_id: &str, name: &str) -> Allocation {
        let count = self
            .counts
            .entry((set_id.to_string(), name.to_string()))
            .and_modify(|n| *n += 1)
            .or_insert(1);
        let occurrence = *count;

        if occurrence == 1 {
            return Allocation {
                base: name.to_string(),
                name: name.to_string(),
                occurrence,
                previous_collision: None,
            };
        }

        Allocation {
            base: name.to_string(),
            name: format!("{}{}", name, occurrence),
            occurrence,
            previous_collision: (occurrence == 2).then(|| format!("{}1", name)),
        }
    }

    /// Times `name` has been allocated within `set_id`.
    pub fn count(&self, set_id: &str, name: &str) -> u32 {
        self.counts
            .get(&(set_id.to_string(), name.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
