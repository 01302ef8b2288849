//! 收集器共用的结果缓冲
//!
//! 去重模式下保留首次出现的顺序

use std::collections::HashSet;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct Collected<T> {
    items: Vec<T>,
    seen: Option<HashSet<T>>,
}

impl<T: Eq + Hash + Clone> Collected<T> {
    pub fn new(remove_duplicates: bool) -> Self {
        Self {
            items: Vec::new(),
            seen: remove_duplicates.then(HashSet::new),
        }
    }

    pub fn push(&mut self, item: &T) {
        match &mut self.seen {
            Some(seen) => {
                if seen.insert(item.clone()) {
                    self.items.push(item.clone());
                }
            }
            None => self.items.push(item.clone()),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        if let Some(seen) = &mut self.seen {
            seen.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let mut c = Collected::new(true);
        for x in [3, 1, 3, 2, 1] {
            c.push(&x);
        }
        assert_eq!(c.items(), &[3, 1, 2]);

        let mut all = Collected::new(false);
        for x in [3, 1, 3] {
            all.push(&x);
        }
        assert_eq!(all.into_vec(), vec![3, 1, 3]);
    }
}
