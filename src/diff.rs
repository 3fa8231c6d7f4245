//! Computing the changes between two ordered, grouped lists.
//!
//! A snapshot is a list of sections, each identified by a key and holding an
//! ordered list of row IDs. Row IDs must be unique across the whole snapshot.
//! [diff_snapshots] reports which sections and rows were inserted, deleted or
//! moved so a client can update its view incrementally instead of reloading it.

use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
};

use serde::Serialize;

/// One group of rows in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<K, R> {
    pub key: K,
    pub rows: Vec<R>,
}

/// The position of a row in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IndexPath {
    pub section: usize,
    pub row: usize,
}

impl IndexPath {
    pub fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

/// The changes that turn one snapshot into another.
///
/// Deleted positions refer to the old snapshot, inserted positions refer to
/// the new snapshot and moves are `(old, new)` pairs. Rows of inserted or
/// deleted sections are also listed as inserted or deleted rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListUpdate {
    pub inserted_sections: Vec<usize>,
    pub deleted_sections: Vec<usize>,
    pub inserted_rows: Vec<IndexPath>,
    pub deleted_rows: Vec<IndexPath>,
    pub moved_rows: Vec<(IndexPath, IndexPath)>,
}

impl ListUpdate {
    pub fn is_empty(&self) -> bool {
        self.inserted_sections.is_empty()
            && self.deleted_sections.is_empty()
            && self.inserted_rows.is_empty()
            && self.deleted_rows.is_empty()
            && self.moved_rows.is_empty()
    }
}

struct Position {
    path: IndexPath,
    flat: usize,
}

fn index_rows<K, R>(snapshot: &[Section<K, R>]) -> HashMap<&R, Position>
where
    R: Eq + Hash,
{
    let mut positions = HashMap::new();
    let mut flat = 0;

    for (section_index, section) in snapshot.iter().enumerate() {
        for (row_index, row) in section.rows.iter().enumerate() {
            positions.insert(
                row,
                Position {
                    path: IndexPath::new(section_index, row_index),
                    flat,
                },
            );
            flat += 1;
        }
    }

    positions
}

/// Compute the changes from `old` to `new`.
///
/// Rows present in both snapshots are reported as moved if they changed
/// section, or if they are not part of the longest run of rows that stayed in
/// their section and kept their relative order. This keeps the number of moves
/// minimal: swapping two neighbours moves one row, not both.
pub fn diff_snapshots<K, R>(old: &[Section<K, R>], new: &[Section<K, R>]) -> ListUpdate
where
    K: Eq + Hash,
    R: Eq + Hash,
{
    let old_keys: HashSet<&K> = old.iter().map(|section| &section.key).collect();
    let new_keys: HashSet<&K> = new.iter().map(|section| &section.key).collect();

    let deleted_sections = old
        .iter()
        .enumerate()
        .filter(|(_, section)| !new_keys.contains(&section.key))
        .map(|(index, _)| index)
        .collect();
    let inserted_sections = new
        .iter()
        .enumerate()
        .filter(|(_, section)| !old_keys.contains(&section.key))
        .map(|(index, _)| index)
        .collect();

    let old_positions = index_rows(old);
    let new_positions = index_rows(new);

    let mut deleted_rows = Vec::new();
    // Rows in both snapshots, in old order: (old path, new path, new flat index).
    let mut common = Vec::new();

    for (section_index, section) in old.iter().enumerate() {
        for (row_index, row) in section.rows.iter().enumerate() {
            let old_path = IndexPath::new(section_index, row_index);

            match new_positions.get(row) {
                Some(position) => common.push((old_path, position.path, position.flat)),
                None => deleted_rows.push(old_path),
            }
        }
    }

    let mut inserted_rows: Vec<IndexPath> = new
        .iter()
        .flat_map(|section| section.rows.iter())
        .filter(|row| !old_positions.contains_key(row))
        .filter_map(|row| new_positions.get(row).map(|position| position.path))
        .collect();
    inserted_rows.sort();

    let (changed_section, same_section): (Vec<_>, Vec<_>) = common
        .into_iter()
        .partition(|(old_path, new_path, _)| {
            old[old_path.section].key != new[new_path.section].key
        });

    // Rows that changed section are always moves, so only rows that stayed in
    // their section compete for the longest in-order run.
    let flat_order: Vec<usize> = same_section.iter().map(|(_, _, flat)| *flat).collect();
    let in_order = longest_increasing_subsequence(&flat_order);

    let mut moved_rows: Vec<(IndexPath, IndexPath)> = changed_section
        .into_iter()
        .chain(
            same_section
                .into_iter()
                .enumerate()
                .filter(|(index, _)| !in_order.contains(index))
                .map(|(_, row)| row),
        )
        .map(|(old_path, new_path, _)| (old_path, new_path))
        .collect();
    moved_rows.sort();

    ListUpdate {
        inserted_sections,
        deleted_sections,
        inserted_rows,
        deleted_rows,
        moved_rows,
    }
}

/// The indexes into `values` of one longest strictly increasing subsequence.
fn longest_increasing_subsequence(values: &[usize]) -> HashSet<usize> {
    // `tails[k]` is the index of the smallest tail of an increasing run of length `k + 1`.
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; values.len()];

    for (index, value) in values.iter().enumerate() {
        let length = tails.partition_point(|&tail| values[tail] < *value);

        if length > 0 {
            previous[index] = Some(tails[length - 1]);
        }

        if length == tails.len() {
            tails.push(index);
        } else {
            tails[length] = index;
        }
    }

    let mut members = HashSet::new();
    let mut cursor = tails.last().copied();

    while let Some(index) = cursor {
        members.insert(index);
        cursor = previous[index];
    }

    members
}
