//! Route specificity ordering
//!
//! Manifest order is match priority: when two routes match a request only the
//! first one wins. The manifest walk visits siblings in the order defined here,
//! so this comparator also fixes the global route order.

use std::cmp::Ordering;

use crate::item::Item;
use crate::segment::Part;

/// Compares two sibling items, more specific first
///
/// 1. An index file sorts before a non-index sibling, unless the index file
///    lives under a rest parameter, in which case it sorts after it.
/// 2. Parts are compared position by position:
///    - a side that has run out of parts sorts after one that still has some,
///    - two rest parts do not decide anything,
///    - a rest part sorts after anything else,
///    - a named parameter sorts after static text,
///    - longer static text sorts first, equal lengths compare as strings.
/// 3. An endpoint sorts before a page.
/// 4. Otherwise the relative file paths decide.
///
/// # Examples
///
/// ```
/// use pagemill_router::item::item_from_entry;
/// use pagemill_router::priority::compare_items;
/// use pagemill_router::source::SourceEntry;
/// use std::cmp::Ordering;
/// use std::path::Path;
///
/// let item = |name: &str| {
///     let entry = SourceEntry { name: name.into(), is_dir: false };
///     item_from_entry(&entry, Path::new("pages"), Path::new(""), &[]).unwrap().unwrap()
/// };
///
/// assert_eq!(compare_items(&item("about.astro"), &item("[slug].astro")), Ordering::Less);
/// assert_eq!(compare_items(&item("[slug].astro"), &item("[...rest].astro")), Ordering::Less);
/// ```
pub fn compare_items(a: &Item, b: &Item) -> Ordering {
    if a.is_index != b.is_index {
        return if a.is_index {
            index_placement(a)
        } else {
            index_placement(b).reverse()
        };
    }

    let max = a.parts.len().max(b.parts.len());
    for i in 0..max {
        match compare_parts(a.parts.get(i), b.parts.get(i)) {
            Ordering::Equal => continue,
            decided => return decided,
        }
    }

    if a.is_page != b.is_page {
        return if a.is_page {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }

    utf16_order(&a.file, &b.file)
}

/// Where an index item goes relative to a non-index sibling
fn index_placement(index: &Item) -> Ordering {
    if has_rest_param(&index.file) {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

fn has_rest_param(file: &str) -> bool {
    file.contains("[...")
}

fn compare_parts(a: Option<&Part>, b: Option<&Part>) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(a), Some(b)) => (a, b),
    };

    match (a, b) {
        (Part::Rest(_), Part::Rest(_)) => Ordering::Equal,
        (Part::Rest(_), _) => Ordering::Greater,
        (_, Part::Rest(_)) => Ordering::Less,
        (Part::Param(_), Part::Param(_)) => Ordering::Equal,
        (Part::Param(_), Part::Static(_)) => Ordering::Greater,
        (Part::Static(_), Part::Param(_)) => Ordering::Less,
        (Part::Static(a), Part::Static(b)) => compare_static(a, b),
    }
}

/// Longer literal first; equal lengths fall back to string order
fn compare_static(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    utf16_len(b)
        .cmp(&utf16_len(a))
        .then_with(|| utf16_order(a, b))
}

// Lengths and order are by UTF-16 code unit, the way browsers and the page
// tooling count them.
fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

fn utf16_order(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}
