//! Sorted posting list operations

use std::cmp::Ordering;

/// Intersect two ascending lists
///
/// Switches to probing the longer list when one side is much shorter, so a
/// rare feature intersected with a common one costs roughly
/// `short * log(long)`.
pub fn intersect(a: &[u32], b: &[u32]) -> Vec<u32> {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return Vec::new();
    }

    if short.len() * 8 < long.len() {
        let mut result = Vec::with_capacity(short.len());
        let mut rest = long;
        for &value in short {
            match rest.binary_search(&value) {
                Ok(pos) => {
                    result.push(value);
                    rest = &rest[pos + 1..];
                }
                Err(pos) => rest = &rest[pos..],
            }
            if rest.is_empty() {
                break;
            }
        }
        return result;
    }

    let mut result = Vec::with_capacity(short.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    result
}

/// Intersect several ascending lists, smallest first
///
/// Returns `None` for an empty input: the empty conjunction matches
/// everything and only the caller knows what "everything" is.
pub fn intersect_all(lists: &[&[u32]]) -> Option<Vec<u32>> {
    let mut ordered: Vec<&[u32]> = lists.to_vec();
    ordered.sort_by_key(|list| list.len());

    let (first, rest) = ordered.split_first()?;
    let mut running = first.to_vec();
    for list in rest {
        if running.is_empty() {
            break;
        }
        running = intersect(&running, list);
    }
    Some(running)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_merge_and_probe() {
        assert_eq!(intersect(&[1, 3, 5, 7], &[3, 4, 5, 8]), vec![3, 5]);

        let long: Vec<u32> = (0..1000).collect();
        assert_eq!(intersect(&[2, 500, 999, 1500], &long), vec![2, 500, 999]);
        assert_eq!(intersect(&long, &[]), Vec::<u32>::new());
    }

    #[test]
    fn test_intersect_all() {
        assert_eq!(intersect_all(&[]), None);
        let a = [1, 2, 3, 4];
        let b = [2, 4, 6];
        let c = [4];
        assert_eq!(intersect_all(&[&a, &b, &c]), Some(vec![4]));
        assert_eq!(intersect_all(&[&a, &[9]]), Some(vec![]));
    }
}
