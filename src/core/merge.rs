use super::list::DepList;
use std::cmp::Ordering;

/// Merges two lists that are each sorted under `cmp` and free of duplicates
/// into one sorted, duplicate-free list.
///
/// On equal keys the element from `left` is removed and passed to `dispose`;
/// the comparison is then repeated against the same `right` element, so a run
/// of equal keys spanning both inputs leaves exactly one survivor, taken from
/// `right`. Callers order the arguments to pick which side wins.
pub fn merge_sorted_dedup<T, C, D>(
    mut left: DepList<T>,
    mut right: DepList<T>,
    mut cmp: C,
    mut dispose: D,
) -> DepList<T>
where
    C: FnMut(&T, &T) -> Ordering,
    D: FnMut(T),
{
    if left.is_empty() {
        return right;
    }
    if right.is_empty() {
        return left;
    }

    let mut merged = DepList::with_capacity(left.len() + right.len());

    loop {
        let order = match (left.front(), right.front()) {
            (Some(l), Some(r)) => cmp(l, r),
            _ => break,
        };

        match order {
            Ordering::Less => {
                if let Some(value) = left.pop_front() {
                    merged.push_back(value);
                }
            }
            Ordering::Greater => {
                if let Some(value) = right.pop_front() {
                    merged.push_back(value);
                }
            }
            Ordering::Equal => {
                if let Some(head) = left.head() {
                    left.remove_node(head, &mut dispose);
                }
            }
        }
    }

    merged.append(left);
    merged.append(right);
    merged
}
