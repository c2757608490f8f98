use std::collections::HashMap;

use conform_domain::Item;
use tracing::warn;

/// Status values that do not, on their own, trigger custom-tally mode (§4.5).
const RESERVED_STATUSES: &[&str] = &["passed", "failed", "skipped", "unknown", "timeout", ""];

/// Whole-tree property: true iff any leaf bears a status outside the
/// reserved set. The mode selected for the root applies uniformly to every
/// node in the tree (§4.5).
pub fn is_custom_mode(root: &Item) -> bool {
    fn scan(item: &Item) -> bool {
        if item.is_leaf() {
            return !RESERVED_STATUSES.contains(&item.status.as_str());
        }
        item.items.iter().any(scan)
    }
    scan(root)
}

/// Parse a status string as a comma-separated list of `tag` or `tag: count`
/// pairs. Unparseable count tokens are logged and skipped — they never
/// fail the run (§4.5).
fn parse_tally(status: &str) -> HashMap<String, u64> {
    let mut out = HashMap::new();
    if status.trim().is_empty() {
        return out;
    }
    for part in status.split(", ") {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.split_once(": ") {
            Some((tag, count_str)) => match count_str.trim().parse::<u64>() {
                Ok(n) => *out.entry(tag.trim().to_string()).or_insert(0) += n,
                Err(_) => warn!(token = %part, "unparseable custom-tally count token, skipping"),
            },
            None => *out.entry(part.to_string()).or_insert(0) += 1,
        }
    }
    out
}

/// Re-serialize a tally with keys sorted lexicographically (§4.5).
fn serialize_tally(tally: &HashMap<String, u64>) -> String {
    let mut keys: Vec<&String> = tally.keys().collect();
    keys.sort();
    keys.into_iter()
        .map(|k| format!("{}: {}", k, tally[k]))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Compute a single status from a set of already-resolved child statuses
/// (§4.5, §8 scenarios 1–3). Exposed standalone so it can be exercised
/// without building an Item tree.
pub fn aggregate_status(custom_mode: bool, children: &[String]) -> String {
    if custom_mode {
        let mut tally: HashMap<String, u64> = HashMap::new();
        for child in children {
            for (k, v) in parse_tally(child) {
                *tally.entry(k).or_insert(0) += v;
            }
        }
        return serialize_tally(&tally);
    }

    if children.is_empty() {
        return "unknown".to_string();
    }

    let normalized: Vec<&str> = children
        .iter()
        .map(|s| if s.is_empty() { "unknown" } else { s.as_str() })
        .collect();

    if normalized.iter().any(|s| *s == "failed" || *s == "timeout") {
        "failed".to_string()
    } else if normalized.iter().any(|s| *s == "unknown") {
        "unknown".to_string()
    } else {
        "passed".to_string()
    }
}

/// Roll up every non-leaf node's status from its children, post-order
/// (IV2: applying this a second time is a no-op since it always recomputes
/// from current children). Leaf statuses, set by the format processors,
/// are never touched.
pub fn roll_up(item: &mut Item, custom_mode: bool) {
    if item.is_leaf() {
        return;
    }
    for child in &mut item.items {
        if !child.is_leaf() {
            roll_up(child, custom_mode);
        }
    }
    let statuses: Vec<String> = item.items.iter().map(|c| c.status.clone()).collect();
    item.status = aggregate_status(custom_mode, &statuses);
}

/// Detect the mode from the whole tree, then roll it up in one pass.
pub fn aggregate(item: &mut Item) {
    let custom_mode = is_custom_mode(item);
    roll_up(item, custom_mode);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_roll_up_is_unknown() {
        assert_eq!(aggregate_status(false, &[]), "unknown");
    }

    #[test]
    fn simple_failure_propagates_to_root() {
        let mut root = Item::new("A", "passed");
        root.items.push(Item::new("B", "passed"));
        root.items.push(Item::new("C", "failed"));
        aggregate(&mut root);
        assert_eq!(root.status, "failed");
        assert_eq!(root.items[0].status, "passed");
        assert_eq!(root.items[1].status, "failed");
    }

    #[test]
    fn custom_tally_accumulates_and_sorts() {
        let mut root = Item::new("root", "");
        root.items.push(Item::new("a", "alpha"));
        root.items.push(Item::new("b", "beta"));
        root.items.push(Item::new("c", "alpha: 2"));
        aggregate(&mut root);
        assert_eq!(root.status, "alpha: 3, beta: 1");
    }

    #[test]
    fn custom_mode_is_a_whole_tree_property() {
        let mut root = Item::new("root", "");
        let mut suite = Item::new("suite", "");
        suite.items.push(Item::new("t1", "passed"));
        suite.items.push(Item::new("t2", "custom-tag"));
        root.items.push(suite);
        aggregate(&mut root);
        // "passed" parses as tag "passed" count 1 once custom mode is triggered.
        assert_eq!(root.items[0].status, "custom-tag: 1, passed: 1");
        assert_eq!(root.status, "custom-tag: 1, passed: 1");
    }

    #[test]
    fn roll_up_is_idempotent() {
        let mut root = Item::new("A", "");
        root.items.push(Item::new("B", "passed"));
        root.items.push(Item::new("C", "failed"));
        aggregate(&mut root);
        let first = root.status.clone();
        aggregate(&mut root);
        assert_eq!(root.status, first);
    }

    #[test]
    fn unparseable_count_token_is_skipped_not_fatal() {
        let tally = parse_tally("alpha: notanumber, beta: 2");
        assert_eq!(tally.get("beta"), Some(&2));
        assert!(tally.get("alpha").is_none());
    }
}
