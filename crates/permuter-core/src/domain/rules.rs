//! Rule sets and the helpers a controller runs around a `Permute` call.
//!
//! Rules are opaque grammar strings such as `CONTAINS L1`, `P1 BEFORE L3`, or
//! `[3] EQUALS Jscar`.  The bridge never interprets them; the solver is
//! order-sensitive, so a [`RuleSet`] only guarantees that order survives.
//!
//! [`prepare_rules`] and [`sample_orders`] are the caller-side steps that a
//! controller performs before sending a request and after receiving the
//! response.

use tracing::{debug, warn};

/// Number of orders [`sample_orders`] keeps when the caller does not choose.
pub const DEFAULT_SAMPLE_LIMIT: usize = 5;

/// An ordered sequence of rule strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleSet(Vec<String>);

impl RuleSet {
    pub fn new(rules: Vec<String>) -> Self {
        Self(rules)
    }

    /// Contiguous view in the order the rules were received.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for RuleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for RuleSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Rules ready to send, plus the part count derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRules {
    pub rules: RuleSet,
    pub part_count: i32,
}

/// Expands a controller's rules into the form the solver expects and derives
/// the part count.
///
/// - Every `CONTAINS X` rule adds an `X EXACTLY 1` rule and counts one part.
/// - Every `[i] EQUALS X` rule pins a part to position `i`; if the highest
///   such index exceeds the counted parts, the part count becomes `index + 2`.
/// - The expanded list is reversed, which is the order the solver is fed.
///
/// # Examples
///
/// ```rust
/// use permuter_core::prepare_rules;
///
/// let prepared = prepare_rules(["STARTSWITH L1", "CONTAINS L1", "CONTAINS P1"]);
/// assert_eq!(prepared.part_count, 2);
/// assert_eq!(prepared.rules.as_slice()[0], "P1 EXACTLY 1");
/// ```
pub fn prepare_rules<I, S>(rules: I) -> PreparedRules
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut expanded: Vec<String> = rules.into_iter().map(Into::into).collect();

    let mut part_count: i32 = 0;
    let mut exactly = Vec::new();
    for rule in &expanded {
        if !rule.contains("CONTAINS ") {
            continue;
        }
        match rule.split(' ').nth(1) {
            Some(part) => {
                exactly.push(format!("{part} EXACTLY 1"));
                part_count += 1;
            }
            None => warn!(rule = %rule, "CONTAINS rule has no part name"),
        }
    }
    expanded.extend(exactly);

    let mut max_index: i32 = 0;
    for rule in expanded.iter().filter(|r| r.contains(" EQUALS ")) {
        match position_index(rule) {
            Some(index) if index > max_index => max_index = index,
            Some(_) => {}
            None => warn!(rule = %rule, "EQUALS rule has no readable [index]"),
        }
    }
    if max_index > part_count {
        part_count = max_index.saturating_add(2);
    }

    expanded.reverse();
    debug!(rules = expanded.len(), part_count, "prepared rules");

    PreparedRules {
        rules: RuleSet(expanded),
        part_count,
    }
}

/// Parses the number between the first `[` and the last `]` of a rule.
fn position_index(rule: &str) -> Option<i32> {
    let start = rule.find('[')? + 1;
    let end = rule.rfind(']')?;
    rule.get(start..end)?.trim().parse().ok()
}

/// Thins a list of orders down to at most `limit`, evenly spaced.
///
/// When there are more than `limit` orders, picks those at indices
/// `k * len / limit` for `k` in `0..limit`; otherwise returns them unchanged.
pub fn sample_orders<T>(orders: Vec<T>, limit: usize) -> Vec<T> {
    let len = orders.len();
    if len <= limit {
        return orders;
    }
    let mut picked = Vec::with_capacity(limit);
    let mut next_k = 0;
    for (index, order) in orders.into_iter().enumerate() {
        if next_k == limit {
            break;
        }
        if index == next_k * len / limit {
            picked.push(order);
            next_k += 1;
        }
    }
    picked
}
