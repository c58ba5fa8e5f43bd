use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;

pub fn month_key(date: &NaiveDate) -> String {
    format!("{}-{:02}", date.year(), date.month())
}

/// Every `YYYY-MM` key from the month of `first` through the month of `last`, inclusive.
pub fn month_span(first: &NaiveDate, last: &NaiveDate) -> Vec<String> {
    let mut months = Vec::new();
    let (mut year, mut month) = (first.year(), first.month());
    let end = (last.year(), last.month());
    while (year, month) <= end {
        months.push(format!("{year}-{month:02}"));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    months
}

/// Format an integer with `,` between groups of three digits.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// The `k` smallest items under `cmp`, in order. Only the selected prefix is sorted.
pub fn top_k<T, F>(mut items: Vec<T>, k: usize, mut cmp: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if k == 0 {
        return Vec::new();
    }
    if items.len() > k {
        items.select_nth_unstable_by(k - 1, &mut cmp);
        items.truncate(k);
    }
    items.sort_by(cmp);
    items
}
