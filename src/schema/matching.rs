//! Zero / one / many classification of lookup results

/// The outcome of a lookup that expects at most one result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match<T> {
    None,
    Found(T),
    /// Every candidate, in the order they were produced
    Ambiguous(Vec<T>),
}

impl<T> Match<T> {
    /// Collect all candidates and classify them
    pub fn classify<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut iter = candidates.into_iter();
        let Some(first) = iter.next() else {
            return Match::None;
        };
        let Some(second) = iter.next() else {
            return Match::Found(first);
        };

        let mut all = vec![first, second];
        all.extend(iter);
        Match::Ambiguous(all)
    }
}
