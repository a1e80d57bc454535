use triangulator_core::{Comment, WatchList};

/// True iff the comment author is on the watch-list. Case-sensitive.
/// Comments from deleted accounts never match.
pub fn matches(comment: &Comment, watch_list: &WatchList) -> bool {
    matching_entries(comment, watch_list).next().is_some()
}

/// Every watch-list entry equal to the comment author, once per entry.
pub fn matching_entries<'a>(
    comment: &'a Comment,
    watch_list: &'a WatchList,
) -> impl Iterator<Item = &'a str> + 'a {
    let author = comment.author.as_deref();
    watch_list
        .iter()
        .filter(move |entry| author == Some(*entry))
}
