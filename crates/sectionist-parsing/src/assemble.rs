use sectionist_core::SectionMap;

/// Rebuild a flat document from `sections`: `"{title}\n{content}\n\n"` per
/// entry, in map order. Content is used as-is.
pub fn assemble(sections: &SectionMap) -> String {
    assemble_entries(sections.iter())
}

/// [`assemble`] over any sequence of `(title, content)` pairs.
pub fn assemble_entries<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut document = String::new();
    for (title, content) in entries {
        document.push_str(title);
        document.push('\n');
        document.push_str(content);
        document.push_str("\n\n");
    }
    document
}
