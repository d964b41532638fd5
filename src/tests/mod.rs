
/// Builds a listing page with one `a.item` per href and an optional `a.next`
pub(crate) fn listing(title: &str, hrefs: &[&str], next: Option<&str>) -> String {
    let items = hrefs
        .iter()
        .map(|href| format!(r#"<li><a class="item" href="{}">{}</a></li>"#, href, href))
        .collect::<Vec<_>>()
        .join("\n");
    let next = next
        .map(|href| format!(r#"<a class="next" href="{}">Next</a>"#, href))
        .unwrap_or_default();

    format!(
        "<html><head><title>{}</title></head><body><ul>\n{}\n</ul>{}</body></html>",
        title, items, next
    )
}

/// A plain article page with the given title
pub(crate) fn article(title: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body><p>{}</p></body></html>",
        title, title
    )
}
