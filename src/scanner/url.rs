use crate::base::Chunk;
use crate::context::{Context, UrlPart};
use crate::html::is_html_space;

use super::Step;

pub(super) fn t_url(mut c: Context, input: &Chunk<'_>) -> Step {
    c.url_part = url_part_after(c.url_part, input);

    Step::to(c, input.len())
}

/// The URL part after `text`, given the part before it.
pub(super) fn url_part_after(part: UrlPart, text: &str) -> UrlPart {
    if text.contains(['#', '?']) {
        UrlPart::QueryOrFrag
    } else if part == UrlPart::None && !text.bytes().all(is_html_space) {
        // NOTE: URL attributes may be surrounded by spaces.
        UrlPart::PreQuery
    } else {
        part
    }
}
