use crate::context::AttrKind;

/// Classifies an attribute by its (lowercase) name.
pub(crate) fn attr_kind(name: &str) -> AttrKind {
    let name = if let Some(rest) = name.strip_prefix("data-") {
        rest
    } else if let Some((prefix, local)) = name.split_once(':') {
        if prefix == "xmlns" {
            return AttrKind::Url;
        }

        // NOTE: `svg:href` and `xlink:href` are treated as `href`.
        local
    } else {
        name
    };

    if let Some(kind) = known_attr_kind(name) {
        kind
    } else if name.starts_with("on") {
        // NOTE: treat partial event handler names as script.
        AttrKind::Js
    } else if name.contains("src") || name.contains("uri") || name.contains("url") {
        AttrKind::Url
    } else {
        AttrKind::Ordinary
    }
}

fn known_attr_kind(name: &str) -> Option<AttrKind> {
    Some(match name {
        "accept" | "alt" | "autocomplete" | "autofocus" | "autoplay" | "border" | "checked"
        | "class" | "cols" | "colspan" | "contenteditable" | "contextmenu" | "controls"
        | "coords" | "datetime" | "default" | "dir" | "dirname" | "disabled" | "draggable"
        | "dropzone" | "for" | "formtarget" | "headers" | "height" | "hidden" | "high"
        | "hreflang" | "id" | "ismap" | "kind" | "label" | "lang" | "list" | "loop" | "low"
        | "max" | "maxlength" | "media" | "mediagroup" | "min" | "multiple" | "name" | "open"
        | "optimum" | "placeholder" | "preload" | "pubdate" | "radiogroup" | "readonly"
        | "required" | "reversed" | "rows" | "rowspan" | "spellcheck" | "scope" | "scoped"
        | "seamless" | "selected" | "shape" | "size" | "sizes" | "span" | "srclang" | "start"
        | "step" | "tabindex" | "target" | "title" | "width" | "wrap" => AttrKind::Ordinary,

        "action" | "archive" | "background" | "cite" | "classid" | "codebase" | "data"
        | "formaction" | "href" | "icon" | "longdesc" | "manifest" | "poster" | "profile"
        | "src" | "usemap" | "xmlns" => AttrKind::Url,

        "accept-charset" | "async" | "challenge" | "charset" | "content" | "crossorigin"
        | "defer" | "enctype" | "form" | "formenctype" | "formmethod" | "formnovalidate"
        | "http-equiv" | "keytype" | "language" | "method" | "novalidate" | "pattern" | "rel"
        | "sandbox" | "type" | "value" => AttrKind::Unsafe,

        "srcset" => AttrKind::Srcset,
        "srcdoc" => AttrKind::Html,
        "style" => AttrKind::Css,

        _ => return None,
    })
}
