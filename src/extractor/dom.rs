use scraper::{ElementRef, Html, Selector};

// Selectors are static strings; a bad one just matches nothing.
fn selector(sel: &str) -> Option<Selector> {
    Selector::parse(sel).ok()
}

pub fn first<'a>(doc: &'a Html, sel: &str) -> Option<ElementRef<'a>> {
    let sel = selector(sel)?;
    doc.select(&sel).next()
}

pub fn first_in<'a>(scope: ElementRef<'a>, sel: &str) -> Option<ElementRef<'a>> {
    let sel = selector(sel)?;
    scope.select(&sel).next()
}

pub fn all<'a>(doc: &'a Html, sel: &str) -> Vec<ElementRef<'a>> {
    match selector(sel) {
        Some(sel) => doc.select(&sel).collect(),
        None => Vec::new(),
    }
}

pub fn all_in<'a>(scope: ElementRef<'a>, sel: &str) -> Vec<ElementRef<'a>> {
    match selector(sel) {
        Some(sel) => scope.select(&sel).collect(),
        None => Vec::new(),
    }
}

/// Visible-ish text of an element: whitespace collapsed and trimmed.
pub fn inner_text(el: ElementRef) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

/// Untouched text content, for script bodies.
pub fn raw_text(el: ElementRef) -> String {
    el.text().collect::<String>()
}

/// Text of the first match, or "" when absent.
pub fn text(doc: &Html, sel: &str) -> String {
    first(doc, sel).map(inner_text).unwrap_or_default()
}

pub fn text_in(scope: ElementRef, sel: &str) -> String {
    first_in(scope, sel).map(inner_text).unwrap_or_default()
}

pub fn attr(el: Option<ElementRef>, name: &str) -> String {
    el.and_then(|e| e.value().attr(name)).map(|s| s.trim().to_string()).unwrap_or_default()
}

pub fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Leading integer of a string, ignoring leading whitespace ("1997-05-21" -> 1997).
pub fn leading_int(s: &str) -> Option<i32> {
    let s = s.trim_start();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<i32>().ok().map(|n| sign * n)
}

pub fn split_list(s: &str) -> Vec<String> {
    s.split(',').map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect()
}

pub fn collapse_whitespace(s: &str) -> String {
    let mut buf = String::with_capacity(s.len());
    let mut in_ws = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !in_ws {
                if !buf.is_empty() { buf.push(' '); }
                in_ws = true;
            }
        } else {
            buf.push(ch);
            in_ws = false;
        }
    }
    buf.trim().to_string()
}
