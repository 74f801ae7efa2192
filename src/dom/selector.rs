//! CSS selector subset.
//!
//! Supported:
//! - groups (`a, b`), compounds of tag / `*` / `#id` / `.class`
//! - attribute conditions `[a]`, `=`, `^=`, `$=`, `*=`, `~=`, `|=`
//! - combinators: descendant, `>`, `+`, `~`
//! - pseudo-classes `:not(..)`, `:submit`, `:reset`, `:disabled`,
//!   `:enabled`, `:first-child`, `:last-child`
//!
//! Matching walks each chain right to left and backtracks across
//! descendant/sibling combinators.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use super::{Document, DomError, NodeId};

// ============================================================================
// Types
// ============================================================================

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    groups: Vec<Chain>,
}

type Chain = Vec<Part>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
    compound: Compound,
    /// Relation to the previous part (`None` for the first part).
    combinator: Option<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    Adjacent,
    Sibling,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: SmallVec<[String; 2]>,
    attrs: Vec<AttrCondition>,
    pseudos: Vec<Pseudo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCondition {
    Exists(String),
    Equals(String, String),
    Prefix(String, String),
    Suffix(String, String),
    Substring(String, String),
    Word(String, String),
    Dash(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pseudo {
    Not(Vec<Chain>),
    Submit,
    Reset,
    Disabled,
    Enabled,
    FirstChild,
    LastChild,
}

// ============================================================================
// Parsing
// ============================================================================

impl Selector {
    pub fn parse(source: &str) -> Result<Self, DomError> {
        let groups = parse_list(source)?;
        Ok(Self {
            source: source.trim().to_string(),
            groups,
        })
    }

    /// The selector text as written.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `id` is an element matching any group.
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        doc.is_element(id) && matches_any(doc, id, &self.groups)
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn unsupported(source: &str) -> DomError {
    DomError::Selector(source.trim().to_string())
}

fn parse_list(source: &str) -> Result<Vec<Chain>, DomError> {
    split_groups(source)?
        .iter()
        .map(|group| parse_chain(group).map_err(|_| unsupported(source)))
        .collect()
}

/// Bracket/paren/quote depth tracker shared by the splitters.
#[derive(Default)]
struct Depth {
    bracket: usize,
    paren: usize,
    quote: Option<char>,
}

impl Depth {
    /// Feed one char; returns `false` on unbalanced input.
    fn feed(&mut self, ch: char) -> bool {
        if let Some(q) = self.quote {
            if ch == q {
                self.quote = None;
            }
            return true;
        }
        match ch {
            '"' | '\'' => self.quote = Some(ch),
            '[' => self.bracket += 1,
            ']' if self.bracket == 0 => return false,
            ']' => self.bracket -= 1,
            '(' => self.paren += 1,
            ')' if self.paren == 0 => return false,
            ')' => self.paren -= 1,
            _ => {}
        }
        true
    }

    #[inline]
    fn top(&self) -> bool {
        self.bracket == 0 && self.paren == 0 && self.quote.is_none()
    }
}

fn split_groups(source: &str) -> Result<Vec<String>, DomError> {
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut depth = Depth::default();

    for ch in source.chars() {
        if ch == ',' && depth.top() {
            let trimmed = current.trim();
            if trimmed.is_empty() {
                return Err(unsupported(source));
            }
            groups.push(trimmed.to_string());
            current.clear();
            continue;
        }
        if !depth.feed(ch) {
            return Err(unsupported(source));
        }
        current.push(ch);
    }

    let trimmed = current.trim();
    if !depth.top() || trimmed.is_empty() {
        return Err(unsupported(source));
    }
    groups.push(trimmed.to_string());
    Ok(groups)
}

fn tokenize(group: &str) -> Result<Vec<String>, DomError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = Depth::default();

    let flush = |current: &mut String, tokens: &mut Vec<String>| {
        if !current.trim().is_empty() {
            tokens.push(current.trim().to_string());
        }
        current.clear();
    };

    for ch in group.chars() {
        if depth.top() {
            match ch {
                '>' | '+' | '~' => {
                    flush(&mut current, &mut tokens);
                    tokens.push(ch.to_string());
                    continue;
                }
                c if c.is_ascii_whitespace() => {
                    flush(&mut current, &mut tokens);
                    continue;
                }
                _ => {}
            }
        }
        if !depth.feed(ch) {
            return Err(unsupported(group));
        }
        current.push(ch);
    }
    if !depth.top() {
        return Err(unsupported(group));
    }
    flush(&mut current, &mut tokens);
    Ok(tokens)
}

fn parse_chain(group: &str) -> Result<Chain, DomError> {
    let mut chain = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in tokenize(group)? {
        let combinator = match token.as_str() {
            ">" => Some(Combinator::Child),
            "+" => Some(Combinator::Adjacent),
            "~" => Some(Combinator::Sibling),
            _ => None,
        };
        if let Some(combinator) = combinator {
            if chain.is_empty() || pending.is_some() {
                return Err(unsupported(group));
            }
            pending = Some(combinator);
            continue;
        }

        let compound = parse_compound(&token)?;
        let combinator = if chain.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        chain.push(Part {
            compound,
            combinator,
        });
    }

    if chain.is_empty() || pending.is_some() {
        return Err(unsupported(group));
    }
    Ok(chain)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

/// Read an identifier starting at byte `start`; returns it and the end offset.
fn read_ident(s: &str, start: usize) -> Option<(&str, usize)> {
    let end = s[start..]
        .char_indices()
        .find(|(_, c)| !is_ident_char(*c))
        .map_or(s.len(), |(i, _)| start + i);
    (end > start).then(|| (&s[start..end], end))
}

/// Offset of the closing delimiter matching the opener at `open`.
fn find_close(s: &str, open: usize, close: char) -> Option<usize> {
    let mut depth = Depth::default();
    for (i, ch) in s[open..].char_indices() {
        if i > 0 && ch == close && depth.bracket + depth.paren == 1 && depth.quote.is_none() {
            return Some(open + i);
        }
        if !depth.feed(ch) {
            return None;
        }
    }
    None
}

fn parse_compound(token: &str) -> Result<Compound, DomError> {
    let err = || unsupported(token);
    let mut compound = Compound::default();
    let mut i = 0;

    if token.starts_with('*') {
        i = 1;
    } else if let Some((tag, end)) = read_ident(token, 0) {
        compound.tag = Some(tag.to_ascii_lowercase());
        i = end;
    }

    while i < token.len() {
        let rest = &token[i..];
        if rest.starts_with('#') {
            let (id, end) = read_ident(token, i + 1).ok_or_else(err)?;
            compound.id = Some(id.to_string());
            i = end;
        } else if rest.starts_with('.') {
            let (class, end) = read_ident(token, i + 1).ok_or_else(err)?;
            compound.classes.push(class.to_string());
            i = end;
        } else if rest.starts_with('[') {
            let close = find_close(token, i, ']').ok_or_else(err)?;
            compound.attrs.push(parse_attr(&token[i + 1..close]).ok_or_else(err)?);
            i = close + 1;
        } else if rest.starts_with(':') {
            let (name, end) = read_ident(token, i + 1).ok_or_else(err)?;
            let (arg, end) = if token[end..].starts_with('(') {
                let close = find_close(token, end, ')').ok_or_else(err)?;
                (Some(&token[end + 1..close]), close + 1)
            } else {
                (None, end)
            };
            compound.pseudos.push(parse_pseudo(name, arg).ok_or_else(err)?);
            i = end;
        } else {
            return Err(err());
        }
    }

    Ok(compound)
}

fn parse_attr(body: &str) -> Option<AttrCondition> {
    let Some(eq) = body.find('=') else {
        let name = body.trim();
        return (!name.is_empty()).then(|| AttrCondition::Exists(name.to_ascii_lowercase()));
    };

    let (name, op) = match body[..eq].chars().last() {
        Some(c @ ('^' | '$' | '*' | '~' | '|')) => (&body[..eq - 1], Some(c)),
        _ => (&body[..eq], None),
    };
    let name = name.trim().to_ascii_lowercase();
    if name.is_empty() {
        return None;
    }

    let raw = body[eq + 1..].trim();
    let value = raw
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| raw.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(raw)
        .to_string();

    Some(match op {
        None => AttrCondition::Equals(name, value),
        Some('^') => AttrCondition::Prefix(name, value),
        Some('$') => AttrCondition::Suffix(name, value),
        Some('*') => AttrCondition::Substring(name, value),
        Some('~') => AttrCondition::Word(name, value),
        Some(_) => AttrCondition::Dash(name, value),
    })
}

fn parse_pseudo(name: &str, arg: Option<&str>) -> Option<Pseudo> {
    match (name.to_ascii_lowercase().as_str(), arg) {
        ("not", Some(inner)) => parse_list(inner).ok().map(Pseudo::Not),
        ("submit", None) => Some(Pseudo::Submit),
        ("reset", None) => Some(Pseudo::Reset),
        ("disabled", None) => Some(Pseudo::Disabled),
        ("enabled", None) => Some(Pseudo::Enabled),
        ("first-child", None) => Some(Pseudo::FirstChild),
        ("last-child", None) => Some(Pseudo::LastChild),
        _ => None,
    }
}

// ============================================================================
// Matching
// ============================================================================

fn matches_any(doc: &Document, id: NodeId, groups: &[Chain]) -> bool {
    groups
        .iter()
        .any(|chain| !chain.is_empty() && matches_from(doc, id, chain, chain.len() - 1))
}

/// Match `chain[..=idx]` with `chain[idx]` anchored at `id`.
fn matches_from(doc: &Document, id: NodeId, chain: &[Part], idx: usize) -> bool {
    let part = &chain[idx];
    if !matches_compound(doc, id, &part.compound) {
        return false;
    }
    let Some(combinator) = part.combinator else {
        return true;
    };
    let prev = idx - 1;

    match combinator {
        Combinator::Child => doc
            .parent(id)
            .is_some_and(|parent| matches_from(doc, parent, chain, prev)),
        Combinator::Descendant => {
            let mut cursor = doc.parent(id);
            while let Some(ancestor) = cursor {
                if matches_from(doc, ancestor, chain, prev) {
                    return true;
                }
                cursor = doc.parent(ancestor);
            }
            false
        }
        Combinator::Adjacent => doc
            .previous_element_sibling(id)
            .is_some_and(|sibling| matches_from(doc, sibling, chain, prev)),
        Combinator::Sibling => {
            let mut cursor = doc.previous_element_sibling(id);
            while let Some(sibling) = cursor {
                if matches_from(doc, sibling, chain, prev) {
                    return true;
                }
                cursor = doc.previous_element_sibling(sibling);
            }
            false
        }
    }
}

fn matches_compound(doc: &Document, id: NodeId, compound: &Compound) -> bool {
    let Some(element) = doc.element(id) else {
        return false;
    };

    if compound.tag.as_deref().is_some_and(|tag| tag != element.tag()) {
        return false;
    }
    if compound
        .id
        .as_deref()
        .is_some_and(|want| element.attr("id") != Some(want))
    {
        return false;
    }
    if !compound.classes.iter().all(|class| element.has_class(class)) {
        return false;
    }
    if !compound.attrs.iter().all(|cond| matches_attr(element.attr(cond.name()), cond)) {
        return false;
    }
    compound.pseudos.iter().all(|pseudo| matches_pseudo(doc, id, pseudo))
}

impl AttrCondition {
    fn name(&self) -> &str {
        match self {
            Self::Exists(name)
            | Self::Equals(name, _)
            | Self::Prefix(name, _)
            | Self::Suffix(name, _)
            | Self::Substring(name, _)
            | Self::Word(name, _)
            | Self::Dash(name, _) => name,
        }
    }
}

fn matches_attr(actual: Option<&str>, cond: &AttrCondition) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    match cond {
        AttrCondition::Exists(_) => true,
        AttrCondition::Equals(_, v) => actual == v,
        AttrCondition::Prefix(_, v) => !v.is_empty() && actual.starts_with(v.as_str()),
        AttrCondition::Suffix(_, v) => !v.is_empty() && actual.ends_with(v.as_str()),
        AttrCondition::Substring(_, v) => !v.is_empty() && actual.contains(v.as_str()),
        AttrCondition::Word(_, v) => actual.split_ascii_whitespace().any(|w| w == v),
        AttrCondition::Dash(_, v) => {
            actual == v || actual.strip_prefix(v.as_str()).is_some_and(|r| r.starts_with('-'))
        }
    }
}

fn is_form_control(tag: &str) -> bool {
    matches!(tag, "button" | "input" | "select" | "textarea" | "option" | "fieldset")
}

fn matches_pseudo(doc: &Document, id: NodeId, pseudo: &Pseudo) -> bool {
    let tag = doc.tag(id).unwrap_or_default();
    let kind = doc.attr(id, "type").map(str::to_ascii_lowercase);

    match pseudo {
        Pseudo::Not(groups) => !matches_any(doc, id, groups),
        Pseudo::Submit => match tag {
            "input" => kind.as_deref() == Some("submit"),
            "button" => matches!(kind.as_deref(), None | Some("submit")),
            _ => false,
        },
        Pseudo::Reset => matches!(tag, "input" | "button") && kind.as_deref() == Some("reset"),
        Pseudo::Disabled => is_form_control(tag) && doc.is_disabled(id),
        Pseudo::Enabled => is_form_control(tag) && !doc.is_disabled(id),
        Pseudo::FirstChild => doc.parent(id).is_some() && doc.previous_element_sibling(id).is_none(),
        Pseudo::LastChild => doc.parent(id).is_some() && doc.next_element_sibling(id).is_none(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const DISABLE_SUBMIT: &str =
        r#".button, :submit, :reset, [data-disable-submit], a[data-xf-click="ajax-click"]"#;

    fn doc() -> Document {
        Document::parse(
            r#"<div class="pageNavWrapper">
                <ul class="pageNav-main">
                    <li class="pageNav-page"><a href="/p/1">1</a></li>
                    <li class="pageNav-page pageNav-page--skip"><a href="/p/3">...</a></li>
                    <li class="pageNav-page"><a href="/p/9" data-page="9">9</a></li>
                </ul>
                <a class="pageNav-jump pageNav-jump--next" href="/p/2">Next</a>
                <form><input type="submit" value="Go"/><button>Plain</button><button type="button">No</button><input type="reset"/></form>
                <a data-xf-click="ajax-click" href="/x">x</a>
                <span lang="en-US" title="one two">t</span>
            </div>"#,
        )
        .unwrap()
    }

    fn count(doc: &Document, s: &str) -> usize {
        doc.query_selector_all(&Selector::parse(s).unwrap()).len()
    }

    #[test]
    fn test_simple_compounds() {
        let doc = doc();
        assert_eq!(count(&doc, "a"), 5);
        assert_eq!(count(&doc, ".pageNav-page"), 3);
        assert_eq!(count(&doc, "li.pageNav-page--skip"), 1);
        assert_eq!(count(&doc, "*"), 16);
    }

    #[test]
    fn test_combinators() {
        let doc = doc();
        assert_eq!(count(&doc, ".pageNavWrapper a"), 5);
        assert_eq!(count(&doc, ".pageNavWrapper > a"), 2);
        assert_eq!(count(&doc, ".pageNav-page--skip a"), 1);
        assert_eq!(count(&doc, "li + li"), 2);
        assert_eq!(count(&doc, "ul ~ a"), 2);
        assert_eq!(count(&doc, "li:first-child > a"), 1);
        assert_eq!(count(&doc, "li:last-child a[data-page]"), 1);
    }

    #[test]
    fn test_descendant_backtracks() {
        let doc = Document::parse(r#"<div class="x"><div><div><b>t</b></div></div></div>"#).unwrap();
        // the nearest `div` above `b` is not a child of `.x`; the next one is
        assert_eq!(count(&doc, ".x > div b"), 1);
    }

    #[test]
    fn test_attribute_operators() {
        let doc = doc();
        assert_eq!(count(&doc, r#"a[href^="/p/"]"#), 4);
        assert_eq!(count(&doc, "a[href$='9']"), 1);
        assert_eq!(count(&doc, "a[href*=p]"), 4);
        assert_eq!(count(&doc, "span[title~=two]"), 1);
        assert_eq!(count(&doc, "span[lang|=en]"), 1);
        assert_eq!(count(&doc, r#"a[data-xf-click="ajax-click"]"#), 1);
    }

    #[test]
    fn test_form_pseudos() {
        let doc = doc();
        assert_eq!(count(&doc, ":submit"), 2);
        assert_eq!(count(&doc, ":reset"), 1);
        assert_eq!(count(&doc, DISABLE_SUBMIT), 4);
        assert_eq!(count(&doc, "a:not(.pageNav-jump)"), 4);
    }

    #[test]
    fn test_invalid_selectors() {
        for bad in ["", "a,", "[href", "a >", ":hover", "a)", "> a", "div:not(a"] {
            assert!(Selector::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_display_keeps_source() {
        let sel: Selector = " .block-outer ".parse().unwrap();
        assert_eq!(sel.to_string(), ".block-outer");
        assert_eq!(sel.as_str(), ".block-outer");
    }
}
