//! Finding `{{path}}` placeholders in text.
//!
//! A placeholder is `{{`, followed by one or more characters other
//! than `}`, followed by `}}`. Anything else (`{{}}`, `{{a}b}}`, a
//! lone `{{`) stays literal text. The scan is a single left to right
//! pass without backtracking.

pub const OPEN: &str = "{{";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'s> {
    Literal(&'s str),
    /// The (untrimmed) text between the braces.
    Placeholder(&'s str),
}

/// Byte positions of the next placeholder at or after `from`:
/// (start of `{{`, end of `}}`).
fn find_placeholder(s: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    let mut pos = from;
    while let Some(off) = s[pos..].find(OPEN) {
        let inner = pos + off + 2;
        let close = inner + s[inner..].find('}')?;
        if close > inner && bytes.get(close + 1) == Some(&b'}') {
            return Some((pos + off, close + 2))
        }
        // No placeholder can start before `close`: they would all
        // hit the same `}` first.
        pos = close + 1;
    }
    None
}

pub struct Pieces<'s> {
    s: &'s str,
    pos: usize,
    // a placeholder found while emitting the literal in front of it
    pending: Option<(usize, usize)>,
}

impl<'s> Iterator for Pieces<'s> {
    type Item = Piece<'s>;

    fn next(&mut self) -> Option<Piece<'s>> {
        if let Some((start, end)) = self.pending.take() {
            self.pos = end;
            return Some(Piece::Placeholder(&self.s[start + 2..end - 2]))
        }
        if self.pos >= self.s.len() {
            return None
        }
        match find_placeholder(self.s, self.pos) {
            Some((start, end)) =>
                if start > self.pos {
                    let lit = &self.s[self.pos..start];
                    self.pending = Some((start, end));
                    Some(Piece::Literal(lit))
                } else {
                    self.pos = end;
                    Some(Piece::Placeholder(&self.s[start + 2..end - 2]))
                },
            None => {
                let lit = &self.s[self.pos..];
                self.pos = self.s.len();
                Some(Piece::Literal(lit))
            }
        }
    }
}

pub fn pieces(s: &str) -> Pieces<'_> {
    Pieces { s, pos: 0, pending: None }
}

/// Cheap pre-check: could `s` contain a placeholder at all?
pub fn may_contain_placeholder(s: &str) -> bool {
    s.contains(OPEN)
}

/// Replace every placeholder in `s` with what `lookup` returns for
/// its trimmed path. Returns None if there was nothing to replace.
pub fn substitute(s: &str, mut lookup: impl FnMut(&str) -> String) -> Option<String> {
    if !may_contain_placeholder(s) {
        return None
    }
    let mut out = String::with_capacity(s.len());
    let mut replaced = false;
    for piece in pieces(s) {
        match piece {
            Piece::Literal(lit) => out.push_str(lit),
            Piece::Placeholder(path) => {
                out.push_str(&lookup(path.trim()));
                replaced = true;
            }
        }
    }
    if replaced {
        Some(out)
    } else {
        None
    }
}
