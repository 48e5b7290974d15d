//! Owned HTML node tree: arena storage with index links, a lenient
//! parser and a serializer.

pub mod myfrom;
pub mod meta;
pub mod arena;
pub mod parse;

use std::io::Write;

pub use arena::{Tree, NodeId, NodeMap, Node, Element, Descendants};
pub use parse::parse_html;
use anyhow::Result;
use kstring::KString;

use crate::{meta::is_void_element, myfrom::MyFrom};

pub fn att<T, U>(key: T, val: U) -> (KString, KString)
    where KString: MyFrom<T> + MyFrom<U>
{
    (KString::myfrom(key), KString::myfrom(val))
}

/// Write `s` to `out` with the HTML special characters escaped. The
/// same escaping is used for text and attribute values.
pub fn html_escape(s: &str, out: &mut impl Write) -> std::io::Result<()> {
    let bytes = s.as_bytes();
    let mut done = 0;
    for (i, b) in bytes.iter().enumerate() {
        let rep: &[u8] = match b {
            b'&' => b"&amp;",
            b'<' => b"&lt;",
            b'>' => b"&gt;",
            b'"' => b"&quot;",
            b'\'' => b"&#39;",
            _ => continue
        };
        out.write_all(&bytes[done..i])?;
        out.write_all(rep)?;
        done = i + 1;
    }
    out.write_all(&bytes[done..])
}

pub trait Print {
    /// Print serialized HTML.
    fn print_html_fragment(&self, out: &mut impl Write, tree: &Tree) -> Result<()>;

    fn to_html_fragment_string(&self, tree: &Tree) -> Result<String> {
        let mut s = Vec::new();
        self.print_html_fragment(&mut s, tree)?;
        // All bytes come from str values and ASCII literals.
        Ok(String::from_utf8(s)?)
    }
}

impl Print for NodeId {
    fn print_html_fragment(&self, out: &mut impl Write, tree: &Tree) -> Result<()> {
        match tree.node(*self) {
            Node::Fragment => {
                for child in tree.children(*self) {
                    child.print_html_fragment(out, tree)?;
                }
            }
            Node::Element(e) => {
                out.write_all(b"<")?;
                out.write_all(e.tag.as_bytes())?;
                for (k, v) in &e.attr {
                    out.write_all(b" ")?;
                    out.write_all(k.as_bytes())?;
                    out.write_all(b"=\"")?;
                    html_escape(v, out)?;
                    out.write_all(b"\"")?;
                }
                out.write_all(b">")?;
                if !is_void_element(&e.tag) {
                    for child in tree.children(*self) {
                        child.print_html_fragment(out, tree)?;
                    }
                    out.write_all(b"</")?;
                    out.write_all(e.tag.as_bytes())?;
                    out.write_all(b">")?;
                }
            }
            Node::Text(s) => html_escape(s, out)?,
            Node::Comment(s) => {
                out.write_all(b"<!--")?;
                out.write_all(s.as_bytes())?;
                out.write_all(b"-->")?;
            }
        }
        Ok(())
    }
}

impl Tree {
    /// The whole tree serialized.
    pub fn to_html_string(&self) -> String {
        self.root().to_html_fragment_string(self)
            .expect("no I/O errors can happen writing to a Vec")
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_html_escape() {
        let mut v = Vec::new();
        html_escape("a<b> & \"c\" 'd'ä", &mut v).unwrap();
        assert_eq!(String::from_utf8(v).unwrap(),
                   "a&lt;b&gt; &amp; &quot;c&quot; &#39;d&#39;ä");
    }

    #[test]
    fn t_print() {
        let mut t = Tree::new();
        let root = t.root();
        let p = t.new_element("p", vec![att("title", "x<y")]);
        let txt = t.new_text("1 < 2");
        let br = t.new_element("br", vec![]);
        t.append_child(root, p);
        t.append_child(p, txt);
        t.append_child(p, br);
        assert_eq!(t.to_html_string(), "<p title=\"x&lt;y\">1 &lt; 2<br></p>");
        assert_eq!(t.text_content(root), "1 < 2");
    }
}
