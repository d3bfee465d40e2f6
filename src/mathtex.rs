//! A small TeX-math subset for scene labels.
//!
//! Sources are split into colored parts, the way a label is authored as a
//! list of fragments. Parsing produces a [`MathNode`] tree whose leaves
//! remember the part they came from; [`layout_math`] positions the leaves in
//! em units given a text measuring function.

use crate::foundation::error::{LarmorError, LarmorResult};

/// Size factor applied to sub- and superscripts.
pub const SCRIPT_SCALE: f64 = 0.7;
const SUB_SHIFT: f64 = 0.25;
const SUP_SHIFT: f64 = 0.45;
const ASCENT: f64 = 0.75;
const DESCENT: f64 = 0.25;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Parsed math expression.
pub enum MathNode {
    /// A run of characters from one part.
    Text {
        /// Unicode text.
        text: String,
        /// Index of the source part.
        part: usize,
    },
    /// Horizontal sequence.
    Row(Vec<MathNode>),
    /// Base with optional sub- and superscript.
    Scripts {
        /// Scripted expression.
        base: Box<MathNode>,
        /// Subscript.
        sub: Option<Box<MathNode>>,
        /// Superscript.
        sup: Option<Box<MathNode>>,
    },
    /// Horizontal space in em.
    Space(f64),
}

impl MathNode {
    /// Unparsed text, laid out as a single run of part 0.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            part: 0,
        }
    }

    /// Concatenated text of every leaf, ignoring layout.
    pub fn flat_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text { text, .. } => out.push_str(text),
            Self::Row(children) => children.iter().for_each(|c| c.collect_text(out)),
            Self::Scripts { base, sub, sup } => {
                base.collect_text(out);
                if let Some(sub) = sub {
                    sub.collect_text(out);
                }
                if let Some(sup) = sup {
                    sup.collect_text(out);
                }
            }
            Self::Space(_) => {}
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Tok {
    Char(char),
    Command(String),
    Literal(String),
    Open,
    Close,
    Sub,
    Sup,
}

fn tokenize(src: &str, part: usize, out: &mut Vec<(Tok, usize)>) -> LarmorResult<()> {
    let mut chars = src.chars().peekable();
    while let Some(c) = chars.next() {
        let tok = match c {
            '{' => Tok::Open,
            '}' => Tok::Close,
            '_' => Tok::Sub,
            '^' => Tok::Sup,
            c if c.is_whitespace() => continue,
            '\\' => {
                let mut name = String::new();
                while let Some(&n) = chars.peek() {
                    if !n.is_ascii_alphabetic() {
                        break;
                    }
                    name.push(n);
                    chars.next();
                }
                if name.is_empty() {
                    match chars.next() {
                        Some(sym) => name.push(sym),
                        None => {
                            return Err(LarmorError::validation(format!(
                                "dangling backslash in '{src}'"
                            )));
                        }
                    }
                }
                if name == "text" {
                    while chars.peek().is_some_and(|c| c.is_whitespace()) {
                        chars.next();
                    }
                    if chars.next() != Some('{') {
                        return Err(LarmorError::validation(format!(
                            "\\text needs a braced argument in '{src}'"
                        )));
                    }
                    let mut depth = 1usize;
                    let mut lit = String::new();
                    for c in chars.by_ref() {
                        match c {
                            '{' => depth += 1,
                            '}' => {
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                            }
                            _ => {}
                        }
                        lit.push(c);
                    }
                    if depth != 0 {
                        return Err(LarmorError::validation(format!(
                            "unterminated \\text in '{src}'"
                        )));
                    }
                    Tok::Literal(lit)
                } else {
                    Tok::Command(name)
                }
            }
            c => Tok::Char(c),
        };
        out.push((tok, part));
    }
    Ok(())
}

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" => "ε",
        "theta" => "θ",
        "lambda" => "λ",
        "mu" => "μ",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "phi" => "φ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Phi" => "Φ",
        "Omega" => "Ω",
        "int" => "∫",
        "sum" => "∑",
        "partial" => "∂",
        "infty" => "∞",
        "cdot" => "·",
        "times" => "×",
        "pm" => "±",
        "approx" => "≈",
        "propto" => "∝",
        "uparrow" => "↑",
        "downarrow" => "↓",
        "rightarrow" | "to" => "→",
        "leftarrow" => "←",
        "{" => "{",
        "}" => "}",
        "%" => "%",
        _ => return None,
    })
}

fn spacing(name: &str) -> Option<f64> {
    Some(match name {
        "," => 0.17,
        ":" | ">" => 0.22,
        ";" => 0.28,
        " " => 0.33,
        "quad" => 1.0,
        "qquad" => 2.0,
        "!" => -0.17,
        _ => return None,
    })
}

struct Parser {
    toks: Vec<(Tok, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<(Tok, usize)> {
        let t = self.toks.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn row(&mut self, in_group: bool) -> LarmorResult<MathNode> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None if in_group => return Err(LarmorError::validation("unbalanced '{'")),
                None => break,
                Some(Tok::Close) if in_group => {
                    self.pos += 1;
                    break;
                }
                Some(Tok::Close) => return Err(LarmorError::validation("unbalanced '}'")),
                Some(Tok::Char('-' | '+')) if items.is_empty() => {
                    if let Some((Tok::Char(c), part)) = self.next() {
                        let text = if c == '-' { "−".to_owned() } else { c.to_string() };
                        items.push(MathNode::Text { text, part });
                    }
                }
                Some(_) => {
                    let atom = self.scripted()?;
                    items.push(atom);
                }
            }
        }
        let mut items = merge_runs(items);
        if in_group && items.len() == 1 {
            return Ok(items.remove(0));
        }
        Ok(MathNode::Row(items))
    }

    fn scripted(&mut self) -> LarmorResult<MathNode> {
        let base = match self.peek() {
            Some(Tok::Sub | Tok::Sup) => MathNode::Row(Vec::new()),
            _ => self.atom()?,
        };
        let mut sub = None;
        let mut sup = None;
        loop {
            match self.peek() {
                Some(Tok::Sub) => {
                    self.pos += 1;
                    if sub.is_some() {
                        return Err(LarmorError::validation("double subscript"));
                    }
                    sub = Some(Box::new(self.argument()?));
                }
                Some(Tok::Sup) => {
                    self.pos += 1;
                    if sup.is_some() {
                        return Err(LarmorError::validation("double superscript"));
                    }
                    sup = Some(Box::new(self.argument()?));
                }
                _ => break,
            }
        }
        if sub.is_none() && sup.is_none() {
            return Ok(base);
        }
        Ok(MathNode::Scripts {
            base: Box::new(base),
            sub,
            sup,
        })
    }

    fn argument(&mut self) -> LarmorResult<MathNode> {
        match self.peek() {
            None => Err(LarmorError::validation("missing argument")),
            Some(Tok::Sub | Tok::Sup) => Err(LarmorError::validation("script without argument")),
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> LarmorResult<MathNode> {
        let Some((tok, part)) = self.next() else {
            return Err(LarmorError::validation("unexpected end of input"));
        };
        let text = |s: &str| MathNode::Text {
            text: s.to_owned(),
            part,
        };
        Ok(match tok {
            Tok::Open => self.row(true)?,
            Tok::Close => return Err(LarmorError::validation("unbalanced '}'")),
            Tok::Sub | Tok::Sup => return Err(LarmorError::validation("unexpected script")),
            Tok::Literal(s) => text(&s),
            Tok::Char('-') => spaced(text("−"), 0.22),
            Tok::Char(c @ ('+' | '=')) => {
                spaced(text(c.encode_utf8(&mut [0; 4])), if c == '=' { 0.28 } else { 0.22 })
            }
            Tok::Char(',') => MathNode::Row(vec![text(","), MathNode::Space(0.17)]),
            Tok::Char(c) => text(c.encode_utf8(&mut [0; 4])),
            Tok::Command(name) => {
                if let Some(s) = symbol(&name) {
                    text(s)
                } else if let Some(em) = spacing(&name) {
                    MathNode::Space(em)
                } else {
                    match name.as_str() {
                        "frac" => {
                            let num = self.argument()?;
                            let den = self.argument()?;
                            MathNode::Row(vec![num, text("/"), den])
                        }
                        "hat" => {
                            let arg = self.argument()?;
                            match arg {
                                MathNode::Text { text: t, part } => MathNode::Text {
                                    text: format!("{t}\u{0302}"),
                                    part,
                                },
                                other => MathNode::Row(vec![other, text("\u{0302}")]),
                            }
                        }
                        "left" | "right" => match self.next() {
                            Some((Tok::Char(c), p)) => MathNode::Text {
                                text: c.to_string(),
                                part: p,
                            },
                            Some((Tok::Command(n), p)) if symbol(&n).is_some() => MathNode::Text {
                                text: symbol(&n).map(str::to_owned).unwrap_or_default(),
                                part: p,
                            },
                            _ => {
                                return Err(LarmorError::validation(format!(
                                    "\\{name} needs a delimiter"
                                )));
                            }
                        },
                        _ => {
                            return Err(LarmorError::validation(format!(
                                "unsupported TeX command '\\{name}'"
                            )));
                        }
                    }
                }
            }
        })
    }
}

fn spaced(node: MathNode, em: f64) -> MathNode {
    MathNode::Row(vec![MathNode::Space(em), node, MathNode::Space(em)])
}

fn merge_runs(items: Vec<MathNode>) -> Vec<MathNode> {
    let mut out: Vec<MathNode> = Vec::with_capacity(items.len());
    for item in items {
        if let (
            Some(MathNode::Text {
                text: prev,
                part: prev_part,
            }),
            MathNode::Text { text, part },
        ) = (out.last_mut(), &item)
            && *prev_part == *part
        {
            prev.push_str(text);
            continue;
        }
        out.push(item);
    }
    out
}

/// Parse colored parts as one math expression.
///
/// Groups may span parts; every leaf records the part its first token came from.
pub fn parse_parts(parts: &[&str]) -> LarmorResult<MathNode> {
    let mut toks = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        tokenize(part, i, &mut toks)?;
    }
    Parser { toks, pos: 0 }.row(false)
}

/// Parse a single-part math expression.
pub fn parse_math(src: &str) -> LarmorResult<MathNode> {
    parse_parts(&[src])
}

#[derive(Clone, Debug, PartialEq)]
/// One positioned text run, in em units relative to the label's baseline origin.
pub struct MathRun {
    /// Unicode text.
    pub text: String,
    /// Source part.
    pub part: usize,
    /// Size relative to the label size.
    pub scale: f64,
    /// Pen x.
    pub x: f64,
    /// Baseline shift, positive up.
    pub rise: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Laid-out math expression in em units.
pub struct MathLayout {
    /// Positioned runs.
    pub runs: Vec<MathRun>,
    /// Total advance.
    pub width: f64,
    /// Extent above the baseline.
    pub ascent: f64,
    /// Extent below the baseline.
    pub descent: f64,
}

impl MathLayout {
    /// `ascent + descent`.
    pub fn height(&self) -> f64 {
        self.ascent + self.descent
    }
}

/// Position every leaf of `node`.
///
/// `measure(text, scale)` returns the advance of `text` in em at `scale`.
pub fn layout_math(node: &MathNode, measure: &mut dyn FnMut(&str, f64) -> f64) -> MathLayout {
    let mut out = MathLayout::default();
    let width = place(node, 0.0, 1.0, 0.0, measure, &mut out);
    out.width = width;
    out
}

fn place(
    node: &MathNode,
    x: f64,
    scale: f64,
    rise: f64,
    measure: &mut dyn FnMut(&str, f64) -> f64,
    out: &mut MathLayout,
) -> f64 {
    match node {
        MathNode::Text { text, part } => {
            out.ascent = out.ascent.max(rise + ASCENT * scale);
            out.descent = out.descent.max(DESCENT * scale - rise);
            out.runs.push(MathRun {
                text: text.clone(),
                part: *part,
                scale,
                x,
                rise,
            });
            measure(text, scale)
        }
        MathNode::Space(em) => em * scale,
        MathNode::Row(children) => {
            let mut advance = 0.0;
            for child in children {
                advance += place(child, x + advance, scale, rise, measure, out);
            }
            advance
        }
        MathNode::Scripts { base, sub, sup } => {
            let base_w = place(base, x, scale, rise, measure, out);
            let script = scale * SCRIPT_SCALE;
            let sub_w = sub.as_ref().map_or(0.0, |s| {
                place(s, x + base_w, script, rise - SUB_SHIFT * scale, measure, out)
            });
            let sup_w = sup.as_ref().map_or(0.0, |s| {
                place(s, x + base_w, script, rise + SUP_SHIFT * scale, measure, out)
            });
            base_w + sub_w.max(sup_w)
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/mathtex.rs"]
mod tests;
