use std::fmt;

/// An ordered list of CSS declarations from a `style` attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleDecls(Vec<(String, String)>);

impl StyleDecls {
    /// Parses `prop: value; prop: value`, keeping quoted `;` and `:` intact.
    pub fn parse(raw: &str) -> Self {
        let mut decls = Vec::new();
        for chunk in split_outside_quotes(raw, ';') {
            let Some((prop, value)) = chunk.split_once(':') else {
                continue;
            };
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim();
            if prop.is_empty() || value.is_empty() {
                continue;
            }
            decls.retain(|(p, _): &(String, String)| *p != prop);
            decls.push((prop, value.to_string()));
        }
        Self(decls)
    }

    pub fn get(&self, prop: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(p, _)| p == prop)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, prop: &str, value: &str) {
        match self.0.iter_mut().find(|(p, _)| p == prop) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.0.push((prop.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, prop: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|(p, _)| p != prop);
        self.0.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }
}

impl fmt::Display for StyleDecls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (prop, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{prop}: {value}")?;
        }
        Ok(())
    }
}

fn split_outside_quotes(raw: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in raw.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, c) if c == sep => {
                parts.push(&raw[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&raw[start..]);
    parts
}
