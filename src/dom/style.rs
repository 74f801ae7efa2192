//! Inline `style` attribute access.

use super::{Document, NodeId};

fn declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            (!prop.is_empty()).then(|| (prop, value.trim().to_string()))
        })
        .collect()
}

fn serialize(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(prop, value)| format!("{prop}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

impl Document {
    pub fn style(&self, id: NodeId, prop: &str) -> Option<String> {
        let style = self.attr(id, "style")?;
        declarations(style)
            .into_iter()
            .find(|(p, _)| p == prop)
            .map(|(_, value)| value)
    }

    pub fn set_style(&mut self, id: NodeId, prop: &str, value: &str) {
        let mut decls = self.attr(id, "style").map(declarations).unwrap_or_default();
        match decls.iter_mut().find(|(p, _)| p == prop) {
            Some(slot) => slot.1 = value.to_string(),
            None => decls.push((prop.to_string(), value.to_string())),
        }
        self.set_attr(id, "style", &serialize(&decls));
    }

    pub fn remove_style(&mut self, id: NodeId, prop: &str) {
        let Some(style) = self.attr(id, "style") else {
            return;
        };
        let mut decls = declarations(style);
        decls.retain(|(p, _)| p != prop);
        if decls.is_empty() {
            self.remove_attr(id, "style");
        } else {
            self.set_attr(id, "style", &serialize(&decls));
        }
    }

    /// `display: none`
    pub fn hide(&mut self, id: NodeId) {
        self.set_style(id, "display", "none");
    }

    pub fn show(&mut self, id: NodeId) {
        self.remove_style(id, "display");
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.style(id, "display").as_deref() == Some("none")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_read() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_style(div, "transition", "none");
        doc.hide(div);
        assert_eq!(doc.attr(div, "style"), Some("transition: none; display: none;"));
        assert!(doc.is_hidden(div));

        doc.show(div);
        assert!(!doc.is_hidden(div));
        assert_eq!(doc.style(div, "transition").as_deref(), Some("none"));
    }

    #[test]
    fn test_remove_last_drops_attribute() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_style(div, "opacity", "0");
        doc.remove_style(div, "opacity");
        assert!(!doc.has_attr(div, "style"));
    }

    #[test]
    fn test_preserves_existing_declarations() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_attr(div, "style", "color:red");
        doc.set_style(div, "Opacity", "1");
        assert_eq!(doc.style(div, "color").as_deref(), Some("red"));
    }
}
