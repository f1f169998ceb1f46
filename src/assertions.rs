use super::*;

impl Harness {
    pub fn assert_text(&self, id: &str, expected: &str) -> Result<()> {
        let target = self.by_id(id)?;
        let actual = self.dom.text_content(target);
        self.check(id, target, expected, &actual)
    }

    pub fn assert_value(&self, id: &str, expected: &str) -> Result<()> {
        let target = self.by_id(id)?;
        let actual = self.dom.value(target);
        self.check(id, target, expected, &actual)
    }

    pub fn assert_checked(&self, id: &str, expected: bool) -> Result<()> {
        let target = self.by_id(id)?;
        let actual = self.dom.checked(target);
        self.check(id, target, &expected.to_string(), &actual.to_string())
    }

    /// `None` asserts the attribute is absent.
    pub fn assert_attr(&self, id: &str, name: &str, expected: Option<&str>) -> Result<()> {
        let target = self.by_id(id)?;
        let actual = self.dom.attr(target, name);
        if actual == expected {
            return Ok(());
        }
        Err(Error::AssertionFailed {
            target: format!("#{id}[{name}]"),
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
            dom_snippet: self.dom.node_snippet(target),
        })
    }

    pub fn assert_focused(&self, id: Option<&str>) -> Result<()> {
        let expected = id.map(|id| self.by_id(id)).transpose()?;
        if self.focus.active == expected {
            return Ok(());
        }
        let label = |node: Option<NodeId>| {
            node.map_or_else(|| "nothing".to_string(), |node| self.trace_node_label(node))
        };
        Err(Error::AssertionFailed {
            target: "focus".into(),
            expected: label(expected),
            actual: label(self.focus.active),
            dom_snippet: self
                .focus
                .active
                .map(|node| self.dom.node_snippet(node))
                .unwrap_or_default(),
        })
    }

    pub fn dump_dom(&self, id: &str) -> Result<String> {
        let target = self.by_id(id)?;
        Ok(self.dom.outer_html(target))
    }

    fn check(&self, id: &str, target: NodeId, expected: &str, actual: &str) -> Result<()> {
        if expected == actual {
            return Ok(());
        }
        Err(Error::AssertionFailed {
            target: format!("#{id}"),
            expected: expected.to_string(),
            actual: actual.to_string(),
            dom_snippet: self.dom.node_snippet(target),
        })
    }
}
