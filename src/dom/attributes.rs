use super::*;

/// Ordered attribute storage. Names are stored lower-cased; insertion order
/// is kept for serialization and replacing a value keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the previous value, if any.
    pub fn insert(&mut self, name: &str, value: &str) -> Option<String> {
        let lowered = name.to_ascii_lowercase();
        if let Some((_, existing)) = self.entries.iter_mut().find(|(key, _)| *key == lowered) {
            return Some(std::mem::replace(existing, value.to_string()));
        }
        self.entries.push((lowered, value.to_string()));
        None
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self
            .entries
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (key, value) in iter {
            attrs.insert(key.as_ref(), value.as_ref());
        }
        attrs
    }
}

impl Dom {
    pub fn attr(&self, node_id: NodeId, name: &str) -> Option<&str> {
        self.element(node_id).and_then(|e| e.attrs.get(name))
    }

    pub fn has_attr(&self, node_id: NodeId, name: &str) -> bool {
        self.attr(node_id, name).is_some()
    }

    pub fn attributes(&self, node_id: NodeId) -> Option<&Attributes> {
        self.element(node_id).map(|e| &e.attrs)
    }

    pub fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let lowered = name.to_ascii_lowercase();
        let (is_option, is_radio_now_checked) = {
            let element = self.require_element_mut(node_id, "setAttribute")?;
            element.attrs.insert(&lowered, value);
            match lowered.as_str() {
                "type" => {
                    element.kind = ElementKind::derive(&element.tag_name, &element.attrs);
                }
                "checked" if !element.checked_dirty => element.checked = true,
                "selected" if !element.selected_dirty => element.selected = true,
                _ => {}
            }
            (
                element.kind == ElementKind::OptionElement,
                lowered == "checked"
                    && element.checked
                    && element.kind == ElementKind::Input(InputType::Radio),
            )
        };

        if is_radio_now_checked {
            self.uncheck_other_radios_in_group(node_id);
        }
        if is_option && lowered == "selected" {
            self.sync_select_for_option(node_id, true);
        }
        if matches!(lowered.as_str(), "id" | "name") && self.is_connected(node_id) {
            self.rebuild_indexes();
        }
        Ok(())
    }

    pub fn remove_attr(&mut self, node_id: NodeId, name: &str) -> Result<()> {
        let lowered = name.to_ascii_lowercase();
        let (removed, is_option) = {
            let element = self.require_element_mut(node_id, "removeAttribute")?;
            let removed = element.attrs.remove(&lowered).is_some();
            match lowered.as_str() {
                "type" => {
                    element.kind = ElementKind::derive(&element.tag_name, &element.attrs);
                }
                "checked" if !element.checked_dirty => element.checked = false,
                "selected" if !element.selected_dirty => element.selected = false,
                _ => {}
            }
            (removed, element.kind == ElementKind::OptionElement)
        };
        if !removed {
            return Ok(());
        }

        if is_option && lowered == "selected" {
            self.sync_select_for_option(node_id, false);
        }
        if matches!(lowered.as_str(), "id" | "name") && self.is_connected(node_id) {
            self.rebuild_indexes();
        }
        Ok(())
    }
}
