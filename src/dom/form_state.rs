use super::*;

impl Dom {
    pub fn checked(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some_and(|e| e.checked)
    }

    /// Sets checkedness and marks it dirty. Checking a radio unchecks the rest
    /// of its group.
    pub fn set_checked(&mut self, node_id: NodeId, checked: bool) -> Result<()> {
        let is_radio = {
            let element = self.require_element_mut(node_id, "checked")?;
            element.checked = checked;
            element.checked_dirty = true;
            element.kind == ElementKind::Input(InputType::Radio)
        };
        if is_radio && checked {
            self.uncheck_other_radios_in_group(node_id);
        }
        Ok(())
    }

    /// Other radios sharing the name and form owner within the same tree.
    pub(crate) fn radio_group(&self, node_id: NodeId) -> Vec<NodeId> {
        let name = self.attr(node_id, "name").unwrap_or_default();
        if name.is_empty() {
            return Vec::new();
        }
        let owner = self.form_owner(node_id);
        self.elements_in_same_tree(node_id)
            .into_iter()
            .filter(|node| *node != node_id)
            .filter(|node| self.element_kind(*node) == Some(ElementKind::Input(InputType::Radio)))
            .filter(|node| self.attr(*node, "name") == Some(name))
            .filter(|node| self.form_owner(*node) == owner)
            .collect()
    }

    pub(crate) fn checked_radio_in_group(&self, node_id: NodeId) -> Option<NodeId> {
        self.radio_group(node_id)
            .into_iter()
            .find(|node| self.checked(*node))
    }

    pub(crate) fn uncheck_other_radios_in_group(&mut self, node_id: NodeId) {
        for node in self.radio_group(node_id) {
            if let Some(element) = self.element_mut(node) {
                element.checked = false;
            }
        }
    }

    /// Current value of an input, textarea, select, option or button.
    pub fn value(&self, node_id: NodeId) -> String {
        let Some(element) = self.element(node_id) else {
            return String::new();
        };
        match element.kind {
            ElementKind::Input(input_type) => {
                if element.value_dirty {
                    element.value.clone()
                } else {
                    match element.attrs.get("value") {
                        Some(value) => value.to_string(),
                        None if input_type.is_checkable() => "on".to_string(),
                        None => String::new(),
                    }
                }
            }
            ElementKind::TextArea => {
                if element.value_dirty {
                    element.value.clone()
                } else {
                    self.text_content(node_id)
                }
            }
            ElementKind::Select => self
                .options(node_id)
                .into_iter()
                .find(|option| self.selected(*option))
                .map(|option| self.value(option))
                .unwrap_or_default(),
            ElementKind::OptionElement => match element.attrs.get("value") {
                Some(value) => value.to_string(),
                None => self
                    .text_content(node_id)
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" "),
            },
            _ => element.attrs.get("value").unwrap_or_default().to_string(),
        }
    }

    pub fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        let kind = self.require_element(node_id, "value")?.kind;
        match kind {
            ElementKind::Input(_) | ElementKind::TextArea => {
                if let Some(element) = self.element_mut(node_id) {
                    element.value = value.to_string();
                    element.value_dirty = true;
                }
                Ok(())
            }
            ElementKind::Select => {
                let options = self.options(node_id);
                let chosen = options.iter().copied().find(|o| self.value(*o) == value);
                for option in options {
                    if let Some(element) = self.element_mut(option) {
                        element.selected = Some(option) == chosen;
                        element.selected_dirty = true;
                    }
                }
                self.normalize_single_select(node_id);
                Ok(())
            }
            _ => self.set_attr(node_id, "value", value),
        }
    }

    /// Disabled attribute on the control itself, on an ancestor `<fieldset>`
    /// or, for options, on an enclosing `<optgroup>`/`<select>`.
    pub fn is_disabled(&self, node_id: NodeId) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };
        let eligible = element.kind.is_form_control()
            || matches!(
                element.kind,
                ElementKind::Fieldset | ElementKind::OptionElement
            )
            || element.tag_name == "optgroup";
        if !eligible {
            return false;
        }
        if element.attrs.contains("disabled") {
            return true;
        }
        let mut cursor = self.parent(node_id);
        while let Some(ancestor) = cursor {
            let Some(parent) = self.element(ancestor) else {
                break;
            };
            let inherits = match parent.kind {
                ElementKind::Fieldset => true,
                ElementKind::Select => element.kind == ElementKind::OptionElement,
                _ => parent.tag_name == "optgroup" && element.kind == ElementKind::OptionElement,
            };
            if inherits && parent.attrs.contains("disabled") {
                return true;
            }
            cursor = self.parent(ancestor);
        }
        false
    }

    /// `<option>` descendants of a select, in tree order.
    pub fn options(&self, select: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for child in self.children(select) {
            self.collect_elements_dfs(*child, &mut out);
        }
        out.retain(|node| self.element_kind(*node) == Some(ElementKind::OptionElement));
        out
    }

    pub(crate) fn owning_select(&self, option: NodeId) -> Option<NodeId> {
        let parent = self.parent(option)?;
        if self.element_kind(parent) == Some(ElementKind::Select) {
            return Some(parent);
        }
        if self.tag_name(parent) == Some("optgroup") {
            let grand = self.parent(parent)?;
            if self.element_kind(grand) == Some(ElementKind::Select) {
                return Some(grand);
            }
        }
        None
    }

    pub fn is_multiple_select(&self, select: NodeId) -> bool {
        self.element_kind(select) == Some(ElementKind::Select) && self.has_attr(select, "multiple")
    }

    pub fn selected(&self, option: NodeId) -> bool {
        self.element(option).is_some_and(|e| e.selected)
    }

    /// Sets one option's selectedness; in a single select this deselects the rest.
    pub fn set_selected(&mut self, option: NodeId, selected: bool) -> Result<()> {
        {
            let element = self.require_element_mut(option, "selected")?;
            element.selected = selected;
            element.selected_dirty = true;
        }
        if let Some(select) = self.owning_select(option) {
            if selected && !self.is_multiple_select(select) {
                for other in self.options(select) {
                    if other != option {
                        if let Some(element) = self.element_mut(other) {
                            element.selected = false;
                        }
                    }
                }
            }
            self.normalize_single_select(select);
        }
        Ok(())
    }

    pub fn selected_index(&self, select: NodeId) -> Option<usize> {
        self.options(select)
            .into_iter()
            .position(|option| self.selected(option))
    }

    /// `None` clears the selection (a single select then falls back to its
    /// first enabled option).
    pub fn set_selected_index(&mut self, select: NodeId, index: Option<usize>) -> Result<()> {
        if self.require_element(select, "selectedIndex")?.kind != ElementKind::Select {
            return Err(Error::TypeMismatch {
                target: format!("selectedIndex on {select}"),
                expected: "select".into(),
                actual: self.tag_name(select).unwrap_or_default().to_string(),
            });
        }
        let options = self.options(select);
        for (position, option) in options.iter().enumerate() {
            if let Some(element) = self.element_mut(*option) {
                element.selected = Some(position) == index;
                element.selected_dirty = true;
            }
        }
        self.normalize_single_select(select);
        Ok(())
    }

    /// A single select keeps exactly one selected option: the last selected
    /// one wins, and with none selected the first enabled option is picked.
    pub(crate) fn normalize_single_select(&mut self, select: NodeId) {
        if self.is_multiple_select(select) {
            return;
        }
        let options = self.options(select);
        let selected: Vec<NodeId> = options
            .iter()
            .copied()
            .filter(|option| self.selected(*option))
            .collect();
        if let Some((_, rest)) = selected.split_last() {
            for option in rest {
                if let Some(element) = self.element_mut(*option) {
                    element.selected = false;
                }
            }
            return;
        }
        if let Some(first) = options.iter().copied().find(|o| !self.is_disabled(*o)) {
            if let Some(element) = self.element_mut(first) {
                element.selected = true;
            }
        }
    }

    pub(crate) fn sync_select_for_option(&mut self, option: NodeId, selected: bool) {
        let Some(select) = self.owning_select(option) else {
            return;
        };
        if selected && !self.is_multiple_select(select) && self.selected(option) {
            for other in self.options(select) {
                if other != option {
                    if let Some(element) = self.element_mut(other) {
                        element.selected = false;
                    }
                }
            }
        }
        self.normalize_single_select(select);
    }

    /// Radio and select invariants for a freshly parsed tree. Walks backwards
    /// so the last checked radio of a group is the one that stays checked.
    pub(crate) fn normalize_form_state(&mut self) {
        for node in self.all_element_nodes().into_iter().rev() {
            match self.element_kind(node) {
                Some(ElementKind::Input(InputType::Radio)) if self.checked(node) => {
                    self.uncheck_other_radios_in_group(node);
                }
                Some(ElementKind::Select) => self.normalize_single_select(node),
                _ => {}
            }
        }
    }

    /// `form="id"` when it names a connected form, else the nearest ancestor form.
    pub fn form_owner(&self, node_id: NodeId) -> Option<NodeId> {
        if self.element_kind(node_id) == Some(ElementKind::Form) {
            return None;
        }
        if let Some(form_id) = self.attr(node_id, "form") {
            if self.is_connected(node_id) {
                return self
                    .by_id(form_id)
                    .filter(|form| self.element_kind(*form) == Some(ElementKind::Form));
            }
            return None;
        }
        self.find_ancestor_by_tag(node_id, "form")
    }

    /// Restores default value, checkedness and selectedness.
    pub(crate) fn reset_control(&mut self, node_id: NodeId) {
        let Some(kind) = self.element_kind(node_id) else {
            return;
        };
        match kind {
            ElementKind::Input(_) | ElementKind::TextArea => {
                let Some(element) = self.element_mut(node_id) else {
                    return;
                };
                element.value.clear();
                element.value_dirty = false;
                element.checked = element.attrs.contains("checked");
                element.checked_dirty = false;
            }
            ElementKind::Select => {
                for option in self.options(node_id) {
                    if let Some(option) = self.element_mut(option) {
                        option.selected = option.attrs.contains("selected");
                        option.selected_dirty = false;
                    }
                }
                self.normalize_single_select(node_id);
            }
            _ => {}
        }
    }
}
