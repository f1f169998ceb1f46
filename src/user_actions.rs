use super::*;

impl Harness {
    /// User click: dispatches a trusted `click` and runs its activation
    /// behavior. Disabled controls swallow the click entirely.
    pub fn click(&mut self, node_id: NodeId) -> Result<()> {
        self.dom.require_element(node_id, "click")?;
        stacker::grow(32 * 1024 * 1024, || self.click_node(node_id))
    }

    pub(crate) fn click_node(&mut self, node_id: NodeId) -> Result<()> {
        if form_controls::is_form_control(&self.dom, node_id) && self.dom.is_disabled(node_id) {
            return Ok(());
        }
        self.fire(node_id, "click")?;
        Ok(())
    }

    /// User-initiated submission (`requestSubmit`): validation, a cancelable
    /// `submit` event, then navigation unless it was cancelled.
    pub fn submit(&mut self, form: NodeId, submitter: Option<NodeId>) -> Result<()> {
        self.require_form(form, "submit")?;
        if let Some(submitter) = submitter {
            if !form_controls::is_submit_control(&self.dom, submitter) {
                return Err(Error::TypeMismatch {
                    target: format!("submitter {}", self.trace_node_label(submitter)),
                    expected: "submit button".into(),
                    actual: self.dom.tag_name(submitter).unwrap_or_default().to_string(),
                });
            }
            if self.dom.form_owner(submitter) != Some(form) {
                return Err(Error::NotFound(format!(
                    "submitter {} does not belong to {}",
                    self.trace_node_label(submitter),
                    self.trace_node_label(form)
                )));
            }
        }
        stacker::grow(32 * 1024 * 1024, || self.request_submit(form, submitter))
    }

    /// Script-initiated `form.submit()`: `submit` listeners still run, but
    /// their cancellation does not stop the navigation.
    pub fn submit_from_script(&mut self, form: NodeId) -> Result<()> {
        self.require_form(form, "submit")?;
        stacker::grow(32 * 1024 * 1024, || {
            let generation = self.generation;
            let mut event = Event::synthetic("submit");
            event.set_untrusted();
            self.dispatch_with_default_actions(form, &mut event)?;
            if self.generation != generation {
                return Ok(());
            }
            self.submit_form_navigation(form, None)
        })
    }

    /// Fires a cancelable `reset`; controls return to their defaults unless
    /// it is cancelled.
    pub fn reset(&mut self, form: NodeId) -> Result<()> {
        self.require_form(form, "reset")?;
        stacker::grow(32 * 1024 * 1024, || self.request_reset(form))
    }

    pub fn focus(&mut self, node_id: NodeId) -> Result<()> {
        self.dom.ensure_node(node_id)?;
        stacker::grow(32 * 1024 * 1024, || self.focus_node(node_id))
    }

    pub fn blur(&mut self, node_id: NodeId) -> Result<()> {
        self.dom.ensure_node(node_id)?;
        stacker::grow(32 * 1024 * 1024, || self.blur_node(node_id))
    }

    /// Moves focus: the previous node gets `blur` and `focusout`, then the
    /// new one `focus` and `focusin`. Unfocusable nodes are ignored.
    pub(crate) fn focus_node(&mut self, node_id: NodeId) -> Result<()> {
        if !form_controls::is_focusable(&self.dom, node_id) {
            return Ok(());
        }
        let previous = self.focus.active;
        if previous == Some(node_id) {
            return Ok(());
        }
        let generation = self.generation;
        if let Some(previous) = previous {
            self.blur_node(previous)?;
            if self.generation != generation || self.focus.active.is_some() {
                // a blur handler navigated or moved focus elsewhere
                return Ok(());
            }
        }

        self.focus.active = Some(node_id);
        self.focus.value_at_focus = form_controls::is_text_entry_control(&self.dom, node_id)
            .then(|| self.dom.value(node_id));
        self.trace_line(format!("[focus] {}", self.trace_node_label(node_id)));

        let detail = EventDetail {
            related_target: previous,
            ..EventDetail::default()
        };
        self.fire_event(node_id, Event::synthetic("focus").with_detail(detail.clone()))?;
        if self.generation == generation {
            self.fire_event(node_id, Event::synthetic("focusin").with_detail(detail))?;
        }
        Ok(())
    }

    /// Blurs `node_id` if it has focus. A text control whose value changed
    /// since it was focused gets `change` first.
    pub(crate) fn blur_node(&mut self, node_id: NodeId) -> Result<()> {
        if self.focus.active != Some(node_id) {
            return Ok(());
        }
        let value_at_focus = self.focus.value_at_focus.take();
        self.focus.active = None;
        self.trace_line(format!("[blur] {}", self.trace_node_label(node_id)));

        let generation = self.generation;
        if value_at_focus.is_some_and(|value| value != self.dom.value(node_id)) {
            self.fire(node_id, "change")?;
        }
        if self.generation == generation {
            self.fire(node_id, "blur")?;
        }
        if self.generation == generation {
            self.fire(node_id, "focusout")?;
        }
        Ok(())
    }

    /// Enter key: focus, `keydown`, `keypress` (skipped when `keydown` was
    /// cancelled; its default action submits or clicks), `keyup`.
    pub fn press_enter(&mut self, node_id: NodeId) -> Result<()> {
        self.dom.require_element(node_id, "press_enter")?;
        stacker::grow(32 * 1024 * 1024, || {
            self.focus_node(node_id)?;
            let generation = self.generation;
            let detail = EventDetail {
                key: Some("Enter".to_string()),
                key_code: 13,
                ..EventDetail::default()
            };
            let keydown =
                self.fire_event(node_id, Event::synthetic("keydown").with_detail(detail.clone()))?;
            if self.generation != generation {
                return Ok(());
            }
            if !keydown.default_prevented() {
                self.fire_event(node_id, Event::synthetic("keypress").with_detail(detail.clone()))?;
                if self.generation != generation {
                    return Ok(());
                }
            }
            self.fire_event(node_id, Event::synthetic("keyup").with_detail(detail))?;
            Ok(())
        })
    }

    /// Toggles a checkbox or radio the way a user would: `input` and
    /// `change` fire only when the state changes.
    pub fn set_checked(&mut self, node_id: NodeId, checked: bool) -> Result<()> {
        if !form_controls::is_checkbox_input(&self.dom, node_id)
            && !form_controls::is_radio_input(&self.dom, node_id)
        {
            return Err(self.type_mismatch(node_id, "input[type=checkbox|radio]"));
        }
        if self.dom.is_disabled(node_id) {
            return Ok(());
        }
        stacker::grow(32 * 1024 * 1024, || {
            if self.dom.checked(node_id) == checked {
                return Ok(());
            }
            self.dom.set_checked(node_id, checked)?;
            let generation = self.generation;
            self.fire(node_id, "input")?;
            if self.generation == generation {
                self.fire(node_id, "change")?;
            }
            Ok(())
        })
    }

    /// Focuses a text control, replaces its value and fires `input`.
    /// `change` follows when the control loses focus.
    pub fn type_text(&mut self, node_id: NodeId, text: &str) -> Result<()> {
        if !form_controls::is_text_entry_control(&self.dom, node_id) {
            return Err(self.type_mismatch(node_id, "text input or textarea"));
        }
        if self.dom.is_disabled(node_id) || self.dom.has_attr(node_id, "readonly") {
            return Ok(());
        }
        stacker::grow(32 * 1024 * 1024, || {
            self.focus_node(node_id)?;
            self.dom.set_value(node_id, text)?;
            let event = Event::synthetic("input").with_detail(EventDetail {
                data: Some(text.to_string()),
                ..EventDetail::default()
            });
            self.fire_event(node_id, event)?;
            Ok(())
        })
    }

    /// Selects the first option whose value is `value`.
    pub fn select_option(&mut self, select: NodeId, value: &str) -> Result<()> {
        self.require_select(select)?;
        let option = self
            .dom
            .options(select)
            .into_iter()
            .find(|option| self.dom.value(*option) == value)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "{} has no option with value `{value}`",
                    self.trace_node_label(select)
                ))
            })?;
        if self.dom.is_disabled(select) || self.dom.is_disabled(option) {
            return Ok(());
        }
        stacker::grow(32 * 1024 * 1024, || {
            self.change_selection(select, |dom| dom.set_selected(option, true))
        })
    }

    pub fn set_selected_index(&mut self, select: NodeId, index: Option<usize>) -> Result<()> {
        self.require_select(select)?;
        if self.dom.is_disabled(select) {
            return Ok(());
        }
        stacker::grow(32 * 1024 * 1024, || {
            self.change_selection(select, |dom| dom.set_selected_index(select, index))
        })
    }

    /// Sets one option's selectedness; mostly useful for multi-selects.
    pub fn set_option_selected(&mut self, option: NodeId, selected: bool) -> Result<()> {
        let Some(select) = self.dom.owning_select(option) else {
            return Err(self.type_mismatch(option, "option inside a select"));
        };
        if self.dom.is_disabled(select) || self.dom.is_disabled(option) {
            return Ok(());
        }
        stacker::grow(32 * 1024 * 1024, || {
            self.change_selection(select, |dom| dom.set_selected(option, selected))
        })
    }

    /// Activation behavior of a clicked `<option>`.
    pub(crate) fn select_option_node(&mut self, option: NodeId) -> Result<()> {
        let Some(select) = self.dom.owning_select(option) else {
            return Ok(());
        };
        if self.dom.is_disabled(select) {
            return Ok(());
        }
        let selected = if self.dom.is_multiple_select(select) {
            !self.dom.selected(option)
        } else {
            true
        };
        self.change_selection(select, |dom| dom.set_selected(option, selected))
    }

    /// Applies `mutate`, then fires `input` and a bubbling non-cancelable
    /// `change` on the select if the selected set actually changed.
    fn change_selection(
        &mut self,
        select: NodeId,
        mutate: impl FnOnce(&mut Dom) -> Result<()>,
    ) -> Result<()> {
        let before = self.selection_snapshot(select);
        mutate(&mut self.dom)?;
        if self.selection_snapshot(select) == before {
            return Ok(());
        }
        let generation = self.generation;
        self.fire(select, "input")?;
        if self.generation == generation {
            self.fire(select, "change")?;
        }
        Ok(())
    }

    fn selection_snapshot(&self, select: NodeId) -> Vec<bool> {
        self.dom
            .options(select)
            .into_iter()
            .map(|option| self.dom.selected(option))
            .collect()
    }

    fn require_select(&self, node_id: NodeId) -> Result<()> {
        if self.dom.element_kind(node_id) == Some(ElementKind::Select) {
            return Ok(());
        }
        Err(self.type_mismatch(node_id, "select"))
    }

    fn type_mismatch(&self, node_id: NodeId, expected: &str) -> Error {
        let actual = match self.dom.element_kind(node_id) {
            Some(ElementKind::Input(input_type)) => format!("input[type={}]", input_type.as_str()),
            Some(_) => self.dom.tag_name(node_id).unwrap_or_default().to_string(),
            None => "non-element".to_string(),
        };
        Error::TypeMismatch {
            target: self.trace_node_label(node_id),
            expected: expected.to_string(),
            actual,
        }
    }
}
