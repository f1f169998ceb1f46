use super::*;

impl Harness {
    /// Controls whose form owner is `form`, in tree order.
    pub fn form_elements(&self, form: NodeId) -> Result<Vec<NodeId>> {
        self.require_form(form, "elements")?;
        Ok(self
            .dom
            .elements_in_same_tree(form)
            .into_iter()
            .filter(|node| form_controls::is_form_control(&self.dom, *node))
            .filter(|node| self.dom.form_owner(*node) == Some(form))
            .collect())
    }

    pub(crate) fn require_form(&self, form: NodeId, operation: &str) -> Result<()> {
        self.dom.ensure_node(form)?;
        if self.dom.element_kind(form) == Some(ElementKind::Form) {
            return Ok(());
        }
        Err(Error::TypeMismatch {
            target: format!("{operation} on {}", self.trace_node_label(form)),
            expected: "form".into(),
            actual: self
                .dom
                .tag_name(form)
                .map(str::to_string)
                .unwrap_or_else(|| "non-element".into()),
        })
    }

    /// Name/value pairs a submission of `form` would send, in tree order.
    ///
    /// Only enabled, named controls count; checkboxes and radios only when
    /// checked, buttons only when they are the submitter.
    pub fn form_submission_entries(
        &self,
        form: NodeId,
        submitter: Option<NodeId>,
    ) -> Result<Vec<(String, String)>> {
        let mut out = Vec::new();
        for control in self.form_elements(form)? {
            if self.dom.is_disabled(control) {
                continue;
            }
            let name = self.dom.attr(control, "name").unwrap_or_default();
            let kind = self.dom.element_kind(control);

            if form_controls::is_image_submit(&self.dom, control) {
                if Some(control) == submitter {
                    let prefix = if name.is_empty() {
                        String::new()
                    } else {
                        format!("{name}.")
                    };
                    out.push((format!("{prefix}x"), "0".to_string()));
                    out.push((format!("{prefix}y"), "0".to_string()));
                }
                continue;
            }
            if name.is_empty() {
                continue;
            }
            let name = name.to_string();

            match kind {
                Some(ElementKind::Button(_))
                | Some(ElementKind::Input(InputType::Submit | InputType::Reset | InputType::Button)) => {
                    if Some(control) == submitter && form_controls::is_submit_control(&self.dom, control) {
                        out.push((name, self.dom.value(control)));
                    }
                }
                Some(ElementKind::Input(InputType::File)) => {}
                Some(ElementKind::Input(InputType::Checkbox | InputType::Radio)) => {
                    if self.dom.checked(control) {
                        out.push((name, self.dom.value(control)));
                    }
                }
                Some(ElementKind::Input(InputType::Hidden)) if name == "_charset_" => {
                    out.push((name, "UTF-8".to_string()));
                }
                Some(ElementKind::Select) => {
                    for option in self.dom.options(control) {
                        if self.dom.selected(option) && !self.dom.is_disabled(option) {
                            out.push((name.clone(), self.dom.value(option)));
                        }
                    }
                }
                _ => out.push((name, self.dom.value(control))),
            }
        }
        Ok(out)
    }

    /// `requestSubmit`: validation, then a cancelable `submit` event whose
    /// default action navigates.
    pub(crate) fn request_submit(&mut self, form: NodeId, submitter: Option<NodeId>) -> Result<()> {
        if !self.dom.is_connected(form) {
            self.trace_line(format!(
                "[form] {} is disconnected, submit ignored",
                self.trace_node_label(form)
            ));
            return Ok(());
        }
        let skip_validation = self.dom.has_attr(form, "novalidate")
            || submitter.is_some_and(|node| self.dom.has_attr(node, "formnovalidate"));
        if self.config.validate_on_submit && !skip_validation && !self.check_validity(form)? {
            self.trace_line(format!(
                "[form] {} has invalid controls, submit blocked",
                self.trace_node_label(form)
            ));
            return Ok(());
        }
        let event = Event::synthetic("submit").with_detail(EventDetail {
            submitter,
            ..EventDetail::default()
        });
        self.fire_event(form, event)?;
        Ok(())
    }

    /// Fires `invalid` at every failing required control. Returns `true`
    /// when the form is valid.
    pub(crate) fn check_validity(&mut self, form: NodeId) -> Result<bool> {
        let invalid: Vec<NodeId> = self
            .form_elements(form)?
            .into_iter()
            .filter(|control| self.is_missing_required_value(*control))
            .collect();
        let generation = self.generation;
        for control in &invalid {
            if self.generation != generation {
                break;
            }
            self.fire(*control, "invalid")?;
        }
        Ok(invalid.is_empty())
    }

    fn is_missing_required_value(&self, control: NodeId) -> bool {
        if self.dom.is_disabled(control) || !self.dom.has_attr(control, "required") {
            return false;
        }
        match self.dom.element_kind(control) {
            Some(ElementKind::Input(InputType::Checkbox)) => !self.dom.checked(control),
            Some(ElementKind::Input(InputType::Radio)) => {
                !self.dom.checked(control) && self.dom.checked_radio_in_group(control).is_none()
            }
            Some(ElementKind::Input(
                InputType::Hidden
                | InputType::Submit
                | InputType::Image
                | InputType::Reset
                | InputType::Button
                | InputType::Range
                | InputType::Color,
            )) => false,
            Some(ElementKind::Input(_) | ElementKind::TextArea | ElementKind::Select) => {
                self.dom.value(control).is_empty()
            }
            _ => false,
        }
    }

    pub(crate) fn request_reset(&mut self, form: NodeId) -> Result<()> {
        if !self.dom.is_connected(form) {
            return Ok(());
        }
        self.fire(form, "reset")?;
        Ok(())
    }

    pub(crate) fn reset_form_controls(&mut self, form: NodeId) {
        let Ok(controls) = self.form_elements(form) else {
            return;
        };
        for control in controls {
            self.dom.reset_control(control);
        }
        if self
            .focus
            .active
            .is_some_and(|active| self.dom.form_owner(active) == Some(form))
        {
            self.focus.value_at_focus = self.focus.active.map(|active| self.dom.value(active));
        }
    }

    /// Enter in a single-line field: click the default button, or submit
    /// directly when the field is the form's only one.
    pub(crate) fn implicit_submit(&mut self, field: NodeId) -> Result<()> {
        let Some(form) = self.dom.form_owner(field) else {
            return Ok(());
        };
        let controls = self.form_elements(form)?;
        let default_button = controls
            .iter()
            .copied()
            .find(|control| form_controls::is_submit_control(&self.dom, *control));
        if let Some(button) = default_button {
            if self.dom.is_disabled(button) {
                return Ok(());
            }
            return self.click_node(button);
        }
        let text_fields = controls
            .iter()
            .filter(|control| form_controls::is_text_like_input(&self.dom, **control))
            .count();
        if text_fields == 1 {
            self.request_submit(form, None)?;
        }
        Ok(())
    }

    /// Turns the form's current state into a navigation request.
    pub(crate) fn submit_form_navigation(
        &mut self,
        form: NodeId,
        submitter: Option<NodeId>,
    ) -> Result<()> {
        if !self.dom.is_connected(form) {
            return Ok(());
        }
        let submitter = submitter.filter(|node| self.dom.contains(*node));
        let parameters = self.form_submission_entries(form, submitter)?;

        let action = submitter
            .and_then(|node| self.dom.attr(node, "formaction"))
            .or_else(|| self.dom.attr(form, "action"))
            .unwrap_or_default()
            .trim()
            .to_string();
        if is_javascript_url(&action) {
            return self.run_javascript_url(&action);
        }
        let method = submitter
            .and_then(|node| self.dom.attr(node, "formmethod"))
            .or_else(|| self.dom.attr(form, "method"))
            .map(HttpMethod::parse)
            .unwrap_or(HttpMethod::Get);

        let mut url = self.resolve_url(&action)?;
        if method == HttpMethod::Get {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(parameters.iter())
                .finish();
            url.set_query(Some(&query));
        }
        let request = NavigationRequest {
            url: url.to_string(),
            method,
            parameters,
            source: NavigationSource::FormSubmission,
        };
        self.perform_navigation(request)?;
        Ok(())
    }
}
