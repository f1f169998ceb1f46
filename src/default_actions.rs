use super::*;

/// Element variants that own a default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActionKey {
    Checkbox,
    Radio,
    SubmitControl,
    ResetControl,
    ButtonLike,
    Hyperlink,
    Label,
    OptionElement,
    TextLikeInput,
    Form,
}

impl ActionKey {
    pub(crate) fn of(dom: &Dom, node_id: NodeId) -> Option<Self> {
        let key = match dom.element_kind(node_id)? {
            ElementKind::Input(InputType::Checkbox) => Self::Checkbox,
            ElementKind::Input(InputType::Radio) => Self::Radio,
            ElementKind::Input(InputType::Submit | InputType::Image)
            | ElementKind::Button(ButtonType::Submit) => Self::SubmitControl,
            ElementKind::Input(InputType::Reset) | ElementKind::Button(ButtonType::Reset) => {
                Self::ResetControl
            }
            ElementKind::Input(InputType::Button) | ElementKind::Button(ButtonType::Button) => {
                Self::ButtonLike
            }
            ElementKind::Input(input_type) if input_type.is_text_like() => Self::TextLikeInput,
            ElementKind::Anchor if form_controls::is_hyperlink(dom, node_id) => Self::Hyperlink,
            ElementKind::Label => Self::Label,
            ElementKind::OptionElement => Self::OptionElement,
            ElementKind::Form => Self::Form,
            _ => return None,
        };
        Some(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DefaultAction {
    ToggleCheckbox,
    CheckRadio,
    RequestSubmit,
    RequestReset,
    FollowHyperlink,
    ActivateLabel,
    SelectOption,
    /// Enter in a single-line field.
    ImplicitSubmit,
    /// Enter on a link or button behaves as a click.
    KeyboardClick,
    SubmitForm,
    ResetFormControls,
}

const DEFAULT_ACTIONS: &[(ActionKey, &str, DefaultAction)] = &[
    (ActionKey::Checkbox, "click", DefaultAction::ToggleCheckbox),
    (ActionKey::Radio, "click", DefaultAction::CheckRadio),
    (ActionKey::SubmitControl, "click", DefaultAction::RequestSubmit),
    (ActionKey::ResetControl, "click", DefaultAction::RequestReset),
    (ActionKey::Hyperlink, "click", DefaultAction::FollowHyperlink),
    (ActionKey::Label, "click", DefaultAction::ActivateLabel),
    (ActionKey::OptionElement, "click", DefaultAction::SelectOption),
    (ActionKey::TextLikeInput, "keypress", DefaultAction::ImplicitSubmit),
    (ActionKey::Hyperlink, "keypress", DefaultAction::KeyboardClick),
    (ActionKey::SubmitControl, "keypress", DefaultAction::KeyboardClick),
    (ActionKey::ResetControl, "keypress", DefaultAction::KeyboardClick),
    (ActionKey::ButtonLike, "keypress", DefaultAction::KeyboardClick),
    (ActionKey::Form, "submit", DefaultAction::SubmitForm),
    (ActionKey::Form, "reset", DefaultAction::ResetFormControls),
];

pub(crate) fn lookup(key: ActionKey, event_type: &str) -> Option<DefaultAction> {
    DEFAULT_ACTIONS
        .iter()
        .find(|(k, t, _)| *k == key && *t == event_type)
        .map(|(_, _, action)| *action)
}

/// State saved by the legacy pre-activation step so a cancelled click can
/// be rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PreActivation {
    None,
    Checkbox { was_checked: bool },
    Radio {
        was_checked: bool,
        previous: Option<NodeId>,
    },
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Activation {
    node: NodeId,
    action: DefaultAction,
    saved: PreActivation,
}

impl Harness {
    /// The target itself, or for a bubbling click the nearest ancestor with
    /// click activation behavior. Disabled controls have none.
    pub(crate) fn activation_target(
        &self,
        target: NodeId,
        event: &Event,
    ) -> Option<(NodeId, DefaultAction)> {
        let candidates = if event.bubbles() {
            self.dom.ancestors_inclusive(target)
        } else {
            vec![target]
        };
        for node in candidates {
            let Some(action) = ActionKey::of(&self.dom, node).and_then(|key| lookup(key, "click"))
            else {
                continue;
            };
            if self.dom.is_disabled(node) {
                return None;
            }
            return Some((node, action));
        }
        None
    }

    /// Runs before the click walk: checkboxes flip and radios check first so
    /// listeners observe the new state.
    pub(crate) fn begin_activation(&mut self, target: NodeId, event: &Event) -> Option<Activation> {
        let (node, action) = self.activation_target(target, event)?;
        let saved = match action {
            DefaultAction::ToggleCheckbox => {
                let was_checked = self.dom.checked(node);
                self.dom.set_checked(node, !was_checked).ok()?;
                PreActivation::Checkbox { was_checked }
            }
            DefaultAction::CheckRadio => {
                let was_checked = self.dom.checked(node);
                let previous = self.dom.checked_radio_in_group(node);
                self.dom.set_checked(node, true).ok()?;
                PreActivation::Radio {
                    was_checked,
                    previous,
                }
            }
            _ => PreActivation::None,
        };
        Some(Activation {
            node,
            action,
            saved,
        })
    }

    pub(crate) fn finish_activation(&mut self, activation: Activation, event: &Event) -> Result<()> {
        let Activation {
            node,
            action,
            saved,
        } = activation;

        if event.default_prevented() {
            match saved {
                PreActivation::Checkbox { was_checked } => self.dom.set_checked(node, was_checked)?,
                PreActivation::Radio {
                    was_checked,
                    previous,
                } => {
                    if !was_checked {
                        match previous {
                            Some(previous) if self.dom.contains(previous) => {
                                self.dom.set_checked(previous, true)?
                            }
                            _ => self.dom.set_checked(node, false)?,
                        }
                    }
                }
                PreActivation::None => {}
            }
            self.trace_line(format!(
                "[default] {} on {} cancelled",
                event.event_type(),
                self.trace_node_label(node)
            ));
            return Ok(());
        }

        match (action, saved) {
            (DefaultAction::ToggleCheckbox, PreActivation::Checkbox { was_checked })
            | (DefaultAction::CheckRadio, PreActivation::Radio { was_checked, .. }) => {
                if self.dom.checked(node) != was_checked && self.dom.is_connected(node) {
                    let generation = self.generation;
                    self.fire(node, "input")?;
                    if self.generation == generation {
                        self.fire(node, "change")?;
                    }
                }
                Ok(())
            }
            _ => self.run_action(node, action, event),
        }
    }

    /// Default action for a finished trusted non-click walk.
    pub(crate) fn run_default_action(&mut self, target: NodeId, event: &Event) -> Result<()> {
        let Some(action) =
            ActionKey::of(&self.dom, target).and_then(|key| lookup(key, event.event_type()))
        else {
            return Ok(());
        };
        self.run_action(target, action, event)
    }

    fn run_action(&mut self, node: NodeId, action: DefaultAction, event: &Event) -> Result<()> {
        let is_enter = event.detail().key.as_deref() == Some("Enter");
        self.trace_line(format!(
            "[default] {:?} on {}",
            action,
            self.trace_node_label(node)
        ));
        match action {
            DefaultAction::RequestSubmit => match self.dom.form_owner(node) {
                Some(form) => self.request_submit(form, Some(node)),
                None => Ok(()),
            },
            DefaultAction::RequestReset => match self.dom.form_owner(node) {
                Some(form) => self.request_reset(form),
                None => Ok(()),
            },
            DefaultAction::FollowHyperlink => self.follow_hyperlink(node),
            DefaultAction::ActivateLabel => {
                let Some(control) = form_controls::labeled_control(&self.dom, node) else {
                    return Ok(());
                };
                let from_inside = event
                    .target()
                    .is_some_and(|target| target == control || self.dom.is_descendant_of(target, control));
                if from_inside {
                    return Ok(());
                }
                self.click_node(control)
            }
            DefaultAction::SelectOption => self.select_option_node(node),
            DefaultAction::ImplicitSubmit if is_enter => self.implicit_submit(node),
            DefaultAction::KeyboardClick if is_enter => self.click_node(node),
            DefaultAction::ImplicitSubmit | DefaultAction::KeyboardClick => Ok(()),
            DefaultAction::SubmitForm => self.submit_form_navigation(node, event.detail().submitter),
            DefaultAction::ResetFormControls => {
                self.reset_form_controls(node);
                Ok(())
            }
            // handled by finish_activation
            DefaultAction::ToggleCheckbox | DefaultAction::CheckRadio => Ok(()),
        }
    }
}
