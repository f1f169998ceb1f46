use super::*;

pub(crate) fn is_form_control(dom: &Dom, node_id: NodeId) -> bool {
    dom.element_kind(node_id)
        .is_some_and(ElementKind::is_form_control)
}

pub(crate) fn is_checkbox_input(dom: &Dom, node_id: NodeId) -> bool {
    dom.element_kind(node_id) == Some(ElementKind::Input(InputType::Checkbox))
}

pub(crate) fn is_radio_input(dom: &Dom, node_id: NodeId) -> bool {
    dom.element_kind(node_id) == Some(ElementKind::Input(InputType::Radio))
}

pub(crate) fn is_submit_control(dom: &Dom, node_id: NodeId) -> bool {
    matches!(
        dom.element_kind(node_id),
        Some(ElementKind::Button(ButtonType::Submit))
            | Some(ElementKind::Input(InputType::Submit | InputType::Image))
    )
}

pub(crate) fn is_image_submit(dom: &Dom, node_id: NodeId) -> bool {
    dom.element_kind(node_id) == Some(ElementKind::Input(InputType::Image))
}

pub(crate) fn is_text_like_input(dom: &Dom, node_id: NodeId) -> bool {
    matches!(
        dom.element_kind(node_id),
        Some(ElementKind::Input(input_type)) if input_type.is_text_like()
    )
}

/// Controls whose value the user edits directly (`type_text` targets).
pub(crate) fn is_text_entry_control(dom: &Dom, node_id: NodeId) -> bool {
    is_text_like_input(dom, node_id) || dom.element_kind(node_id) == Some(ElementKind::TextArea)
}

pub(crate) fn is_hyperlink(dom: &Dom, node_id: NodeId) -> bool {
    dom.element_kind(node_id) == Some(ElementKind::Anchor) && dom.has_attr(node_id, "href")
}

pub(crate) fn is_focusable(dom: &Dom, node_id: NodeId) -> bool {
    let Some(kind) = dom.element_kind(node_id) else {
        return false;
    };
    if !dom.is_connected(node_id) {
        return false;
    }
    match kind {
        ElementKind::Input(InputType::Hidden) => false,
        ElementKind::Input(_) | ElementKind::Button(_) | ElementKind::Select | ElementKind::TextArea => {
            !dom.is_disabled(node_id)
        }
        ElementKind::Anchor => dom.has_attr(node_id, "href") || dom.has_attr(node_id, "tabindex"),
        _ => dom.has_attr(node_id, "tabindex"),
    }
}

/// The control a `<label>` activates: `for="id"`, else its first labelable descendant.
pub(crate) fn labeled_control(dom: &Dom, label: NodeId) -> Option<NodeId> {
    if let Some(target_id) = dom.attr(label, "for") {
        return dom
            .by_id(target_id)
            .filter(|node| is_form_control(dom, *node));
    }
    let mut descendants = Vec::new();
    for child in dom.children(label) {
        dom.collect_elements_dfs(*child, &mut descendants);
    }
    descendants
        .into_iter()
        .find(|node| is_form_control(dom, *node))
}
