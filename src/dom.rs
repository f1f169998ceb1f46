use super::*;

mod attributes;
mod form_state;
mod indexes;
mod serialize;
mod tree_mutation;

pub use attributes::Attributes;

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: Attributes,
    pub(crate) kind: ElementKind,
    pub(crate) value: String,
    pub(crate) value_dirty: bool,
    pub(crate) checked: bool,
    pub(crate) checked_dirty: bool,
    pub(crate) selected: bool,
    pub(crate) selected_dirty: bool,
}

impl Element {
    pub(crate) fn new(tag_name: &str, attrs: Attributes) -> Self {
        let tag_name = tag_name.to_ascii_lowercase();
        let kind = ElementKind::derive(&tag_name, &attrs);
        let checked = attrs.contains("checked");
        let selected = attrs.contains("selected");
        Self {
            tag_name,
            attrs,
            kind,
            value: String::new(),
            value_dirty: false,
            checked,
            checked_dirty: false,
            selected,
            selected_dirty: false,
        }
    }
}

/// Public view of a node's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
}

/// Closed set of element variants the default actions care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Generic,
    Form,
    Input(InputType),
    Button(ButtonType),
    Select,
    OptionElement,
    TextArea,
    Anchor,
    Label,
    Fieldset,
}

impl ElementKind {
    pub(crate) fn derive(tag_name: &str, attrs: &Attributes) -> Self {
        match tag_name {
            "form" => Self::Form,
            "input" => Self::Input(InputType::parse(attrs.get("type"))),
            "button" => Self::Button(ButtonType::parse(attrs.get("type"))),
            "select" => Self::Select,
            "option" => Self::OptionElement,
            "textarea" => Self::TextArea,
            "a" | "area" => Self::Anchor,
            "label" => Self::Label,
            "fieldset" => Self::Fieldset,
            _ => Self::Generic,
        }
    }

    pub fn is_form_control(self) -> bool {
        matches!(
            self,
            Self::Input(_) | Self::Button(_) | Self::Select | Self::TextArea
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Text,
    Search,
    Password,
    Email,
    Url,
    Tel,
    Number,
    Date,
    Month,
    Week,
    Time,
    DateTimeLocal,
    Hidden,
    Checkbox,
    Radio,
    Submit,
    Image,
    Reset,
    Button,
    File,
    Color,
    Range,
}

impl InputType {
    pub(crate) fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Text;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "search" => Self::Search,
            "password" => Self::Password,
            "email" => Self::Email,
            "url" => Self::Url,
            "tel" => Self::Tel,
            "number" => Self::Number,
            "date" => Self::Date,
            "month" => Self::Month,
            "week" => Self::Week,
            "time" => Self::Time,
            "datetime-local" => Self::DateTimeLocal,
            "hidden" => Self::Hidden,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "submit" => Self::Submit,
            "image" => Self::Image,
            "reset" => Self::Reset,
            "button" => Self::Button,
            "file" => Self::File,
            "color" => Self::Color,
            "range" => Self::Range,
            _ => Self::Text,
        }
    }

    /// Single-line fields that block implicit submission.
    pub fn is_text_like(self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::Search
                | Self::Password
                | Self::Email
                | Self::Url
                | Self::Tel
                | Self::Number
                | Self::Date
                | Self::Month
                | Self::Week
                | Self::Time
                | Self::DateTimeLocal
        )
    }

    pub fn is_checkable(self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Search => "search",
            Self::Password => "password",
            Self::Email => "email",
            Self::Url => "url",
            Self::Tel => "tel",
            Self::Number => "number",
            Self::Date => "date",
            Self::Month => "month",
            Self::Week => "week",
            Self::Time => "time",
            Self::DateTimeLocal => "datetime-local",
            Self::Hidden => "hidden",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Submit => "submit",
            Self::Image => "image",
            Self::Reset => "reset",
            Self::Button => "button",
            Self::File => "file",
            Self::Color => "color",
            Self::Range => "range",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonType {
    Submit,
    Reset,
    Button,
}

impl ButtonType {
    pub(crate) fn parse(raw: Option<&str>) -> Self {
        match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            Some("reset") => Self::Reset,
            Some("button") => Self::Button,
            _ => Self::Submit,
        }
    }
}

/// Arena-backed document tree.
///
/// Arena slots live as long as the tree; a removed subtree stays addressable
/// through its [`NodeId`] and can be re-attached. The listeners of a detached
/// subtree are dropped with [`Harness::release_detached`], the slots when the
/// document is replaced.
#[derive(Debug, Clone)]
pub struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) id_index: HashMap<String, Vec<NodeId>>,
    pub(crate) name_index: HashMap<String, Vec<NodeId>>,
    pub(crate) clone_id_policy: CloneIdPolicy,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
            name_index: HashMap::new(),
            clone_id_policy: CloneIdPolicy::default(),
        }
    }

    /// Parses markup with the bundled fragment parser.
    pub fn parse(html: &str) -> Result<Self> {
        html::parse_html(html)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn clone_id_policy(&self) -> CloneIdPolicy {
        self.clone_id_policy
    }

    pub fn set_clone_id_policy(&mut self, policy: CloneIdPolicy) {
        self.clone_id_policy = policy;
    }

    pub(crate) fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(node_id.0)
    }

    pub(crate) fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node_id.0)
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        node_id.0 < self.nodes.len()
    }

    pub(crate) fn ensure_node(&self, node_id: NodeId) -> Result<()> {
        if self.contains(node_id) {
            Ok(())
        } else {
            Err(Error::NotFound(format!("{node_id} is not part of this document")))
        }
    }

    pub(crate) fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    /// Parser entry point: creates an element already attached under `parent`.
    /// Indexes are left to the caller's final `rebuild_indexes`.
    pub(crate) fn create_element_in(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attrs: Attributes,
    ) -> NodeId {
        self.create_node(Some(parent), NodeType::Element(Element::new(tag_name, attrs)))
    }

    pub(crate) fn create_text_in(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.create_node(
            None,
            NodeType::Element(Element::new(tag_name, Attributes::new())),
        )
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.create_node(None, NodeType::Text(text.to_string()))
    }

    pub fn node_kind(&self, node_id: NodeId) -> Option<NodeKind> {
        self.node(node_id).map(|node| match node.node_type {
            NodeType::Document => NodeKind::Document,
            NodeType::Element(_) => NodeKind::Element,
            NodeType::Text(_) => NodeKind::Text,
        })
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.node(node_id)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.node_mut(node_id)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn require_element(&self, node_id: NodeId, operation: &str) -> Result<&Element> {
        self.element(node_id).ok_or_else(|| self.not_an_element(node_id, operation))
    }

    pub(crate) fn require_element_mut(
        &mut self,
        node_id: NodeId,
        operation: &str,
    ) -> Result<&mut Element> {
        if self.element(node_id).is_none() {
            return Err(self.not_an_element(node_id, operation));
        }
        self.element_mut(node_id)
            .ok_or_else(|| Error::NotFound(format!("{node_id} is not part of this document")))
    }

    fn not_an_element(&self, node_id: NodeId, operation: &str) -> Error {
        let actual = match self.node_kind(node_id) {
            Some(NodeKind::Document) => "document",
            Some(NodeKind::Text) => "text",
            Some(NodeKind::Element) => "element",
            None => {
                return Error::NotFound(format!("{node_id} is not part of this document"));
            }
        };
        Error::TypeMismatch {
            target: format!("{operation} on {node_id}"),
            expected: "element".into(),
            actual: actual.into(),
        }
    }

    pub fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub fn element_kind(&self, node_id: NodeId) -> Option<ElementKind> {
        self.element(node_id).map(|e| e.kind)
    }

    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.node(node_id).and_then(|node| node.parent)
    }

    pub fn children(&self, node_id: NodeId) -> &[NodeId] {
        self.node(node_id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// The node followed by its ancestors, ending at the document root for a
    /// connected node or at the top of a detached subtree.
    pub fn ancestors_inclusive(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.contains(node_id).then_some(node_id);
        while let Some(node) = cursor {
            out.push(node);
            cursor = self.parent(node);
        }
        out
    }

    pub fn is_descendant_of(&self, node_id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub fn is_connected(&self, node_id: NodeId) -> bool {
        self.tree_root(node_id) == Some(self.root)
    }

    /// The document root for connected nodes; detached and cloned nodes have none.
    pub fn owner_document(&self, node_id: NodeId) -> Option<NodeId> {
        if node_id == self.root {
            return None;
        }
        self.is_connected(node_id).then_some(self.root)
    }

    pub(crate) fn tree_root(&self, node_id: NodeId) -> Option<NodeId> {
        self.ancestors_inclusive(node_id).last().copied()
    }

    pub fn find_ancestor_by_tag(&self, node_id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if self
                .tag_name(current)
                .is_some_and(|name| name.eq_ignore_ascii_case(tag))
            {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    /// Pre-order walk with an explicit stack, so tree depth never touches the
    /// call stack.
    pub(crate) fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        let mut pending = vec![node_id];
        while let Some(current) = pending.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            if matches!(node.node_type, NodeType::Element(_)) {
                out.push(current);
            }
            pending.extend(node.children.iter().rev());
        }
    }

    /// `node_id` and all of its descendants (text nodes included), pre-order.
    pub fn subtree_nodes(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending = vec![node_id];
        while let Some(current) = pending.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            out.push(current);
            pending.extend(node.children.iter().rev());
        }
        out
    }

    /// Connected elements in tree order.
    pub(crate) fn all_element_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_dfs(self.root, &mut out);
        out
    }

    /// Elements of the tree `node_id` belongs to (connected or detached), in tree order.
    pub(crate) fn elements_in_same_tree(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if let Some(root) = self.tree_root(node_id) {
            self.collect_elements_dfs(root, &mut out);
        }
        out
    }

    pub fn text_content(&self, node_id: NodeId) -> String {
        let Some(node) = self.node(node_id) else {
            return String::new();
        };
        if let NodeType::Text(text) = &node.node_type {
            return text.clone();
        }
        let mut out = String::new();
        let mut pending: Vec<NodeId> = node.children.iter().rev().copied().collect();
        while let Some(current) = pending.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            match &node.node_type {
                NodeType::Text(text) => out.push_str(text),
                NodeType::Document | NodeType::Element(_) => {
                    pending.extend(node.children.iter().rev());
                }
            }
        }
        out
    }

    pub fn set_text_content(&mut self, node_id: NodeId, text: &str) -> Result<()> {
        self.ensure_node(node_id)?;
        if let Some(NodeType::Text(current)) = self.node_mut(node_id).map(|n| &mut n.node_type) {
            *current = text.to_string();
            return Ok(());
        }
        let old_children = std::mem::take(&mut self.nodes[node_id.0].children);
        for child in old_children {
            self.nodes[child.0].parent = None;
        }
        if !text.is_empty() {
            self.create_text_in(node_id, text.to_string());
        }
        self.rebuild_indexes();
        Ok(())
    }
}
