use super::*;

impl Dom {
    /// First connected element carrying `id`, in tree order.
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index
            .get(id)
            .and_then(|nodes| nodes.first().copied())
    }

    pub fn require_by_id(&self, id: &str) -> Result<NodeId> {
        self.by_id(id)
            .ok_or_else(|| Error::NotFound(format!("no element with id `{id}`")))
    }

    /// Every connected element carrying `id`. Duplicates stay in tree order.
    pub fn all_by_id(&self, id: &str) -> Vec<NodeId> {
        self.id_index.get(id).cloned().unwrap_or_default()
    }

    pub fn by_name(&self, name: &str) -> Vec<NodeId> {
        self.name_index.get(name).cloned().unwrap_or_default()
    }

    pub(crate) fn index_node_attrs(&mut self, node_id: NodeId) {
        let Some(element) = self.element(node_id) else {
            return;
        };
        let id = element.attrs.get("id").map(str::to_string);
        let name = element.attrs.get("name").map(str::to_string);
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            self.id_index.entry(id).or_default().push(node_id);
        }
        if let Some(name) = name.filter(|name| !name.is_empty()) {
            self.name_index.entry(name).or_default().push(node_id);
        }
    }

    /// Recomputes both indexes from the connected tree.
    ///
    /// Called after every structural mutation and after `id`/`name` changes on
    /// connected elements, so lookups never observe detached or stale nodes.
    pub(crate) fn rebuild_indexes(&mut self) {
        self.id_index.clear();
        self.name_index.clear();
        for node in self.all_element_nodes() {
            self.index_node_attrs(node);
        }
    }
}
