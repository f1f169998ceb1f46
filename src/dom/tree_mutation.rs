use super::*;

impl Dom {
    fn can_have_children(&self, node_id: NodeId) -> bool {
        matches!(
            self.node(node_id).map(|node| &node.node_type),
            Some(NodeType::Document | NodeType::Element(_))
        )
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId, operation: &str) -> Result<()> {
        self.ensure_node(parent)?;
        self.ensure_node(child)?;
        if !self.can_have_children(parent) {
            return Err(Error::HierarchyRequest(format!(
                "{operation} target {parent} cannot have children"
            )));
        }
        if child == self.root {
            return Err(Error::HierarchyRequest(format!(
                "{operation} cannot move the document root"
            )));
        }
        // parent must not sit inside child's subtree
        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return Err(Error::HierarchyRequest(format!(
                    "{operation} would create a cycle"
                )));
            }
            cursor = self.parent(node);
        }
        Ok(())
    }

    fn detach_from_parent(&mut self, child: NodeId) {
        if let Some(old_parent) = self.parent(child) {
            self.nodes[old_parent.0].children.retain(|id| *id != child);
        }
        self.nodes[child.0].parent = None;
    }

    /// Moves `child` (with its subtree) to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_insertion(parent, child, "appendChild")?;
        self.detach_from_parent(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.after_insertion(child);
        Ok(())
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        let Some(reference) = reference else {
            return self.append_child(parent, child);
        };
        self.check_insertion(parent, child, "insertBefore")?;
        if self.parent(reference) != Some(parent) {
            return Err(Error::NotFound(format!(
                "insertBefore reference {reference} is not a child of {parent}"
            )));
        }
        if child == reference {
            return Ok(());
        }
        self.detach_from_parent(child);
        let index = self.nodes[parent.0]
            .children
            .iter()
            .position(|id| *id == reference)
            .unwrap_or(self.nodes[parent.0].children.len());
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(index, child);
        self.after_insertion(child);
        Ok(())
    }

    fn after_insertion(&mut self, child: NodeId) {
        if self.is_connected(child) {
            let mut inserted = Vec::new();
            self.collect_elements_dfs(child, &mut inserted);
            for node in inserted {
                match self.element_kind(node) {
                    Some(ElementKind::Input(InputType::Radio)) if self.checked(node) => {
                        self.uncheck_other_radios_in_group(node);
                    }
                    Some(ElementKind::Select) => self.normalize_single_select(node),
                    _ => {}
                }
            }
        }
        self.rebuild_indexes();
    }

    /// Detaches `child` from `parent`. The subtree stays valid (and keeps its
    /// listeners) but is no longer reachable from the document.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.ensure_node(parent)?;
        self.ensure_node(child)?;
        if self.parent(child) != Some(parent) {
            return Err(Error::NotFound(format!(
                "removeChild: {child} is not a child of {parent}"
            )));
        }
        self.detach_from_parent(child);
        self.rebuild_indexes();
        Ok(())
    }

    /// Detaches the node from wherever it sits. Detached nodes are left alone.
    pub fn remove_node(&mut self, node_id: NodeId) -> Result<()> {
        self.ensure_node(node_id)?;
        if node_id == self.root {
            return Err(Error::HierarchyRequest("cannot remove the document root".into()));
        }
        let Some(parent) = self.parent(node_id) else {
            return Ok(());
        };
        self.remove_child(parent, node_id)
    }

    /// Copies a node (and with `deep`, its descendants) into a new detached
    /// subtree. The copy shares no state with the source and has no
    /// listeners; whether `id` survives depends on [`CloneIdPolicy`].
    pub fn clone_node(&mut self, node_id: NodeId, deep: bool) -> Result<NodeId> {
        self.ensure_node(node_id)?;
        if node_id == self.root {
            return Err(Error::NotSupported("cannot clone the document node".into()));
        }
        Ok(self.clone_subtree(node_id, None, deep))
    }

    fn clone_subtree(&mut self, source: NodeId, parent: Option<NodeId>, deep: bool) -> NodeId {
        stacker::maybe_grow(64 * 1024, 1024 * 1024, || {
            self.clone_subtree_inner(source, parent, deep)
        })
    }

    fn clone_subtree_inner(&mut self, source: NodeId, parent: Option<NodeId>, deep: bool) -> NodeId {
        let mut node_type = self.nodes[source.0].node_type.clone();
        if let (NodeType::Element(element), CloneIdPolicy::Clear) =
            (&mut node_type, self.clone_id_policy)
        {
            element.attrs.remove("id");
        }
        let copy = self.create_node(parent, node_type);
        if deep {
            let children = self.nodes[source.0].children.clone();
            for child in children {
                self.clone_subtree(child, Some(copy), true);
            }
        }
        copy
    }
}
