use serde::{Deserialize, Serialize};

/// One node of a bill-of-materials tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomNode {
    pub product_name: String,
    pub cabinet_position: Option<String>,
    pub quantity: Option<f64>,
    pub children: Vec<BomNode>,
}

impl BomNode {
    pub fn leaf(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            cabinet_position: None,
            quantity: None,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first search for a product anywhere below (and including) this node.
    pub fn find(&self, product_name: &str) -> Option<&BomNode> {
        if self.product_name == product_name {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find(product_name))
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(BomNode::node_count).sum::<usize>()
    }
}

pub fn find_in_forest<'a>(roots: &'a [BomNode], product_name: &str) -> Option<&'a BomNode> {
    roots.iter().find_map(|root| root.find(product_name))
}
