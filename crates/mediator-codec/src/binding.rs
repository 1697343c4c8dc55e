//! Binding between element trees and typed records
//!
//! Both record shapes have the same layout under different element names, so
//! one pair of routines handles both, driven by an [`ElementNames`] table.

use crate::BindingError;
use mediator_ir::{NewDetail, NewRecord, Node, OldDetail, OldRecord, Timestamp};

/// A record that can be moved to and from an element tree
pub trait XmlRecord: Sized {
    /// Name of the root element
    const ROOT: &'static str;

    /// Build the element tree for this record. Absent fields produce no element.
    fn to_node(&self) -> Node;

    /// Bind a validated element tree to a record.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError`] when the root element does not match or a
    /// value cannot be converted.
    fn from_node(node: &Node) -> Result<Self, BindingError>;
}

/// Element names of one document shape
struct ElementNames {
    root: &'static str,
    id: &'static str,
    name: &'static str,
    data: &'static str,
    time: &'static str,
    value: &'static str,
}

const OLD_NAMES: ElementNames = ElementNames {
    root: "oldschema",
    id: "oldid",
    name: "oldname",
    data: "olddata",
    time: "oldtime",
    value: "oldvalue",
};

const NEW_NAMES: ElementNames = ElementNames {
    root: "newschema",
    id: "newid",
    name: "newname",
    data: "newdata",
    time: "newtime",
    value: "newvalue",
};

/// Shape-independent view of a record
struct Fields {
    id: Option<String>,
    name: Option<String>,
    data: Option<(Option<Timestamp>, Option<String>)>,
}

impl ElementNames {
    fn build(
        &self,
        id: Option<&str>,
        name: Option<&str>,
        data: Option<(Option<&Timestamp>, Option<&str>)>,
    ) -> Node {
        let mut root = Node::new(self.root);
        root.add_optional_text(self.id, id)
            .add_optional_text(self.name, name);

        if let Some((time, value)) = data {
            let time = time.map(ToString::to_string);
            let mut detail = Node::new(self.data);
            detail
                .add_optional_text(self.time, time.as_deref())
                .add_optional_text(self.value, value);
            root.add_child(detail);
        }
        root
    }

    fn bind(&self, node: &Node) -> Result<Fields, BindingError> {
        if node.name != self.root {
            return Err(BindingError::Root {
                expected: self.root,
                found: node.name.clone(),
            });
        }

        let data = node
            .find_child(self.data)
            .map(|detail| {
                let time = detail
                    .child_text(self.time)
                    .map(|text| {
                        Timestamp::parse(text).map_err(|source| BindingError::Value {
                            element: format!("{}/{}/{}", self.root, self.data, self.time),
                            source,
                        })
                    })
                    .transpose()?;
                let value = detail.child_text(self.value).map(str::to_string);
                Ok::<_, BindingError>((time, value))
            })
            .transpose()?;

        Ok(Fields {
            id: node.child_text(self.id).map(str::to_string),
            name: node.child_text(self.name).map(str::to_string),
            data,
        })
    }
}

impl XmlRecord for OldRecord {
    const ROOT: &'static str = OLD_NAMES.root;

    fn to_node(&self) -> Node {
        OLD_NAMES.build(
            self.id.as_deref(),
            self.name.as_deref(),
            self.data
                .as_ref()
                .map(|d| (d.time.as_ref(), d.value.as_deref())),
        )
    }

    fn from_node(node: &Node) -> Result<Self, BindingError> {
        let fields = OLD_NAMES.bind(node)?;
        Ok(Self {
            id: fields.id,
            name: fields.name,
            data: fields.data.map(|(time, value)| OldDetail { time, value }),
        })
    }
}

impl XmlRecord for NewRecord {
    const ROOT: &'static str = NEW_NAMES.root;

    fn to_node(&self) -> Node {
        NEW_NAMES.build(
            self.id.as_deref(),
            self.name.as_deref(),
            self.data
                .as_ref()
                .map(|d| (d.time.as_ref(), d.value.as_deref())),
        )
    }

    fn from_node(node: &Node) -> Result<Self, BindingError> {
        let fields = NEW_NAMES.bind(node)?;
        Ok(Self {
            id: fields.id,
            name: fields.name,
            data: fields.data.map(|(time, value)| NewDetail { time, value }),
        })
    }
}
