use serde::Deserialize;

use super::relationship_label;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Entity {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "type")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Tag {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default = "default_tag_color")]
    pub color: String,
}

fn default_tag_color() -> String {
    "#808080".to_owned()
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Relationship {
    pub id: String,
    #[serde(rename = "fromEntityId")]
    pub from_id: String,
    #[serde(rename = "toEntityId")]
    pub to_id: String,
    #[serde(default, rename = "relationType")]
    pub type_label: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Link {
    pub id: String,
    #[serde(rename = "fromEntityId")]
    pub from_id: String,
    #[serde(rename = "toEntityId")]
    pub to_id: String,
    #[serde(default)]
    pub note: String,
}

/// Immutable view of one project's entities and their connections.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Snapshot {
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// One relationship or link seen from a particular entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    pub outgoing: bool,
    pub label: String,
    pub other_id: String,
    pub is_link: bool,
}

impl Snapshot {
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn connection_count(&self) -> usize {
        self.relationships.len() + self.links.len()
    }

    pub fn connections_of(&self, id: &str) -> Vec<Connection> {
        let relationships = self
            .relationships
            .iter()
            .filter(|rel| rel.from_id == id || rel.to_id == id)
            .map(|rel| {
                let outgoing = rel.from_id == id;
                Connection {
                    outgoing,
                    label: relationship_label(&rel.type_label),
                    other_id: (if outgoing { &rel.to_id } else { &rel.from_id }).clone(),
                    is_link: false,
                }
            });

        let links = self
            .links
            .iter()
            .filter(|link| link.from_id == id || link.to_id == id)
            .map(|link| {
                let outgoing = link.from_id == id;
                Connection {
                    outgoing,
                    label: link.note.clone(),
                    other_id: (if outgoing { &link.to_id } else { &link.from_id }).clone(),
                    is_link: true,
                }
            });

        relationships.chain(links).collect()
    }
}
