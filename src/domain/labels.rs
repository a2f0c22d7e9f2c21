use eframe::egui::Color32;

const RELATIONSHIP_LABELS: [(&str, &str); 24] = [
    ("PARENT_OF", "Parent of"),
    ("CHILD_OF", "Child of"),
    ("SIBLING_OF", "Sibling of"),
    ("SPOUSE_OF", "Spouse of"),
    ("FRIEND_OF", "Friend of"),
    ("ENEMY_OF", "Enemy of"),
    ("MENTOR_OF", "Mentor of"),
    ("STUDENT_OF", "Student of"),
    ("MEMBER_OF", "Member of"),
    ("LEADER_OF", "Leader of"),
    ("ALLIED_WITH", "Allied with"),
    ("RIVAL_OF", "Rival of"),
    ("LOCATED_IN", "Located in"),
    ("BORN_IN", "Born in"),
    ("DIED_IN", "Died in"),
    ("RULES", "Rules"),
    ("PARTICIPATED_IN", "Participated in"),
    ("CAUSED", "Caused"),
    ("WITNESSED", "Witnessed"),
    ("OWNS", "Owns"),
    ("CREATED", "Created"),
    ("USES", "Uses"),
    ("RELATED_TO", "Related to"),
    ("MENTIONED_IN", "Mentioned in"),
];

pub const CATEGORY_PALETTE: [(&str, Color32); 7] = [
    ("CHARACTER", Color32::from_rgb(0x63, 0x66, 0xf1)),
    ("LOCATION", Color32::from_rgb(0x22, 0xc5, 0x5e)),
    ("FACTION", Color32::from_rgb(0xf5, 0x9e, 0x0b)),
    ("ITEM", Color32::from_rgb(0xec, 0x48, 0x99)),
    ("EVENT", Color32::from_rgb(0x8b, 0x5c, 0xf6)),
    ("CHAPTER", Color32::from_rgb(0x06, 0xb6, 0xd4)),
    ("CONCEPT", Color32::from_rgb(0xf9, 0x73, 0x16)),
];

const UNKNOWN_CATEGORY_COLOR: Color32 = Color32::from_rgb(0x6b, 0x72, 0x80);
const DEFAULT_TAG_COLOR: Color32 = Color32::from_rgb(0x80, 0x80, 0x80);

/// Human-readable text for a relationship type such as `FRIEND_OF`.
///
/// Custom types fall back to a lower-cased, space separated rendition.
pub fn relationship_label(type_label: &str) -> String {
    RELATIONSHIP_LABELS
        .iter()
        .find(|(key, _)| *key == type_label)
        .map(|(_, label)| (*label).to_owned())
        .unwrap_or_else(|| type_label.replace('_', " ").to_lowercase())
}

pub fn category_color(category: &str) -> Color32 {
    CATEGORY_PALETTE
        .iter()
        .find(|(key, _)| *key == category)
        .map(|(_, color)| *color)
        .unwrap_or(UNKNOWN_CATEGORY_COLOR)
}

/// Parses a `#rrggbb` tag colour, falling back to grey.
pub fn tag_color(hex: &str) -> Color32 {
    Color32::from_hex(hex.trim()).unwrap_or(DEFAULT_TAG_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_relationship_types_use_table() {
        assert_eq!(relationship_label("FRIEND_OF"), "Friend of");
        assert_eq!(relationship_label("RULES"), "Rules");
    }

    #[test]
    fn custom_relationship_types_are_humanized() {
        assert_eq!(relationship_label("SWORN_TO"), "sworn to");
        assert_eq!(relationship_label(""), "");
    }

    #[test]
    fn unknown_category_is_grey() {
        assert_eq!(category_color("FACTION"), Color32::from_rgb(0xf5, 0x9e, 0x0b));
        assert_eq!(category_color("DRAGON"), UNKNOWN_CATEGORY_COLOR);
    }

    #[test]
    fn tag_colors_parse_hex_or_fall_back() {
        assert_eq!(tag_color("#ec4899"), Color32::from_rgb(0xec, 0x48, 0x99));
        assert_eq!(tag_color("crimson"), DEFAULT_TAG_COLOR);
        assert_eq!(tag_color(""), DEFAULT_TAG_COLOR);
    }
}
