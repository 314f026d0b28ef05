use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

static SECTION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(NPCS|PLAYER CHARACTERS|ITEMS|LOCATIONS|FACTIONS|QUESTS):$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(ascii_case_insensitive)]
enum Section {
    #[strum(serialize = "NPCS")]
    Npcs,
    #[strum(serialize = "PLAYER CHARACTERS")]
    PlayerCharacters,
    #[strum(serialize = "ITEMS")]
    Items,
    #[strum(serialize = "LOCATIONS")]
    Locations,
    #[strum(serialize = "FACTIONS")]
    Factions,
    #[strum(serialize = "QUESTS")]
    Quests,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntry {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCharacter {
    pub name: String,
    pub description: String,
    /// `NPC` or `PC`
    pub kind: &'static str,
}

/// Wiki updates found in a block of curated session notes.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedNotes {
    pub characters: Vec<NoteCharacter>,
    pub items: Vec<NoteEntry>,
    pub locations: Vec<NoteEntry>,
    pub organizations: Vec<NoteEntry>,
}

impl ParsedNotes {
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.items.is_empty() && self.locations.is_empty() && self.organizations.is_empty()
    }
}

/// Parses `SECTION:` headers followed by `- Name: Description` bullets.
///
/// Lines before the first header, bullets without a colon and everything
/// under `QUESTS:` are ignored.
pub fn parse_notes(text: &str) -> ParsedNotes {
    let mut notes = ParsedNotes::default();
    let mut section = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(caps) = SECTION_HEADER.captures(trimmed) {
            section = Section::from_str(&caps[1]).ok();
            continue;
        }
        let (Some(current), Some(content)) = (section, trimmed.strip_prefix('-')) else {
            continue;
        };
        let Some((name, description)) = content.trim().split_once(':') else {
            continue;
        };
        let name = name.trim().to_string();
        if name.is_empty() {
            continue;
        }
        let entry = NoteEntry {
            name,
            description: description.trim().to_string(),
        };
        match current {
            Section::Npcs => notes.characters.push(NoteCharacter {
                name: entry.name,
                description: entry.description,
                kind: "NPC",
            }),
            Section::PlayerCharacters => notes.characters.push(NoteCharacter {
                name: entry.name,
                description: entry.description,
                kind: "PC",
            }),
            Section::Items => notes.items.push(entry),
            Section::Locations => notes.locations.push(entry),
            Section::Factions => notes.organizations.push(entry),
            Section::Quests => {}
        }
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections() {
        let text = "\
Session went long.
- Stray: ignored before any header

NPCs:
- Meek: A timid goblin who refused to fight.
- Sildar Hallwinter: Lord's Alliance agent: rescued from the cave
PLAYER CHARACTERS:
  - Lita: Halfling rogue
items:
- Glasstaff's Staff: Staff of Defense
- No colon here
LOCATIONS:
- Cragmaw Hideout: Goblin cave
FACTIONS:
- Redbrands: Thugs in Phandalin
QUESTS:
- Find Gundren: Still missing
";
        let notes = parse_notes(text);
        assert_eq!(
            notes.characters,
            vec![
                NoteCharacter {
                    name: "Meek".into(),
                    description: "A timid goblin who refused to fight.".into(),
                    kind: "NPC"
                },
                NoteCharacter {
                    name: "Sildar Hallwinter".into(),
                    description: "Lord's Alliance agent: rescued from the cave".into(),
                    kind: "NPC"
                },
                NoteCharacter {
                    name: "Lita".into(),
                    description: "Halfling rogue".into(),
                    kind: "PC"
                },
            ]
        );
        assert_eq!(notes.items.len(), 1);
        assert_eq!(notes.items[0].name, "Glasstaff's Staff");
        assert_eq!(notes.locations[0].name, "Cragmaw Hideout");
        assert_eq!(notes.organizations[0].description, "Thugs in Phandalin");
    }

    #[test]
    fn test_header_must_stand_alone() {
        let notes = parse_notes("NPCS: Meek\n- Meek: goblin");
        assert!(notes.is_empty());
    }

    #[test]
    fn test_empty_text() {
        assert!(parse_notes("").is_empty());
    }
}
