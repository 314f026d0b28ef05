/// Prompt asking for the six extraction sections as a single JSON object.
pub fn extraction_prompt(transcript: &str) -> String {
    format!(
        r#"You are a meticulous D&D campaign assistant. Read the following game session transcript and extract all relevant entities.
Return ONLY a single, valid JSON object with no surrounding text and no markdown fence.

The object has 6 top-level keys: "characters", "locations", "organizations", "items", "lore" and "sessionSummary".

- "characters": array of objects with "name" and "description" (what they did or what was learned). When stated in the transcript also include "type" ("PC" or "NPC"), "species", "class", "level", "hp", "ac" (numbers) and "status".
- "locations": array of objects with "name" and "description". Optionally "type" and "foundingYear" (a number).
- "organizations": array of objects with "name" and "description". Optionally "type".
- "items": array of objects with "name" and "description". Optionally "type" and "rarity".
- "lore": array of objects with "title" (e.g. "The Spellplague") and "description". Optionally "type" and "tag".
- "sessionSummary": a single object with "title" (a creative title for the session), "recap" (a detailed narrative summary), "outline" (a short bulleted outline) and "notableQuotes" (an array of objects with "quote", "speaker" and "context").

If a category has no entities, return an empty array [].
Do not invent information. Only use details from the transcript.

Here is the transcript:
---
{transcript}
---
"#
    )
}

/// Prompt asking the model to rewrite a session storybook using curated notes as the source of truth.
pub fn enhance_prompt(storybook: &str, notes_recap: &str) -> String {
    format!(
        r#"You are a fantasy novel editor.

Here is the "Original Draft" of a D&D session chapter:
---
{storybook}
---

Here are the "Editor's Notes" (an accurate recap) for the same session:
---
{notes_recap}
---

Rewrite the "Original Draft" to improve it.
1. Source of truth: the "Editor's Notes" contain the correct spellings of names and the correct facts. Fix any discrepancies in the draft.
2. Add detail: if the notes contain details, dialogue or events missing from the draft, weave them into the narrative.
3. Keep the style: keep the novelistic, past-tense, show-don't-tell style of the draft. Do not turn it into a list.

Return ONLY the enhanced story text.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_embed_inputs() {
        let prompt = extraction_prompt("Lita opened the door.");
        assert!(prompt.contains("Lita opened the door."));
        assert!(prompt.contains("\"sessionSummary\""));

        let prompt = enhance_prompt("Once upon a time", "Lidda, not Lita");
        assert!(prompt.contains("Once upon a time"));
        assert!(prompt.contains("Lidda, not Lita"));
    }
}
