//! Prompt templates.

/// Analysis prompt. The model is asked for a JSON object matching
/// `StoryAnalysis`.
pub fn analyze_story(story_text: &str) -> String {
    format!(
        "You are a literary expert. Analyze the provided story and identify key themes, \
main characters, story structure, and provide a summary.

Respond with a JSON object with these fields:
- \"themes\": array of strings, key themes identified in the story
- \"characters\": array of strings, main characters and their descriptions
- \"structure\": string, a summary of the story structure, including the beginning, \
rising action, climax, falling action, and resolution
- \"summary\": string, a brief summary of the story

Story:
{story_text}"
    )
}

/// Storyboard prompt. `analysis_json` is the serialized analysis.
pub fn storyboard(analysis_json: &str, user_prompts: &str) -> String {
    format!(
        "Based on the story analysis and user prompts, create a visual storyboard with 3-5 key scenes.

Story Analysis: {analysis_json}
User Prompts: {user_prompts}

Generate a JSON array of strings, where each string is a detailed textual description of a key scene."
    )
}

/// Guidance used when the user does not supply any.
pub fn default_storyboard_guidance(title: &str) -> String {
    format!("Generate a storyboard for the story titled \"{title}\". Focus on key visual moments.")
}

/// The two text parts sent with an image request.
pub fn image_parts(subject: &str, style: &str) -> [String; 2] {
    [
        format!("Generate an image of: {subject}"),
        format!("In the style of: {style}"),
    ]
}
