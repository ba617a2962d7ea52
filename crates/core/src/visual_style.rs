//! Static catalog of visual styles applied to scene image generation.

use serde::Serialize;

/// A named preset whose prompt fragment is appended to every image request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisualStyle {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub preview_image_url: &'static str,
    pub prompt_fragment: &'static str,
}

const PREVIEW_PLACEHOLDER: &str = "https://placehold.co/300x180.png";

/// Every style offered to users, in display order.
pub const VISUAL_STYLES: &[VisualStyle] = &[
    VisualStyle {
        id: "cinematic",
        name: "Cinematic",
        description: "Dramatic, rich colors.",
        preview_image_url: PREVIEW_PLACEHOLDER,
        prompt_fragment: "cinematic style, dramatic lighting, high contrast, rich colors, film grain",
    },
    VisualStyle {
        id: "anime",
        name: "Anime",
        description: "Japanese animation.",
        preview_image_url: PREVIEW_PLACEHOLDER,
        prompt_fragment: "anime style, vibrant colors, expressive characters, detailed backgrounds, cel shading",
    },
    VisualStyle {
        id: "pixelart",
        name: "Pixel Art",
        description: "Retro 8/16-bit look.",
        preview_image_url: PREVIEW_PLACEHOLDER,
        prompt_fragment: "pixel art style, 16-bit, retro gaming aesthetic, limited palette",
    },
    VisualStyle {
        id: "watercolor",
        name: "Watercolor",
        description: "Soft, flowing, artistic.",
        preview_image_url: PREVIEW_PLACEHOLDER,
        prompt_fragment: "watercolor painting style, soft edges, flowing colors, artistic, textured paper",
    },
    VisualStyle {
        id: "noir",
        name: "Film Noir",
        description: "B&W, high contrast.",
        preview_image_url: PREVIEW_PLACEHOLDER,
        prompt_fragment: "film noir style, black and white, high contrast, dramatic shadows, mysterious atmosphere, 1940s aesthetic",
    },
    VisualStyle {
        id: "fantasy",
        name: "Fantasy Art",
        description: "Epic, detailed, magical.",
        preview_image_url: PREVIEW_PLACEHOLDER,
        prompt_fragment: "epic fantasy art style, detailed illustration, magical elements, rich textures, vibrant lighting",
    },
    VisualStyle {
        id: "scifi",
        name: "Sci-Fi Concept",
        description: "Futuristic, technological.",
        preview_image_url: PREVIEW_PLACEHOLDER,
        prompt_fragment: "sci-fi concept art style, futuristic technology, sleek designs, neon accents, metallic surfaces",
    },
    VisualStyle {
        id: "cartoon",
        name: "Modern Cartoon",
        description: "Clean lines, bright.",
        preview_image_url: PREVIEW_PLACEHOLDER,
        prompt_fragment: "modern cartoon style, clean lines, bright and bold colors, expressive characters, simple backgrounds",
    },
];

/// Look up a style by identifier.
pub fn find_style(id: &str) -> Option<&'static VisualStyle> {
    VISUAL_STYLES.iter().find(|s| s.id == id)
}
