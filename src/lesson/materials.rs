//! Printable practice materials

use std::fmt;

/// Take-home materials a lesson advertises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Material {
    ColoringPages,
    Flashcards,
    MatchingGame,
    ProgressChart,
}

impl Material {
    pub const ALL: [Material; 4] = [
        Material::ColoringPages,
        Material::Flashcards,
        Material::MatchingGame,
        Material::ProgressChart,
    ];

    /// Alert shown when the material is requested
    pub fn announcement(self) -> &'static str {
        match self {
            Material::ColoringPages => {
                "🎨 Coloring pages are coming soon! Ask mom or dad to help print them!"
            }
            Material::Flashcards => "📝 Word flashcards are coming soon! These will be so much fun!",
            Material::MatchingGame => "🧩 Matching game is coming soon! You will love this game!",
            Material::ProgressChart => {
                "⭐ Progress chart is coming soon! Track all your amazing learning!"
            }
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Material::ColoringPages => "coloring pages",
            Material::Flashcards => "flashcards",
            Material::MatchingGame => "matching game",
            Material::ProgressChart => "progress chart",
        };
        f.write_str(name)
    }
}
