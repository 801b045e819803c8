use crate::model::Color;

/// Map a free-text color token onto the palette. Unknown text falls back to
/// `Color::Black`; this never fails.
pub fn normalize_color(text: &str) -> Color {
    match text.trim().to_lowercase().as_str() {
        "black" | "negro" | "negra" | "space" => Color::Black,
        "white" | "blanco" | "blanca" => Color::White,
        "red" | "rojo" | "roja" | "product" => Color::Red,
        "blue" | "azul" => Color::Blue,
        "celeste" | "sierra" | "sierra blue" => Color::SierraBlue,
        "green" | "verde" => Color::Green,
        "alpine" | "alpino" | "alpine green" => Color::AlpineGreen,
        "purple" | "violeta" | "morado" | "lila" => Color::Purple,
        "deep" | "deep purple" => Color::DeepPurple,
        "pink" | "rosa" | "rosado" => Color::Pink,
        "gold" | "dorado" | "oro" => Color::Gold,
        "silver" | "plata" | "plateado" => Color::Silver,
        "graphite" | "graphito" | "grafito" => Color::Graphite,
        "midnight" | "mid" | "medianoche" => Color::Midnight,
        "starlight" | "blanco estelar" => Color::Starlight,
        _ => Color::Black,
    }
}

/// Single token that `normalize_color` maps back onto `color`. Used when
/// writing records out in the price-list dialect.
pub fn dialect_token(color: Color) -> &'static str {
    match color {
        Color::Black => "negro",
        Color::White => "blanco",
        Color::Red => "rojo",
        Color::Blue => "azul",
        Color::Green => "verde",
        Color::Purple => "violeta",
        Color::Pink => "rosa",
        Color::Gold => "dorado",
        Color::Silver => "plata",
        Color::Graphite => "graphito",
        Color::SierraBlue => "celeste",
        Color::AlpineGreen => "alpine",
        Color::Midnight => "midnight",
        Color::Starlight => "starlight",
        Color::DeepPurple => "deep",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn spanish_synonyms() {
        assert_eq!(normalize_color("graphito"), Color::Graphite);
        assert_eq!(normalize_color("azul"), Color::Blue);
        assert_eq!(normalize_color("celeste"), Color::SierraBlue);
        assert_eq!(normalize_color("violeta"), Color::Purple);
        assert_eq!(normalize_color("negro"), Color::Black);
        assert_eq!(normalize_color("mid"), Color::Midnight);
    }

    #[test]
    fn case_and_whitespace_insensitive() {
        assert_eq!(normalize_color("  AZUL "), Color::Blue);
        assert_eq!(normalize_color("Sierra Blue"), Color::SierraBlue);
    }

    #[test]
    fn unknown_and_empty_fall_back_to_black() {
        assert_eq!(normalize_color("turquesa"), Color::Black);
        assert_eq!(normalize_color(""), Color::Black);
    }

    #[test]
    fn dialect_tokens_map_back() {
        for c in Color::ALL {
            assert_eq!(normalize_color(dialect_token(c)), c, "token for {c}");
        }
    }

    proptest! {
        #[test]
        fn tokens_outside_the_table_are_black(token in "[xyzq]{3,10}") {
            prop_assert_eq!(normalize_color(&token), Color::Black);
        }
    }
}
