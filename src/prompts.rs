pub const BAZI: &str = include_str!("../data/prompts/bazi.txt");
pub const PALM_IMAGE: &str = include_str!("../data/prompts/palm_image.txt");
pub const PALM_GENERIC: &str = include_str!("../data/prompts/palm_generic.txt");
pub const ASTROLOGY: &str = include_str!("../data/prompts/astrology.txt");
pub const TAROT_DRAW: &str = include_str!("../data/prompts/tarot_draw.txt");
pub const TAROT_CARDS: &str = include_str!("../data/prompts/tarot_cards.txt");

/// Replace `{{key}}` placeholders in a template string.
///
/// Single pass, so placeholder-looking text inside a substituted value is
/// left alone. Unknown placeholders are kept verbatim.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        match after_open.find("}}") {
            Some(end) => {
                let key = &after_open[..end];
                match vars.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => result.push_str(value),
                    None => {
                        result.push_str("{{");
                        result.push_str(key);
                        result.push_str("}}");
                    }
                }
                rest = &after_open[end + 2..];
            }
            None => {
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    result.push_str(rest);
    result.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_multiple_vars() {
        assert_eq!(
            render("{{a}} and {{b}}", &[("a", "cats"), ("b", "dogs")]),
            "cats and dogs"
        );
    }

    #[test]
    fn test_render_does_not_expand_values() {
        assert_eq!(
            render("{{a}} / {{b}}", &[("a", "{{b}}"), ("b", "x")]),
            "{{b}} / x"
        );
    }

    #[test]
    fn test_render_keeps_unknown_and_unclosed() {
        assert_eq!(render("{{missing}} {{open", &[]), "{{missing}} {{open");
    }

    #[test]
    fn test_prompts_are_non_empty() {
        for template in [BAZI, PALM_IMAGE, PALM_GENERIC, ASTROLOGY, TAROT_DRAW, TAROT_CARDS] {
            assert!(!template.trim().is_empty());
        }
    }

    #[test]
    fn test_templates_have_placeholders() {
        assert!(BAZI.contains("{{birth}}"));
        assert!(BAZI.contains("{{hour}}"));
        assert!(ASTROLOGY.contains("{{birthday}}"));
        assert!(TAROT_DRAW.contains("{{question}}"));
        for key in ["{{question}}", "{{past}}", "{{present}}", "{{future}}"] {
            assert!(TAROT_CARDS.contains(key), "{}", key);
        }
    }
}
