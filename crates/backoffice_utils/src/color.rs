use colored::*;

pub struct ConsoleColors {}

impl ConsoleColors {
    pub fn highlight(text: &str) -> String {
        // #6C4AB6
        let violet = Color::TrueColor {
            r: 108,
            g: 74,
            b: 182,
        };

        text.color(violet).to_string()
    }

    pub fn success(text: &str) -> String {
        // #2EB67D
        let green = Color::TrueColor {
            r: 46,
            g: 182,
            b: 125,
        };

        text.color(green).to_string()
    }

    pub fn alert(text: &str) -> String {
        let red = Color::TrueColor { r: 224, g: 30, b: 90 };

        text.color(red).bold().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colored_text_keeps_content() {
        colored::control::set_override(false);
        assert_eq!(ConsoleColors::highlight("users"), "users");
        assert_eq!(ConsoleColors::success("done"), "done");
        assert_eq!(ConsoleColors::alert("failed"), "failed");
    }
}
